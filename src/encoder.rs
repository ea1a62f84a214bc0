// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh
// -----
// Created Date: 2023/09/21 11:30:17

use algorithm::buf::{Bt, BtMut};

use crate::field::{
    encode_dynamic_table_size_update, encode_indexed_header_field,
    encode_literal_header_field_with_indexed_name, encode_literal_header_field_with_new_name,
};
use crate::table::{HpackMatch, IndexingTable};
use crate::{Helper, HpackError, HpackField, HpackResult, DEFAULT_SETTINGS_HEADER_TABLE_SIZE};

/// Encodes header blocks with HPACK, one encoder per direction of one
/// connection. The dynamic table mirrors the one the peer's decoder keeps,
/// which is why the encode entry points take `&mut self`.
pub struct Encoder {
    indexing_table: IndexingTable,
}

impl Encoder {
    pub fn new() -> Encoder {
        Encoder::with_max_size(DEFAULT_SETTINGS_HEADER_TABLE_SIZE)
    }

    pub fn with_max_size(size: usize) -> Encoder {
        Encoder {
            indexing_table: IndexingTable::with_size(size),
        }
    }

    /// Encodes one header block into `dst`, in field order.
    ///
    /// When the host requests a new table maximum the update is applied and
    /// emitted first, once, before any field. Returns the number of octets
    /// written.
    pub fn encode_block<'a, B, I>(
        &mut self,
        dst: &mut B,
        fields: I,
        new_max_table_size: Option<usize>,
    ) -> HpackResult<usize>
    where
        B: Bt + BtMut,
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let mut size = 0;
        if let Some(new_size) = new_max_table_size {
            if !self.indexing_table.update_maximum_size(new_size) {
                return Err(HpackError::InsertionRejected);
            }
            size += encode_dynamic_table_size_update(dst, new_size)?;
        }

        for (name, value) in fields {
            size += self.encode_header_field(dst, name, value)?;
        }
        log::trace!("encoded header block: {} octets", size);
        Ok(size)
    }

    /// Encodes a header list into a fresh buffer.
    pub fn encode<'a, I>(&mut self, fields: I) -> HpackResult<Vec<u8>>
    where
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let mut dst = algorithm::buf::BinaryMut::new();
        self.encode_block(&mut dst, fields, None)?;
        Ok(dst.chunk().to_vec())
    }

    fn encode_header_field<B: Bt + BtMut>(
        &mut self,
        dst: &mut B,
        name: &[u8],
        value: &[u8],
    ) -> HpackResult<usize> {
        // The wire wants lower case names no matter what the host stores.
        let name = Helper::lower_name(name);
        let name = &*name;

        // Choose the representation (See RFC7541 7.1.3)
        // - Authorization obviously should not be indexed
        // - Short Cookie values should not be indexed because of low entropy
        let ftype = if (name == b"cookie" && value.len() < 20) || name == b"authorization" {
            HpackField::NeverindexLiteral
        } else {
            HpackField::IndexedLiteral
        };

        let result = self.indexing_table.lookup(name, value);
        match result.match_type {
            HpackMatch::Exact => encode_indexed_header_field(dst, result.index),
            HpackMatch::Name => encode_literal_header_field_with_indexed_name(
                dst,
                name,
                value,
                result.index,
                &mut self.indexing_table,
                ftype,
            ),
            HpackMatch::None => encode_literal_header_field_with_new_name(
                dst,
                name,
                value,
                &mut self.indexing_table,
                ftype,
            ),
        }
    }

    /// Applies a size limit the peer advertised out of band, without
    /// emitting anything; the in-band update goes out with the next block.
    pub fn set_max_table_size(&mut self, new_size: usize) -> bool {
        self.indexing_table.update_maximum_size(new_size)
    }

    pub fn max_table_size(&self) -> usize {
        self.indexing_table.maximum_size()
    }

    pub fn indexing_table(&self) -> &IndexingTable {
        &self.indexing_table
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}
