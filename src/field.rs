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
// Created Date: 2023/09/20 09:12:44

//! Per-field encoding and decoding of the five representations of
//! [RFC 7541] section 6.

use algorithm::buf::{Bt, BtMut};

use crate::{
    table::IndexingTable, xpack, CompressionError, Helper, HpackResult,
};

/// The five ways a single header field can appear on the wire. The high
/// bits of the first byte identify the representation unambiguously, so
/// parsing the type cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpackField {
    /// [RFC 7541] 6.1. Indexed Header Field Representation
    Index,
    /// [RFC 7541] 6.2.1. Literal Header Field with Incremental Indexing
    IndexedLiteral,
    /// [RFC 7541] 6.2.2. Literal Header Field without Indexing
    NoindexLiteral,
    /// [RFC 7541] 6.2.3. Literal Header Field Never Indexed
    NeverindexLiteral,
    /// [RFC 7541] 6.3. Dynamic Table Size Update
    TablesizeUpdate,
}

impl HpackField {
    pub fn parse(octet: u8) -> HpackField {
        if octet & 0x80 == 0x80 {
            HpackField::Index
        } else if octet & 0x40 == 0x40 {
            HpackField::IndexedLiteral
        } else if octet & 0x20 == 0x20 {
            HpackField::TablesizeUpdate
        } else if octet & 0x10 == 0x10 {
            HpackField::NeverindexLiteral
        } else {
            HpackField::NoindexLiteral
        }
    }

    pub fn is_literal(&self) -> bool {
        match self {
            HpackField::IndexedLiteral
            | HpackField::NoindexLiteral
            | HpackField::NeverindexLiteral => true,
            _ => false,
        }
    }

    /// Integer prefix length and tag bits of the literal forms.
    fn literal_prefix(&self) -> HpackResult<(u8, u8)> {
        match self {
            HpackField::IndexedLiteral => Ok((6, 0x40)),
            HpackField::NoindexLiteral => Ok((4, 0x00)),
            HpackField::NeverindexLiteral => Ok((4, 0x10)),
            _ => Err(CompressionError::UnexpectedRepresentation.into()),
        }
    }
}

pub fn encode_indexed_header_field<B: Bt + BtMut>(dst: &mut B, index: usize) -> HpackResult<usize> {
    let size = xpack::encode_integer(dst, 0x80, index as u64, 7)?;
    log::trace!("encoded field: {}", index);
    Ok(size)
}

pub fn encode_literal_header_field_with_indexed_name<B: Bt + BtMut>(
    dst: &mut B,
    name: &[u8],
    value: &[u8],
    index: usize,
    indexing_table: &mut IndexingTable,
    ftype: HpackField,
) -> HpackResult<usize> {
    let (prefix, flag) = ftype.literal_prefix()?;
    if ftype == HpackField::IndexedLiteral {
        indexing_table.add_header_field(name, value);
    }

    let mut size = xpack::encode_integer(dst, flag, index as u64, prefix)?;
    size += xpack::encode_string(dst, 0, value, 7)?;
    log::trace!("encoded field: {}: {} value octets", index, value.len());
    Ok(size)
}

pub fn encode_literal_header_field_with_new_name<B: Bt + BtMut>(
    dst: &mut B,
    name: &[u8],
    value: &[u8],
    indexing_table: &mut IndexingTable,
    ftype: HpackField,
) -> HpackResult<usize> {
    let (_, flag) = ftype.literal_prefix()?;
    if ftype == HpackField::IndexedLiteral {
        indexing_table.add_header_field(name, value);
    }

    let mut size = dst.put_u8(flag);
    size += xpack::encode_string(dst, 0, name, 7)?;
    size += xpack::encode_string(dst, 0, value, 7)?;
    log::trace!("encoded field: {} name octets, {} value octets", name.len(), value.len());
    Ok(size)
}

pub fn encode_dynamic_table_size_update<B: Bt + BtMut>(
    dst: &mut B,
    size: usize,
) -> HpackResult<usize> {
    xpack::encode_integer(dst, 0x20, size as u64, 5)
}

//
// [RFC 7541] 6.1. Indexed Header Field Representation
//
pub fn decode_indexed_header_field<'a>(
    indexing_table: &'a IndexingTable,
    buf: &[u8],
) -> HpackResult<((&'a [u8], &'a [u8]), usize)> {
    let (index, consumed) = xpack::decode_integer(buf, 7)?;
    let field = indexing_table.get_header_field(index)?;
    Ok((field, consumed))
}

//
// [RFC 7541] 6.2. Literal Header Field Representation
//
// Decodes all three literal forms. The returned flag reports an uppercase
// octet in a literally transmitted name: invalid in HTTP/2 but not an HPACK
// error, so parsing carries on and the block driver decides.
pub fn decode_literal_header_field(
    indexing_table: &mut IndexingTable,
    buf: &[u8],
) -> HpackResult<((Vec<u8>, Vec<u8>), usize, bool)> {
    if buf.is_empty() {
        return Err(CompressionError::IntegerDecoding(
            crate::IntegerDecodingError::NotEnoughOctets,
        )
        .into());
    }

    let ftype = HpackField::parse(buf[0]);
    let (prefix, _) = ftype.literal_prefix()?;
    let (index, mut consumed) = xpack::decode_integer(buf, prefix)?;

    let mut has_http2_violation = false;
    let name = if index != 0 {
        let (name, _) = indexing_table.get_header_field(index)?;
        name.to_vec()
    } else {
        let (name, used) = xpack::decode_string(&buf[consumed..], 7)?;
        consumed += used;
        // Field name validation belongs to HTTP2 rather than HPACK, but
        // this is the only place the raw octets are still at hand.
        has_http2_violation = Helper::has_upalpha(&name);
        name
    };

    let (value, used) = xpack::decode_string(&buf[consumed..], 7)?;
    consumed += used;

    // Incremental indexing adds the field to the dynamic table as a new entry
    if ftype == HpackField::IndexedLiteral {
        indexing_table.add_header_field(&name, &value);
    }

    Ok(((name, value), consumed, has_http2_violation))
}

//
// [RFC 7541] 6.3. Dynamic Table Size Update
//
pub fn update_dynamic_table_size(
    indexing_table: &mut IndexingTable,
    buf: &[u8],
    maximum_table_size: usize,
) -> HpackResult<(usize, usize)> {
    let (size, consumed) = xpack::decode_integer(buf, 5)?;
    if size > maximum_table_size as u64 {
        return Err(CompressionError::InvalidSizeUpdate.into());
    }
    let size = size as usize;
    log::trace!("table size update: {} -> {}", indexing_table.maximum_size(), size);
    if !indexing_table.update_maximum_size(size) {
        return Err(crate::HpackError::InsertionRejected);
    }
    Ok((size, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Helper, HpackError};
    use algorithm::buf::{BinaryMut, Bt};

    #[test]
    fn parse_representation() {
        assert_eq!(HpackField::parse(0x82), HpackField::Index);
        assert_eq!(HpackField::parse(0x41), HpackField::IndexedLiteral);
        assert_eq!(HpackField::parse(0x3f), HpackField::TablesizeUpdate);
        assert_eq!(HpackField::parse(0x10), HpackField::NeverindexLiteral);
        assert_eq!(HpackField::parse(0x04), HpackField::NoindexLiteral);
        assert!(HpackField::NeverindexLiteral.is_literal());
        assert!(!HpackField::TablesizeUpdate.is_literal());
    }

    #[test]
    fn indexed_field_roundtrip() {
        let mut dst = BinaryMut::new();
        encode_indexed_header_field(&mut dst, 2).unwrap();
        assert_eq!(dst.chunk(), &[0x82]);

        let table = IndexingTable::with_size(4096);
        let ((name, value), consumed) = decode_indexed_header_field(&table, dst.chunk()).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(name, b":method");
        assert_eq!(value, b"GET");
    }

    #[test]
    fn indexed_field_out_of_bounds() {
        let table = IndexingTable::with_size(4096);
        assert_eq!(
            decode_indexed_header_field(&table, &[0x80]),
            Err(HpackError::Compression(CompressionError::HeaderIndexOutOfBounds))
        );
        assert_eq!(
            decode_indexed_header_field(&table, &[0xbe]),
            Err(HpackError::Compression(CompressionError::HeaderIndexOutOfBounds))
        );
    }

    #[test]
    fn literal_with_new_name_adds_entry() {
        // [RFC 7541] C.4.3 custom-key: custom-value
        let buf = Helper::hex_to_vec("4088 25a8 49e9 5ba9 7d7f 8925 a849 e95b b8e8 b4bf");
        let mut table = IndexingTable::with_size(4096);
        let ((name, value), consumed, violated) =
            decode_literal_header_field(&mut table, &buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(name, b"custom-key");
        assert_eq!(value, b"custom-value");
        assert!(!violated);
        assert_eq!(table.size(), 10 + 12 + 32);
        assert_eq!(
            table.get_header_field(62).unwrap(),
            (&b"custom-key"[..], &b"custom-value"[..])
        );
    }

    #[test]
    fn literal_without_indexing_leaves_table() {
        // [RFC 7541] C.2.2 :path: /sample/path
        let buf = Helper::hex_to_vec("040c 2f73 616d 706c 652f 7061 7468");
        let mut table = IndexingTable::with_size(4096);
        let ((name, value), consumed, violated) =
            decode_literal_header_field(&mut table, &buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(name, b":path");
        assert_eq!(value, b"/sample/path");
        assert!(!violated);
        assert_eq!(table.size(), 0);
    }

    #[test]
    fn literal_never_indexed() {
        // [RFC 7541] C.2.3 password: secret
        let buf = Helper::hex_to_vec("1008 7061 7373 776f 7264 0673 6563 7265 74");
        let mut table = IndexingTable::with_size(4096);
        let ((name, value), consumed, violated) =
            decode_literal_header_field(&mut table, &buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(name, b"password");
        assert_eq!(value, b"secret");
        assert!(!violated);
        assert_eq!(table.size(), 0);
    }

    #[test]
    fn literal_uppercase_name_reports_violation() {
        // "Key" literal name, raw coded
        let buf = Helper::hex_to_vec("4003 4b65 7905 7468 6572 65");
        let mut table = IndexingTable::with_size(4096);
        let ((name, _value), consumed, violated) =
            decode_literal_header_field(&mut table, &buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(name, b"Key");
        assert!(violated);
    }

    #[test]
    fn literal_truncated_value() {
        // declares a six octet value, carries three
        let buf = Helper::hex_to_vec("4003 6b65 7906 7468 65");
        let mut table = IndexingTable::with_size(4096);
        assert!(decode_literal_header_field(&mut table, &buf).is_err());
        // nothing was indexed
        assert_eq!(table.size(), 0);
    }

    #[test]
    fn size_update() {
        let mut dst = BinaryMut::new();
        encode_dynamic_table_size_update(&mut dst, 256).unwrap();
        assert_eq!(dst.chunk(), &Helper::hex_to_vec("3fe1 01")[..]);

        let mut table = IndexingTable::with_size(4096);
        let (size, consumed) = update_dynamic_table_size(&mut table, dst.chunk(), 4096).unwrap();
        assert_eq!((size, consumed), (256, 3));
        assert_eq!(table.maximum_size(), 256);

        // an update above the out-of-band maximum is a compression error
        let buf = Helper::hex_to_vec("3fe2 1f");
        assert_eq!(
            update_dynamic_table_size(&mut table, &buf, 4096),
            Err(HpackError::Compression(CompressionError::InvalidSizeUpdate))
        );
    }
}
