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
// Created Date: 2023/09/19 16:44:02

use crate::{CompressionError, HpackResult};

use super::{static_table, DynamicTable, HpackIndex, HpackLookupResult, HpackMatch};

/// [RFC 7541] 2.3. Indexing Table
///
/// The single address space the representations speak: `1..=61` is the
/// static table, everything above addresses the dynamic table with the most
/// recent insertion first.
#[derive(Debug)]
pub struct IndexingTable {
    dynamic_table: DynamicTable,
}

impl IndexingTable {
    pub fn with_size(size: usize) -> IndexingTable {
        IndexingTable {
            dynamic_table: DynamicTable::with_size(size),
        }
    }

    /// Resolves a combined index to its field.
    ///
    /// [RFC 7541] 2.3.3. Index Address Space
    /// The address space starts at 1; index zero and indices past the end
    /// of the dynamic table MUST be treated as a decoding error.
    pub fn get_header_field(&self, index: u64) -> HpackResult<(&[u8], &[u8])> {
        if index == 0 {
            return Err(CompressionError::HeaderIndexOutOfBounds.into());
        }
        if index <= static_table::STATIC_TABLE.len() as u64 {
            match static_table::get(index as usize) {
                Some(field) => return Ok(field),
                None => return Err(CompressionError::HeaderIndexOutOfBounds.into()),
            }
        }
        let relative = index - static_table::STATIC_TABLE.len() as u64 - 1;
        self.dynamic_table
            .lookup_relative(relative)
            .ok_or(CompressionError::HeaderIndexOutOfBounds.into())
    }

    /// Finds the smallest combined index carrying the field, preferring an
    /// exact match anywhere over a name-only match anywhere.
    pub fn lookup(&self, name: &[u8], value: &[u8]) -> HpackLookupResult {
        let from_static = static_table::find(name, value);
        if from_static.match_type == HpackMatch::Exact {
            return from_static;
        }

        let (found, match_type) = self.dynamic_table.find(name, value);
        if let Some(absolute) = found {
            if match_type == HpackMatch::Exact || from_static.match_type == HpackMatch::None {
                return HpackLookupResult {
                    index: self.combined_index(absolute),
                    index_type: HpackIndex::Dynamic,
                    match_type,
                };
            }
        }
        from_static
    }

    /// Adds the field to the dynamic table. Reports whether the table
    /// accepted the operation, oversized-and-cleared included.
    pub fn add_header_field(&mut self, name: &[u8], value: &[u8]) -> bool {
        self.dynamic_table.insert(name, value)
    }

    pub fn update_maximum_size(&mut self, new_size: usize) -> bool {
        self.dynamic_table.update_maximum_size(new_size)
    }

    pub fn size(&self) -> usize {
        self.dynamic_table.size()
    }

    pub fn maximum_size(&self) -> usize {
        self.dynamic_table.maximum_size()
    }

    pub fn dynamic_table(&self) -> &DynamicTable {
        &self.dynamic_table
    }

    pub fn dynamic_table_mut(&mut self) -> &mut DynamicTable {
        &mut self.dynamic_table
    }

    fn combined_index(&self, absolute: u64) -> usize {
        let newest = self.dynamic_table.largest_index().unwrap_or(0);
        static_table::STATIC_TABLE.len() + 1 + (newest - absolute) as usize
    }
}
