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
// Created Date: 2023/09/19 10:05:56

use std::collections::VecDeque;

use super::HpackMatch;

// [RFC 7541] 4.1. Calculating Table Size
// The size of an entry is the sum of its name's length in octets, its
// value's length in octets, and 32.
const ADDITIONAL_32_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct DynamicTableEntry {
    /// Absolute index, assigned at insertion and never reused.
    index: u64,
    offset: usize,
    name_len: usize,
    value_len: usize,
    ref_count: usize,
}

impl DynamicTableEntry {
    fn table_size(&self) -> usize {
        self.name_len + self.value_len + ADDITIONAL_32_BYTES
    }
}

/// Flat byte arena holding every live name and value contiguously.
///
/// The buffer is twice the table maximum so that a write never lands on
/// octets a reader still holds: appends wrap back to offset 0 once the head
/// passes the overwrite threshold, and everything behind the threshold
/// stays readable until the writer comes around again, by which time the
/// accounted entries have long been evicted.
#[derive(Debug)]
struct DynamicTableStorage {
    data: Vec<u8>,
    overwrite_threshold: usize,
    /// Offset the next write starts at.
    head: usize,
}

impl DynamicTableStorage {
    fn with_size(size: usize) -> DynamicTableStorage {
        DynamicTableStorage {
            data: vec![0; size * 2],
            overwrite_threshold: size,
            head: 0,
        }
    }

    fn read(&self, offset: usize, name_len: usize, value_len: usize) -> (&[u8], &[u8]) {
        (
            &self.data[offset..offset + name_len],
            &self.data[offset + name_len..offset + name_len + value_len],
        )
    }

    fn write(&mut self, name: &[u8], value: &[u8]) -> usize {
        let offset = self.head;
        self.data[offset..offset + name.len()].copy_from_slice(name);
        self.data[offset + name.len()..offset + name.len() + value.len()].copy_from_slice(value);

        self.head += name.len() + value.len();
        if self.head > self.overwrite_threshold + 1 {
            // This is how we wrap back around to the beginning of the buffer.
            log::trace!("storage wrap: head={} threshold={}", self.head, self.overwrite_threshold);
            self.head = 0;
        }
        offset
    }

    /// The storage never shrinks; offsets handed out so far stay valid and
    /// the table evicts by accounting, not by reclaiming octets.
    fn can_expand(&self, new_size: usize) -> bool {
        new_size * 2 > self.data.len()
    }
}

/// [RFC 7541] 2.3.2. Dynamic Table
///
/// FIFO ordered, sized by the accounting rule of 4.1, addressed by the
/// absolute index of each insertion. Entries can be pinned through
/// `ref_entry`; a pinned entry blocks any eviction that would reach it.
#[derive(Debug)]
pub struct DynamicTable {
    /// front is the oldest entry, back the most recent.
    entries: VecDeque<DynamicTableEntry>,
    storage: DynamicTableStorage,
    maximum_size: usize,
    available: usize,
    /// Total number of insertions over the table's lifetime.
    entries_inserted: u64,
}

impl DynamicTable {
    pub fn with_size(size: usize) -> DynamicTable {
        log::trace!("dynamic table size: {}", size);
        DynamicTable {
            entries: VecDeque::new(),
            storage: DynamicTableStorage::with_size(size),
            maximum_size: size,
            available: size,
            entries_inserted: 0,
        }
    }

    /// Looks up an entry by its absolute index. Evicted and not yet
    /// assigned indices both miss.
    pub fn lookup(&self, index: u64) -> Option<(&[u8], &[u8])> {
        let newest = self.entries.back()?;
        let oldest = self.entries.front()?;
        if index > newest.index || index < oldest.index {
            return None;
        }
        let entry = &self.entries[(index - oldest.index) as usize];
        Some(self.storage.read(entry.offset, entry.name_len, entry.value_len))
    }

    /// Looks up an entry relative to the most recent insertion, where 0 is
    /// the newest entry.
    pub fn lookup_relative(&self, relative_index: u64) -> Option<(&[u8], &[u8])> {
        let newest = self.entries.back()?;
        self.lookup(newest.index.checked_sub(relative_index)?)
    }

    /// Scans for the field, newest first, preferring an exact match over a
    /// name-only one. Returns the absolute index of the best candidate.
    pub fn find(&self, name: &[u8], value: &[u8]) -> (Option<u64>, HpackMatch) {
        let mut candidate = None;
        for entry in self.entries.iter().rev() {
            if name.len() != entry.name_len {
                continue;
            }
            let (entry_name, entry_value) =
                self.storage.read(entry.offset, entry.name_len, entry.value_len);
            if name != entry_name {
                continue;
            }
            if value == entry_value {
                return (Some(entry.index), HpackMatch::Exact);
            }
            if candidate.is_none() {
                candidate = Some(entry.index);
            }
        }
        match candidate {
            Some(index) => (Some(index), HpackMatch::Name),
            None => (None, HpackMatch::None),
        }
    }

    /// Appends a field, evicting from the oldest end as needed.
    ///
    /// A field larger than the whole table empties it and is not stored,
    /// which still counts as success. The one failure mode is an eviction
    /// blocked by a referenced entry; nothing is mutated in that case.
    pub fn insert(&mut self, name: &[u8], value: &[u8]) -> bool {
        let required = name.len() + value.len() + ADDITIONAL_32_BYTES;

        if required > self.maximum_size {
            // [RFC 7541] 4.4. Entry Eviction When Adding New Entries
            // It is not an error to attempt to add an entry that is larger
            // than the maximum size; an attempt to add an entry larger than
            // the entire table causes the table to be emptied of all
            // existing entries.
            if self.entries.iter().any(|e| e.ref_count > 0) {
                return false;
            }
            log::trace!("insert clears table: required={} maximum={}", required, self.maximum_size);
            self.entries.clear();
            self.available = self.maximum_size;
            return true;
        }

        if required > self.available && !self.make_space(required - self.available) {
            return false;
        }

        let offset = self.storage.write(name, value);
        let index = self.entries_inserted;
        self.entries_inserted += 1;
        self.entries.push_back(DynamicTableEntry {
            index,
            offset,
            name_len: name.len(),
            value_len: value.len(),
            ref_count: 0,
        });
        self.available -= required;
        log::trace!("insert entry: index={} size={} available={}", index, required, self.available);
        true
    }

    /// [RFC 7541] 4.3. Entry Eviction when Dynamic Table Size Changes
    ///
    /// A shrink evicts from the oldest end until the used size fits, or
    /// fails when a referenced entry is in the way. A grow rebuilds the
    /// storage arena in a single pass without touching any entry.
    pub fn update_maximum_size(&mut self, new_size: usize) -> bool {
        let used = self.maximum_size - self.available;
        if used < new_size {
            self.maximum_size = new_size;
            self.available = new_size - used;
            self.expand_storage(new_size);
            return true;
        }

        if self.make_space(used - new_size) {
            self.available = new_size - (self.maximum_size - self.available);
            self.maximum_size = new_size;
            return true;
        }
        false
    }

    pub fn ref_entry(&mut self, index: u64) -> bool {
        match self.entry_mut(index) {
            Some(entry) => {
                entry.ref_count += 1;
                true
            }
            None => false,
        }
    }

    pub fn unref_entry(&mut self, index: u64) -> bool {
        match self.entry_mut(index) {
            Some(entry) if entry.ref_count > 0 => {
                entry.ref_count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn size(&self) -> usize {
        self.maximum_size - self.available
    }

    pub fn maximum_size(&self) -> usize {
        self.maximum_size
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// The absolute index of the most recent insertion. Survives eviction
    /// and resizing; only meaningful once something has been inserted.
    pub fn largest_index(&self) -> Option<u64> {
        if self.entries_inserted == 0 {
            None
        } else {
            Some(self.entries_inserted - 1)
        }
    }

    fn entry_mut(&mut self, index: u64) -> Option<&mut DynamicTableEntry> {
        let oldest = self.entries.front()?.index;
        let newest = self.entries.back()?.index;
        if index > newest || index < oldest {
            return None;
        }
        self.entries.get_mut((index - oldest) as usize)
    }

    /// Frees at least `needed` octets of accounting by dropping the oldest
    /// entries. The eviction set is decided up front so a referenced entry
    /// fails the operation with no partial mutation.
    fn make_space(&mut self, needed: usize) -> bool {
        let mut freed = 0;
        let mut evict = 0;
        for entry in self.entries.iter() {
            if freed >= needed {
                break;
            }
            if entry.ref_count > 0 {
                log::trace!("eviction blocked: index={} refs={}", entry.index, entry.ref_count);
                return false;
            }
            freed += entry.table_size();
            evict += 1;
        }
        if freed < needed {
            return false;
        }

        if evict > 0 {
            log::trace!("evict {} entries, freed {}", evict, freed);
            for _ in 0..evict {
                self.entries.pop_front();
            }
            self.available += freed;
        }
        true
    }

    /// Copies every live field into a fresh arena, rewriting offsets in one
    /// pass; the old arena is dropped only when the pass is complete.
    fn expand_storage(&mut self, new_size: usize) {
        if !self.storage.can_expand(new_size) {
            return;
        }
        let old = std::mem::replace(&mut self.storage, DynamicTableStorage::with_size(new_size));
        for entry in self.entries.iter_mut() {
            let (name, value) = old.read(entry.offset, entry.name_len, entry.value_len);
            entry.offset = self.storage.write(name, value);
        }
        log::trace!("storage expanded to {} octets", new_size * 2);
    }
}
