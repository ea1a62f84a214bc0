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
// Created Date: 2023/09/18 14:31:08

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::{HpackIndex, HpackLookupResult, HpackMatch};

/// (HPACK, Appendix A) 1-indexed on the wire.
pub static STATIC_TABLE: &'static [(&'static [u8], &'static [u8])] = &[
    (b":authority", b""),
    (b":method", b"GET"),
    (b":method", b"POST"),
    (b":path", b"/"),
    (b":path", b"/index.html"),
    (b":scheme", b"http"),
    (b":scheme", b"https"),
    (b":status", b"200"),
    (b":status", b"204"),
    (b":status", b"206"),
    (b":status", b"304"),
    (b":status", b"400"),
    (b":status", b"404"),
    (b":status", b"500"),
    (b"accept-charset", b""),
    (b"accept-encoding", b"gzip, deflate"),
    (b"accept-language", b""),
    (b"accept-ranges", b""),
    (b"accept", b""),
    (b"access-control-allow-origin", b""),
    (b"age", b""),
    (b"allow", b""),
    (b"authorization", b""),
    (b"cache-control", b""),
    (b"content-disposition", b""),
    (b"content-encoding", b""),
    (b"content-language", b""),
    (b"content-length", b""),
    (b"content-location", b""),
    (b"content-range", b""),
    (b"content-type", b""),
    (b"cookie", b""),
    (b"date", b""),
    (b"etag", b""),
    (b"expect", b""),
    (b"expires", b""),
    (b"from", b""),
    (b"host", b""),
    (b"if-match", b""),
    (b"if-modified-since", b""),
    (b"if-none-match", b""),
    (b"if-range", b""),
    (b"if-unmodified-since", b""),
    (b"last-modified", b""),
    (b"link", b""),
    (b"location", b""),
    (b"max-forwards", b""),
    (b"proxy-authenticate", b""),
    (b"proxy-authorization", b""),
    (b"range", b""),
    (b"referer", b""),
    (b"refresh", b""),
    (b"retry-after", b""),
    (b"server", b""),
    (b"set-cookie", b""),
    (b"strict-transport-security", b""),
    (b"transfer-encoding", b""),
    (b"user-agent", b""),
    (b"vary", b""),
    (b"via", b""),
    (b"www-authenticate", b""),
];

lazy_static! {
    /// name -> (smallest index carrying the name, value -> index)
    static ref STATIC_HASH: HashMap<&'static [u8], (usize, HashMap<&'static [u8], usize>)> = {
        let mut h = HashMap::<&'static [u8], (usize, HashMap<&'static [u8], usize>)>::new();
        for (idx, &(name, value)) in STATIC_TABLE.iter().enumerate() {
            let entry = h.entry(name).or_insert_with(|| (idx + 1, HashMap::new()));
            entry.1.entry(value).or_insert(idx + 1);
        }
        h
    };
}

/// Looks up the 1-based `index`, `1..=61`.
pub fn get(index: usize) -> Option<(&'static [u8], &'static [u8])> {
    if index >= 1 && index <= STATIC_TABLE.len() {
        Some(STATIC_TABLE[index - 1])
    } else {
        None
    }
}

pub fn find(name: &[u8], value: &[u8]) -> HpackLookupResult {
    match STATIC_HASH.get(name) {
        Some((name_index, values)) => {
            let (index, match_type) = match values.get(value) {
                Some(index) => (*index, HpackMatch::Exact),
                None => (*name_index, HpackMatch::Name),
            };
            HpackLookupResult {
                index,
                index_type: HpackIndex::Static,
                match_type,
            }
        }
        None => HpackLookupResult::none(),
    }
}
