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
// Created Date: 2023/09/14 11:02:13

use std::borrow::Cow;

pub struct Helper;

impl Helper {
    #[inline]
    pub fn is_upalpha(b: u8) -> bool {
        b >= b'A' && b <= b'Z'
    }

    #[inline]
    pub fn to_lower(b: u8) -> u8 {
        if Self::is_upalpha(b) {
            b + 32
        } else {
            b
        }
    }

    #[inline]
    pub fn has_upalpha(name: &[u8]) -> bool {
        name.iter().any(|b| Self::is_upalpha(*b))
    }

    /// Convert field name to lower case to follow the HTTP2 spec, keeping a
    /// borrow when the name already complies.
    pub fn lower_name(name: &[u8]) -> Cow<'_, [u8]> {
        if Self::has_upalpha(name) {
            Cow::Owned(name.iter().map(|b| Self::to_lower(*b)).collect())
        } else {
            Cow::Borrowed(name)
        }
    }

    #[inline]
    pub fn convert_hex(b: u8) -> Option<u8> {
        if b >= 48 && b <= 57 {
            return Some(b - 48);
        } else if b >= 65 && b <= 70 {
            return Some(b - 65 + 10);
        } else if b >= 97 && b <= 102 {
            return Some(b - 97 + 10);
        } else {
            return None;
        }
    }

    /// 将十六进制字符串转成二进制数据, 忽略所有空白字符
    pub fn hex_to_vec(s: &str) -> Vec<u8> {
        let mut result = Vec::with_capacity(s.len() / 2);
        let mut high = None;
        for b in s.bytes() {
            if b.is_ascii_whitespace() {
                continue;
            }
            match (high, Self::convert_hex(b)) {
                (None, Some(v)) => high = Some(v),
                (Some(h), Some(v)) => {
                    result.push(h << 4 | v);
                    high = None;
                }
                _ => break,
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::Helper;

    #[test]
    fn lower_name() {
        assert_eq!(&*Helper::lower_name(b"Content-Type"), b"content-type");
        assert_eq!(&*Helper::lower_name(b"etag"), b"etag");
        assert!(Helper::has_upalpha(b"X-Custom"));
        assert!(!Helper::has_upalpha(b":path"));
    }

    #[test]
    fn hex() {
        assert_eq!(Helper::hex_to_vec("8286 8441"), vec![0x82, 0x86, 0x84, 0x41]);
        assert_eq!(Helper::hex_to_vec("0a"), vec![0x0A]);
    }
}
