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
// Created Date: 2023/09/15 09:40:31

//! The integer and string primitives shared by HPACK and QPACK.

use algorithm::buf::{Bt, BtMut};

use crate::{
    HpackResult, HuffmanDecoder, HuffmanEncoder, IntegerDecodingError, StringDecodingError,
};

//
// [RFC 7541] 5.1. Integer representation
//
// The top `8 - n` bits of the first byte are taken from `flag`, so the
// caller can fold the representation tag into the same octet.
pub fn encode_integer<B: Bt + BtMut>(
    dst: &mut B,
    flag: u8,
    value: u64,
    n: u8,
) -> HpackResult<usize> {
    let mask = (1u64 << n) - 1;
    if value < mask {
        return Ok(dst.put_u8(flag | value as u8));
    }

    let mut size = dst.put_u8(flag | mask as u8);
    let mut value = value - mask;
    while value >= 128 {
        size += dst.put_u8((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    size += dst.put_u8(value as u8);
    Ok(size)
}

//
// [RFC 7541] 5.1. Integer representation
//
// Returns the decoded value and the number of octets consumed. Excessively
// large encodings, in value or octet length, are a decoding error.
pub fn decode_integer(buf: &[u8], n: u8) -> HpackResult<(u64, usize)> {
    if buf.is_empty() {
        return Err(IntegerDecodingError::NotEnoughOctets.into());
    }

    let mask = (1u64 << n) - 1;
    let mut value = buf[0] as u64 & mask;
    if value < mask {
        return Ok((value, 1));
    }

    let mut m = 0u32;
    let mut consumed = 1;
    loop {
        if consumed >= buf.len() {
            return Err(IntegerDecodingError::NotEnoughOctets.into());
        }
        let b = buf[consumed];
        consumed += 1;

        let added = (b & 0x7f) as u64;
        if m >= 64 || (u64::MAX >> m) < added {
            return Err(IntegerDecodingError::Overflow.into());
        }
        value = match value.checked_add(added << m) {
            Some(v) => v,
            None => return Err(IntegerDecodingError::Overflow.into()),
        };
        m += 7;

        if b & 0x80 == 0 {
            return Ok((value, consumed));
        }
    }
}

//
// [RFC 7541] 5.2. String Literal Representation
//
// The payload is always Huffman coded and the `1 << n` bit of the first
// byte records that, on top of whatever tag `flag` carries.
pub fn encode_string<B: Bt + BtMut>(
    dst: &mut B,
    flag: u8,
    value: &[u8],
    n: u8,
) -> HpackResult<usize> {
    // The longest code is 30 bits, four output bytes per input byte suffice.
    let mut encoded = vec![0u8; value.len() * 4];
    let len = HuffmanEncoder::new().encode(value, &mut encoded)?;

    let mut size = encode_integer(dst, flag | (1 << n), len as u64, n)?;
    size += dst.put_slice(&encoded[..len]);
    Ok(size)
}

//
// [RFC 7541] 5.2. String Literal Representation
//
// Accepts both raw and Huffman coded payloads and returns the content
// octets along with the number of input octets consumed.
pub fn decode_string(buf: &[u8], n: u8) -> HpackResult<(Vec<u8>, usize)> {
    if buf.is_empty() {
        return Err(StringDecodingError::NotEnoughOctets.into());
    }

    let is_huffman = buf[0] & (1 << n) != 0;
    let (len, consumed) = decode_integer(buf, n)?;
    if len > (buf.len() - consumed) as u64 {
        return Err(StringDecodingError::NotEnoughOctets.into());
    }
    let len = len as usize;

    let raw = &buf[consumed..consumed + len];
    let value = if is_huffman {
        HuffmanDecoder::new().decode(raw)?
    } else {
        raw.to_vec()
    };
    Ok((value, consumed + len))
}
