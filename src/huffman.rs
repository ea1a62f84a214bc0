use std::collections::HashMap;

use crate::{HpackError, HpackResult, HuffmanDecoderError};
use lazy_static::lazy_static;

/// Decodes octet strings compressed with the canonical Huffman code of
/// RFC 7541, Appendix B.
///
/// The entire input is treated as one encoded string; the trailing bits of
/// the last byte must be the most significant bits of the EOS symbol and
/// strictly fewer than 8, otherwise the input is rejected.
pub struct HuffmanDecoder;

impl HuffmanDecoder {
    pub fn new() -> HuffmanDecoder {
        HuffmanDecoder {}
    }

    /// Decodes the buffer `buf` into a newly allocated `Vec`.
    ///
    /// The shortest code is 5 bits long, so the output can never grow past
    /// 8/5 of the input; the result is allocated at twice the input length
    /// up front and never reallocates.
    pub fn decode(&mut self, buf: &[u8]) -> HpackResult<Vec<u8>> {
        let mut current: u32 = 0;
        let mut current_len: u8 = 0;
        let mut all_ones = true;
        let mut result: Vec<u8> = Vec::with_capacity(buf.len() * 2);

        for b in BitIterator::new(buf.iter()) {
            current_len += 1;
            current <<= 1;
            if b {
                current |= 1;
            } else {
                all_ones = false;
            }

            if current_len == EOS_LEN && current == EOS_VALUE {
                return Err(HuffmanDecoderError::EOSInString.into());
            }
            if let Some(symbol) = HUFFMAN_CODE_MAP.get(&(current, current_len)) {
                result.push(*symbol);
                current = 0;
                current_len = 0;
                all_ones = true;
            }
        }

        // A leftover of more than 7 bits means a whole byte of padding.
        if current_len > 7 {
            return Err(HuffmanDecoderError::PaddingTooLarge.into());
        }

        // 后续必须以全为1的字码填充
        if !all_ones {
            return Err(HuffmanDecoderError::InvalidPadding.into());
        }

        Ok(result)
    }
}

/// Encodes octet strings with the canonical Huffman code of RFC 7541,
/// Appendix B, writing into a caller-provided buffer.
pub struct HuffmanEncoder;

impl HuffmanEncoder {
    pub fn new() -> HuffmanEncoder {
        HuffmanEncoder {}
    }

    /// Concatenates the code of every source octet, most significant bit
    /// first, then fills the remainder of the last byte with the prefix of
    /// EOS. Returns the number of bytes written, or `BufferTooSmall` when
    /// `dst` cannot hold them.
    pub fn encode(&mut self, src: &[u8], dst: &mut [u8]) -> HpackResult<usize> {
        // The longest code is 30 bits, so an u32 window always has room
        // for the next symbol.
        let mut buf: u32 = 0;
        let mut remain_bits: u32 = 32;
        let mut pos = 0;

        for b in src {
            let (code, bit_len) = HUFFMAN_CODE_ARRAY[*b as usize];
            let bit_len = bit_len as u32;

            if remain_bits > bit_len {
                remain_bits -= bit_len;
                buf |= code << remain_bits;
            } else if remain_bits == bit_len {
                buf |= code;
                pos = Self::append(dst, pos, buf, 0)?;
                remain_bits = 32;
                buf = 0;
            } else {
                buf |= code >> (bit_len - remain_bits);
                pos = Self::append(dst, pos, buf, 0)?;
                remain_bits = 32 - (bit_len - remain_bits);
                buf = code << remain_bits;
            }
        }

        pos = Self::append(dst, pos, buf, remain_bits / 8)?;

        let pad_len = remain_bits % 8;
        if pad_len != 0 {
            dst[pos - 1] |= 0xff >> (8 - pad_len);
        }

        Ok(pos)
    }

    fn append(dst: &mut [u8], mut pos: usize, src: u32, keep: u32) -> HpackResult<usize> {
        for j in (keep..4).rev() {
            if pos >= dst.len() {
                return Err(HpackError::BufferTooSmall);
            }
            dst[pos] = (src >> (8 * j)) as u8;
            pos += 1;
        }
        Ok(pos)
    }
}

/// A helper struct that represents an iterator over individual bits of all
/// bytes found in a wrapped Iterator over bytes.
/// Bits are represented as `bool`s, where `true` corresponds to a set bit and
/// `false` to a 0 bit.
///
/// Bits are yielded in order of significance, starting from the
/// most-significant bit.
struct BitIterator<'a, I: Iterator> {
    buffer_iterator: I,
    current_byte: Option<&'a u8>,
    /// The bit-position within the current byte
    pos: u8,
}

impl<'a, I> BitIterator<'a, I>
        where I: Iterator<Item=&'a u8> {
    pub fn new(iterator: I) -> BitIterator<'a, I> {
        BitIterator::<'a, I> {
            buffer_iterator: iterator,
            current_byte: None,
            pos: 7,
        }
    }
}

impl<'a, I> Iterator for BitIterator<'a, I>
        where I: Iterator<Item=&'a u8> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.current_byte.is_none() {
            self.current_byte = self.buffer_iterator.next();
            self.pos = 7;
        }

        // If we still have `None`, it means the buffer has been exhausted
        let b = *(self.current_byte?);

        let is_set = (b & (1 << self.pos)) == (1 << self.pos);
        if self.pos == 0 {
            // We have exhausted all bits from the current byte -- try to get
            // a new one on the next pass.
            self.current_byte = None;
        } else {
            // Still more bits left here...
            self.pos -= 1;
        }

        Some(is_set)
    }
}

const EOS_VALUE: u32 = 0x3fffffff;
const EOS_LEN: u8 = 30;

/// (HPACK, Appendix B) 256 octets plus EOS.
static HUFFMAN_CODE_ARRAY: &'static [(u32, u8)] = &[
    (0x1ff8, 13),
    (0x7fffd8, 23),
    (0xfffffe2, 28),
    (0xfffffe3, 28),
    (0xfffffe4, 28),
    (0xfffffe5, 28),
    (0xfffffe6, 28),
    (0xfffffe7, 28),
    (0xfffffe8, 28),
    (0xffffea, 24),
    (0x3ffffffc, 30),
    (0xfffffe9, 28),
    (0xfffffea, 28),
    (0x3ffffffd, 30),
    (0xfffffeb, 28),
    (0xfffffec, 28),
    (0xfffffed, 28),
    (0xfffffee, 28),
    (0xfffffef, 28),
    (0xffffff0, 28),
    (0xffffff1, 28),
    (0xffffff2, 28),
    (0x3ffffffe, 30),
    (0xffffff3, 28),
    (0xffffff4, 28),
    (0xffffff5, 28),
    (0xffffff6, 28),
    (0xffffff7, 28),
    (0xffffff8, 28),
    (0xffffff9, 28),
    (0xffffffa, 28),
    (0xffffffb, 28),
    (0x14, 6),
    (0x3f8, 10),
    (0x3f9, 10),
    (0xffa, 12),
    (0x1ff9, 13),
    (0x15, 6),
    (0xf8, 8),
    (0x7fa, 11),
    (0x3fa, 10),
    (0x3fb, 10),
    (0xf9, 8),
    (0x7fb, 11),
    (0xfa, 8),
    (0x16, 6),
    (0x17, 6),
    (0x18, 6),
    (0x0, 5), //b'0'
    (0x1, 5),
    (0x2, 5),
    (0x19, 6),
    (0x1a, 6),
    (0x1b, 6),
    (0x1c, 6),
    (0x1d, 6),
    (0x1e, 6),
    (0x1f, 6),
    (0x5c, 7),
    (0xfb, 8),
    (0x7ffc, 15),
    (0x20, 6),
    (0xffb, 12),
    (0x3fc, 10),
    (0x1ffa, 13),
    (0x21, 6), //b'A'
    (0x5d, 7), //b'B'
    (0x5e, 7),
    (0x5f, 7),
    (0x60, 7),
    (0x61, 7),
    (0x62, 7),
    (0x63, 7),
    (0x64, 7),
    (0x65, 7),
    (0x66, 7),
    (0x67, 7),
    (0x68, 7), //b'M'
    (0x69, 7),
    (0x6a, 7),
    (0x6b, 7),
    (0x6c, 7),
    (0x6d, 7),
    (0x6e, 7),
    (0x6f, 7),
    (0x70, 7),
    (0x71, 7),
    (0x72, 7),
    (0xfc, 8),
    (0x73, 7),
    (0xfd, 8), //b'Z'
    (0x1ffb, 13),
    (0x7fff0, 19),
    (0x1ffc, 13),
    (0x3ffc, 14),
    (0x22, 6),
    (0x7ffd, 15),
    (0x3, 5), //b'a'
    (0x23, 6),
    (0x4, 5),
    (0x24, 6),
    (0x5, 5),
    (0x25, 6),
    (0x26, 6),
    (0x27, 6),
    (0x6, 5),
    (0x74, 7), //b'j'
    (0x75, 7),
    (0x28, 6),
    (0x29, 6),
    (0x2a, 6),
    (0x7, 5),
    (0x2b, 6),
    (0x76, 7),
    (0x2c, 6),
    (0x8, 5),
    (0x9, 5),
    (0x2d, 6),
    (0x77, 7),
    (0x78, 7),
    (0x79, 7),
    (0x7a, 7),
    (0x7b, 7), //b'z'
    (0x7ffe, 15),
    (0x7fc, 11),
    (0x3ffd, 14),
    (0x1ffd, 13),
    (0xffffffc, 28),
    (0xfffe6, 20),
    (0x3fffd2, 22),
    (0xfffe7, 20),
    (0xfffe8, 20),
    (0x3fffd3, 22),
    (0x3fffd4, 22),
    (0x3fffd5, 22),
    (0x7fffd9, 23),
    (0x3fffd6, 22),
    (0x7fffda, 23),
    (0x7fffdb, 23),
    (0x7fffdc, 23),
    (0x7fffdd, 23),
    (0x7fffde, 23),
    (0xffffeb, 24),
    (0x7fffdf, 23),
    (0xffffec, 24),
    (0xffffed, 24),
    (0x3fffd7, 22),
    (0x7fffe0, 23),
    (0xffffee, 24),
    (0x7fffe1, 23),
    (0x7fffe2, 23),
    (0x7fffe3, 23),
    (0x7fffe4, 23),
    (0x1fffdc, 21),
    (0x3fffd8, 22),
    (0x7fffe5, 23),
    (0x3fffd9, 22),
    (0x7fffe6, 23),
    (0x7fffe7, 23),
    (0xffffef, 24),
    (0x3fffda, 22),
    (0x1fffdd, 21),
    (0xfffe9, 20),
    (0x3fffdb, 22),
    (0x3fffdc, 22),
    (0x7fffe8, 23),
    (0x7fffe9, 23),
    (0x1fffde, 21),
    (0x7fffea, 23),
    (0x3fffdd, 22),
    (0x3fffde, 22),
    (0xfffff0, 24),
    (0x1fffdf, 21),
    (0x3fffdf, 22),
    (0x7fffeb, 23),
    (0x7fffec, 23),
    (0x1fffe0, 21),
    (0x1fffe1, 21),
    (0x3fffe0, 22),
    (0x1fffe2, 21),
    (0x7fffed, 23),
    (0x3fffe1, 22),
    (0x7fffee, 23),
    (0x7fffef, 23),
    (0xfffea, 20),
    (0x3fffe2, 22),
    (0x3fffe3, 22),
    (0x3fffe4, 22),
    (0x7ffff0, 23),
    (0x3fffe5, 22),
    (0x3fffe6, 22),
    (0x7ffff1, 23),
    (0x3ffffe0, 26),
    (0x3ffffe1, 26),
    (0xfffeb, 20),
    (0x7fff1, 19),
    (0x3fffe7, 22),
    (0x7ffff2, 23),
    (0x3fffe8, 22),
    (0x1ffffec, 25),
    (0x3ffffe2, 26),
    (0x3ffffe3, 26),
    (0x3ffffe4, 26),
    (0x7ffffde, 27),
    (0x7ffffdf, 27),
    (0x3ffffe5, 26),
    (0xfffff1, 24),
    (0x1ffffed, 25),
    (0x7fff2, 19),
    (0x1fffe3, 21),
    (0x3ffffe6, 26),
    (0x7ffffe0, 27),
    (0x7ffffe1, 27),
    (0x3ffffe7, 26),
    (0x7ffffe2, 27),
    (0xfffff2, 24),
    (0x1fffe4, 21),
    (0x1fffe5, 21),
    (0x3ffffe8, 26),
    (0x3ffffe9, 26),
    (0xffffffd, 28),
    (0x7ffffe3, 27),
    (0x7ffffe4, 27),
    (0x7ffffe5, 27),
    (0xfffec, 20),
    (0xfffff3, 24),
    (0xfffed, 20),
    (0x1fffe6, 21),
    (0x3fffe9, 22),
    (0x1fffe7, 21),
    (0x1fffe8, 21),
    (0x7ffff3, 23),
    (0x3fffea, 22),
    (0x3fffeb, 22),
    (0x1ffffee, 25),
    (0x1ffffef, 25),
    (0xfffff4, 24),
    (0xfffff5, 24),
    (0x3ffffea, 26),
    (0x7ffff4, 23),
    (0x3ffffeb, 26),
    (0x7ffffe6, 27),
    (0x3ffffec, 26),
    (0x3ffffed, 26),
    (0x7ffffe7, 27),
    (0x7ffffe8, 27),
    (0x7ffffe9, 27),
    (0x7ffffea, 27),
    (0x7ffffeb, 27),
    (0xffffffe, 28),
    (0x7ffffec, 27),
    (0x7ffffed, 27),
    (0x7ffffee, 27),
    (0x7ffffef, 27),
    (0x7fffff0, 27),
    (0x3ffffee, 26),
    (0x3fffffff, 30),
];

lazy_static! {
    static ref HUFFMAN_CODE_MAP: HashMap<(u32, u8), u8> = {
        let mut m = HashMap::<(u32, u8), u8>::new();
        for (symbol, &(code, code_len)) in HUFFMAN_CODE_ARRAY.iter().enumerate() {
            // EOS is never a decodable symbol, it only pads.
            if symbol < 256 {
                m.insert((code, code_len), symbol as u8);
            }
        }
        m
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Helper;

    fn encode_to_vec(src: &[u8]) -> Vec<u8> {
        let mut dst = vec![0u8; src.len() * 4 + 4];
        let len = HuffmanEncoder::new().encode(src, &mut dst).unwrap();
        dst.truncate(len);
        dst
    }

    #[test]
    fn encode_custom_key() {
        // [RFC 7541] C.4.1
        assert_eq!(
            encode_to_vec(b"custom-key"),
            Helper::hex_to_vec("25a8 49e9 5ba9 7d7f")
        );
        assert_eq!(
            encode_to_vec(b"www.example.com"),
            Helper::hex_to_vec("f1e3 c2e5 f23a 6ba0 ab90 f4ff")
        );
        assert_eq!(encode_to_vec(b"no-cache"), Helper::hex_to_vec("a8eb 1064 9cbf"));
    }

    #[test]
    fn encode_empty() {
        let mut dst = [0u8; 4];
        assert_eq!(HuffmanEncoder::new().encode(b"", &mut dst).unwrap(), 0);
    }

    #[test]
    fn encode_buffer_too_small() {
        let mut dst = [0u8; 3];
        assert_eq!(
            HuffmanEncoder::new().encode(b"custom-key", &mut dst),
            Err(HpackError::BufferTooSmall)
        );
    }

    #[test]
    fn roundtrip_all_octets() {
        let src: Vec<u8> = (0u8..=255).collect();
        let encoded = encode_to_vec(&src);
        let decoded = HuffmanDecoder::new().decode(&encoded).unwrap();
        assert_eq!(decoded, src);
    }

    #[test]
    fn decode_custom_key() {
        let buf = Helper::hex_to_vec("25a8 49e9 5ba9 7d7f");
        assert_eq!(HuffmanDecoder::new().decode(&buf).unwrap(), b"custom-key");
    }

    #[test]
    fn decode_eos_is_error() {
        // 30 bits of EOS plus two bits of padding
        let buf = [0xff, 0xff, 0xff, 0xff];
        assert_eq!(
            HuffmanDecoder::new().decode(&buf),
            Err(HuffmanDecoderError::EOSInString.into())
        );
    }

    #[test]
    fn decode_padding_too_large() {
        // 16 ones decode nothing and leave more than a byte of padding
        let buf = [0xff, 0xff];
        assert_eq!(
            HuffmanDecoder::new().decode(&buf),
            Err(HuffmanDecoderError::PaddingTooLarge.into())
        );
    }

    #[test]
    fn decode_padding_with_zero_bit() {
        // '0' is coded 00000; the trailing three 0 bits are not an EOS prefix
        let buf = [0x00];
        assert_eq!(
            HuffmanDecoder::new().decode(&buf),
            Err(HuffmanDecoderError::InvalidPadding.into())
        );
    }

    #[test]
    fn decode_clean_padding() {
        // 'e' is coded 00101; the trailing three 1 bits are valid padding
        let buf = [0b00101_111];
        assert_eq!(HuffmanDecoder::new().decode(&buf).unwrap(), b"e");
    }
}
