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
// Created Date: 2023/09/14 10:21:49

use std::{fmt, result};

/// Represents all errors that can be encountered while decoding an
/// integer.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum IntegerDecodingError {
    /// When a buffer from which an integer was supposed to be decoded does
    /// not contain enough octets to complete the decoding.
    NotEnoughOctets,
    /// 5.1. specifies that "excessively large integer decodings" MUST be
    /// considered an error. This variant corresponds to a continuation
    /// sequence whose value does not fit into a `u64`.
    Overflow,
}

/// Represents all errors that can be encountered while decoding an octet
/// string.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum StringDecodingError {
    /// The declared length of the string runs past the end of the input.
    NotEnoughOctets,
    HuffmanDecoderError(HuffmanDecoderError),
}

/// Represents the error variants that the `HuffmanDecoder` can return.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum HuffmanDecoderError {
    /// Any padding strictly larger than 7 bits MUST be interpreted as an error
    PaddingTooLarge,
    /// Any padding that does not correspond to the most significant bits of
    /// EOS MUST be interpreted as an error.
    InvalidPadding,
    /// If EOS is ever found in the string, it causes an error.
    EOSInString,
}

/// Wire-format violations of RFC 7541. Any of these requires the caller to
/// tear the connection down with an HTTP/2 `COMPRESSION_ERROR`.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum CompressionError {
    IntegerDecoding(IntegerDecodingError),
    StringDecoding(StringDecodingError),
    /// [RFC 7541] 2.3.3. Index Address Space
    /// Indices strictly greater than the sum of the lengths of both tables
    /// MUST be treated as a decoding error, and so is index zero.
    HeaderIndexOutOfBounds,
    /// A dynamic table size update above the limit the peer advertised.
    InvalidSizeUpdate,
    /// A size update after the first field of a block, or a third update
    /// at the head of a block.
    MisplacedSizeUpdate,
    /// A representation that is not valid for the attempted operation.
    UnexpectedRepresentation,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum HpackError {
    Compression(CompressionError),
    /// The accumulated uncompressed header list ran past the host limit.
    SizeExceeded,
    /// The caller-supplied output buffer cannot hold the next byte.
    BufferTooSmall,
    /// A table shrink or insertion was blocked by referenced entries.
    InsertionRejected,
}

impl HpackError {
    #[inline]
    pub fn description_str(&self) -> &'static str {
        match self {
            HpackError::Compression(e) => e.description_str(),
            HpackError::SizeExceeded => "header list size exceeded",
            HpackError::BufferTooSmall => "buffer too small",
            HpackError::InsertionRejected => "insertion rejected by referenced entries",
        }
    }

    pub fn is_compression_error(&self) -> bool {
        match self {
            HpackError::Compression(_) => true,
            _ => false,
        }
    }
}

impl CompressionError {
    #[inline]
    pub fn description_str(&self) -> &'static str {
        match self {
            CompressionError::IntegerDecoding(IntegerDecodingError::NotEnoughOctets) => {
                "not enough octets to decode integer"
            }
            CompressionError::IntegerDecoding(IntegerDecodingError::Overflow) => {
                "integer decoding overflow"
            }
            CompressionError::StringDecoding(StringDecodingError::NotEnoughOctets) => {
                "not enough octets to decode string"
            }
            CompressionError::StringDecoding(StringDecodingError::HuffmanDecoderError(_)) => {
                "huffman decoding error"
            }
            CompressionError::HeaderIndexOutOfBounds => "header index out of bounds",
            CompressionError::InvalidSizeUpdate => "table size update above peer limit",
            CompressionError::MisplacedSizeUpdate => "table size update after header field",
            CompressionError::UnexpectedRepresentation => "unexpected field representation",
        }
    }
}

impl fmt::Display for HpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description_str())
    }
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description_str())
    }
}

impl From<CompressionError> for HpackError {
    fn from(e: CompressionError) -> Self {
        HpackError::Compression(e)
    }
}

impl From<IntegerDecodingError> for HpackError {
    fn from(e: IntegerDecodingError) -> Self {
        HpackError::Compression(CompressionError::IntegerDecoding(e))
    }
}

impl From<StringDecodingError> for HpackError {
    fn from(e: StringDecodingError) -> Self {
        HpackError::Compression(CompressionError::StringDecoding(e))
    }
}

impl From<HuffmanDecoderError> for HpackError {
    fn from(e: HuffmanDecoderError) -> Self {
        StringDecodingError::HuffmanDecoderError(e).into()
    }
}

pub type HpackResult<T> = result::Result<T, HpackError>;
