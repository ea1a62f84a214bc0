//! Exposes the struct `Decoder` that allows for HPACK-encoded header blocks to
//! be decoded into a header list.
//!
//! The decoder follows HPACK rules and keeps the dynamic table in sync with
//! the peer's encoder; the single semantic check on top of that is the
//! HTTP/2 requirement that literal field names be lower case, which is
//! reported without aborting the parse.

use crate::field::{
    decode_indexed_header_field, decode_literal_header_field, update_dynamic_table_size,
};
use crate::table::IndexingTable;
use crate::{HpackError, HpackField, HpackResult, DEFAULT_SETTINGS_HEADER_TABLE_SIZE};

// [RFC 7541] 4.1. Calculating Table Size
const ADDITIONAL_32_BYTES: usize = 32;

/// Receives the fields of a header block as they decode. The borrows only
/// live for the duration of the call; an implementation that keeps a field
/// copies it.
pub trait HeaderSink {
    fn append_field(&mut self, name: &[u8], value: &[u8]);
}

impl HeaderSink for Vec<(Vec<u8>, Vec<u8>)> {
    fn append_field(&mut self, name: &[u8], value: &[u8]) {
        self.push((name.to_vec(), value.to_vec()));
    }
}

impl<F> HeaderSink for F
where
    F: FnMut(&[u8], &[u8]),
{
    fn append_field(&mut self, name: &[u8], value: &[u8]) {
        self(name, value)
    }
}

/// How a fully parsed header block came out: either clean, or carrying an
/// HTTP/2 semantic violation (an upper case literal name) that the
/// transport should turn into a stream error rather than a connection
/// error. Both report the number of octets consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDecoded {
    Normal(usize),
    HttpViolation(usize),
}

/// Decodes header blocks encoded with HPACK.
///
/// One decoder serves one direction of one connection; the whole block must
/// be at hand (in HTTP/2 all CONTINUATION frames concatenated) since the
/// dynamic table mutates as fields decode.
pub struct Decoder {
    indexing_table: IndexingTable,
}

impl Decoder {
    pub fn new() -> Decoder {
        Decoder::with_max_size(DEFAULT_SETTINGS_HEADER_TABLE_SIZE)
    }

    pub fn with_max_size(size: usize) -> Decoder {
        Decoder {
            indexing_table: IndexingTable::with_size(size),
        }
    }

    /// Decodes one header block, delivering each field to `sink` in order.
    ///
    /// `max_header_list_size` bounds the uncompressed list the way
    /// SETTINGS_MAX_HEADER_LIST_SIZE does: name plus value plus 32 per
    /// field. `peer_max_table_size` is the out-of-band limit any in-band
    /// size update must stay under.
    ///
    /// On a wire-format error the table keeps the state it had before the
    /// failing representation, so the caller can shut the connection down
    /// cleanly.
    pub fn decode_block<S: HeaderSink>(
        &mut self,
        buf: &[u8],
        sink: &mut S,
        max_header_list_size: usize,
        peer_max_table_size: usize,
    ) -> HpackResult<BlockDecoded> {
        let mut cursor = 0;
        let mut total_header_size: usize = 0;
        let mut header_field_started = false;
        let mut size_updates = 0;
        let mut has_http2_violation = false;

        while cursor < buf.len() {
            match HpackField::parse(buf[cursor]) {
                HpackField::Index => {
                    let ((name, value), consumed) =
                        decode_indexed_header_field(&self.indexing_table, &buf[cursor..])?;
                    total_header_size += name.len() + value.len() + ADDITIONAL_32_BYTES;
                    if total_header_size > max_header_list_size {
                        return Err(HpackError::SizeExceeded);
                    }
                    sink.append_field(name, value);
                    cursor += consumed;
                    header_field_started = true;
                }
                HpackField::IndexedLiteral
                | HpackField::NoindexLiteral
                | HpackField::NeverindexLiteral => {
                    let ((name, value), consumed, violated) =
                        decode_literal_header_field(&mut self.indexing_table, &buf[cursor..])?;
                    total_header_size += name.len() + value.len() + ADDITIONAL_32_BYTES;
                    if total_header_size > max_header_list_size {
                        return Err(HpackError::SizeExceeded);
                    }
                    sink.append_field(&name, &value);
                    has_http2_violation |= violated;
                    cursor += consumed;
                    header_field_started = true;
                }
                HpackField::TablesizeUpdate => {
                    // [RFC 7541] 4.2. allows a shrink-then-grow pair at the
                    // head of a block and nothing once a field has started.
                    if header_field_started || size_updates >= 2 {
                        return Err(crate::CompressionError::MisplacedSizeUpdate.into());
                    }
                    let (_, consumed) = update_dynamic_table_size(
                        &mut self.indexing_table,
                        &buf[cursor..],
                        peer_max_table_size,
                    )?;
                    size_updates += 1;
                    cursor += consumed;
                }
            }
        }

        log::trace!("decoded header block: {} octets", cursor);
        if has_http2_violation {
            Ok(BlockDecoded::HttpViolation(cursor))
        } else {
            Ok(BlockDecoded::Normal(cursor))
        }
    }

    /// Decodes a block into an owned header list.
    pub fn decode(&mut self, buf: &[u8]) -> HpackResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut header_list = Vec::new();
        self.decode_block(buf, &mut header_list, usize::MAX, usize::MAX)?;
        Ok(header_list)
    }

    /// Applies a size limit the peer advertised out of band.
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

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}
