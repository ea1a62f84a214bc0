
mod decoder;
mod encoder;
mod error;
mod field;
mod helper;
mod huffman;
mod table;
mod xpack;

/// 默认的动态表最大长度值
pub const DEFAULT_SETTINGS_HEADER_TABLE_SIZE: usize = 4_096;

/// 默认的头列表限制值
pub const DEFAULT_MAX_HEADER_LIST_SIZE: usize = 16_384;

pub use decoder::{BlockDecoded, Decoder, HeaderSink};
pub use encoder::Encoder;
pub use error::{
    CompressionError, HpackError, HpackResult, HuffmanDecoderError, IntegerDecodingError,
    StringDecodingError,
};
pub use field::{
    decode_indexed_header_field, decode_literal_header_field, encode_dynamic_table_size_update,
    encode_indexed_header_field, encode_literal_header_field_with_indexed_name,
    encode_literal_header_field_with_new_name, update_dynamic_table_size, HpackField,
};
pub use helper::Helper;
pub use huffman::{HuffmanDecoder, HuffmanEncoder};
pub use table::{DynamicTable, HpackIndex, HpackMatch, HpackLookupResult, IndexingTable};
pub use xpack::{decode_integer, decode_string, encode_integer, encode_string};
