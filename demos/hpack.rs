use algorithm::buf::{BinaryMut, Bt};
use webhpack::{Decoder, Encoder, Helper, DEFAULT_SETTINGS_HEADER_TABLE_SIZE};

/// https://httpwg.org/specs/rfc7541.html#request.examples.with.huffman.coding
fn parse_header() {
    let mut decoder = Decoder::new();

    // C.4.1
    let buf = Helper::hex_to_vec("8286 8441 8cf1 e3c2 e5f2 3a6b a0ab 90f4 ff");
    let headers = decoder.decode(&buf).unwrap();
    for (name, value) in &headers {
        println!(
            "{}: {}",
            String::from_utf8_lossy(name),
            String::from_utf8_lossy(value)
        );
    }
    assert_eq!(headers.len(), 4);
    assert_eq!(decoder.indexing_table().size(), 57);

    // C.4.2
    let buf = Helper::hex_to_vec("8286 84be 5886 a8eb 1064 9cbf");
    let headers = decoder.decode(&buf).unwrap();
    assert_eq!(headers[4].0, b"cache-control");
    assert_eq!(headers[4].1, b"no-cache");

    // C.4.3
    let buf = Helper::hex_to_vec("8287 85bf 4088 25a8 49e9 5ba9 7d7f 8925 a849 e95b b8e8 b4bf");
    let headers = decoder.decode(&buf).unwrap();
    assert_eq!(headers[4].0, b"custom-key");
    assert_eq!(headers[4].1, b"custom-value");
    println!("dynamic table now {} octets", decoder.indexing_table().size());
}

fn build_header() {
    let mut encoder = Encoder::with_max_size(DEFAULT_SETTINGS_HEADER_TABLE_SIZE);
    let fields: Vec<(&[u8], &[u8])> = vec![
        (b":method", b"GET"),
        (b":scheme", b"http"),
        (b":path", b"/"),
        (b":authority", b"www.example.com"),
    ];

    let mut block = BinaryMut::new();
    let size = encoder.encode_block(&mut block, fields, None).unwrap();
    let hex: Vec<String> = block.chunk().iter().map(|b| format!("{:02x}", b)).collect();
    println!("encoded {} octets: {}", size, hex.join(""));

    let mut decoder = Decoder::new();
    let headers = decoder.decode(block.chunk()).unwrap();
    assert_eq!(headers.len(), 4);
    println!("decoded back {} fields", headers.len());
}

fn main() {
    parse_header();
    build_header();
}
