use algorithm::buf::{BinaryMut, Bt};
use webhpack::{
    BlockDecoded, CompressionError, Decoder, Encoder, Helper, HpackError,
    DEFAULT_MAX_HEADER_LIST_SIZE, DEFAULT_SETTINGS_HEADER_TABLE_SIZE,
};

fn field_list(list: &[(&str, &str)]) -> Vec<(Vec<u8>, Vec<u8>)> {
    list.iter()
        .map(|(n, v)| (n.as_bytes().to_vec(), v.as_bytes().to_vec()))
        .collect()
}

/// Feeds every list through an encoder/decoder pair sharing one table
/// maximum and checks that the fields survive and both tables stay in
/// lockstep after every block.
fn assert_roundtrip(lists: &[&[(&str, &str)]], max_size: usize) {
    let mut encoder = Encoder::with_max_size(max_size);
    let mut decoder = Decoder::with_max_size(max_size);

    for list in lists {
        let mut block = BinaryMut::new();
        encoder
            .encode_block(
                &mut block,
                list.iter().map(|(n, v)| (n.as_bytes(), v.as_bytes())),
                None,
            )
            .unwrap();

        let mut decoded = Vec::new();
        let outcome = decoder
            .decode_block(
                block.chunk(),
                &mut decoded,
                usize::MAX,
                DEFAULT_SETTINGS_HEADER_TABLE_SIZE,
            )
            .unwrap();
        assert_eq!(outcome, BlockDecoded::Normal(block.remaining()));
        assert_eq!(decoded, field_list(list));

        let enc = encoder.indexing_table();
        let dec = decoder.indexing_table();
        assert_eq!(enc.size(), dec.size());
        assert_eq!(enc.maximum_size(), dec.maximum_size());
        assert_eq!(enc.dynamic_table().count(), dec.dynamic_table().count());
        assert_eq!(
            enc.dynamic_table().largest_index(),
            dec.dynamic_table().largest_index()
        );
        assert!(enc.size() <= enc.maximum_size());
    }
}

#[test]
fn request_sequence_roundtrip() {
    // the three requests of [RFC 7541] C.3 / C.4
    assert_roundtrip(
        &[
            &[
                (":method", "GET"),
                (":scheme", "http"),
                (":path", "/"),
                (":authority", "www.example.com"),
            ],
            &[
                (":method", "GET"),
                (":scheme", "http"),
                (":path", "/"),
                (":authority", "www.example.com"),
                ("cache-control", "no-cache"),
            ],
            &[
                (":method", "GET"),
                (":scheme", "https"),
                (":path", "/index.html"),
                (":authority", "www.example.com"),
                ("custom-key", "custom-value"),
            ],
        ],
        DEFAULT_SETTINGS_HEADER_TABLE_SIZE,
    );
}

#[test]
fn response_sequence_roundtrip_with_eviction() {
    // the three responses of [RFC 7541] C.5 / C.6 against a 256 octet table
    assert_roundtrip(
        &[
            &[
                (":status", "302"),
                ("cache-control", "private"),
                ("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
                ("location", "https://www.example.com"),
            ],
            &[
                (":status", "307"),
                ("cache-control", "private"),
                ("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
                ("location", "https://www.example.com"),
            ],
            &[
                (":status", "200"),
                ("cache-control", "private"),
                ("date", "Mon, 21 Oct 2013 20:13:22 GMT"),
                ("location", "https://www.example.com"),
                ("content-encoding", "gzip"),
                (
                    "set-cookie",
                    "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1",
                ),
            ],
        ],
        256,
    );
}

#[test]
fn mixed_case_names_roundtrip_lowercased() {
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();

    let block = encoder
        .encode([("X-Request-Id".as_bytes(), "abc123".as_bytes())])
        .unwrap();
    let mut decoded = Vec::new();
    decoder
        .decode_block(&block, &mut decoded, DEFAULT_MAX_HEADER_LIST_SIZE, 4096)
        .unwrap();
    assert_eq!(decoded, field_list(&[("x-request-id", "abc123")]));
}

#[test]
fn size_update_travels_in_band() {
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();

    // grow some shared state first
    let first = [("custom-key", "custom-value"), ("custom-two", "v2")];
    let block = encoder
        .encode(first.iter().map(|(n, v)| (n.as_bytes(), v.as_bytes())))
        .unwrap();
    let mut decoded = Vec::new();
    decoder
        .decode_block(&block, &mut decoded, usize::MAX, 4096)
        .unwrap();
    assert_eq!(decoder.max_table_size(), DEFAULT_SETTINGS_HEADER_TABLE_SIZE);

    // the host asks for a shrink; the update leads the next block
    let mut block = BinaryMut::new();
    encoder
        .encode_block(
            &mut block,
            [(&b":method"[..], &b"GET"[..])],
            Some(0),
        )
        .unwrap();
    assert_eq!(block.chunk()[0], 0x20);

    let mut decoded = Vec::new();
    decoder
        .decode_block(block.chunk(), &mut decoded, usize::MAX, 4096)
        .unwrap();
    assert_eq!(decoder.max_table_size(), 0);
    assert_eq!(decoder.indexing_table().size(), 0);
    assert_eq!(encoder.indexing_table().size(), 0);
    assert_eq!(decoded, field_list(&[(":method", "GET")]));
}

#[test]
fn oversized_update_is_rejected_by_decoder() {
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();

    let mut block = BinaryMut::new();
    encoder
        .encode_block(&mut block, [(&b":method"[..], &b"GET"[..])], Some(8192))
        .unwrap();

    let mut decoded = Vec::new();
    assert_eq!(
        decoder.decode_block(block.chunk(), &mut decoded, usize::MAX, 4096),
        Err(HpackError::Compression(CompressionError::InvalidSizeUpdate))
    );
}

#[test]
fn many_blocks_stay_synchronized() {
    // churn a small table so insertions, evictions and oversized clears
    // all happen along the way
    let mut encoder = Encoder::with_max_size(128);
    let mut decoder = Decoder::with_max_size(128);

    for round in 0..64usize {
        let name = format!("x-header-{}", round % 7);
        let value = "v".repeat((round * 11) % 90);
        let fields = [(name.as_bytes(), value.as_bytes())];

        let mut block = BinaryMut::new();
        encoder.encode_block(&mut block, fields, None).unwrap();

        let mut decoded = Vec::new();
        decoder
            .decode_block(block.chunk(), &mut decoded, usize::MAX, 4096)
            .unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].0, name.as_bytes());
        assert_eq!(decoded[0].1, value.as_bytes());

        let enc = encoder.indexing_table();
        let dec = decoder.indexing_table();
        assert_eq!(enc.size(), dec.size());
        assert_eq!(enc.dynamic_table().count(), dec.dynamic_table().count());
        assert!(enc.size() <= 128);
    }
}

#[test]
fn decode_rfc_appendix_c4_bytes() {
    let mut decoder = Decoder::new();
    let mut decoded = Vec::new();
    let buf = Helper::hex_to_vec("8286 8441 8cf1 e3c2 e5f2 3a6b a0ab 90f4 ff");
    let outcome = decoder
        .decode_block(&buf, &mut decoded, usize::MAX, 4096)
        .unwrap();
    assert_eq!(outcome, BlockDecoded::Normal(buf.len()));
    assert_eq!(
        decoded,
        field_list(&[
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            (":authority", "www.example.com"),
        ])
    );
}

#[test]
fn garbage_input_never_panics() {
    // malformed inputs must come back as errors, not panics
    let samples: &[&[u8]] = &[
        &[0xff],
        &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        &[0x40],
        &[0x41],
        &[0x00],
        &[0x1f],
        &[0x3f],
        &[0x61, 0xff, 0x00],
        &[0x80],
        &[0xc0, 0x80, 0x80],
    ];
    for sample in samples {
        let mut decoder = Decoder::new();
        let mut decoded = Vec::new();
        let _ = decoder.decode_block(sample, &mut decoded, usize::MAX, 4096);
    }
}
