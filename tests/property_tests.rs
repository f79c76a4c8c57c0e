//! Property-based tests for the wire framing layer.

use proptest::prelude::*;
use serde_json::json;
use toolrpc::{FrameDecoder, Request, RequestId};

fn arb_request() -> impl Strategy<Value = Request> {
    let arb_id = prop_oneof![
        any::<i64>().prop_map(RequestId::from),
        "[a-zA-Z0-9-]{1,12}".prop_map(RequestId::from),
    ];
    let arb_args = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[^\\p{Cc}]{0,24}".prop_map(|s| json!({ "text": s })),
    ];
    (arb_id, "[a-z_/]{1,16}", arb_args).prop_map(|(id, tool, args)| Request { id, tool, args })
}

fn encode_stream(requests: &[Request]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for request in requests {
        bytes.extend_from_slice(&serde_json::to_vec(request).unwrap());
        bytes.push(b'\n');
    }
    bytes
}

fn decode_in_chunks(stream: &[u8], chunk_sizes: &[usize], max_frame: usize) -> Vec<Request> {
    let mut decoder = FrameDecoder::new(max_frame);
    let mut decoded = Vec::new();
    let mut offset = 0;
    let mut turn = 0;
    while offset < stream.len() {
        let size = chunk_sizes
            .get(turn % chunk_sizes.len())
            .copied()
            .unwrap_or(1)
            .max(1);
        let end = (offset + size).min(stream.len());
        decoder.buffer_mut().extend_from_slice(&stream[offset..end]);
        offset = end;
        turn += 1;
        loop {
            match decoder.decode_next() {
                Ok(Some(request)) => decoded.push(request),
                Ok(None) => break,
                // Recoverable: the decoder has already resynced past the
                // offending record.
                Err(_) => {}
            }
        }
    }
    decoded
}

proptest! {
    /// However the byte stream is fragmented, the decoded request sequence
    /// is identical to decoding it in one contiguous read.
    #[test]
    fn framing_is_fragmentation_agnostic(
        requests in prop::collection::vec(arb_request(), 0..8),
        chunk_sizes in prop::collection::vec(1usize..16, 1..8),
    ) {
        let stream = encode_stream(&requests);
        let whole = decode_in_chunks(&stream, &[stream.len().max(1)], 1 << 20);
        let fragmented = decode_in_chunks(&stream, &chunk_sizes, 1 << 20);
        prop_assert_eq!(&whole, &requests);
        prop_assert_eq!(fragmented, requests);
    }

    /// An oversized record never poisons the records that follow it.
    #[test]
    fn oversized_record_resyncs_to_next_record(
        padding in 64usize..256,
        chunk in 1usize..32,
    ) {
        let max_frame = 48;
        let big = format!(
            "{{\"id\":1,\"tool\":\"big\",\"args\":\"{}\"}}\n",
            "x".repeat(padding)
        );
        let follow = Request {
            id: RequestId::from(2),
            tool: "echo".into(),
            args: serde_json::Value::Null,
        };
        let mut stream = big.into_bytes();
        stream.extend_from_slice(&encode_stream(std::slice::from_ref(&follow)));

        let decoded = decode_in_chunks(&stream, &[chunk], max_frame);
        prop_assert_eq!(decoded, vec![follow]);
    }
}
