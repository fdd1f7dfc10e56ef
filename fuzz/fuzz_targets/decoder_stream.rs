#![no_main]

use arbitrary::Arbitrary;
use hqd_decoder::{DecodeError, ErrorCode, QpackDecoderStreamDelegate, QpackDecoderStreamReceiver};
use libfuzzer_sys::fuzz_target;

// Fuzz target: QPACK decoder stream, whole vs. chunked.
//
// Catches:
// - Panics on arbitrary instruction bytes
// - Callback sequences that depend on where the input was split
// - More than one error report per receiver

#[derive(Debug, Arbitrary)]
struct Input {
    bytes: Vec<u8>,
    chunk_lengths: Vec<u8>,
    close: bool,
}

#[derive(Default, PartialEq, Debug)]
struct Log {
    calls: Vec<(u8, u64)>,
    errors: usize,
}

impl QpackDecoderStreamDelegate for Log {
    fn on_insert_count_increment(&mut self, increment: u64) {
        self.calls.push((0, increment));
    }
    fn on_header_acknowledgement(&mut self, stream_id: u64) {
        self.calls.push((1, stream_id));
    }
    fn on_stream_cancellation(&mut self, stream_id: u64) {
        self.calls.push((2, stream_id));
    }
    fn on_error_detected(&mut self, _: ErrorCode, _: &DecodeError) {
        self.errors += 1;
    }
}

fuzz_target!(|input: Input| {
    let mut whole = Log::default();
    let mut receiver = QpackDecoderStreamReceiver::new();
    receiver.decode(&input.bytes, &mut whole);
    if input.close {
        receiver.end_of_stream(&mut whole);
    }

    let mut chunked = Log::default();
    let mut receiver = QpackDecoderStreamReceiver::new();
    let mut rest = input.bytes.as_slice();
    for &len in &input.chunk_lengths {
        let (chunk, tail) = rest.split_at(usize::from(len).min(rest.len()));
        receiver.decode(chunk, &mut chunked);
        rest = tail;
    }
    receiver.decode(rest, &mut chunked);
    if input.close {
        receiver.end_of_stream(&mut chunked);
    }

    assert!(whole.errors <= 1);
    assert_eq!(whole, chunked);
});
