#![no_main]

use arbitrary::Arbitrary;
use hqd_decoder::{DataPayloadDecoder, DataPayloadListener, DecodeStatus};
use hqd_wire::{DecodeBuffer, FrameFlags, FrameHeader, FrameType};
use libfuzzer_sys::fuzz_target;

// Fuzz target: DATA payload decoding with arbitrary header flags and
// chunking.
//
// Catches:
// - Reads past the declared payload length
// - Content + padding not adding up to the payload
// - Errors that do not match the pad-length bound

#[derive(Debug, Arbitrary)]
struct Input {
    flags: u8,
    payload: Vec<u8>,
    trailing: Vec<u8>,
    chunk_lengths: Vec<u8>,
}

#[derive(Default)]
struct Totals {
    pad_length: Option<usize>,
    content: usize,
    padding: usize,
    ended: bool,
    too_long: Option<usize>,
}

impl DataPayloadListener for Totals {
    fn on_data_start(&mut self, _: &FrameHeader) {}
    fn on_pad_length(&mut self, pad_length: usize) {
        self.pad_length = Some(pad_length);
    }
    fn on_data_payload(&mut self, data: &[u8]) {
        self.content += data.len();
    }
    fn on_padding(&mut self, padding: &[u8]) {
        self.padding += padding.len();
    }
    fn on_data_end(&mut self) {
        self.ended = true;
    }
    fn on_padding_too_long(&mut self, _: &FrameHeader, missing_length: usize) {
        self.too_long = Some(missing_length);
    }
}

fn take<'a>(rest: &mut &'a [u8], len: u8) -> &'a [u8] {
    let (chunk, tail) = rest.split_at(usize::from(len).min(rest.len()));
    *rest = tail;
    chunk
}

fuzz_target!(|input: Input| {
    let Ok(length) = u32::try_from(input.payload.len()) else {
        return;
    };
    let header = FrameHeader::new(length, FrameType::DATA, FrameFlags::from_raw(input.flags), 1);
    let mut wire = input.payload.clone();
    wire.extend_from_slice(&input.trailing);

    let mut decoder = DataPayloadDecoder::new();
    let mut totals = Totals::default();
    let mut rest = wire.as_slice();
    let mut lengths = input.chunk_lengths.iter();

    let first = take(&mut rest, lengths.next().copied().unwrap_or(u8::MAX));
    let mut db = DecodeBuffer::new(first);
    let mut status = decoder.start_decoding_payload(&header, &mut db, &mut totals);
    let mut unread = db.remaining();
    while status == DecodeStatus::InProgress && !rest.is_empty() {
        let chunk = take(&mut rest, lengths.next().copied().unwrap_or(u8::MAX));
        let mut db = DecodeBuffer::new(chunk);
        status = decoder.resume_decoding_payload(&mut db, &mut totals);
        unread = db.remaining();
    }

    let consumed = wire.len() - rest.len() - unread;
    match status {
        DecodeStatus::Done => {
            assert!(totals.ended);
            assert_eq!(consumed, input.payload.len());
            let pad_byte = usize::from(totals.pad_length.is_some());
            assert_eq!(pad_byte + totals.content + totals.padding, input.payload.len());
            assert_eq!(totals.padding, totals.pad_length.unwrap_or(0));
        }
        DecodeStatus::Error => {
            let missing = totals.too_long.expect("only padding errors are possible");
            assert!(header.is_padded());
            match totals.pad_length {
                Some(pad_length) => assert_eq!(missing, pad_length + 1 - input.payload.len()),
                None => assert!(input.payload.is_empty() && missing == 1),
            }
            assert_eq!(totals.content + totals.padding, 0);
        }
        DecodeStatus::InProgress => unreachable!("the whole payload was supplied"),
    }
});
