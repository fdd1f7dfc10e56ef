//! Shared fixtures for the hqd integration tests and benches.
//!
//! [`Recorder`] implements both delegate traits and logs every callback
//! as an [`Event`]. Payload and padding fragments are merged as they
//! arrive, so the log of a chunked decode equals the log of the same
//! bytes fed in one piece.

use hqd_decoder::{
    DataPayloadDecoder, DataPayloadListener, DecodeError, DecodeStatus, ErrorCode,
    QpackDecoderStreamDelegate, QpackDecoderStreamReceiver, RunClass,
};
use hqd_wire::{DecodeBuffer, FrameHeader};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    InsertCountIncrement(u64),
    HeaderAcknowledgement(u64),
    StreamCancellation(u64),
    Error { code: u64, message: String },

    DataStart(FrameHeader),
    PadLength(usize),
    Payload(Vec<u8>),
    Padding(Vec<u8>),
    DataEnd,
    PaddingTooLong { header: FrameHeader, missing_length: usize },
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of error callbacks seen, of either kind.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Error { .. } | Event::PaddingTooLong { .. }))
            .count()
    }

    /// All content bytes, concatenated.
    #[must_use]
    pub fn content(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Payload(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    /// One line per event, for snapshots.
    #[must_use]
    pub fn render(&self) -> String {
        self.events
            .iter()
            .map(|event| match event {
                Event::InsertCountIncrement(n) => format!("insert_count_increment {n}\n"),
                Event::HeaderAcknowledgement(id) => format!("header_acknowledgement {id}\n"),
                Event::StreamCancellation(id) => format!("stream_cancellation {id}\n"),
                Event::Error { code, message } => format!("error {code:#x}: {message}\n"),
                Event::DataStart(header) => format!("data_start [{header}]\n"),
                Event::PadLength(p) => format!("pad_length {p}\n"),
                Event::Payload(bytes) => {
                    format!("payload {:?}\n", String::from_utf8_lossy(bytes))
                }
                Event::Padding(bytes) => format!("padding {} bytes\n", bytes.len()),
                Event::DataEnd => "data_end\n".to_string(),
                Event::PaddingTooLong { missing_length, .. } => {
                    format!("padding_too_long missing {missing_length}\n")
                }
            })
            .collect()
    }

    fn push_bytes(&mut self, bytes: &[u8], class: RunClass) {
        match (self.events.last_mut(), class) {
            (Some(Event::Payload(acc)), RunClass::Content)
            | (Some(Event::Padding(acc)), RunClass::Padding) => {
                acc.extend_from_slice(bytes);
            }
            (_, RunClass::Content) => self.events.push(Event::Payload(bytes.to_vec())),
            (_, RunClass::Padding) => self.events.push(Event::Padding(bytes.to_vec())),
        }
    }
}

impl QpackDecoderStreamDelegate for Recorder {
    fn on_insert_count_increment(&mut self, increment: u64) {
        self.events.push(Event::InsertCountIncrement(increment));
    }

    fn on_header_acknowledgement(&mut self, stream_id: u64) {
        self.events.push(Event::HeaderAcknowledgement(stream_id));
    }

    fn on_stream_cancellation(&mut self, stream_id: u64) {
        self.events.push(Event::StreamCancellation(stream_id));
    }

    fn on_error_detected(&mut self, code: ErrorCode, error: &DecodeError) {
        self.events.push(Event::Error {
            code: code.wire_value(),
            message: error.to_string(),
        });
    }
}

impl DataPayloadListener for Recorder {
    fn on_data_start(&mut self, header: &FrameHeader) {
        self.events.push(Event::DataStart(*header));
    }

    fn on_pad_length(&mut self, pad_length: usize) {
        self.events.push(Event::PadLength(pad_length));
    }

    fn on_data_payload(&mut self, data: &[u8]) {
        self.push_bytes(data, RunClass::Content);
    }

    fn on_padding(&mut self, padding: &[u8]) {
        self.push_bytes(padding, RunClass::Padding);
    }

    fn on_data_end(&mut self) {
        self.events.push(Event::DataEnd);
    }

    fn on_padding_too_long(&mut self, header: &FrameHeader, missing_length: usize) {
        self.events.push(Event::PaddingTooLong {
            header: *header,
            missing_length,
        });
    }
}

/// Feed `input` to a fresh receiver, split at `cuts` (sorted offsets).
#[must_use]
pub fn decode_stream_chunked(input: &[u8], cuts: &[usize]) -> Recorder {
    let mut receiver = QpackDecoderStreamReceiver::new();
    let mut recorder = Recorder::new();
    for chunk in split_at_cuts(input, cuts) {
        receiver.decode(chunk, &mut recorder);
    }
    recorder
}

/// Decode one DATA payload, split at `cuts`. Returns the final status
/// alongside the callbacks.
#[must_use]
pub fn decode_payload_chunked(
    header: &FrameHeader,
    payload: &[u8],
    cuts: &[usize],
) -> (DecodeStatus, Recorder) {
    let mut decoder = DataPayloadDecoder::new();
    let mut recorder = Recorder::new();
    let mut chunks = split_at_cuts(payload, cuts).into_iter();
    let first = chunks.next().unwrap_or_default();
    let mut db = DecodeBuffer::new(first);
    let mut status = decoder.start_decoding_payload(header, &mut db, &mut recorder);
    for chunk in chunks {
        if status != DecodeStatus::InProgress {
            break;
        }
        status = decoder.resume_decoding_payload(&mut DecodeBuffer::new(chunk), &mut recorder);
    }
    (status, recorder)
}

/// Split `input` at the given offsets, clamped and deduplicated. Always
/// returns at least one (possibly empty) chunk.
#[must_use]
pub fn split_at_cuts<'a>(input: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut offsets: Vec<usize> = cuts.iter().map(|&c| c.min(input.len())).collect();
    offsets.sort_unstable();
    offsets.dedup();

    let mut chunks = Vec::with_capacity(offsets.len() + 1);
    let mut start = 0;
    for offset in offsets {
        chunks.push(&input[start..offset]);
        start = offset;
    }
    chunks.push(&input[start..]);
    chunks
}
