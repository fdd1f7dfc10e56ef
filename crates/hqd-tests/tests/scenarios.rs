//! End-to-end scenarios: known byte sequences decoded and rendered to
//! insta inline snapshots, one line per callback.

use hqd_decoder::{DataPayloadDecoder, DecodeStatus, QpackDecoderStreamReceiver};
use hqd_tests::{Event, Recorder, decode_payload_chunked, decode_stream_chunked};
use hqd_wire::{DecodeBuffer, FrameFlags, FrameHeader, FrameType};
use insta::assert_snapshot;

fn bytes(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str).unwrap_or_else(|e| panic!("bad fixture {hex_str}: {e}"))
}

fn data_header(len: u32, flags: FrameFlags) -> FrameHeader {
    FrameHeader::new(len, FrameType::DATA, flags, 1)
}

// ── QPACK decoder stream ──────────────────────────────────────────────────────

#[test]
fn stream_cancellation_of_stream_five() {
    let recorder = decode_stream_chunked(&bytes("45"), &[]);
    assert_snapshot!(recorder.render(), @"stream_cancellation 5");
}

#[test]
fn opcode_00_with_value_37_is_insert_count_increment() {
    let recorder = decode_stream_chunked(&[0b0010_0101], &[]);
    assert_snapshot!(recorder.render(), @"insert_count_increment 37");
}

#[test]
fn mixed_instruction_stream() {
    // ICI 1, ack 127 (two bytes), cancel 300 (three bytes), ack 0
    let input = bytes("01ff007fed0180");
    let recorder = decode_stream_chunked(&input, &[]);
    assert_snapshot!(recorder.render(), @r"
    insert_count_increment 1
    header_acknowledgement 127
    stream_cancellation 300
    header_acknowledgement 0
    ");

    for cut in 0..=input.len() {
        assert_eq!(decode_stream_chunked(&input, &[cut]).events, recorder.events, "cut at {cut}");
    }
}

#[test]
fn over_long_integer_reports_once() {
    // Prefix all ones, then eleven continuation bytes.
    let mut input = vec![0x3F];
    input.extend_from_slice(&[0x80; 11]);
    input.push(0x01);
    let recorder = decode_stream_chunked(&input, &[3, 7]);
    assert_snapshot!(
        recorder.render(),
        @"error 0x202: malformed varint: varint too long: more than 10 continuation bytes"
    );
}

#[test]
fn truncated_stream_reports_at_close() {
    let mut receiver = QpackDecoderStreamReceiver::new();
    let mut recorder = Recorder::new();
    receiver.decode(&bytes("80ff"), &mut recorder);
    receiver.end_of_stream(&mut recorder);
    assert_snapshot!(recorder.render(), @r"
    header_acknowledgement 0
    error 0x202: stream ended inside an instruction
    ");
}

#[test]
fn empty_chunk_to_fresh_receiver_does_nothing() {
    let mut receiver = QpackDecoderStreamReceiver::new();
    let mut recorder = Recorder::new();
    receiver.decode(&[], &mut recorder);
    assert!(recorder.events.is_empty());
    assert!(!receiver.error_detected());

    // Still at an instruction boundary.
    receiver.end_of_stream(&mut recorder);
    assert!(recorder.events.is_empty());
}

// ── DATA payload ──────────────────────────────────────────────────────────────

#[test]
fn padded_hello() {
    let header = data_header(9, FrameFlags::PADDED);
    let (status, recorder) = decode_payload_chunked(&header, b"\x03hello\x00\x00\x00", &[]);
    assert_eq!(status, DecodeStatus::Done);
    assert_snapshot!(recorder.render(), @r#"
    data_start [length=9, type=0x00, flags=0x08, stream=1]
    pad_length 3
    payload "hello"
    padding 3 bytes
    data_end
    "#);
}

#[test]
fn padded_hello_byte_at_a_time() {
    let header = data_header(9, FrameFlags::PADDED);
    let payload = b"\x03hello\x00\x00\x00";
    let cuts: Vec<usize> = (1..payload.len()).collect();
    let (status, chunked) = decode_payload_chunked(&header, payload, &cuts);
    let (_, whole) = decode_payload_chunked(&header, payload, &[]);
    assert_eq!(status, DecodeStatus::Done);
    assert_eq!(chunked.events, whole.events);
}

#[test]
fn pad_length_past_end_of_payload() {
    let header = data_header(9, FrameFlags::PADDED);
    let (status, recorder) = decode_payload_chunked(&header, b"\x09hello\x00\x00\x00", &[]);
    assert_eq!(status, DecodeStatus::Error);
    assert_snapshot!(recorder.render(), @r"
    data_start [length=9, type=0x00, flags=0x08, stream=1]
    pad_length 9
    padding_too_long missing 1
    ");
    assert!(recorder.content().is_empty());
    assert!(!recorder.events.iter().any(|e| matches!(e, Event::Padding(_))));
}

#[test]
fn padded_frame_without_pad_length_byte() {
    let header = data_header(0, FrameFlags::PADDED);
    let (status, recorder) = decode_payload_chunked(&header, &[], &[]);
    assert_eq!(status, DecodeStatus::Error);
    assert_snapshot!(recorder.render(), @r"
    data_start [length=0, type=0x00, flags=0x08, stream=1]
    padding_too_long missing 1
    ");
}

#[test]
fn unpadded_end_stream_frame() {
    let header = data_header(5, FrameFlags::END_STREAM);
    let (status, recorder) = decode_payload_chunked(&header, b"world", &[2]);
    assert_eq!(status, DecodeStatus::Done);
    assert_snapshot!(recorder.render(), @r#"
    data_start [length=5, type=0x00, flags=0x01, stream=1]
    payload "world"
    data_end
    "#);
}

#[test]
fn empty_chunk_to_fresh_payload_decoder_pauses() {
    let header = data_header(3, FrameFlags::NONE);
    let mut decoder = DataPayloadDecoder::new();
    let mut recorder = Recorder::new();
    let mut db = DecodeBuffer::new(&[]);
    let status = decoder.start_decoding_payload(&header, &mut db, &mut recorder);
    assert_eq!(status, DecodeStatus::InProgress);
    assert_eq!(recorder.events, vec![Event::DataStart(header)]);

    let status = decoder.resume_decoding_payload(&mut DecodeBuffer::new(&[]), &mut recorder);
    assert_eq!(status, DecodeStatus::InProgress);
    assert_eq!(recorder.events.len(), 1);
}

#[test]
fn frames_read_back_to_back_from_one_buffer() {
    let mut wire = Vec::new();
    hqd_encoder::DataFrame::new(1, b"ab").write_to(&mut wire).unwrap();
    hqd_encoder::DataFrame::new(3, b"cd")
        .with_padding(2)
        .with_end_stream()
        .write_to(&mut wire)
        .unwrap();

    let mut db = DecodeBuffer::new(&wire);
    let mut decoder = DataPayloadDecoder::new();
    let mut recorder = Recorder::new();
    while !db.is_empty() {
        let header = FrameHeader::read_from(&mut db).unwrap();
        assert_eq!(
            decoder.start_decoding_payload(&header, &mut db, &mut recorder),
            DecodeStatus::Done
        );
    }
    assert_snapshot!(recorder.render(), @r#"
    data_start [length=2, type=0x00, flags=0x00, stream=1]
    payload "ab"
    data_end
    data_start [length=5, type=0x00, flags=0x09, stream=3]
    pad_length 2
    payload "cd"
    padding 2 bytes
    data_end
    "#);
}
