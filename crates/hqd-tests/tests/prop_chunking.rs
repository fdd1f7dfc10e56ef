//! Splitting the input differently must never change what the delegate
//! sees.

use hqd_decoder::DecodeStatus;
use hqd_encoder::{DataFrame, DecoderStreamSender};
use hqd_tests::{Event, decode_payload_chunked, decode_stream_chunked};
use hqd_wire::DecodeBuffer;
use hqd_wire::FrameHeader;
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
enum Instruction {
    InsertCountIncrement(u64),
    HeaderAcknowledgement(u64),
    StreamCancellation(u64),
}

fn value() -> impl Strategy<Value = u64> {
    prop_oneof![0u64..64, 0u64..300, any::<u64>(), Just(u64::MAX)]
}

fn instruction() -> impl Strategy<Value = Instruction> {
    prop_oneof![
        value().prop_map(Instruction::InsertCountIncrement),
        value().prop_map(Instruction::HeaderAcknowledgement),
        value().prop_map(Instruction::StreamCancellation),
    ]
}

fn encode(instructions: &[Instruction]) -> Vec<u8> {
    let mut sender = DecoderStreamSender::new();
    for instruction in instructions {
        match *instruction {
            Instruction::InsertCountIncrement(n) => sender.send_insert_count_increment(n),
            Instruction::HeaderAcknowledgement(id) => sender.send_header_acknowledgement(id),
            Instruction::StreamCancellation(id) => sender.send_stream_cancellation(id),
        };
    }
    sender.flush()
}

fn expected(instructions: &[Instruction]) -> Vec<Event> {
    instructions
        .iter()
        .map(|i| match *i {
            Instruction::InsertCountIncrement(n) => Event::InsertCountIncrement(n),
            Instruction::HeaderAcknowledgement(id) => Event::HeaderAcknowledgement(id),
            Instruction::StreamCancellation(id) => Event::StreamCancellation(id),
        })
        .collect()
}

proptest! {
    #[test]
    fn decoder_stream_split_anywhere(
        instructions in prop::collection::vec(instruction(), 0..16),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let input = encode(&instructions);
        let cuts: Vec<usize> = cuts.iter().map(|c| c.index(input.len() + 1)).collect();
        let recorder = decode_stream_chunked(&input, &cuts);
        prop_assert_eq!(recorder.events, expected(&instructions));
    }

    #[test]
    fn arbitrary_stream_bytes_chunk_invariant(
        input in prop::collection::vec(any::<u8>(), 0..64),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let cuts: Vec<usize> = cuts.iter().map(|c| c.index(input.len() + 1)).collect();
        let whole = decode_stream_chunked(&input, &[]);
        let chunked = decode_stream_chunked(&input, &cuts);
        prop_assert_eq!(&chunked.events, &whole.events);
        prop_assert!(whole.error_count() <= 1);
    }

    #[test]
    fn data_payload_split_anywhere(
        content in prop::collection::vec(any::<u8>(), 0..512),
        pad_length in prop::option::of(any::<u8>()),
        end_stream in any::<bool>(),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let mut frame = DataFrame::new(1, &content);
        frame.pad_length = pad_length;
        frame.end_stream = end_stream;
        let mut wire = Vec::new();
        frame.write_to(&mut wire).unwrap();

        let mut db = DecodeBuffer::new(&wire);
        let header = FrameHeader::read_from(&mut db).unwrap();
        let payload = db.rest();
        let cuts: Vec<usize> = cuts.iter().map(|c| c.index(payload.len() + 1)).collect();

        let (status, recorder) = decode_payload_chunked(&header, payload, &cuts);
        prop_assert_eq!(status, DecodeStatus::Done);
        prop_assert_eq!(recorder.content(), content);
        let (_, whole) = decode_payload_chunked(&header, payload, &[]);
        prop_assert_eq!(recorder.events, whole.events);
    }
}
