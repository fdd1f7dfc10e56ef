#![no_main]

use hqd_wire::{DecodeBuffer, FrameHeader};
use libfuzzer_sys::fuzz_target;

// Fuzz target: frame header read->write roundtrip.
//
// Any 9 bytes parse; writing the result back reproduces them apart from
// the reserved stream-identifier bit.
fuzz_target!(|data: &[u8]| {
    let mut db = DecodeBuffer::new(data);
    let Ok(header) = FrameHeader::read_from(&mut db) else {
        assert!(data.len() < 9);
        return;
    };
    assert_eq!(db.offset(), 9);

    let mut out = Vec::new();
    header.write_to(&mut out).unwrap();
    assert_eq!(out[..5], data[..5]);
    assert_eq!(out[5], data[5] & 0x7F);
    assert_eq!(out[6..9], data[6..9]);
});
