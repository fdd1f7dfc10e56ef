#![no_main]

use hqd_wire::varint::decode_prefix_integer;
use hqd_wire::{DecodeBuffer, VarintDecoder};
use libfuzzer_sys::fuzz_target;

// Fuzz target: prefix-integer decoding of arbitrary bytes.
//
// Input format:
//   byte 0: prefix width (mod 8, plus 1)
//   bytes 1..: encoding
//
// The one-shot decoder and a byte-at-a-time resumable decoder must agree.
fuzz_target!(|data: &[u8]| {
    let Some((&width, bytes)) = data.split_first() else {
        return;
    };
    let prefix_bits = width % 8 + 1;
    let whole = decode_prefix_integer(bytes, prefix_bits);

    let mut state = VarintDecoder::new();
    let mut piecewise = None;
    for end in 0..bytes.len() {
        let mut db = DecodeBuffer::new(&bytes[end..=end]);
        match db.consume_varint(prefix_bits, &mut state) {
            Ok(value) => {
                piecewise = Some(Ok((value, end + 1)));
                break;
            }
            Err(e) if e.is_insufficient_data() => {}
            Err(e) => {
                piecewise = Some(Err(e));
                break;
            }
        }
    }

    match (whole, piecewise) {
        (Ok(a), Some(Ok(b))) => assert_eq!(a, b),
        (Err(a), None) => assert!(a.is_insufficient_data()),
        (Err(a), Some(Err(b))) => assert_eq!(a.to_string(), b.to_string()),
        (a, b) => panic!("one-shot {a:?} vs piecewise {b:?}"),
    }
});
