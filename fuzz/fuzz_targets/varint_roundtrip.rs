#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: prefix-integer encode->decode roundtrip.
//
// Input format:
//   byte 0: prefix width (mod 8, plus 1) and opcode bits above it
//   bytes 1..9: value (little-endian u64)
fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }
    let prefix_bits = data[0] % 8 + 1;
    let high_bits = if prefix_bits == 8 { 0 } else { data[0] & (0xFF << prefix_bits) };
    let value = u64::from_le_bytes(data[1..9].try_into().unwrap());

    let mut buf = Vec::new();
    let written = hqd_wire::varint::encode_prefix_integer(value, prefix_bits, high_bits, &mut buf);
    assert_eq!(written, buf.len());

    let (decoded, consumed) = hqd_wire::varint::decode_prefix_integer(&buf, prefix_bits).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(consumed, written);
});
