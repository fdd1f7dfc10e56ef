//! Prefix integers survive encoding at every prefix width, whole or fed
//! one byte at a time.

use hqd_wire::varint::{MAX_CONTINUATION_BYTES, decode_prefix_integer, encode_prefix_integer};
use hqd_wire::{VarintDecoder, WireError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn roundtrip_every_prefix_width(
        value in any::<u64>(),
        prefix_bits in 1u8..=8,
        high in any::<u8>(),
    ) {
        let high_bits = if prefix_bits == 8 { 0 } else { high & !((1u8 << prefix_bits) - 1) };
        let mut buf = Vec::new();
        let written = encode_prefix_integer(value, prefix_bits, high_bits, &mut buf);
        prop_assert_eq!(written, buf.len());
        prop_assert_eq!(buf[0] & !(0xFFu8 >> (8 - prefix_bits)), high_bits);

        let (decoded, consumed) = decode_prefix_integer(&buf, prefix_bits).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, buf.len());
        prop_assert!(consumed <= 1 + MAX_CONTINUATION_BYTES);
    }

    #[test]
    fn byte_at_a_time_matches_whole(value in any::<u64>(), prefix_bits in 1u8..=8) {
        let mut buf = Vec::new();
        encode_prefix_integer(value, prefix_bits, 0, &mut buf);

        let mut state = VarintDecoder::new();
        let mut result = state.start(prefix_bits, buf[0]).unwrap();
        for &byte in &buf[1..] {
            prop_assert!(result.is_none());
            result = state.resume_byte(byte).unwrap();
        }
        prop_assert_eq!(result, Some(value));
    }

    #[test]
    fn every_prefix_of_an_encoding_is_incomplete(value in 256u64.., prefix_bits in 1u8..=8) {
        let mut buf = Vec::new();
        encode_prefix_integer(value, prefix_bits, 0, &mut buf);
        for end in 0..buf.len() {
            let err = decode_prefix_integer(&buf[..end], prefix_bits).unwrap_err();
            prop_assert!(matches!(err, WireError::InsufficientData { .. }), "{err}");
        }
    }

    #[test]
    fn limit_rejects_larger_values(
        limit in any::<u64>(),
        value in any::<u64>(),
        prefix_bits in 1u8..=8,
    ) {
        let mut buf = Vec::new();
        encode_prefix_integer(value, prefix_bits, 0, &mut buf);

        let mut db = hqd_wire::DecodeBuffer::new(&buf);
        let mut state = VarintDecoder::with_limits(limit, MAX_CONTINUATION_BYTES);
        let result = db.consume_varint(prefix_bits, &mut state);
        if value <= limit {
            prop_assert_eq!(result.unwrap(), value);
        } else {
            prop_assert!(
                matches!(result, Err(WireError::VarintOverflow { limit: l }) if l == limit),
                "{:?}",
                result
            );
        }
    }
}
