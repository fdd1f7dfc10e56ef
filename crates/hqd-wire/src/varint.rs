use crate::buffer::DecodeBuffer;
use crate::error::WireError;

/// Longest continuation run a `u64` can ever need.
///
/// The prefix contributes at most 8 bits of value, and the remainder is
/// split into 7-bit groups: ceil(64 / 7) = 10 bytes.
pub const MAX_CONTINUATION_BYTES: usize = 10;

/// Encode `value` as an RFC 7541 §5.1 prefix integer.
///
/// The low `prefix_bits` of the first byte carry the value (or all-ones
/// when it does not fit); `high_bits` supplies the opcode pattern in the
/// bits above the prefix. Continuation bytes follow, least-significant
/// 7-bit group first, with the high bit set on every byte but the last.
///
/// # Returns
///
/// The number of bytes appended to `out`.
///
/// # Panics
///
/// Panics if `prefix_bits` is outside `1..=8`.
///
/// # Wire format examples (`prefix_bits = 5`, `high_bits = 0`)
///
/// | Value | Encoded bytes        |
/// |-------|----------------------|
/// | 10    | `[0x0A]`             |
/// | 31    | `[0x1F, 0x00]`       |
/// | 1337  | `[0x1F, 0x9A, 0x0A]` |
pub fn encode_prefix_integer(
    value: u64,
    prefix_bits: u8,
    high_bits: u8,
    out: &mut Vec<u8>,
) -> usize {
    assert!((1..=8).contains(&prefix_bits), "prefix_bits must be 1..=8, got {prefix_bits}");
    let max_prefix = prefix_max(prefix_bits);
    debug_assert_eq!(
        u64::from(high_bits) & max_prefix,
        0,
        "opcode bits overlap the integer prefix"
    );

    let start = out.len();
    if value < max_prefix {
        #[allow(clippy::cast_possible_truncation)]
        out.push(high_bits | value as u8);
        return 1;
    }

    #[allow(clippy::cast_possible_truncation)]
    out.push(high_bits | max_prefix as u8);
    let mut rest = value - max_prefix;
    while rest >= 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        out.push((rest & 0x7F) as u8 | 0x80);
        rest >>= 7;
    }
    #[allow(clippy::cast_possible_truncation)]
    out.push(rest as u8);
    out.len() - start
}

/// Decode a complete prefix integer from the start of `buf`.
///
/// One-shot convenience over [`VarintDecoder`] for callers that already
/// hold the whole encoding.
///
/// # Returns
///
/// `(value, bytes_consumed)` on success.
///
/// # Errors
///
/// - [`WireError::InsufficientData`] if `buf` ends mid-integer.
/// - [`WireError::VarintOverflow`] if the value does not fit in a `u64`.
/// - [`WireError::VarintTooLong`] if the continuation run is too long.
pub fn decode_prefix_integer(buf: &[u8], prefix_bits: u8) -> Result<(u64, usize), WireError> {
    let mut db = DecodeBuffer::new(buf);
    let mut state = VarintDecoder::new();
    let value = db.consume_varint(prefix_bits, &mut state)?;
    Ok((value, db.offset()))
}

fn prefix_max(prefix_bits: u8) -> u64 {
    (1u64 << prefix_bits) - 1
}

/// Resumable prefix-integer decoder.
///
/// Holds everything needed to continue an integer whose encoding was
/// split across input chunks: the value accumulated so far, the bit
/// position of the next 7-bit group, and how many continuation bytes
/// have been seen. The cursor it is fed from lives for one call only, so
/// this state is owned by whoever drives the cursor.
///
/// ```text
///   start(prefix_bits, first_byte) ─┬─ prefix < max ──────────→ Some(value)
///                                   └─ prefix == max ─→ in_progress
///   resume_byte(b) ─┬─ b & 0x80 != 0 → None (keep feeding)
///                   └─ b & 0x80 == 0 → Some(value)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VarintDecoder {
    limit: u64,
    max_continuation_bytes: usize,
    value: u64,
    shift: u32,
    continuation_bytes: usize,
    in_progress: bool,
}

impl Default for VarintDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl VarintDecoder {
    /// Decoder accepting any `u64` with at most
    /// [`MAX_CONTINUATION_BYTES`] continuation bytes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(u64::MAX, MAX_CONTINUATION_BYTES)
    }

    /// Decoder rejecting values above `limit` or encodings with more than
    /// `max_continuation_bytes` continuation bytes.
    #[must_use]
    pub fn with_limits(limit: u64, max_continuation_bytes: usize) -> Self {
        Self {
            limit,
            max_continuation_bytes,
            value: 0,
            shift: 0,
            continuation_bytes: 0,
            in_progress: false,
        }
    }

    /// True between a prefix that was all-ones and the final
    /// continuation byte.
    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Forget any partial value, keeping the limits.
    pub fn reset(&mut self) {
        *self = Self::with_limits(self.limit, self.max_continuation_bytes);
    }

    /// Feed the byte holding the prefix.
    ///
    /// Returns `Ok(Some(value))` when the prefix alone carries the value,
    /// `Ok(None)` when continuation bytes must follow.
    ///
    /// # Errors
    ///
    /// [`WireError::VarintOverflow`] if the prefix value exceeds the limit.
    ///
    /// # Panics
    ///
    /// Panics if `prefix_bits` is outside `1..=8`.
    pub fn start(&mut self, prefix_bits: u8, first: u8) -> Result<Option<u64>, WireError> {
        assert!((1..=8).contains(&prefix_bits), "prefix_bits must be 1..=8, got {prefix_bits}");
        self.reset();

        let max_prefix = prefix_max(prefix_bits);
        let prefix = u64::from(first) & max_prefix;
        if prefix < max_prefix {
            return self.finish(prefix).map(Some);
        }

        self.value = max_prefix;
        self.in_progress = true;
        Ok(None)
    }

    /// Feed one continuation byte.
    ///
    /// # Errors
    ///
    /// - [`WireError::VarintTooLong`] past the continuation byte limit.
    /// - [`WireError::VarintOverflow`] if the value outgrows a `u64` or
    ///   the configured limit.
    pub fn resume_byte(&mut self, byte: u8) -> Result<Option<u64>, WireError> {
        debug_assert!(self.in_progress, "resume_byte called without a pending integer");

        self.continuation_bytes += 1;
        if self.continuation_bytes > self.max_continuation_bytes {
            return Err(WireError::VarintTooLong {
                max_bytes: self.max_continuation_bytes,
            });
        }

        let group = u64::from(byte & 0x7F);
        if group != 0 {
            let overflow = WireError::VarintOverflow { limit: self.limit };
            if self.shift >= u64::BITS {
                return Err(overflow);
            }
            let shifted = group << self.shift;
            if shifted >> self.shift != group {
                return Err(overflow);
            }
            self.value = self.value.checked_add(shifted).ok_or(overflow)?;
        }
        self.shift += 7;

        if byte & 0x80 != 0 {
            return Ok(None);
        }
        self.in_progress = false;
        self.finish(self.value).map(Some)
    }

    fn finish(&self, value: u64) -> Result<u64, WireError> {
        if value > self.limit {
            return Err(WireError::VarintOverflow { limit: self.limit });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64, prefix_bits: u8) -> Vec<u8> {
        let mut out = Vec::new();
        encode_prefix_integer(value, prefix_bits, 0, &mut out);
        out
    }

    // RFC 7541 Appendix C.1 examples.

    #[test]
    fn encode_10_with_5_bit_prefix() {
        assert_eq!(encode(10, 5), vec![0x0A]);
    }

    #[test]
    fn encode_1337_with_5_bit_prefix() {
        assert_eq!(encode(1337, 5), vec![0x1F, 0x9A, 0x0A]);
    }

    #[test]
    fn encode_42_with_8_bit_prefix() {
        assert_eq!(encode(42, 8), vec![0x2A]);
    }

    #[test]
    fn prefix_exactly_full_needs_zero_continuation() {
        // 31 does not fit below the all-ones marker of a 5-bit prefix.
        assert_eq!(encode(31, 5), vec![0x1F, 0x00]);
    }

    #[test]
    fn high_bits_are_preserved() {
        let mut out = Vec::new();
        encode_prefix_integer(5, 6, 0b0100_0000, &mut out);
        assert_eq!(out, vec![0x45]);
    }

    #[test]
    fn decode_1337() {
        assert_eq!(decode_prefix_integer(&[0x1F, 0x9A, 0x0A], 5).unwrap(), (1337, 3));
    }

    #[test]
    fn decode_ignores_opcode_bits() {
        assert_eq!(decode_prefix_integer(&[0b1110_1010], 5).unwrap(), (10, 1));
    }

    #[test]
    fn decode_leaves_trailing_bytes() {
        assert_eq!(decode_prefix_integer(&[0x0A, 0xFF, 0xFF], 5).unwrap(), (10, 1));
    }

    #[test]
    fn roundtrip_boundary_values() {
        for prefix_bits in 1..=8 {
            let max_prefix = (1u64 << prefix_bits) - 1;
            let values = [
                0,
                1,
                max_prefix - 1,
                max_prefix,
                max_prefix + 1,
                127,
                128,
                16_383,
                u64::MAX,
            ];
            for value in values {
                let encoded = encode(value, prefix_bits);
                let (decoded, consumed) = decode_prefix_integer(&encoded, prefix_bits).unwrap();
                assert_eq!(decoded, value, "prefix {prefix_bits}, value {value}");
                assert_eq!(consumed, encoded.len());
            }
        }
    }

    #[test]
    fn u64_max_fits_in_continuation_limit() {
        for prefix_bits in 1..=8 {
            let encoded = encode(u64::MAX, prefix_bits);
            assert!(encoded.len() - 1 <= MAX_CONTINUATION_BYTES);
        }
    }

    #[test]
    fn decode_empty_is_insufficient() {
        let err = decode_prefix_integer(&[], 5).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn decode_truncated_is_insufficient() {
        let err = decode_prefix_integer(&[0x1F, 0x9A], 5).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn decode_overflow_rejected() {
        // u64::MAX with an 8-bit prefix, then bump the last group.
        let mut encoded = encode(u64::MAX, 8);
        let last = encoded.len() - 1;
        encoded[last] += 1;
        let err = decode_prefix_integer(&encoded, 8).unwrap_err();
        assert!(matches!(err, WireError::VarintOverflow { limit: u64::MAX }));
    }

    #[test]
    fn decode_too_long_rejected() {
        // Zero-valued groups never overflow, so only the length cap stops them.
        let mut encoded = vec![0x1F];
        encoded.extend_from_slice(&[0x80; 11]);
        encoded.push(0x00);
        let err = decode_prefix_integer(&encoded, 5).unwrap_err();
        assert!(matches!(err, WireError::VarintTooLong { max_bytes: 10 }));
    }

    #[test]
    fn resumes_byte_by_byte() {
        let mut state = VarintDecoder::new();
        assert_eq!(state.start(5, 0x1F).unwrap(), None);
        assert!(state.in_progress());
        assert_eq!(state.resume_byte(0x9A).unwrap(), None);
        assert_eq!(state.resume_byte(0x0A).unwrap(), Some(1337));
        assert!(!state.in_progress());
    }

    #[test]
    fn limit_applies_to_prefix_and_continuation() {
        let mut state = VarintDecoder::with_limits(20, MAX_CONTINUATION_BYTES);
        assert!(matches!(state.start(5, 21), Err(WireError::VarintOverflow { limit: 20 })));

        let mut state = VarintDecoder::with_limits(40, MAX_CONTINUATION_BYTES);
        assert_eq!(state.start(5, 0x1F).unwrap(), None);
        // 31 + 10 = 41
        assert!(matches!(state.resume_byte(10), Err(WireError::VarintOverflow { limit: 40 })));
    }
}
