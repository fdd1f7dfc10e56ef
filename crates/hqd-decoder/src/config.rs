use hqd_wire::varint::{MAX_CONTINUATION_BYTES, VarintDecoder};

/// Largest integer RFC 9204 requires a QPACK implementation to accept.
pub const QPACK_MAX_INTEGER: u64 = (1 << 62) - 1;

/// Limits applied while decoding.
///
/// ```text
/// ┌────────────────────────┬───────────────┬──────────────────────────────┐
/// │ Field                  │ Default       │ Purpose                      │
/// ├────────────────────────┼───────────────┼──────────────────────────────┤
/// │ max_integer            │ u64::MAX      │ Largest prefix-integer value │
/// │ max_continuation_bytes │ 10            │ Longest continuation run     │
/// └────────────────────────┴───────────────┴──────────────────────────────┘
/// ```
///
/// Values above `max_integer` are reported as
/// [`DecodeError::MalformedVarint`](crate::DecodeError::MalformedVarint),
/// the same as a value that overflows a `u64`. Peers speaking RFC 9204 can
/// be held to [`QPACK_MAX_INTEGER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    pub max_integer: u64,
    pub max_continuation_bytes: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_integer: u64::MAX,
            max_continuation_bytes: MAX_CONTINUATION_BYTES,
        }
    }
}

impl DecoderConfig {
    /// A fresh integer decoder carrying these limits.
    #[must_use]
    pub fn varint_decoder(&self) -> VarintDecoder {
        VarintDecoder::with_limits(self.max_integer, self.max_continuation_bytes)
    }
}
