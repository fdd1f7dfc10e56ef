/// Errors produced at the byte level: cursor reads, prefix integers and
/// frame headers.
///
/// `InsufficientData` is the only recoverable variant. It means "call
/// again with more bytes"; the decoders above treat it as a suspension
/// point rather than a failure.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The cursor ran dry before the requested bytes were available.
    #[error("insufficient data: needed {needed} bytes, {available} available")]
    InsufficientData { needed: usize, available: usize },

    /// A prefix integer decoded to a value above the accepted maximum.
    #[error("varint exceeds maximum value {limit}")]
    VarintOverflow { limit: u64 },

    /// A prefix integer carried more continuation bytes than allowed.
    #[error("varint too long: more than {max_bytes} continuation bytes")]
    VarintTooLong { max_bytes: usize },

    /// A frame payload length does not fit in the 24-bit length field.
    #[error("frame payload of {length} bytes exceeds the 24-bit length field")]
    FrameTooLarge { length: usize },

    /// I/O error during write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// Whether this is the suspension signal rather than a real failure.
    #[must_use]
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
