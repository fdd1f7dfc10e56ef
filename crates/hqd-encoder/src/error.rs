use hqd_wire::WireError;

/// Errors from building outgoing frames.
///
/// ```text
///   EncodeError
///   ├── PayloadTooLarge   ← content + padding overflows the 24-bit length
///   └── Wire(WireError)   ← header serialization / I/O
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("frame payload of {length} bytes exceeds the 24-bit length field")]
    PayloadTooLarge { length: usize },

    #[error(transparent)]
    Wire(#[from] WireError),
}

impl From<std::io::Error> for EncodeError {
    fn from(e: std::io::Error) -> Self {
        Self::Wire(WireError::Io(e))
    }
}
