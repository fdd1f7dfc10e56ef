use hqd_wire::WireError;

/// Fatal decoding failures.
///
/// Running out of input is not in this list: the engine reports it as
/// [`Progress::Paused`](crate::Progress::Paused) and waits for the next
/// chunk. Everything here ends the logical stream; the decoder that
/// produced it latches and ignores all later input.
///
/// ```text
///   DecodeError
///   ├── UnknownOpcode          ← first byte matches no grammar entry
///   ├── MalformedVarint        ← integer overflow / over-long / over limit
///   ├── PaddingTooLong         ← pad length exceeds the declared payload
///   ├── PayloadTruncated       ← declared payload ends inside a field
///   ├── LengthOverrun          ← byte run longer than the declared payload
///   └── TruncatedInstruction   ← stream closed mid-instruction
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// No grammar entry's opcode pattern matches the first byte.
    #[error("unknown opcode in first byte {byte:#04x}")]
    UnknownOpcode { byte: u8 },

    /// A prefix integer could not be decoded into the target width.
    #[error("malformed varint: {0}")]
    MalformedVarint(#[source] WireError),

    /// The pad-length byte asks for more padding than the payload holds.
    ///
    /// `missing_length` is how many bytes the declared payload would have
    /// needed to grow by for the padding to fit.
    #[error("pad length {pad_length} exceeds payload; missing {missing_length} bytes")]
    PaddingTooLong { pad_length: usize, missing_length: usize },

    /// The declared payload ended before field `field` was complete.
    #[error("payload ended inside field {field}")]
    PayloadTruncated { field: usize },

    /// A byte run would extend past the end of the declared payload.
    #[error("field {field} needs {length} bytes but only {available} remain in payload")]
    LengthOverrun {
        field: usize,
        length: u64,
        available: u64,
    },

    /// The stream ended with an instruction partially decoded.
    #[error("stream ended inside an instruction")]
    TruncatedInstruction,
}

/// HTTP/3 error codes surfaced alongside a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// `QPACK_DECODER_STREAM_ERROR` (RFC 9204 §6).
    QpackDecoderStreamError,
}

impl ErrorCode {
    /// The code as sent on the wire.
    #[must_use]
    pub fn wire_value(self) -> u64 {
        match self {
            Self::QpackDecoderStreamError => 0x202,
        }
    }
}
