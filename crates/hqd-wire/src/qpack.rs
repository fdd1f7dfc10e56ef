//! QPACK decoder-stream instruction opcodes (RFC 9204 §4.4).
//!
//! ```text
//!   Section Acknowledgement   1 | stream id (7+)
//!   Stream Cancellation       0 1 | stream id (6+)
//!   Insert Count Increment    0 0 | increment (6+)
//! ```
//!
//! Every byte value starts exactly one of the three instructions.

/// The three decoder-stream instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecoderInstruction {
    InsertCountIncrement,
    HeaderAcknowledgement,
    StreamCancellation,
}

impl DecoderInstruction {
    pub const ALL: [Self; 3] = [
        Self::InsertCountIncrement,
        Self::HeaderAcknowledgement,
        Self::StreamCancellation,
    ];

    /// Opcode bits, already shifted into place.
    pub const fn opcode(self) -> u8 {
        match self {
            Self::InsertCountIncrement => 0b0000_0000,
            Self::HeaderAcknowledgement => 0b1000_0000,
            Self::StreamCancellation => 0b0100_0000,
        }
    }

    /// Mask selecting the opcode bits of the first byte.
    pub const fn opcode_mask(self) -> u8 {
        match self {
            Self::HeaderAcknowledgement => 0b1000_0000,
            Self::InsertCountIncrement | Self::StreamCancellation => 0b1100_0000,
        }
    }

    /// Width of the integer prefix following the opcode.
    pub const fn prefix_bits(self) -> u8 {
        match self {
            Self::HeaderAcknowledgement => 7,
            Self::InsertCountIncrement | Self::StreamCancellation => 6,
        }
    }
}
