use std::fmt;

use crate::buffer::DecodeBuffer;
use crate::error::WireError;

/// Size of the fixed frame header in bytes.
pub const FRAME_HEADER_SIZE: usize = 9;

/// Largest payload length the 24-bit length field can carry.
pub const MAX_PAYLOAD_LENGTH: u32 = (1 << 24) - 1;

/// Frame type byte.
///
/// Only the payload-level decoders for DATA live in this workspace; the
/// other constants exist so headers of any type can be parsed and
/// printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameType(u8);

impl FrameType {
    pub const DATA: Self = Self(0x00);
    pub const HEADERS: Self = Self(0x01);
    pub const PRIORITY: Self = Self(0x02);
    pub const RST_STREAM: Self = Self(0x03);
    pub const SETTINGS: Self = Self(0x04);
    pub const PUSH_PROMISE: Self = Self(0x05);
    pub const PING: Self = Self(0x06);
    pub const GOAWAY: Self = Self(0x07);
    pub const WINDOW_UPDATE: Self = Self(0x08);
    pub const CONTINUATION: Self = Self(0x09);

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Frame flags bitfield.
///
/// Bit meaning depends on the frame type; for DATA:
///   bit 0 = END_STREAM
///   bit 3 = PADDED (payload starts with a pad-length byte)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrameFlags(u8);

impl FrameFlags {
    pub const NONE: Self = Self(0);
    pub const END_STREAM: Self = Self(0b0000_0001);
    pub const PADDED: Self = Self(0b0000_1000);

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn is_end_stream(self) -> bool {
        self.0 & Self::END_STREAM.0 != 0
    }

    pub fn is_padded(self) -> bool {
        self.0 & Self::PADDED.0 != 0
    }

    /// Keep only the bits present in `mask`.
    #[must_use]
    pub fn intersect(self, mask: Self) -> Self {
        Self(self.0 & mask.0)
    }
}

impl std::ops::BitOr for FrameFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The fixed header preceding every frame payload.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────┐
/// │ Offset │ Size    │ Description                      │
/// ├────────┼─────────┼──────────────────────────────────┤
/// │ 0x00   │ 3 bytes │ Payload length (big-endian)      │
/// │ 0x03   │ 1 byte  │ Type                             │
/// │ 0x04   │ 1 byte  │ Flags                            │
/// │ 0x05   │ 4 bytes │ R bit + 31-bit stream identifier │
/// └────────┴─────────┴──────────────────────────────────┘
/// ```
///
/// The payload decoders never parse this themselves; they are handed
/// the header by whatever reads frames off the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHeader {
    pub payload_length: u32,
    pub frame_type: FrameType,
    pub flags: FrameFlags,
    pub stream_id: u32,
}

impl FrameHeader {
    #[must_use]
    pub fn new(
        payload_length: u32,
        frame_type: FrameType,
        flags: FrameFlags,
        stream_id: u32,
    ) -> Self {
        Self {
            payload_length,
            frame_type,
            flags,
            stream_id,
        }
    }

    pub fn is_padded(&self) -> bool {
        self.flags.is_padded()
    }

    /// Read a header from the front of `db`.
    ///
    /// The reserved bit of the stream identifier is dropped.
    ///
    /// # Errors
    ///
    /// [`WireError::InsufficientData`] if fewer than
    /// [`FRAME_HEADER_SIZE`] bytes remain; nothing is consumed then.
    pub fn read_from(db: &mut DecodeBuffer<'_>) -> Result<Self, WireError> {
        let bytes = db.consume_fixed(FRAME_HEADER_SIZE)?;
        let payload_length = u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]);
        let stream_id = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) & 0x7FFF_FFFF;
        Ok(Self {
            payload_length,
            frame_type: FrameType::from_raw(bytes[3]),
            flags: FrameFlags::from_raw(bytes[4]),
            stream_id,
        })
    }

    /// Write the 9-byte header.
    ///
    /// # Errors
    ///
    /// - [`WireError::FrameTooLarge`] if `payload_length` does not fit in
    ///   24 bits.
    /// - [`WireError::Io`] from the writer.
    pub fn write_to(&self, w: &mut impl std::io::Write) -> Result<usize, WireError> {
        if self.payload_length > MAX_PAYLOAD_LENGTH {
            return Err(WireError::FrameTooLarge {
                length: self.payload_length as usize,
            });
        }
        let len = self.payload_length.to_be_bytes();
        let sid = (self.stream_id & 0x7FFF_FFFF).to_be_bytes();
        w.write_all(&[
            len[1],
            len[2],
            len[3],
            self.frame_type.raw(),
            self.flags.raw(),
            sid[0],
            sid[1],
            sid[2],
            sid[3],
        ])?;
        Ok(FRAME_HEADER_SIZE)
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "length={}, type={:#04x}, flags={:#04x}, stream={}",
            self.payload_length,
            self.frame_type.raw(),
            self.flags.raw(),
            self.stream_id
        )
    }
}
