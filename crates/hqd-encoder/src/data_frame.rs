use std::io::Write;

use hqd_wire::frame_header::{FRAME_HEADER_SIZE, MAX_PAYLOAD_LENGTH};
use hqd_wire::{FrameFlags, FrameHeader, FrameType};

use crate::error::EncodeError;

/// An outgoing DATA frame.
///
/// With `pad_length` set the frame carries the PADDED flag and its
/// payload is laid out as:
///
/// ```text
/// ┌──────────────┬──────────────────┬──────────────────────────┐
/// │ pad_length   │ content          │ padding (zero bytes)     │
/// │ [1 byte]     │ [content.len()]  │ [pad_length bytes]       │
/// └──────────────┴──────────────────┴──────────────────────────┘
/// ```
///
/// `Some(0)` is legal and differs from `None`: it still costs the
/// pad-length byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFrame<'a> {
    pub stream_id: u32,
    pub content: &'a [u8],
    pub pad_length: Option<u8>,
    pub end_stream: bool,
}

impl<'a> DataFrame<'a> {
    #[must_use]
    pub fn new(stream_id: u32, content: &'a [u8]) -> Self {
        Self {
            stream_id,
            content,
            pad_length: None,
            end_stream: false,
        }
    }

    #[must_use]
    pub fn with_padding(mut self, pad_length: u8) -> Self {
        self.pad_length = Some(pad_length);
        self
    }

    #[must_use]
    pub fn with_end_stream(mut self) -> Self {
        self.end_stream = true;
        self
    }

    /// Length of the payload, excluding the frame header.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.content.len() + self.pad_length.map_or(0, |p| 1 + usize::from(p))
    }

    /// The header this frame will be written with.
    ///
    /// # Errors
    ///
    /// [`EncodeError::PayloadTooLarge`] if the payload does not fit the
    /// 24-bit length field.
    pub fn header(&self) -> Result<FrameHeader, EncodeError> {
        let length = self.payload_len();
        let payload_length = u32::try_from(length)
            .ok()
            .filter(|&l| l <= MAX_PAYLOAD_LENGTH)
            .ok_or(EncodeError::PayloadTooLarge { length })?;

        let mut flags = FrameFlags::NONE;
        if self.pad_length.is_some() {
            flags = flags | FrameFlags::PADDED;
        }
        if self.end_stream {
            flags = flags | FrameFlags::END_STREAM;
        }
        Ok(FrameHeader::new(payload_length, FrameType::DATA, flags, self.stream_id))
    }

    /// Write header and payload, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::PayloadTooLarge`] before anything is written.
    /// - [`EncodeError::Wire`] if the writer fails.
    pub fn write_to(&self, w: &mut impl Write) -> Result<usize, EncodeError> {
        let header = self.header()?;
        header.write_to(w)?;
        if let Some(pad_length) = self.pad_length {
            w.write_all(&[pad_length])?;
        }
        w.write_all(self.content)?;
        if let Some(pad_length) = self.pad_length {
            w.write_all(&vec![0; usize::from(pad_length)])?;
        }
        Ok(FRAME_HEADER_SIZE + self.payload_len())
    }
}
