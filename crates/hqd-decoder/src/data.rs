use hqd_wire::{DecodeBuffer, FrameFlags, FrameHeader, FrameType};

use crate::config::DecoderConfig;
use crate::engine::{FieldDecoder, FieldSink, FieldValues, Progress};
use crate::error::DecodeError;
use crate::grammar::{Field, Instruction, Language, Opcode, Presence, RunClass, RunLength};

/// Message kinds of the frame-payload grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    Data,
}

const PAD_LENGTH: usize = 0;

/// Padded payload layout:
///
/// ```text
///   [pad_length: u8, only if PADDED] [content] [padding: pad_length bytes]
/// ```
///
/// Content is whatever the declared length leaves once the pad-length
/// byte and the padding are accounted for.
const DATA_FIELDS: &[Field] = &[
    Field::Uint {
        width: 1,
        presence: Presence::IfFlag(FrameFlags::PADDED.raw()),
    },
    Field::Run {
        len: RunLength::Remainder {
            reserve: Some(PAD_LENGTH),
        },
        class: RunClass::Content,
    },
    Field::Run {
        len: RunLength::Field(PAD_LENGTH),
        class: RunClass::Padding,
    },
];

pub static DATA_PAYLOAD_LANGUAGE: Language<PayloadKind> = Language {
    name: "DATA payload",
    instructions: &[Instruction {
        kind: PayloadKind::Data,
        opcode: Opcode::ANY,
        fields: DATA_FIELDS,
    }],
};

/// Result of feeding payload bytes to a [`DataPayloadDecoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The whole payload has been decoded and `on_data_end` has fired.
    Done,
    /// More payload bytes are needed.
    InProgress,
    /// The payload was invalid, or an earlier one was.
    Error,
}

/// Callbacks for a DATA frame payload, in the order they fire:
///
/// ```text
///   on_data_start
///   on_pad_length          (PADDED only)
///   on_data_payload *      (zero or more fragments)
///   on_padding *           (zero or more fragments)
///   on_data_end
/// ```
///
/// When the pad length does not fit, `on_padding_too_long` replaces
/// everything after `on_pad_length` (or after `on_data_start` when the
/// payload is too short to hold the pad-length byte at all).
pub trait DataPayloadListener {
    fn on_data_start(&mut self, header: &FrameHeader);
    fn on_pad_length(&mut self, pad_length: usize);
    fn on_data_payload(&mut self, data: &[u8]);
    fn on_padding(&mut self, padding: &[u8]);
    fn on_data_end(&mut self);
    fn on_padding_too_long(&mut self, header: &FrameHeader, missing_length: usize);
}

/// Incremental decoder for DATA frame payloads.
///
/// One instance serves a connection: call
/// [`start_decoding_payload`](Self::start_decoding_payload) with each
/// frame's header and whatever payload bytes are at hand, then
/// [`resume_decoding_payload`](Self::resume_decoding_payload) with later
/// bytes until it returns [`DecodeStatus::Done`]. The decoder reads
/// exactly `payload_length` bytes from the buffers it is given and leaves
/// anything after them for the caller.
///
/// Content and padding are delivered as they arrive, so a payload split
/// over several buffers produces several `on_data_payload` calls. The
/// listener should concatenate them.
///
/// A pad length larger than the payload is fatal: the listener gets
/// `on_padding_too_long` and the decoder refuses all further input.
#[derive(Debug)]
pub struct DataPayloadDecoder {
    decoder: FieldDecoder<PayloadKind>,
    header: Option<FrameHeader>,
    error: Option<DecodeError>,
}

impl Default for DataPayloadDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPayloadDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            decoder: FieldDecoder::new(&DATA_PAYLOAD_LANGUAGE, config),
            header: None,
            error: None,
        }
    }

    #[must_use]
    pub fn error_detected(&self) -> bool {
        self.error.is_some()
    }

    /// The error that latched the decoder, if any.
    #[must_use]
    pub fn error(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }

    /// Begin a new payload.
    ///
    /// # Panics
    ///
    /// Panics if the previous payload has not finished.
    pub fn start_decoding_payload<L: DataPayloadListener>(
        &mut self,
        header: &FrameHeader,
        db: &mut DecodeBuffer<'_>,
        listener: &mut L,
    ) -> DecodeStatus {
        if self.error.is_some() {
            return DecodeStatus::Error;
        }
        assert!(self.header.is_none(), "start_decoding_payload while a payload is in progress");
        debug_assert_eq!(header.frame_type, FrameType::DATA);

        listener.on_data_start(header);

        // No room for the pad-length byte itself.
        if header.is_padded() && header.payload_length == 0 {
            listener.on_padding_too_long(header, 1);
            self.error = Some(DecodeError::PaddingTooLong {
                pad_length: 0,
                missing_length: 1,
            });
            return DecodeStatus::Error;
        }

        let flags = header.flags.intersect(FrameFlags::PADDED);
        self.decoder.begin_bounded(
            &DATA_PAYLOAD_LANGUAGE.instructions[0],
            u64::from(header.payload_length),
            flags.raw(),
        );
        self.header = Some(*header);
        self.resume_decoding_payload(db, listener)
    }

    /// Continue the payload begun by the last
    /// [`start_decoding_payload`](Self::start_decoding_payload).
    ///
    /// # Panics
    ///
    /// Panics if no payload is in progress.
    pub fn resume_decoding_payload<L: DataPayloadListener>(
        &mut self,
        db: &mut DecodeBuffer<'_>,
        listener: &mut L,
    ) -> DecodeStatus {
        if self.error.is_some() {
            return DecodeStatus::Error;
        }
        let Some(header) = self.header else {
            panic!("resume_decoding_payload without a payload in progress");
        };

        let mut dispatch = Dispatch { listener, header };
        match self.decoder.decode(db, &mut dispatch) {
            Ok(Progress::Complete) => {
                self.header = None;
                DecodeStatus::Done
            }
            Ok(Progress::Paused) => DecodeStatus::InProgress,
            Err(error) => {
                self.header = None;
                self.error = Some(error);
                DecodeStatus::Error
            }
        }
    }
}

/// Routes engine events to the listener and checks the pad length.
struct Dispatch<'a, L> {
    listener: &'a mut L,
    header: FrameHeader,
}

impl<L: DataPayloadListener> FieldSink<PayloadKind> for Dispatch<'_, L> {
    fn on_integer(
        &mut self,
        _kind: PayloadKind,
        field: usize,
        value: u64,
    ) -> Result<(), DecodeError> {
        debug_assert_eq!(field, PAD_LENGTH);
        let pad_length = usize::try_from(value).unwrap_or(usize::MAX);
        self.listener.on_pad_length(pad_length);

        // The pad-length byte is already spent; padding must fit in the rest.
        let available = self.header.payload_length as usize - 1;
        if pad_length > available {
            let missing_length = pad_length - available;
            self.listener.on_padding_too_long(&self.header, missing_length);
            return Err(DecodeError::PaddingTooLong {
                pad_length,
                missing_length,
            });
        }
        Ok(())
    }

    fn on_bytes(&mut self, _kind: PayloadKind, _field: usize, class: RunClass, bytes: &[u8]) {
        match class {
            RunClass::Content => self.listener.on_data_payload(bytes),
            RunClass::Padding => self.listener.on_padding(bytes),
        }
    }

    fn on_message(&mut self, _kind: PayloadKind, _values: &FieldValues) {
        self.listener.on_data_end();
    }
}
