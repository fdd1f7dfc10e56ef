use hqd_wire::DecodeBuffer;
use hqd_wire::qpack::DecoderInstruction;

use crate::config::DecoderConfig;
use crate::engine::{FieldDecoder, FieldSink, FieldValues};
use crate::error::{DecodeError, ErrorCode};
use crate::grammar::{Field, Instruction, Language, Opcode};

const fn instruction(
    kind: DecoderInstruction,
    fields: &'static [Field],
) -> Instruction<DecoderInstruction> {
    Instruction {
        kind,
        opcode: Opcode::new(kind.opcode(), kind.opcode_mask()),
        fields,
    }
}

const INSERT_COUNT_INCREMENT_FIELDS: &[Field] = &[Field::Varint {
    prefix_bits: DecoderInstruction::InsertCountIncrement.prefix_bits(),
}];

const HEADER_ACKNOWLEDGEMENT_FIELDS: &[Field] = &[Field::Varint {
    prefix_bits: DecoderInstruction::HeaderAcknowledgement.prefix_bits(),
}];

const STREAM_CANCELLATION_FIELDS: &[Field] = &[Field::Varint {
    prefix_bits: DecoderInstruction::StreamCancellation.prefix_bits(),
}];

/// Grammar of the QPACK decoder stream: three instructions, each a single
/// prefix integer sharing its first byte with the opcode.
pub static DECODER_STREAM_LANGUAGE: Language<DecoderInstruction> = Language {
    name: "qpack decoder stream",
    instructions: &[
        instruction(DecoderInstruction::InsertCountIncrement, INSERT_COUNT_INCREMENT_FIELDS),
        instruction(DecoderInstruction::HeaderAcknowledgement, HEADER_ACKNOWLEDGEMENT_FIELDS),
        instruction(DecoderInstruction::StreamCancellation, STREAM_CANCELLATION_FIELDS),
    ],
};

/// Callbacks for decoded decoder-stream instructions.
///
/// `on_error_detected` fires at most once per receiver. The stream is
/// unusable afterwards and the owner should close the connection with
/// `code`.
pub trait QpackDecoderStreamDelegate {
    fn on_insert_count_increment(&mut self, increment: u64);
    fn on_header_acknowledgement(&mut self, stream_id: u64);
    fn on_stream_cancellation(&mut self, stream_id: u64);
    fn on_error_detected(&mut self, code: ErrorCode, error: &DecodeError);
}

/// Incremental parser for the QPACK decoder stream.
///
/// Feed it whatever the transport delivers, in any split. Each complete
/// instruction is reported to the delegate as soon as its last byte
/// arrives; a partially received instruction is held until the rest
/// comes in.
///
/// The first malformed instruction is reported through
/// [`QpackDecoderStreamDelegate::on_error_detected`] and latches the
/// receiver: every later [`decode`](Self::decode) is ignored.
///
/// # Example
///
/// ```rust
/// use hqd_decoder::{DecodeError, ErrorCode, QpackDecoderStreamDelegate, QpackDecoderStreamReceiver};
///
/// #[derive(Default)]
/// struct Cancelled(Vec<u64>);
///
/// impl QpackDecoderStreamDelegate for Cancelled {
///     fn on_insert_count_increment(&mut self, _: u64) {}
///     fn on_header_acknowledgement(&mut self, _: u64) {}
///     fn on_stream_cancellation(&mut self, stream_id: u64) {
///         self.0.push(stream_id);
///     }
///     fn on_error_detected(&mut self, _: ErrorCode, _: &DecodeError) {}
/// }
///
/// let mut receiver = QpackDecoderStreamReceiver::new();
/// let mut delegate = Cancelled::default();
/// receiver.decode(&[0x45], &mut delegate);
/// assert_eq!(delegate.0, vec![5]);
/// ```
#[derive(Debug)]
pub struct QpackDecoderStreamReceiver {
    decoder: FieldDecoder<DecoderInstruction>,
    error_detected: bool,
}

impl Default for QpackDecoderStreamReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl QpackDecoderStreamReceiver {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            decoder: FieldDecoder::new(&DECODER_STREAM_LANGUAGE, config),
            error_detected: false,
        }
    }

    /// Whether an error has been reported; if so, input is ignored.
    #[must_use]
    pub fn error_detected(&self) -> bool {
        self.error_detected
    }

    /// Decode the next chunk of the stream.
    ///
    /// Empty input and input arriving after an error are no-ops.
    pub fn decode<D: QpackDecoderStreamDelegate>(&mut self, data: &[u8], delegate: &mut D) {
        if data.is_empty() || self.error_detected {
            return;
        }

        let mut db = DecodeBuffer::new(data);
        let mut dispatch = Dispatch { delegate: &mut *delegate };
        if let Err(error) = self.decoder.decode(&mut db, &mut dispatch) {
            self.report(error, delegate);
        }
    }

    /// The peer closed the stream.
    ///
    /// An instruction still waiting for bytes can never complete, so it
    /// is reported as [`DecodeError::TruncatedInstruction`].
    pub fn end_of_stream<D: QpackDecoderStreamDelegate>(&mut self, delegate: &mut D) {
        if self.error_detected || !self.decoder.in_message() {
            return;
        }
        self.report(DecodeError::TruncatedInstruction, delegate);
    }

    fn report<D: QpackDecoderStreamDelegate>(&mut self, error: DecodeError, delegate: &mut D) {
        debug_assert!(!self.error_detected);
        self.error_detected = true;
        delegate.on_error_detected(ErrorCode::QpackDecoderStreamError, &error);
    }
}

/// Routes completed instructions to the delegate.
struct Dispatch<'a, D> {
    delegate: &'a mut D,
}

impl<D: QpackDecoderStreamDelegate> FieldSink<DecoderInstruction> for Dispatch<'_, D> {
    fn on_message(&mut self, kind: DecoderInstruction, values: &FieldValues) {
        let value = values.get(0).unwrap_or_default();
        match kind {
            DecoderInstruction::InsertCountIncrement => {
                self.delegate.on_insert_count_increment(value);
            }
            DecoderInstruction::HeaderAcknowledgement => {
                self.delegate.on_header_acknowledgement(value);
            }
            DecoderInstruction::StreamCancellation => self.delegate.on_stream_cancellation(value),
        }
    }
}
