use hqd_wire::qpack::DecoderInstruction;
use hqd_wire::varint::encode_prefix_integer;

/// Buffers QPACK decoder-stream instructions for sending.
///
/// Instructions are appended in call order; [`flush`](Self::flush) hands
/// back everything written so far and leaves the sender empty.
///
/// ```rust
/// use hqd_encoder::DecoderStreamSender;
///
/// let mut sender = DecoderStreamSender::new();
/// sender.send_insert_count_increment(37).send_stream_cancellation(5);
/// assert_eq!(sender.flush(), vec![0x25, 0x45]);
/// ```
#[derive(Debug, Default)]
pub struct DecoderStreamSender {
    buf: Vec<u8>,
}

impl DecoderStreamSender {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_insert_count_increment(&mut self, increment: u64) -> &mut Self {
        self.write(DecoderInstruction::InsertCountIncrement, increment)
    }

    pub fn send_header_acknowledgement(&mut self, stream_id: u64) -> &mut Self {
        self.write(DecoderInstruction::HeaderAcknowledgement, stream_id)
    }

    pub fn send_stream_cancellation(&mut self, stream_id: u64) -> &mut Self {
        self.write(DecoderInstruction::StreamCancellation, stream_id)
    }

    /// Bytes waiting to be flushed.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    fn write(&mut self, instruction: DecoderInstruction, value: u64) -> &mut Self {
        let (prefix_bits, opcode) = (instruction.prefix_bits(), instruction.opcode());
        encode_prefix_integer(value, prefix_bits, opcode, &mut self.buf);
        self
    }
}
