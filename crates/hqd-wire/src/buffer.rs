use crate::error::WireError;
use crate::varint::VarintDecoder;

/// Cursor over one chunk of caller-supplied input.
///
/// `DecodeBuffer` borrows the bytes handed to a single decode call and
/// tracks how far the decoders have read. It never outlives that call;
/// anything that must survive to the next chunk (a half-read integer, a
/// byte count still owed to a run) is stored by the decoder that drives
/// the cursor.
///
/// Every read either succeeds or fails with
/// [`WireError::InsufficientData`], which is a request for more input,
/// not a parse failure.
///
/// ```text
///   buf:  [ consumed ........ | remaining ............ ]
///                             ^ offset()
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DecodeBuffer<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DecodeBuffer<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unconsumed tail, without consuming it.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Look at the next byte without consuming it.
    ///
    /// # Errors
    ///
    /// [`WireError::InsufficientData`] if nothing remains.
    pub fn peek_byte(&self) -> Result<u8, WireError> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(WireError::InsufficientData {
                needed: 1,
                available: 0,
            })
    }

    /// Consume exactly `n` bytes.
    ///
    /// Nothing is consumed when fewer than `n` bytes remain.
    ///
    /// # Errors
    ///
    /// [`WireError::InsufficientData`] if fewer than `n` bytes remain.
    pub fn consume_fixed(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let available = self.remaining();
        if available < n {
            return Err(WireError::InsufficientData { needed: n, available });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Consume one byte.
    ///
    /// # Errors
    ///
    /// [`WireError::InsufficientData`] if nothing remains.
    pub fn consume_byte(&mut self) -> Result<u8, WireError> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Consume up to `n` bytes, as many as are available.
    ///
    /// Used for byte runs, which are delivered in whatever fragments the
    /// input happens to be split into.
    pub fn consume_up_to(&mut self, n: usize) -> &'a [u8] {
        let take = n.min(self.remaining());
        let bytes = &self.buf[self.pos..self.pos + take];
        self.pos += take;
        bytes
    }

    /// Consume a prefix integer, resuming from `state`.
    ///
    /// When `state` is idle the next byte is taken as the prefix byte and
    /// its low `prefix_bits` bits start the value; otherwise decoding
    /// continues with continuation bytes. On
    /// [`WireError::InsufficientData`] every byte read so far has been
    /// folded into `state`, so the next call picks up exactly where this
    /// one stopped.
    ///
    /// # Errors
    ///
    /// - [`WireError::InsufficientData`] if the input ends mid-integer.
    /// - [`WireError::VarintOverflow`] / [`WireError::VarintTooLong`] from
    ///   the integer itself.
    pub fn consume_varint(
        &mut self,
        prefix_bits: u8,
        state: &mut VarintDecoder,
    ) -> Result<u64, WireError> {
        if !state.in_progress() {
            let first = self.consume_byte()?;
            if let Some(value) = state.start(prefix_bits, first)? {
                return Ok(value);
            }
        }

        while let Some(&byte) = self.buf.get(self.pos) {
            self.pos += 1;
            if let Some(value) = state.resume_byte(byte)? {
                return Ok(value);
            }
        }

        Err(WireError::InsufficientData {
            needed: 1,
            available: 0,
        })
    }

    /// A cursor over at most `max_len` of the remaining bytes.
    ///
    /// The subset starts at offset zero; after reading from it, call
    /// [`advance`](Self::advance) with its offset to move this cursor past
    /// the same bytes.
    #[must_use]
    pub fn subset(&self, max_len: usize) -> DecodeBuffer<'a> {
        let end = self.pos + max_len.min(self.remaining());
        DecodeBuffer::new(&self.buf[self.pos..end])
    }

    /// Skip `n` bytes already handled through a [`subset`](Self::subset).
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the remaining bytes.
    pub fn advance(&mut self, n: usize) {
        assert!(n <= self.remaining(), "advance past end of buffer");
        self.pos += n;
    }
}
