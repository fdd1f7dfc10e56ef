use hqd_wire::{DecodeBuffer, VarintDecoder, WireError};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::grammar::{Field, Instruction, Language, MAX_FIELDS, Presence, RunClass, RunLength};

/// Outcome of a successful [`FieldDecoder::decode`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// A bounded message (one started with
    /// [`begin_bounded`](FieldDecoder::begin_bounded)) finished.
    Complete,
    /// The input ran out. Any partially decoded field is saved and the next
    /// call resumes it.
    Paused,
}

/// Integer values of the fields completed so far in the current message,
/// indexed by field position. Absent optional fields and byte runs read
/// as `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldValues([Option<u64>; MAX_FIELDS]);

impl FieldValues {
    #[must_use]
    pub fn get(&self, field: usize) -> Option<u64> {
        self.0.get(field).copied().flatten()
    }

    fn set(&mut self, field: usize, value: u64) {
        self.0[field] = Some(value);
    }
}

/// Receiver of engine events.
///
/// Concrete decoders implement this to turn field-level events into
/// their own callbacks. The engine calls nothing else, so every side
/// effect of decoding flows through here.
///
/// Events for one message arrive in wire order: `on_integer` /
/// `on_bytes` per field, then exactly one `on_message`. Byte runs arrive
/// as one `on_bytes` per non-empty fragment; how many fragments depends
/// on how the input was chunked.
pub trait FieldSink<K> {
    /// An integer field completed. Returning an error aborts decoding with
    /// that error; this is where validation the grammar cannot express
    /// belongs.
    ///
    /// # Errors
    ///
    /// Whatever the implementation decides is fatal.
    fn on_integer(&mut self, kind: K, field: usize, value: u64) -> Result<(), DecodeError> {
        let _ = (kind, field, value);
        Ok(())
    }

    /// A fragment of a byte run.
    fn on_bytes(&mut self, kind: K, field: usize, class: RunClass, bytes: &[u8]) {
        let _ = (kind, field, class, bytes);
    }

    /// Every field of the message has been consumed.
    fn on_message(&mut self, kind: K, values: &FieldValues);
}

/// Partial state of the field currently being decoded.
#[derive(Clone, Copy, Debug)]
enum Partial {
    Fresh,
    Varint(VarintDecoder),
    Uint { acc: u64, read: u8 },
    Run { left: u64 },
}

/// Where decoding stopped: the only state that survives between calls.
///
/// ```text
///   instruction ── None: waiting for the first byte of a message
///                └ Some: inside a message
///   field       ── index of the field being decoded
///   partial     ── progress within that field
///   values      ── integers completed earlier in this message
///   remaining   ── bytes left in a bounded message (None = self-delimiting)
///   flags       ── frame flags deciding optional fields
/// ```
#[derive(Clone, Copy, Debug)]
struct ResumePoint<K: 'static> {
    instruction: Option<&'static Instruction<K>>,
    field: usize,
    partial: Partial,
    values: FieldValues,
    remaining: Option<u64>,
    flags: u8,
}

impl<K: 'static> ResumePoint<K> {
    fn idle() -> Self {
        Self {
            instruction: None,
            field: 0,
            partial: Partial::Fresh,
            values: FieldValues::default(),
            remaining: None,
            flags: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Done,
    Suspend,
}

/// Generic field-stepping decoder.
///
/// Walks the fields of one [`Instruction`] at a time, pulling bytes from
/// a [`DecodeBuffer`] and reporting to a [`FieldSink`]. When the buffer
/// runs dry mid-field the decoder records exactly where it was and
/// returns [`Progress::Paused`]; feeding the next chunk continues from
/// that byte. The callback sequence is therefore the same however the
/// input is split, apart from how byte runs are fragmented.
///
/// Two modes:
///
/// - **Self-delimiting** (QPACK instruction streams): messages follow
///   each other back to back. Each one is chosen by matching its first
///   byte against the language's opcodes, and `decode` keeps going until
///   the input is exhausted.
/// - **Bounded** (frame payloads): the caller picks the instruction and
///   declares the payload length with
///   [`begin_bounded`](Self::begin_bounded). The decoder never reads past
///   that length and returns [`Progress::Complete`] when the message ends.
///
/// Errors are returned, not latched. The owning decoder is responsible
/// for refusing further input after one.
#[derive(Debug)]
pub struct FieldDecoder<K: 'static> {
    language: &'static Language<K>,
    config: DecoderConfig,
    resume: ResumePoint<K>,
}

impl<K: Copy + 'static> FieldDecoder<K> {
    #[must_use]
    pub fn new(language: &'static Language<K>, config: DecoderConfig) -> Self {
        debug_assert!(language.is_well_formed(), "grammar {} is malformed", language.name);
        Self {
            language,
            config,
            resume: ResumePoint::idle(),
        }
    }

    /// True while a message has been started but not finished.
    #[must_use]
    pub fn in_message(&self) -> bool {
        self.resume.instruction.is_some()
    }

    /// Start a message of known `length` whose optional fields are decided
    /// by `flags`.
    ///
    /// # Panics
    ///
    /// Panics if a message is already in progress.
    pub fn begin_bounded(&mut self, instruction: &'static Instruction<K>, length: u64, flags: u8) {
        assert!(!self.in_message(), "begin_bounded while a message is in progress");
        self.resume = ResumePoint {
            instruction: Some(instruction),
            remaining: Some(length),
            flags,
            ..ResumePoint::idle()
        };
    }

    /// Decode as much of `db` as possible.
    ///
    /// In self-delimiting mode this consumes every whole message in `db`
    /// and any leading part of the next one. In bounded mode it stops at
    /// the end of the declared payload, leaving later bytes in `db`.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnknownOpcode`] if no instruction matches.
    /// - [`DecodeError::MalformedVarint`] for a bad prefix integer.
    /// - [`DecodeError::LengthOverrun`] / [`DecodeError::PayloadTruncated`]
    ///   when a field does not fit in the declared payload.
    /// - Anything the sink returns from [`FieldSink::on_integer`].
    pub fn decode<S: FieldSink<K>>(
        &mut self,
        db: &mut DecodeBuffer<'_>,
        sink: &mut S,
    ) -> Result<Progress, DecodeError> {
        loop {
            let Some(instruction) = self.resume.instruction else {
                let Ok(byte) = db.peek_byte() else {
                    return Ok(Progress::Paused);
                };
                let instruction = self
                    .language
                    .lookup(byte)
                    .ok_or(DecodeError::UnknownOpcode { byte })?;
                self.resume.instruction = Some(instruction);
                continue;
            };

            while self.resume.field < instruction.fields.len() {
                if self.step(instruction, db, sink)? == Step::Suspend {
                    return Ok(Progress::Paused);
                }
            }

            let bounded = self.resume.remaining.is_some();
            debug_assert!(
                self.resume.remaining.is_none_or(|r| r == 0),
                "grammar {} left payload bytes unaccounted for",
                self.language.name
            );
            let values = self.resume.values;
            self.resume = ResumePoint::idle();
            sink.on_message(instruction.kind, &values);

            if bounded {
                return Ok(Progress::Complete);
            }
        }
    }

    fn step<S: FieldSink<K>>(
        &mut self,
        instruction: &'static Instruction<K>,
        db: &mut DecodeBuffer<'_>,
        sink: &mut S,
    ) -> Result<Step, DecodeError> {
        let index = self.resume.field;
        let kind = instruction.kind;

        match instruction.fields[index] {
            Field::Varint { prefix_bits } => {
                let mut state = match self.resume.partial {
                    Partial::Varint(state) => state,
                    _ => self.config.varint_decoder(),
                };
                let mut window = self.window(db);
                let result = window.consume_varint(prefix_bits, &mut state);
                self.consume(db, window.offset());
                match result {
                    Ok(value) => self.complete_integer(kind, index, value, sink),
                    Err(WireError::InsufficientData { .. }) => {
                        self.resume.partial = Partial::Varint(state);
                        self.pause(index)
                    }
                    Err(e) => Err(DecodeError::MalformedVarint(e)),
                }
            }

            Field::Uint { width, presence } => {
                if let Presence::IfFlag(mask) = presence {
                    if self.resume.flags & mask == 0 {
                        self.next_field();
                        return Ok(Step::Done);
                    }
                }
                let (mut acc, mut read) = match self.resume.partial {
                    Partial::Uint { acc, read } => (acc, read),
                    _ => (0, 0),
                };
                let mut window = self.window(db);
                while read < width {
                    let Ok(byte) = window.consume_byte() else {
                        break;
                    };
                    acc = (acc << 8) | u64::from(byte);
                    read += 1;
                }
                self.consume(db, window.offset());
                if read < width {
                    self.resume.partial = Partial::Uint { acc, read };
                    return self.pause(index);
                }
                self.complete_integer(kind, index, acc, sink)
            }

            Field::Run { len, class } => {
                let mut left = match self.resume.partial {
                    Partial::Run { left } => left,
                    _ => self.run_length(index, len)?,
                };
                let mut window = self.window(db);
                let chunk = window.consume_up_to(usize::try_from(left).unwrap_or(usize::MAX));
                if !chunk.is_empty() {
                    left -= chunk.len() as u64;
                    sink.on_bytes(kind, index, class, chunk);
                }
                self.consume(db, window.offset());
                if left > 0 {
                    self.resume.partial = Partial::Run { left };
                    return self.pause(index);
                }
                self.next_field();
                Ok(Step::Done)
            }
        }
    }

    fn complete_integer<S: FieldSink<K>>(
        &mut self,
        kind: K,
        index: usize,
        value: u64,
        sink: &mut S,
    ) -> Result<Step, DecodeError> {
        self.resume.values.set(index, value);
        self.next_field();
        sink.on_integer(kind, index, value)?;
        Ok(Step::Done)
    }

    fn run_length(&self, index: usize, len: RunLength) -> Result<u64, DecodeError> {
        let value_of = |i: usize| self.resume.values.get(i).unwrap_or(0);
        match (len, self.resume.remaining) {
            (RunLength::Field(i), None) => Ok(value_of(i)),
            (RunLength::Field(i), Some(available)) => {
                let length = value_of(i);
                if length > available {
                    return Err(DecodeError::LengthOverrun {
                        field: index,
                        length,
                        available,
                    });
                }
                Ok(length)
            }
            (RunLength::Remainder { reserve }, Some(available)) => {
                let reserved = reserve.map_or(0, value_of);
                available.checked_sub(reserved).ok_or(DecodeError::LengthOverrun {
                    field: index,
                    length: reserved,
                    available,
                })
            }
            (RunLength::Remainder { .. }, None) => {
                unreachable!("remainder run in self-delimiting grammar {}", self.language.name)
            }
        }
    }

    /// The part of `db` this message may read.
    fn window<'a>(&self, db: &DecodeBuffer<'a>) -> DecodeBuffer<'a> {
        let limit = self
            .resume
            .remaining
            .map_or(usize::MAX, |r| usize::try_from(r).unwrap_or(usize::MAX));
        db.subset(limit)
    }

    fn consume(&mut self, db: &mut DecodeBuffer<'_>, n: usize) {
        db.advance(n);
        if let Some(remaining) = self.resume.remaining.as_mut() {
            *remaining -= n as u64;
        }
    }

    /// Out of input mid-field: suspend, unless the declared payload is what
    /// ran out.
    fn pause(&self, index: usize) -> Result<Step, DecodeError> {
        if self.resume.remaining == Some(0) {
            return Err(DecodeError::PayloadTruncated { field: index });
        }
        Ok(Step::Suspend)
    }

    fn next_field(&mut self) {
        self.resume.field += 1;
        self.resume.partial = Partial::Fresh;
    }
}
