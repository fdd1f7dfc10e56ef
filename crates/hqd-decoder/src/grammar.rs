//! Declarative message grammars.
//!
//! A [`Language`] is a static table of [`Instruction`]s. Each instruction
//! pairs a closed-enum kind with the opcode pattern that selects it and
//! the ordered fields that make up its body. The tables are plain
//! `static` data: built at compile time, never mutated, shared by every
//! decoder that uses them.
//!
//! ```text
//!   Language
//!   └── Instruction { kind, opcode: value/mask, fields }
//!       ├── Field::Varint { prefix_bits }
//!       ├── Field::Uint   { width, presence }
//!       └── Field::Run    { len: Field(i) | Remainder { reserve }, class }
//! ```

/// Upper bound on fields per instruction; sized for the fixed value
/// array carried by the engine.
pub const MAX_FIELDS: usize = 4;

/// Bit pattern matched against the first byte of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub value: u8,
    pub mask: u8,
}

impl Opcode {
    /// Matches every byte. Used by grammars whose messages are selected
    /// by the caller rather than by their first byte.
    pub const ANY: Self = Self { value: 0, mask: 0 };

    #[must_use]
    pub const fn new(value: u8, mask: u8) -> Self {
        Self { value, mask }
    }

    #[must_use]
    pub fn matches(self, byte: u8) -> bool {
        byte & self.mask == self.value
    }
}

/// When an optional field is on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Always,
    /// Present only when one of these frame flag bits is set.
    IfFlag(u8),
}

/// How long a byte run is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunLength {
    /// The value of an earlier integer field. An absent field counts as 0.
    Field(usize),
    /// Everything left in the declared payload, less the value of an
    /// earlier integer field (trailing bytes that belong to a later run).
    Remainder { reserve: Option<usize> },
}

/// What a byte run carries, for the concrete decoder's benefit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunClass {
    Content,
    Padding,
}

/// One field of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// Prefix integer in the low `prefix_bits` of the current byte, with
    /// continuation bytes when the prefix is all-ones.
    Varint { prefix_bits: u8 },
    /// Big-endian unsigned integer of `width` bytes.
    Uint { width: u8, presence: Presence },
    /// Raw bytes, delivered in fragments as they arrive.
    Run { len: RunLength, class: RunClass },
}

impl Field {
    fn is_integer(self) -> bool {
        matches!(self, Self::Varint { .. } | Self::Uint { .. })
    }
}

/// One message kind.
#[derive(Debug)]
pub struct Instruction<K: 'static> {
    pub kind: K,
    pub opcode: Opcode,
    pub fields: &'static [Field],
}

/// A set of message kinds sharing an opcode space.
#[derive(Debug)]
pub struct Language<K: 'static> {
    pub name: &'static str,
    pub instructions: &'static [Instruction<K>],
}

impl<K: 'static> Language<K> {
    /// First instruction whose opcode matches `byte`.
    pub fn lookup(&'static self, byte: u8) -> Option<&'static Instruction<K>> {
        self.instructions.iter().find(|i| i.opcode.matches(byte))
    }

    /// Structural checks on the table:
    ///
    /// - at most [`MAX_FIELDS`] fields per instruction;
    /// - prefix widths in `1..=8`, and a leading varint's prefix does not
    ///   overlap the opcode bits it shares a byte with;
    /// - fixed integers are 1 to 8 bytes wide;
    /// - run lengths only reference earlier integer fields.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.instructions.iter().all(|instruction| {
            instruction.fields.len() <= MAX_FIELDS
                && instruction
                    .fields
                    .iter()
                    .enumerate()
                    .all(|(index, field)| field_is_well_formed(instruction, index, *field))
        })
    }
}

fn field_is_well_formed<K>(instruction: &Instruction<K>, index: usize, field: Field) -> bool {
    let earlier_integer = |i: usize| i < index && instruction.fields[i].is_integer();
    match field {
        Field::Varint { prefix_bits } => {
            if !(1..=8).contains(&prefix_bits) {
                return false;
            }
            let prefix_mask = ((1u16 << prefix_bits) - 1) as u8;
            index > 0 || instruction.opcode.mask & prefix_mask == 0
        }
        Field::Uint { width, .. } => (1..=8).contains(&width),
        Field::Run { len: RunLength::Field(i), .. } => earlier_integer(i),
        Field::Run {
            len: RunLength::Remainder { reserve },
            ..
        } => reserve.is_none_or(earlier_integer),
    }
}
