#![warn(clippy::pedantic)]

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod qpack;

pub use config::{DecoderConfig, QPACK_MAX_INTEGER};
pub use data::{DataPayloadDecoder, DataPayloadListener, DecodeStatus};
pub use engine::{FieldDecoder, FieldSink, FieldValues, Progress};
pub use error::{DecodeError, ErrorCode};
pub use grammar::{Field, Instruction, Language, Opcode, Presence, RunClass, RunLength};
pub use qpack::{QpackDecoderStreamDelegate, QpackDecoderStreamReceiver};
