#![warn(clippy::pedantic)]

pub mod buffer;
pub mod error;
pub mod frame_header;
pub mod qpack;
pub mod varint;

pub use buffer::DecodeBuffer;
pub use error::WireError;
pub use frame_header::{FrameFlags, FrameHeader, FrameType};
pub use varint::VarintDecoder;
