#![warn(clippy::pedantic)]

pub mod data_frame;
pub mod error;
pub mod sender;

pub use data_frame::DataFrame;
pub use error::EncodeError;
pub use sender::DecoderStreamSender;
