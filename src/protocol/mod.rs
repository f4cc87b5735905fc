//! Protocol module - multipart wire format and framing.
//!
//! This module implements the byte-stream framing of the message bus:
//! - 5-byte part header encoding/decoding
//! - Frame buffer for accumulating partial reads into whole messages
//! - [`RawMessage`], the undecoded multipart message handed to the dispatcher

mod frame;
mod frame_buffer;
mod wire_format;

pub use frame::{encode_message, RawMessage};
pub use frame_buffer::FrameBuffer;
pub use wire_format::{flags, PartHeader, DEFAULT_MAX_FRAME_SIZE, PART_HEADER_SIZE};
