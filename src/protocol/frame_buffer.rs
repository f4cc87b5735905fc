//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented parts:
//! - `WaitingForHeader`: Need at least 5 bytes
//! - `WaitingForPart`: Header parsed, need N more part bytes
//!
//! Completed parts are collected until one arrives without the `MORE`
//! flag, at which point the whole [`RawMessage`] is emitted.

use bytes::{Bytes, BytesMut};

use super::wire_format::{flags, PartHeader, DEFAULT_MAX_FRAME_SIZE, PART_HEADER_SIZE};
use super::RawMessage;
use crate::error::{Result, SdkError};

/// State machine for part parsing.
#[derive(Debug, Clone)]
enum State {
    /// Waiting for complete header (need 5 bytes).
    WaitingForHeader,
    /// Header parsed, waiting for part bytes.
    WaitingForPart { header: PartHeader },
}

/// Buffer for accumulating incoming bytes and extracting complete messages.
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Parts of the message currently being assembled.
    pending_parts: Vec<Bytes>,
    /// Total size of `pending_parts`.
    pending_size: usize,
    /// Maximum allowed message size, all parts included.
    max_frame_size: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer with default settings.
    ///
    /// Default capacity: 64KB, max message: 16 MiB.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a new frame buffer with a custom max message size.
    pub fn with_max_frame_size(max_frame_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            state: State::WaitingForHeader,
            pending_parts: Vec::new(),
            pending_size: 0,
            max_frame_size,
        }
    }

    /// Push data into the buffer and extract all complete messages.
    ///
    /// Partial data is buffered internally for the next push.
    ///
    /// # Errors
    ///
    /// Returns error if a message grows past `max_frame_size` or a header
    /// sets reserved flag bits.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<RawMessage>> {
        self.buffer.extend_from_slice(data);

        let mut messages = Vec::new();

        while let Some(message) = self.try_extract_one()? {
            messages.push(message);
        }

        Ok(messages)
    }

    /// Try to extract a single complete message.
    fn try_extract_one(&mut self) -> Result<Option<RawMessage>> {
        loop {
            match self.state {
                State::WaitingForHeader => {
                    let header = match PartHeader::decode(&self.buffer) {
                        Some(h) => h,
                        None => return Ok(None),
                    };

                    if header.flags & flags::RESERVED_MASK != 0 {
                        return Err(SdkError::Protocol(format!(
                            "Reserved flag bits set: {:#04x}",
                            header.flags
                        )));
                    }

                    let total = self.pending_size + header.length as usize;
                    if total > self.max_frame_size as usize {
                        return Err(SdkError::Protocol(format!(
                            "Message size {} exceeds maximum {}",
                            total, self.max_frame_size
                        )));
                    }

                    let _ = self.buffer.split_to(PART_HEADER_SIZE);
                    self.state = State::WaitingForPart { header };
                }

                State::WaitingForPart { header } => {
                    let length = header.length as usize;
                    if self.buffer.len() < length {
                        return Ok(None);
                    }

                    let part = self.buffer.split_to(length).freeze();
                    self.pending_parts.push(part);
                    self.pending_size += length;
                    self.state = State::WaitingForHeader;

                    if !header.has_more() {
                        self.pending_size = 0;
                        let parts = std::mem::take(&mut self.pending_parts);
                        return Ok(Some(RawMessage::new(parts)));
                    }
                }
            }
        }
    }

    /// Get the number of buffered bytes not yet assigned to a part.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing is buffered, including half-assembled messages.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
            && self.pending_parts.is_empty()
            && matches!(self.state, State::WaitingForHeader)
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending_parts.clear();
        self.pending_size = 0;
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPart { .. } => "WaitingForPart",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
