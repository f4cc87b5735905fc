//! Multipart message as it travels on the bus.
//!
//! Uses `bytes::Bytes` so parts can be shared without copying.
//!
//! # Example
//!
//! ```
//! use tfw_sdk::protocol::{encode_message, FrameBuffer, RawMessage};
//!
//! let message = RawMessage::from_parts(["fsm.update", r#"{"current_state": 1}"#]);
//! let wire = encode_message(&message);
//!
//! let mut buffer = FrameBuffer::new();
//! let decoded = buffer.push(&wire).unwrap();
//! assert_eq!(decoded, vec![message]);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{PartHeader, PART_HEADER_SIZE};

/// An undecoded message: an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMessage {
    parts: Vec<Bytes>,
}

impl RawMessage {
    /// Create a message from already-owned parts.
    pub fn new(parts: Vec<Bytes>) -> Self {
        Self { parts }
    }

    /// Create a message by copying each part.
    pub fn from_parts<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        Self {
            parts: parts
                .into_iter()
                .map(|p| Bytes::copy_from_slice(p.as_ref()))
                .collect(),
        }
    }

    /// Get the parts.
    #[inline]
    pub fn parts(&self) -> &[Bytes] {
        &self.parts
    }

    /// Number of parts.
    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if the message has no parts.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Consume into the parts.
    pub fn into_parts(self) -> Vec<Bytes> {
        self.parts
    }

    /// Total encoded size on the wire.
    pub fn encoded_len(&self) -> usize {
        self.parts.iter().map(|p| PART_HEADER_SIZE + p.len()).sum()
    }
}

/// Encode a message into its wire representation.
///
/// An empty message is encoded as a single empty part.
pub fn encode_message(message: &RawMessage) -> Bytes {
    if message.is_empty() {
        return Bytes::copy_from_slice(&PartHeader::new(false, 0).encode());
    }

    let mut buf = BytesMut::with_capacity(message.encoded_len());
    let last = message.len() - 1;

    for (i, part) in message.parts().iter().enumerate() {
        let header = PartHeader::new(i < last, part.len() as u32);
        buf.put_slice(&header.encode());
        buf.put_slice(part);
    }

    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::flags;

    #[test]
    fn test_encode_sets_more_on_all_but_last() {
        let message = RawMessage::from_parts(["ab", "c"]);
        let wire = encode_message(&message);

        assert_eq!(wire.len(), message.encoded_len());
        assert_eq!(wire[0], flags::MORE);
        assert_eq!(&wire[1..5], &2u32.to_be_bytes());
        assert_eq!(&wire[5..7], b"ab");
        assert_eq!(wire[7], 0);
        assert_eq!(&wire[12..], b"c");
    }

    #[test]
    fn test_encode_empty_message() {
        let wire = encode_message(&RawMessage::default());
        assert_eq!(&wire[..], &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_accessors() {
        let message = RawMessage::from_parts(["key", "{}"]);
        assert_eq!(message.len(), 2);
        assert!(!message.is_empty());
        assert_eq!(&message.parts()[0][..], b"key");
        assert_eq!(message.into_parts().len(), 2);
    }
}
