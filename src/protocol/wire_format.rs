//! Wire format encoding and decoding.
//!
//! Every message part on the stream is preceded by a 5-byte header:
//! ```text
//! ┌───────┬──────────┐
//! │ Flags │ Length   │
//! │ 1 byte│ 4 bytes  │
//! │       │ uint32 BE│
//! └───────┴──────────┘
//! ```
//!
//! A message is a run of parts; every part except the last has the
//! `MORE` flag set.

/// Part header size in bytes (fixed, exactly 5).
pub const PART_HEADER_SIZE: usize = 5;

/// Default maximum size of one message, all parts included (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// Flag constants for the part header.
pub mod flags {
    /// Another part of the same message follows.
    pub const MORE: u8 = 0b0000_0001;

    /// Reserved bits mask (bits 1-7); a header setting any of them is rejected.
    pub const RESERVED_MASK: u8 = 0b1111_1110;

    /// Check if a specific flag is set.
    #[inline]
    pub fn has_flag(flags: u8, flag: u8) -> bool {
        flags & flag != 0
    }
}

/// Decoded part header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartHeader {
    /// Flags byte (see `flags` module).
    pub flags: u8,
    /// Part length in bytes.
    pub length: u32,
}

impl PartHeader {
    /// Create a new part header.
    pub fn new(more: bool, length: u32) -> Self {
        Self {
            flags: if more { flags::MORE } else { 0 },
            length,
        }
    }

    /// Whether another part follows this one.
    #[inline]
    pub fn has_more(&self) -> bool {
        flags::has_flag(self.flags, flags::MORE)
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use tfw_sdk::protocol::PartHeader;
    ///
    /// let bytes = PartHeader::new(true, 10).encode();
    /// assert_eq!(bytes, [1, 0, 0, 0, 10]);
    /// ```
    pub fn encode(&self) -> [u8; PART_HEADER_SIZE] {
        let mut buf = [0u8; PART_HEADER_SIZE];
        buf[0] = self.flags;
        buf[1..5].copy_from_slice(&self.length.to_be_bytes());
        buf
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < PART_HEADER_SIZE {
            return None;
        }

        Some(Self {
            flags: buf[0],
            length: u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(PART_HEADER_SIZE, 5);
    }

    #[test]
    fn test_encode_big_endian_length() {
        let bytes = PartHeader::new(false, 0x0102_0304).encode();
        assert_eq!(bytes, [0, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_decode_too_short() {
        assert!(PartHeader::decode(&[1, 0, 0]).is_none());
    }

    #[test]
    fn test_decode_more_flag() {
        let header = PartHeader::decode(&[flags::MORE, 0, 0, 1, 0]).unwrap();
        assert!(header.has_more());
        assert_eq!(header.length, 256);

        let last = PartHeader::decode(&[0, 0, 0, 0, 7]).unwrap();
        assert!(!last.has_more());
        assert_eq!(last.length, 7);
    }
}
