//! Codec module - text and JSON encoding of message parts.
//!
//! - [`JsonCodec`] - UTF-8 text and JSON bodies using `serde_json`
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects,
//! so the dispatcher and writer pick them at compile time.
//!
//! # Example
//!
//! ```
//! use tfw_sdk::codec::JsonCodec;
//! use serde_json::json;
//!
//! let encoded = JsonCodec::encode(&json!({"key": "console.write"})).unwrap();
//! let decoded: serde_json::Value = JsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded["key"], "console.write");
//! ```

mod json;

pub use json::JsonCodec;
