//! JSON codec using `serde_json`.
//!
//! Bodies on the bus are UTF-8 JSON. Decoding validates UTF-8 first so a
//! bad byte sequence is reported as such rather than as a JSON syntax error.

use serde_json::{Map, Value};

use crate::error::{Result, SdkError};

/// JSON codec for message parts.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to JSON bytes.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Decode JSON bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns `Utf8` if the bytes are not valid UTF-8 and `Json` if the text
    /// does not parse into `T`.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        let text = Self::decode_text(bytes)?;
        Ok(serde_json::from_str(text)?)
    }

    /// Decode a part as UTF-8 text.
    #[inline]
    pub fn decode_text(bytes: &[u8]) -> Result<&str> {
        Ok(std::str::from_utf8(bytes)?)
    }

    /// Decode a part that must hold a JSON object.
    pub fn decode_object(bytes: &[u8]) -> Result<Map<String, Value>> {
        match Self::decode::<Value>(bytes)? {
            Value::Object(map) => Ok(map),
            other => Err(SdkError::Malformed(format!(
                "expected a JSON object body, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
