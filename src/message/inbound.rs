//! Inbound message decoding.
//!
//! Decoding fails closed: anything that does not match the expected shape
//! becomes [`SdkError::Malformed`] before a handler sees it.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::codec::JsonCodec;
use crate::error::{Result, SdkError};
use crate::protocol::RawMessage;

/// A decoded inbound message: routing key plus JSON object body.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Routing discriminator.
    pub key: String,
    /// Key-specific payload.
    pub body: Map<String, Value>,
}

impl InboundMessage {
    /// Create a message from a key and body.
    pub fn new(key: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            key: key.into(),
            body,
        }
    }

    /// Decode a raw two-part message.
    ///
    /// Parts beyond the second are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` if there are fewer than two parts, a part is not
    /// UTF-8, or the body is not a JSON object.
    pub fn decode(raw: &RawMessage) -> Result<Self> {
        let (key, body) = match raw.parts() {
            [key, body, ..] => (key, body),
            parts => {
                return Err(SdkError::Malformed(format!(
                    "expected 2 parts, got {}",
                    parts.len()
                )))
            }
        };

        let key = JsonCodec::decode_text(key)
            .map_err(|e| SdkError::Malformed(format!("key: {}", e)))?;

        let body = JsonCodec::decode_object(body).map_err(|e| match e {
            SdkError::Malformed(_) => e,
            other => SdkError::Malformed(format!("body of {}: {}", key, other)),
        })?;

        Ok(Self::new(key, body))
    }

    /// Decode the body into a typed per-key struct.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` when a required field is missing or mistyped.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.body.clone()))
            .map_err(|e| SdkError::Malformed(format!("{}: {}", self.key, e)))
    }
}

/// Body of `fsm.update`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FsmUpdate {
    /// New workflow step.
    #[serde(deserialize_with = "integer_like")]
    pub current_state: i64,
}

/// Body of `message.button.click`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ButtonClick {
    /// Value attached to the clicked button.
    pub value: Value,
}

/// Body of `ide.write`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdeWrite {
    pub filename: String,
    pub content: String,
}

/// Body of `history.bash`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryBash {
    pub command: String,
}

/// Accept integers, floats (truncated toward zero), booleans and integer
/// strings.
fn integer_like<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f.trunc() as i64)
                }
                _ => Err(de::Error::custom(format!("{} is out of range", n))),
            }
        }
        Value::Bool(b) => Ok(i64::from(b)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("{:?} is not an integer", s))),
        other => Err(de::Error::custom(format!("{} is not an integer", other))),
    }
}
