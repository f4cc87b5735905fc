//! Outbound envelopes and their builders.
//!
//! Every envelope is a JSON object carrying `key`. On the wire it travels
//! as two parts: the key, then the whole object.
//!
//! # Example
//!
//! ```
//! use tfw_sdk::message::OutboundMessage;
//!
//! let msg = OutboundMessage::message_send("Welcome!");
//! assert_eq!(msg.key(), "message.send");
//! assert_eq!(msg.get("originator").unwrap(), "avataobot");
//! ```

use bytes::Bytes;
use serde_json::{Map, Value};

use super::keys;
use crate::codec::JsonCodec;
use crate::error::Result;
use crate::protocol::RawMessage;

/// Sender name attached to bot messages.
pub const ORIGINATOR: &str = "avataobot";

/// A message ready to be sent to the framework host.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    key: String,
    body: Map<String, Value>,
}

impl OutboundMessage {
    /// Create an envelope holding only `key`.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let mut body = Map::new();
        body.insert("key".to_string(), Value::String(key.clone()));
        Self { key, body }
    }

    /// Add a field to the envelope.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.body.insert(field.to_string(), value.into());
        self
    }

    /// Wrap an arbitrary payload without touching it.
    ///
    /// The routing key is taken from the payload's `key` string, or is empty.
    pub fn custom(payload: Map<String, Value>) -> Self {
        let key = payload
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { key, body: payload }
    }

    /// Get the routing key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the full JSON object.
    #[inline]
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Get a single field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// Convert into the JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }

    /// Encode as a two-part bus message.
    pub fn to_raw(&self) -> Result<RawMessage> {
        let body = JsonCodec::encode(&self.body)?;
        Ok(RawMessage::new(vec![
            Bytes::copy_from_slice(self.key.as_bytes()),
            Bytes::from(body),
        ]))
    }

    // ---- messaging ----

    /// `message.queue`: several bot messages shown one after another.
    pub fn message_queue<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let messages: Vec<Value> = messages
            .into_iter()
            .map(|m| {
                let mut entry = Map::new();
                entry.insert("message".to_string(), Value::String(m.into()));
                entry.insert("originator".to_string(), Value::String(ORIGINATOR.to_string()));
                Value::Object(entry)
            })
            .collect();

        Self::new(keys::MESSAGE_QUEUE).with("messages", messages)
    }

    /// `message.send`: a single bot message.
    pub fn message_send(message: impl Into<String>) -> Self {
        Self::new(keys::MESSAGE_SEND)
            .with("originator", ORIGINATOR)
            .with("message", message.into())
    }

    // ---- dashboard / webservice / terminal ----

    pub fn dashboard_layout(layout: impl Into<String>) -> Self {
        Self::new(keys::FRONTEND_DASHBOARD).with("layout", layout.into())
    }

    pub fn iframe_url(url: impl Into<String>) -> Self {
        Self::new(keys::FRONTEND_DASHBOARD).with("iframeUrl", url.into())
    }

    /// Hosts expect the flag as the text `"True"` / `"False"`.
    pub fn show_url_bar(value: bool) -> Self {
        let text = if value { "True" } else { "False" };
        Self::new(keys::FRONTEND_DASHBOARD).with("showUrlBar", text)
    }

    pub fn reload_iframe() -> Self {
        Self::new(keys::FRONTEND_RELOAD_IFRAME)
    }

    pub fn terminal_menu_item(item: impl Into<String>) -> Self {
        Self::new(keys::FRONTEND_DASHBOARD).with("terminalMenuItem", item.into())
    }

    pub fn terminal_write(content: impl Into<String>) -> Self {
        Self::new(keys::TERMINAL_WRITE).with("content", content.into())
    }

    pub fn console_write(content: impl Into<String>) -> Self {
        Self::new(keys::CONSOLE_WRITE).with("content", content.into())
    }

    // ---- IDE ----

    /// `ide.read`: select a file, optionally with the patterns of files to list.
    ///
    /// `patterns` is left out when `None` or empty.
    pub fn ide_read<S: AsRef<str>>(filename: impl Into<String>, patterns: Option<&[S]>) -> Self {
        let msg = Self::new(keys::IDE_READ).with("filename", filename.into());
        match patterns {
            Some(p) if !p.is_empty() => {
                let patterns: Vec<Value> =
                    p.iter().map(|s| Value::String(s.as_ref().to_string())).collect();
                msg.with("patterns", patterns)
            }
            _ => msg,
        }
    }

    pub fn show_deploy_button(value: bool) -> Self {
        Self::new(keys::FRONTEND_IDE).with("showDeployButton", value)
    }

    /// `deploy.finish`: reply to `deploy.start`. `error: true` only on failure.
    pub fn deploy_finish(success: bool) -> Self {
        let msg = Self::new(keys::DEPLOY_FINISH);
        if success {
            msg
        } else {
            msg.with("error", true)
        }
    }
}
