//! Send-only command API for handlers and application code.
//!
//! Each method builds one envelope (see [`OutboundMessage`]) and queues it
//! for the writer task without waiting. Sends are fire-and-forget: an `Ok`
//! means the message was queued, not that the host received it.
//!
//! # Example
//!
//! ```
//! use tfw_sdk::{Commander, WriterHandle};
//!
//! let (writer, mut rx) = WriterHandle::channel(16);
//! let commander = Commander::new(writer);
//!
//! commander.message_send("Hello!").unwrap();
//! commander.ide_show_deploy_button(true).unwrap();
//!
//! assert_eq!(rx.try_recv().unwrap().key(), "message.send");
//! assert_eq!(rx.try_recv().unwrap().key(), "frontend.ide");
//! ```

use serde_json::{Map, Value};

use crate::error::Result;
use crate::message::OutboundMessage;
use crate::writer::WriterHandle;

/// Issues outbound commands to the framework host.
#[derive(Debug, Clone)]
pub struct Commander {
    writer: WriterHandle,
}

impl Commander {
    /// Create a commander over a writer handle.
    pub fn new(writer: WriterHandle) -> Self {
        Self { writer }
    }

    /// Queue any envelope.
    pub fn send(&self, message: OutboundMessage) -> Result<()> {
        tracing::debug!(key = %message.key(), "Queueing outbound message");
        self.writer.try_send(message)
    }

    // ---- messaging ----

    pub fn message_queue<I, S>(&self, messages: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.send(OutboundMessage::message_queue(messages))
    }

    pub fn message_send(&self, message: impl Into<String>) -> Result<()> {
        self.send(OutboundMessage::message_send(message))
    }

    // ---- dashboard ----

    pub fn dashboard_layout(&self, layout: impl Into<String>) -> Result<()> {
        self.send(OutboundMessage::dashboard_layout(layout))
    }

    // ---- webservice ----

    pub fn webservice_iframe_url(&self, url: impl Into<String>) -> Result<()> {
        self.send(OutboundMessage::iframe_url(url))
    }

    pub fn webservice_show_url_bar(&self, value: bool) -> Result<()> {
        self.send(OutboundMessage::show_url_bar(value))
    }

    pub fn webservice_reload_iframe(&self) -> Result<()> {
        self.send(OutboundMessage::reload_iframe())
    }

    // ---- terminal / console ----

    pub fn terminal_menu_item(&self, item: impl Into<String>) -> Result<()> {
        self.send(OutboundMessage::terminal_menu_item(item))
    }

    pub fn terminal_write(&self, content: impl Into<String>) -> Result<()> {
        self.send(OutboundMessage::terminal_write(content))
    }

    pub fn console_write(&self, content: impl Into<String>) -> Result<()> {
        self.send(OutboundMessage::console_write(content))
    }

    // ---- IDE ----

    /// Open `filename` in the IDE, optionally listing files matching `patterns`.
    pub fn ide_select_file<S: AsRef<str>>(
        &self,
        filename: impl Into<String>,
        patterns: Option<&[S]>,
    ) -> Result<()> {
        self.send(OutboundMessage::ide_read(filename, patterns))
    }

    pub fn ide_show_deploy_button(&self, value: bool) -> Result<()> {
        self.send(OutboundMessage::show_deploy_button(value))
    }

    // ---- custom ----

    /// Send an arbitrary payload unchanged.
    pub fn custom(&self, payload: Map<String, Value>) -> Result<()> {
        self.send(OutboundMessage::custom(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use serde_json::json;

    fn commander() -> (Commander, tokio::sync::mpsc::Receiver<OutboundMessage>) {
        let (writer, rx) = WriterHandle::channel(32);
        (Commander::new(writer), rx)
    }

    #[test]
    fn test_every_family_is_queued_in_order() {
        let (c, mut rx) = commander();

        c.message_queue(["a", "b"]).unwrap();
        c.message_send("m").unwrap();
        c.dashboard_layout("ide-only").unwrap();
        c.webservice_iframe_url("http://localhost:1/").unwrap();
        c.webservice_show_url_bar(false).unwrap();
        c.webservice_reload_iframe().unwrap();
        c.terminal_menu_item("terminal").unwrap();
        c.terminal_write("t").unwrap();
        c.console_write("c").unwrap();
        c.ide_select_file("f.py", Some(&["*.py"][..])).unwrap();
        c.ide_show_deploy_button(true).unwrap();
        c.custom(json!({"key": "x.y"}).as_object().unwrap().clone()).unwrap();

        let keys: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|m| m.key().to_string())
            .collect();

        assert_eq!(
            keys,
            [
                "message.queue",
                "message.send",
                "frontend.dashboard",
                "frontend.dashboard",
                "frontend.dashboard",
                "frontend.reloadIframe",
                "frontend.dashboard",
                "terminal.write",
                "console.write",
                "ide.read",
                "frontend.ide",
                "x.y",
            ]
        );
    }

    #[test]
    fn test_select_file_without_patterns() {
        let (c, mut rx) = commander();
        c.ide_select_file::<&str>("main.rs", None).unwrap();

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.into_value(), json!({"key": "ide.read", "filename": "main.rs"}));
    }

    #[test]
    fn test_send_after_writer_gone() {
        let (c, rx) = commander();
        drop(rx);
        assert!(matches!(c.console_write("x"), Err(SdkError::ConnectionClosed)));
    }
}
