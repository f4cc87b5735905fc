//! # tfw-sdk
//!
//! Runtime bridge between a tutorial framework host and user-supplied
//! event handlers.
//!
//! The host talks to this process over a message bus. Every inbound
//! message is a routing key plus a JSON body; the SDK decodes it, keeps
//! track of the current workflow step, and calls the matching method of
//! the user's [`EventHandlers`]. Handlers talk back through a
//! [`Commander`].
//!
//! ## Routed keys
//!
//! | key | handler |
//! |---|---|
//! | `fsm.update` | `on_step(current_state)` |
//! | `message.button.click` | `on_message_button_click(current_state, value)` |
//! | `deploy.start` | `on_deploy(current_state)`, answered with `deploy.finish` |
//! | `ide.write` | `on_ide_write(current_state, filename, content)` |
//! | `history.bash` | `on_terminal_command(current_state, command)` |
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::process::ExitCode;
//! use tfw_sdk::{Commander, EventHandlers, HandlerResult, Result};
//!
//! struct App {
//!     commander: Commander,
//! }
//!
//! impl EventHandlers for App {
//!     fn on_step(&mut self, current_state: i64) -> HandlerResult {
//!         self.commander.message_send(format!("Welcome to step {}", current_state))?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> ExitCode {
//!     tfw_sdk::bootstrap(|_path: &Path, commander: Commander| -> Result<Box<dyn EventHandlers>> {
//!         Ok(Box::new(App { commander }))
//!     })
//!     .await
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod message;
pub mod protocol;
pub mod transport;

mod commands;
mod dispatcher;
mod sdk;
mod state;
mod url;
mod writer;

pub use commands::Commander;
pub use config::SdkConfig;
pub use dispatcher::Dispatcher;
pub use error::{HandlerError, HandlerResult, Result, SdkError};
pub use handler::{EventHandlers, HandlerLoader};
pub use logging::init_logging;
pub use message::{InboundMessage, OutboundMessage};
pub use sdk::{bootstrap, Sdk, SdkBuilder, ShutdownHandle};
pub use state::SessionState;
pub use url::UrlResolver;
pub use writer::{spawn_writer_task, WriterHandle, DEFAULT_CHANNEL_CAPACITY};
