//! Handler module - the user-supplied event handlers and how they are called.
//!
//! Provides:
//! - [`EventHandlers`] - one method per routed message key
//! - [`HandlerLoader`] - produces the handler set from a path at startup
//! - [`invoke`] - runs a handler with panic and error isolation
//!
//! # Example
//!
//! ```
//! use tfw_sdk::handler::EventHandlers;
//! use tfw_sdk::{Commander, HandlerResult};
//!
//! struct Guide {
//!     commander: Commander,
//! }
//!
//! impl EventHandlers for Guide {
//!     fn on_step(&mut self, current_state: i64) -> HandlerResult {
//!         self.commander.message_send(format!("Step {}", current_state))?;
//!         Ok(())
//!     }
//!
//!     fn on_deploy(&mut self, _current_state: i64) -> HandlerResult<bool> {
//!         Ok(true)
//!     }
//! }
//! ```

mod invoke;
mod loader;
mod registry;

pub use invoke::invoke;
pub use loader::HandlerLoader;
pub use registry::{EventHandlers, HandlerKind};
