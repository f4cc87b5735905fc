//! Message schema - routing keys, typed inbound bodies, outbound envelopes.
//!
//! Inbound messages arrive as two parts (key, JSON object). The dispatcher
//! decodes them into [`InboundMessage`] and then into one of the per-key
//! body structs. Outbound messages are [`OutboundMessage`] envelopes that
//! always carry a `key` field.

mod inbound;
mod outbound;

pub use inbound::{ButtonClick, FsmUpdate, HistoryBash, IdeWrite, InboundMessage};
pub use outbound::{OutboundMessage, ORIGINATOR};

/// Routing keys used on the bus.
pub mod keys {
    /// Workflow step changed.
    pub const FSM_UPDATE: &str = "fsm.update";
    /// A message button was clicked.
    pub const BUTTON_CLICK: &str = "message.button.click";
    /// The user pressed deploy.
    pub const DEPLOY_START: &str = "deploy.start";
    /// A file was saved in the IDE.
    pub const IDE_WRITE: &str = "ide.write";
    /// A command was run in the terminal.
    pub const HISTORY_BASH: &str = "history.bash";

    /// Reply to `deploy.start`.
    pub const DEPLOY_FINISH: &str = "deploy.finish";
    /// Queue of bot messages.
    pub const MESSAGE_QUEUE: &str = "message.queue";
    /// Single bot message.
    pub const MESSAGE_SEND: &str = "message.send";
    /// Dashboard layout and webservice/terminal settings.
    pub const FRONTEND_DASHBOARD: &str = "frontend.dashboard";
    /// Reload the webservice iframe.
    pub const FRONTEND_RELOAD_IFRAME: &str = "frontend.reloadIframe";
    /// IDE settings.
    pub const FRONTEND_IDE: &str = "frontend.ide";
    /// Write to the terminal.
    pub const TERMINAL_WRITE: &str = "terminal.write";
    /// Write to the console.
    pub const CONSOLE_WRITE: &str = "console.write";
    /// Open a file in the IDE.
    pub const IDE_READ: &str = "ide.read";

    /// Keys the dispatcher routes to a handler.
    pub const ROUTED: [&str; 5] = [FSM_UPDATE, BUTTON_CLICK, DEPLOY_START, IDE_WRITE, HISTORY_BASH];

    /// Check whether a key is routed to a handler.
    pub fn is_routed(key: &str) -> bool {
        ROUTED.contains(&key)
    }
}
