//! The handler set a dispatcher routes to.

use serde_json::Value;

use crate::error::{HandlerError, HandlerResult};

/// User event handlers, one method per routed key.
///
/// Every method receives the current workflow step first. Methods run to
/// completion on the dispatch loop, so a slow handler delays every message
/// behind it.
///
/// Unimplemented methods do nothing, except [`on_deploy`](Self::on_deploy),
/// which reports failure so the host is told the deploy did not happen.
pub trait EventHandlers: Send {
    /// `fsm.update`: the workflow moved to `current_state`.
    fn on_step(&mut self, current_state: i64) -> HandlerResult {
        let _ = current_state;
        Ok(())
    }

    /// `message.button.click`
    fn on_message_button_click(&mut self, current_state: i64, value: &Value) -> HandlerResult {
        let _ = (current_state, value);
        Ok(())
    }

    /// `deploy.start`: return whether the deploy succeeded.
    fn on_deploy(&mut self, current_state: i64) -> HandlerResult<bool> {
        let _ = current_state;
        Err(HandlerError::NotImplemented(HandlerKind::Deploy.name()))
    }

    /// `ide.write`
    fn on_ide_write(&mut self, current_state: i64, filename: &str, content: &str) -> HandlerResult {
        let _ = (current_state, filename, content);
        Ok(())
    }

    /// `history.bash`
    fn on_terminal_command(&mut self, current_state: i64, command: &str) -> HandlerResult {
        let _ = (current_state, command);
        Ok(())
    }
}

impl<T: EventHandlers + ?Sized> EventHandlers for Box<T> {
    fn on_step(&mut self, current_state: i64) -> HandlerResult {
        (**self).on_step(current_state)
    }

    fn on_message_button_click(&mut self, current_state: i64, value: &Value) -> HandlerResult {
        (**self).on_message_button_click(current_state, value)
    }

    fn on_deploy(&mut self, current_state: i64) -> HandlerResult<bool> {
        (**self).on_deploy(current_state)
    }

    fn on_ide_write(&mut self, current_state: i64, filename: &str, content: &str) -> HandlerResult {
        (**self).on_ide_write(current_state, filename, content)
    }

    fn on_terminal_command(&mut self, current_state: i64, command: &str) -> HandlerResult {
        (**self).on_terminal_command(current_state, command)
    }
}

/// Identity of a handler, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Step,
    ButtonClick,
    Deploy,
    IdeWrite,
    TerminalCommand,
}

impl HandlerKind {
    /// Handler method name.
    pub fn name(self) -> &'static str {
        match self {
            HandlerKind::Step => "on_step",
            HandlerKind::ButtonClick => "on_message_button_click",
            HandlerKind::Deploy => "on_deploy",
            HandlerKind::IdeWrite => "on_ide_write",
            HandlerKind::TerminalCommand => "on_terminal_command",
        }
    }
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
