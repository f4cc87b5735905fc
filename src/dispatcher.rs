//! The dispatch loop: decode, route, invoke, reply.
//!
//! Messages are handled strictly one at a time. Each routed key is checked
//! independently, so a key may trigger more than one branch. Handler
//! failures (errors and panics) are logged with the handler name and never
//! leave the turn; only `deploy.start` reports them to the host, through the
//! `deploy.finish` reply.

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::error::{HandlerResult, Result};
use crate::handler::{invoke, EventHandlers, HandlerKind};
use crate::message::{keys, ButtonClick, FsmUpdate, HistoryBash, IdeWrite, InboundMessage, OutboundMessage};
use crate::protocol::RawMessage;
use crate::state::SessionState;
use crate::transport::MessageSource;
use crate::writer::WriterHandle;

/// Routes inbound messages to the handler set and owns the session state.
pub struct Dispatcher {
    handlers: Box<dyn EventHandlers>,
    state: SessionState,
    writer: WriterHandle,
}

impl Dispatcher {
    /// Create a dispatcher at step 0.
    pub fn new(handlers: Box<dyn EventHandlers>, writer: WriterHandle) -> Self {
        Self {
            handlers,
            state: SessionState::new(),
            writer,
        }
    }

    /// Current workflow step.
    #[inline]
    pub fn current_state(&self) -> i64 {
        self.state.current()
    }

    /// Process one raw message to completion.
    ///
    /// Malformed messages are logged and dropped. Nothing here returns an
    /// error: one bad message or handler never affects the next.
    pub async fn route(&mut self, raw: &RawMessage) {
        let message = match InboundMessage::decode(raw) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("Dropping message: {}", e);
                return;
            }
        };

        let key = message.key.as_str();

        if key == keys::FSM_UPDATE {
            self.on_fsm_update(&message);
        }

        if key == keys::BUTTON_CLICK {
            self.on_button_click(&message);
        }

        if key == keys::DEPLOY_START {
            self.on_deploy_start().await;
        }

        if key == keys::IDE_WRITE {
            self.on_ide_write(&message);
        }

        if key == keys::HISTORY_BASH {
            self.on_history_bash(&message);
        }

        if !keys::is_routed(key) {
            tracing::debug!(key = %key, "Ignoring message with unrouted key");
        }
    }

    /// Run the loop until `shutdown` resolves or the source is exhausted.
    ///
    /// Shutdown is only observed while waiting for a message, so the turn
    /// in progress always completes.
    ///
    /// # Errors
    ///
    /// Returns the source's error if reading fails (e.g. a framing violation).
    pub async fn run<S, F>(&mut self, source: &mut S, shutdown: F) -> Result<()>
    where
        S: MessageSource,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let next = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, leaving dispatch loop");
                    return Ok(());
                }
                next = source.next_message() => next?,
            };

            match next {
                Some(raw) => {
                    self.route(&raw).await;
                    // A buffered burst never suspends on its own; the writer
                    // must get a turn or handler commands fill its queue.
                    tokio::task::yield_now().await;
                }
                None => {
                    tracing::info!("Message bus closed, leaving dispatch loop");
                    return Ok(());
                }
            }
        }
    }

    fn on_fsm_update(&mut self, message: &InboundMessage) {
        let Some(update) = typed_body::<FsmUpdate>(message) else {
            return;
        };

        self.state.set(update.current_state);
        tracing::debug!(current_state = update.current_state, "Session state updated");

        report(
            HandlerKind::Step,
            invoke(|| self.handlers.on_step(update.current_state)),
        );
    }

    fn on_button_click(&mut self, message: &InboundMessage) {
        let Some(click) = typed_body::<ButtonClick>(message) else {
            return;
        };

        let current = self.state.current();
        report(
            HandlerKind::ButtonClick,
            invoke(|| self.handlers.on_message_button_click(current, &click.value)),
        );
    }

    async fn on_deploy_start(&mut self) {
        let current = self.state.current();

        let success = match invoke(|| self.handlers.on_deploy(current)) {
            Ok(success) => success,
            Err(e) => {
                tracing::error!(handler = %HandlerKind::Deploy, "{}", e);
                false
            }
        };

        if !success {
            tracing::warn!(current_state = current, "Deploy failed");
        }

        if let Err(e) = self.writer.send(OutboundMessage::deploy_finish(success)).await {
            tracing::error!("Failed to send deploy.finish: {}", e);
        }
    }

    fn on_ide_write(&mut self, message: &InboundMessage) {
        let Some(write) = typed_body::<IdeWrite>(message) else {
            return;
        };

        let current = self.state.current();
        report(
            HandlerKind::IdeWrite,
            invoke(|| self.handlers.on_ide_write(current, &write.filename, &write.content)),
        );
    }

    fn on_history_bash(&mut self, message: &InboundMessage) {
        let Some(bash) = typed_body::<HistoryBash>(message) else {
            return;
        };

        let current = self.state.current();
        report(
            HandlerKind::TerminalCommand,
            invoke(|| self.handlers.on_terminal_command(current, &bash.command)),
        );
    }
}

fn typed_body<T: DeserializeOwned>(message: &InboundMessage) -> Option<T> {
    match message.body_as() {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::error!("Dropping message: {}", e);
            None
        }
    }
}

fn report(kind: HandlerKind, result: HandlerResult) {
    if let Err(e) = result {
        tracing::error!(handler = %kind, "{}", e);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
