//! Step Guide - a minimal tutorial handler set.
//!
//! `TFW_EVENT_HANDLERS` points at a text file with one bot message per
//! line; line N is sent when the workflow reaches step N.
//!
//! This example demonstrates:
//! - Loading handler data from the configured handler source
//! - Sending commands from handlers with a `Commander`
//! - Answering `deploy.start`
//!
//! # Running
//!
//! ```text
//! printf 'Welcome!\nOpen app.py\nDeploy when ready\n' > steps.txt
//! TFW_EVENT_HANDLERS=steps.txt TFW_BUS_ADDR=tcp://127.0.0.1:7654 \
//!     cargo run --example step_guide
//! ```

use std::path::Path;
use std::process::ExitCode;

use serde_json::Value;
use tfw_sdk::{Commander, EventHandlers, HandlerResult, Result, SdkError};

struct StepGuide {
    steps: Vec<String>,
    commander: Commander,
}

impl EventHandlers for StepGuide {
    fn on_step(&mut self, current_state: i64) -> HandlerResult {
        let index = usize::try_from(current_state).ok();

        if let Some(message) = index.and_then(|i| self.steps.get(i)) {
            self.commander.message_send(message.as_str())?;
        }

        if index == Some(self.steps.len() - 1) {
            self.commander.ide_show_deploy_button(true)?;
        }
        Ok(())
    }

    fn on_message_button_click(&mut self, current_state: i64, value: &Value) -> HandlerResult {
        self.commander
            .console_write(format!("[step {}] button: {}", current_state, value))?;
        Ok(())
    }

    fn on_deploy(&mut self, _current_state: i64) -> HandlerResult<bool> {
        self.commander.message_send("Deployed, nice work!")?;
        Ok(true)
    }

    fn on_ide_write(&mut self, _current_state: i64, filename: &str, _content: &str) -> HandlerResult {
        self.commander.console_write(format!("saved {}", filename))?;
        Ok(())
    }

    fn on_terminal_command(&mut self, _current_state: i64, command: &str) -> HandlerResult {
        self.commander.console_write(format!("$ {}", command))?;
        Ok(())
    }
}

fn load(path: &Path, commander: Commander) -> Result<Box<dyn EventHandlers>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SdkError::HandlerLoad(format!("{}: {}", path.display(), e)))?;

    let steps: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    if steps.is_empty() {
        return Err(SdkError::HandlerLoad(format!("{} has no steps", path.display())));
    }

    Ok(Box::new(StepGuide { steps, commander }))
}

#[tokio::main]
async fn main() -> ExitCode {
    tfw_sdk::bootstrap(load).await
}
