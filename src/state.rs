//! Session state - the current workflow step.
//!
//! Only the dispatcher's `fsm.update` branch writes it; every handler reads
//! it as its first argument.

/// Current workflow step shared across handler invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    current_state: i64,
}

impl SessionState {
    /// Create a session at step 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current step.
    #[inline]
    pub fn current(&self) -> i64 {
        self.current_state
    }

    pub(crate) fn set(&mut self, current_state: i64) {
        self.current_state = current_state;
    }
}
