//! Fault-isolated handler invocation.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{HandlerError, HandlerResult};

/// Run a handler call, turning a panic into [`HandlerError::Panicked`].
///
/// The result is returned as a value; nothing escapes to the caller.
pub fn invoke<T, F>(call: F) -> HandlerResult<T>
where
    F: FnOnce() -> HandlerResult<T>,
{
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through() {
        assert_eq!(invoke(|| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_error_passes_through() {
        let result: HandlerResult = invoke(|| Err(HandlerError::msg("nope")));
        assert_eq!(result.unwrap_err().to_string(), "nope");
    }

    #[test]
    fn test_panic_with_str() {
        let result: HandlerResult = invoke(|| panic!("boom"));
        match result {
            Err(HandlerError::Panicked(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_panic_with_string() {
        let step = 4;
        let result: HandlerResult<bool> = invoke(|| panic!("bad step {}", step));
        match result {
            Err(HandlerError::Panicked(msg)) => assert_eq!(msg, "bad step 4"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
