//! Event bus
//!
//! Name-keyed publish/subscribe used for media lifecycle notifications and
//! the synthetic `updateui` / `fatalerror` events. Handlers of one name run
//! in subscription order and are isolated from each other: an `Err` or a
//! panic in one handler is logged and the next handler still runs.

use crate::error::{ControlError, HandlerError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Synthetic event published after every reconciliation pass
pub const UPDATE_UI: &str = "updateui";

/// Synthetic event published once when every source failed
pub const FATAL_ERROR: &str = "fatalerror";

/// Result returned by handlers
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// A subscribed handler; receives the bus owner and the published arguments
pub type Handler<C> = Box<dyn FnMut(&C, &[Value]) -> HandlerResult>;

/// Whether `name` only uses alphanumerics, `.`, `*` and `-`
///
/// `*` is accepted but carries no wildcard meaning: names match exactly.
pub fn is_valid_event_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '-'))
}

/// Ordered handler table keyed by event name
pub struct EventBus<C> {
    handlers: HashMap<String, Vec<Handler<C>>>,
}

impl<C> EventBus<C> {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Append a handler to `name`'s list
    pub fn subscribe<F>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: FnMut(&C, &[Value]) -> HandlerResult + 'static,
    {
        if !is_valid_event_name(name) {
            return Err(ControlError::InvalidSubscription {
                name: name.to_string(),
            });
        }
        self.handlers
            .entry(name.to_string())
            .or_default()
            .push(Box::new(handler));
        Ok(())
    }

    /// Invoke every handler of `name` with `owner` as receiver
    ///
    /// Returns the number of handlers that completed successfully.
    pub fn publish(&mut self, owner: &C, name: &str, args: &[Value]) -> usize {
        let Some(handlers) = self.handlers.get_mut(name) else {
            return 0;
        };

        let mut completed = 0;
        for (position, handler) in handlers.iter_mut().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| handler(owner, args))) {
                Ok(Ok(())) => completed += 1,
                Ok(Err(e)) => {
                    tracing::warn!(event = %name, position, error = %e, "event handler failed");
                }
                Err(_) => {
                    tracing::warn!(event = %name, position, "event handler panicked");
                }
            }
        }
        completed
    }

    /// Number of handlers subscribed to `name`
    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<(&str, usize)> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        names.sort_unstable();
        f.debug_struct("EventBus").field("handlers", &names).finish()
    }
}
