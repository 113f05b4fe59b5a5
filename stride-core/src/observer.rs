//! Count-change fan-out
//!
//! Handlers run in registration order. A handler that fails is logged and
//! skipped; it never stops delivery to the rest and stays registered.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Failure reported by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverError {
    message: String,
}

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Handle returned on registration, used to remove the handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObserverId(u32);

type Handler = Box<dyn FnMut(u32) -> Result<(), ObserverError>>;

/// Ordered set of count handlers
#[derive(Default)]
pub struct ObserverList {
    handlers: Vec<(ObserverId, Handler)>,
    next_id: u32,
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.handlers.len())
            .finish()
    }
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler called with each new count
    pub fn add<F>(&mut self, handler: F) -> ObserverId
    where
        F: FnMut(u32) -> Result<(), ObserverError> + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Unregister; returns whether the handler was present
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver `count` to every handler
    ///
    /// Returns the number of handlers that failed.
    pub fn notify(&mut self, count: u32) -> usize {
        let mut failures = 0;
        for (id, handler) in self.handlers.iter_mut() {
            if let Err(e) = handler(count) {
                failures += 1;
                tracing::warn!(observer = id.0, error = %e, "step observer failed");
            }
        }
        failures
    }
}
