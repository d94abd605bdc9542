//! Logging collaborators handed to a settings store
//!
//! A store only ever needs an `info` capability, and only while it is being
//! built. Hosts that have not installed a subscriber yet can pass an
//! [`EarlyLogger`] explicitly; everything else goes through `tracing`.

use std::sync::Mutex;

/// Minimal logger used before the host's real logging is available
pub trait EarlyLogger: Send + Sync {
    fn info(&self, message: &str);
}

/// Default logger, forwarding to the `tracing` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl EarlyLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "runconf", "{}", message);
    }
}

/// Keeps messages in memory so a host can replay them once its
/// subscriber is installed.
#[derive(Debug, Default)]
pub struct BufferedLogger {
    lines: Mutex<Vec<String>>,
}

impl BufferedLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the buffered messages, oldest first
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Take the buffered messages, leaving the buffer empty
    pub fn drain(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(mut lines) => std::mem::take(&mut *lines),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Forward every buffered message to `tracing` and clear the buffer
    pub fn replay(&self) {
        for line in self.drain() {
            TracingLogger.info(&line);
        }
    }
}

impl EarlyLogger for BufferedLogger {
    fn info(&self, message: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
