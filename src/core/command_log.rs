use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use derive_more::Display;

use crate::{prelude::*, telemetry::CommandMessage};

#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum Kind {
    #[display("info")]
    Info,

    #[display("success")]
    Success,

    #[display("warning")]
    Warning,

    #[display("error")]
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub kind: Kind,
}

/// Bounded log of device command messages, newest last.
#[must_use]
#[derive(Debug)]
pub struct CommandLog {
    entries: VecDeque<CommandLogEntry>,
    capacity: usize,
}

impl CommandLog {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>, message: impl Into<String>, kind: Kind) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(CommandLogEntry { timestamp, message: message.into(), kind });
    }

    /// Apply a message published by the device.
    ///
    /// Returns the appended entry, or `None` if the message cleared the log.
    pub fn apply_device_message(&mut self, message: &CommandMessage) -> Option<&CommandLogEntry> {
        if message.is_clear_log() {
            debug!(device_id = %message.device_id, "clearing the command log");
            self.clear();
            return None;
        }
        self.push(message.received_at, message.text.as_str(), Kind::Info);
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CommandLogEntry> {
        self.entries.iter()
    }
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}
