use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of diagnostic messages kept per user.
pub const MESSAGE_LOG_CAPACITY: usize = 15;

/// Bounded, oldest-first log of recent diagnostic messages for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct MessageLog {
    entries: VecDeque<String>,
}

impl MessageLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MESSAGE_LOG_CAPACITY),
        }
    }

    /// Appends a message, evicting the oldest once the log is full.
    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == MESSAGE_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<String>> for MessageLog {
    fn from(messages: Vec<String>) -> Self {
        let mut log = Self::new();
        for message in messages {
            log.push(message);
        }
        log
    }
}

impl From<MessageLog> for Vec<String> {
    fn from(log: MessageLog) -> Self {
        log.entries.into()
    }
}
