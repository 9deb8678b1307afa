//! The sliding window of recent messages.

use std::collections::VecDeque;

/// The most recent messages, oldest first, bounded by a capacity.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    messages: VecDeque<String>,
    capacity: usize,
}

impl ConversationWindow {
    /// Create an empty window holding at most `capacity` messages (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a message, evicting the oldest when full. The message is
    /// trimmed; blank messages are ignored.
    pub fn push(&mut self, message: &str) {
        let message = message.trim();
        if message.is_empty() {
            return;
        }
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message.to_string());
    }

    /// Iterate over the messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// Number of messages held.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no message is held.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Maximum number of messages held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
