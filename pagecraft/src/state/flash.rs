//! One-time messages shown on the next rendered page

use parking_lot::Mutex;
use std::sync::Arc;

/// Severity of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    /// Something worked
    Success,
    /// Neutral notice
    Info,
    /// Something went wrong
    Error,
}

impl FlashLevel {
    /// CSS class for this level
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Info => "flash-info",
            Self::Error => "flash-error",
        }
    }
}

/// A message displayed once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    /// Severity
    pub level: FlashLevel,
    /// Text
    pub message: String,
}

impl FlashMessage {
    /// A success message
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    /// An informational message
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    /// An error message
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// CSS class for the message's level
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        self.level.css_class()
    }
}

/// Messages queued for the next page render
#[derive(Debug, Clone, Default)]
pub struct FlashQueue {
    messages: Arc<Mutex<Vec<FlashMessage>>>,
}

impl FlashQueue {
    /// Queue a message
    pub fn push(&self, message: FlashMessage) {
        self.messages.lock().push(message);
    }

    /// Take every queued message, leaving the queue empty
    #[must_use]
    pub fn drain(&self) -> Vec<FlashMessage> {
        std::mem::take(&mut *self.messages.lock())
    }
}
