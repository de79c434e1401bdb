// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User-facing notifications ("toasts").
//!
//! Classification code never shows anything itself; it hands a
//! [`Notification`] to whatever [`Notifier`] the shell was built with.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Success => write!(f, "ok"),
            NotificationLevel::Info => write!(f, "info"),
            NotificationLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Prints notifications to stderr, one per line.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("[{}] {}", notification.level, notification.message);
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything notified so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::error("a"));
        notifier.notify(Notification::success("b"));

        let seen = notifier.notifications();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], Notification::error("a"));
        assert_eq!(seen[1].level, NotificationLevel::Success);
    }

    #[test]
    fn level_display() {
        assert_eq!(NotificationLevel::Error.to_string(), "error");
        assert_eq!(NotificationLevel::Success.to_string(), "ok");
    }
}
