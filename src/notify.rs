//! Turning the outcome of user actions into notifications.

use std::sync::Mutex;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{FinTrackError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Somewhere notifications are shown.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Collects notifications in memory.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Remove and return everything collected so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

/// Writes notifications to the log; used by the command-line tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => error!("{}", notification.message),
            NotificationKind::Warning => warn!("{}", notification.message),
            NotificationKind::Success | NotificationKind::Info => info!("{}", notification.message),
        }
    }
}

/// Report the outcome of a user action.
///
/// On success `success` is shown and the value returned. On failure the
/// error is logged, the service's own message (or `fallback` when the error
/// carries none) is shown, and `None` is returned so the caller keeps its
/// previous state.
pub fn report<T>(
    notifier: &dyn Notifier,
    result: Result<T>,
    success: &str,
    fallback: &str,
) -> Option<T> {
    match result {
        Ok(value) => {
            notifier.notify(Notification::new(NotificationKind::Success, success));
            Some(value)
        }
        Err(e) => {
            error!(error = %e, "{}", fallback);
            let message = match &e {
                FinTrackError::Remote { message, .. } | FinTrackError::Validation(message)
                    if !message.trim().is_empty() =>
                {
                    message.clone()
                }
                _ => fallback.to_string(),
            };
            notifier.notify(Notification::new(NotificationKind::Error, message));
            None
        }
    }
}
