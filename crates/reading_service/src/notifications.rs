use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationKind {
    DailyReminder,
    Milestone,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub scheduled_for: DateTime<Utc>,
}

/// Platform-specific notification adapters will implement this trait.
pub trait NotificationSink: Send + Sync {
    fn schedule(&self, notification: NotificationRequest);
    fn cancel(&self, kind: NotificationKind);
}

/// Keeps every request in memory; handy for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    scheduled: Mutex<Vec<NotificationRequest>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        self.scheduled.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn schedule(&self, notification: NotificationRequest) {
        let mut scheduled = self.scheduled.lock();
        if notification.kind == NotificationKind::DailyReminder {
            scheduled.retain(|pending| pending.kind != NotificationKind::DailyReminder);
        }
        scheduled.push(notification);
    }

    fn cancel(&self, kind: NotificationKind) {
        self.scheduled.lock().retain(|pending| pending.kind != kind);
    }
}
