use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const REMINDER_TITLE: &str = "📖 Time to Read Your Bible!";
pub const REMINDER_BODY: &str = "Don't break your streak. Open the app and log today's reading.";

/// Daily reminder preference. Disabled at 08:00 until the user opts in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub time: NaiveTime,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
        }
    }
}

impl ReminderSettings {
    pub fn at(time: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            enabled: true,
            time: parse_reminder_time(time)?,
        })
    }

    /// Next time the reminder fires: later today, or tomorrow once today's slot has passed.
    pub fn next_occurrence(&self, now: NaiveDateTime) -> NaiveDateTime {
        let target = now.date().and_time(self.time);
        if target <= now {
            target + Duration::days(1)
        } else {
            target
        }
    }
}

pub fn parse_reminder_time(raw: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidReminderTime(raw.to_string()))
}
