use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::plan::TOTAL_DAYS;

/// A user's recorded reading for one plan day. At most one per day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub day: u32,
    pub passage: String,
    #[serde(default)]
    pub notes: String,
    pub completed: bool,
    pub recorded_at: DateTime<Utc>,
}

impl Entry {
    /// Builds a completed entry after validating the day and trimming text fields.
    pub fn completed(
        day: u32,
        passage: &str,
        notes: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        validate_day(day)?;
        let passage = passage.trim();
        if passage.is_empty() {
            return Err(ValidationError::EmptyPassage { day });
        }
        Ok(Self {
            day,
            passage: passage.to_string(),
            notes: notes.trim().to_string(),
            completed: true,
            recorded_at,
        })
    }

    /// Calendar date used for streak math.
    pub fn recorded_date(&self) -> NaiveDate {
        self.recorded_at.date_naive()
    }
}

pub fn validate_day(day: u32) -> Result<(), ValidationError> {
    if (1..=TOTAL_DAYS).contains(&day) {
        Ok(())
    } else {
        Err(ValidationError::DayOutOfRange {
            day,
            total: TOTAL_DAYS,
        })
    }
}

/// Feed item appended once per successful save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEvent {
    pub identity: String,
    pub day: u32,
    pub passage: String,
    #[serde(default)]
    pub notes: String,
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn for_entry(
        identity: impl Into<String>,
        entry: &Entry,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity: identity.into(),
            day: entry.day,
            passage: entry.passage.clone(),
            notes: entry.notes.clone(),
            occurred_at,
        }
    }
}

/// Leaderboard row projected from another user's derived state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub identity: String,
    pub completed_count: u32,
    pub current_streak: u32,
}
