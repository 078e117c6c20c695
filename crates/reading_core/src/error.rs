use thiserror::Error;

/// Rejected input. Raised before any state is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("day {day} is outside the reading plan (1-{total})")]
    DayOutOfRange { day: u32, total: u32 },
    #[error("passage for day {day} must not be empty")]
    EmptyPassage { day: u32 },
    #[error("no reading recorded for day {day}")]
    UnknownEntry { day: u32 },
    #[error("invalid reminder time `{0}`, expected HH:MM")]
    InvalidReminderTime(String),
}
