pub mod entry;
pub mod error;
pub mod milestone;
pub mod plan;
pub mod progress;
pub mod reminder;
pub mod streak;

pub use crate::entry::{ActivityEvent, Entry, Participant};
pub use crate::error::ValidationError;
pub use crate::milestone::{milestone_message, Milestone};
pub use crate::plan::{plan_entry_for_day, scheduled_date_string, PlanEntry, TOTAL_DAYS};
pub use crate::progress::{resolve_current_day, resolve_missed_days, DerivedState};
pub use crate::streak::compute_streak;
