use serde::{Deserialize, Serialize};

use crate::plan::TOTAL_DAYS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Milestone {
    Complete,
    SixtyDays,
    OneMonth,
    Weekly(u32),
    Progress,
}

impl Milestone {
    /// Resolves a completion count. Exact 90/60/30 win over the weekly rule.
    pub fn for_count(completed_count: u32) -> Self {
        match completed_count {
            TOTAL_DAYS => Milestone::Complete,
            60 => Milestone::SixtyDays,
            30 => Milestone::OneMonth,
            n if n > 0 && n % 7 == 0 => Milestone::Weekly(n),
            _ => Milestone::Progress,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Milestone::Complete => "🏆 CHALLENGE COMPLETE! Amazing!".to_string(),
            Milestone::SixtyDays => "🔥 60 Days! You're on Fire!".to_string(),
            Milestone::OneMonth => "🎉 30 Days Complete! One Month Strong!".to_string(),
            Milestone::Weekly(count) => format!("✨ {count} Days! One Week Milestone!"),
            Milestone::Progress => "⭐ Great Progress!".to_string(),
        }
    }

    pub fn is_celebration(&self) -> bool {
        !matches!(self, Milestone::Progress)
    }
}

pub fn milestone_message(completed_count: u32) -> String {
    Milestone::for_count(completed_count).message()
}
