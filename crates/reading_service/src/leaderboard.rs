use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use reading_core::{ActivityEvent, DerivedState, Participant};

use crate::error::StoreError;
use crate::store::ReadingStore;

pub const DEFAULT_REFRESH_INTERVAL_SECS: i64 = 30;
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

/// Dashboard numbers for one participant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub current_day: u32,
    pub completed_count: u32,
    pub current_streak: u32,
    pub rank: Option<usize>,
    pub total_participants: usize,
}

/// Most completed days first, then longest streak, then identity.
pub fn rank_participants(mut participants: Vec<Participant>) -> Vec<Participant> {
    participants.sort_by(|a, b| {
        b.completed_count
            .cmp(&a.completed_count)
            .then_with(|| b.current_streak.cmp(&a.current_streak))
            .then_with(|| a.identity.cmp(&b.identity))
    });
    participants
}

/// Polled snapshot of every participant and the shared activity feed.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    participants: Vec<Participant>,
    activities: Vec<ActivityEvent>,
    refreshed_at: Option<DateTime<Utc>>,
    refresh_interval: Duration,
    activity_limit: usize,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(
            Duration::seconds(DEFAULT_REFRESH_INTERVAL_SECS),
            DEFAULT_ACTIVITY_LIMIT,
        )
    }
}

impl Leaderboard {
    pub fn new(refresh_interval: Duration, activity_limit: usize) -> Self {
        Self {
            participants: Vec::new(),
            activities: Vec::new(),
            refreshed_at: None,
            refresh_interval,
            activity_limit,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn activities(&self) -> &[ActivityEvent] {
        &self.activities
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.refreshed_at {
            Some(last) => now - last >= self.refresh_interval,
            None => true,
        }
    }

    /// Reloads participants and activity. On failure the previous snapshot is kept.
    #[instrument(skip(self, store))]
    pub fn refresh(
        &mut self,
        store: &dyn ReadingStore,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let participants = store.load_participants()?;
        let activities = store.load_recent_activity(self.activity_limit)?;
        self.participants = rank_participants(participants);
        self.activities = activities;
        self.refreshed_at = Some(now);
        tracing::debug!(participants = self.participants.len(), "leaderboard refreshed");
        Ok(())
    }

    /// Refreshes only once the polling interval has elapsed. Returns whether it reloaded.
    pub fn poll(
        &mut self,
        store: &dyn ReadingStore,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        if !self.needs_refresh(now) {
            return Ok(false);
        }
        self.refresh(store, now)?;
        Ok(true)
    }

    /// 1-based rank of `identity`, if it is on the board.
    pub fn position(&self, identity: &str) -> Option<usize> {
        self.participants
            .iter()
            .position(|participant| participant.identity == identity)
            .map(|index| index + 1)
    }

    pub fn total_group_days(&self) -> u32 {
        self.participants
            .iter()
            .map(|participant| participant.completed_count)
            .sum()
    }

    pub fn stats(&self, identity: &str, derived: &DerivedState) -> Stats {
        Stats {
            current_day: derived.current_day,
            completed_count: derived.completed_count,
            current_streak: derived.current_streak,
            rank: self.position(identity),
            total_participants: self.participants.len(),
        }
    }
}
