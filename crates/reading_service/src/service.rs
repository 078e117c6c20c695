use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::instrument;

use reading_core::{
    entry::validate_day,
    plan::reading_plan,
    progress::{completed_days, plan_calendar, DayCell},
    reminder::{ReminderSettings, REMINDER_BODY, REMINDER_TITLE},
    resolve_missed_days, ActivityEvent, DerivedState, Entry, Milestone, PlanEntry,
    ValidationError,
};

use crate::{
    clock::{Clock, SystemClock},
    error::MutationError,
    notifications::{NotificationKind, NotificationRequest, NotificationSink},
    store::{EntryChange, Mutation, ReadingStore},
};

/// Opaque identity handed over by the sign-in layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub display_name: String,
}

/// One user's reading log plus the orchestration around save, edit and delete.
pub struct ReadingService {
    user: UserIdentity,
    store: Arc<dyn ReadingStore>,
    clock: Arc<dyn Clock>,
    notification_sink: Option<Arc<dyn NotificationSink>>,
    entries: RwLock<BTreeMap<u32, Entry>>,
    writer: Mutex<()>,
}

pub struct ReadingServiceBuilder {
    user: Option<UserIdentity>,
    store: Option<Arc<dyn ReadingStore>>,
    clock: Arc<dyn Clock>,
    notification_sink: Option<Arc<dyn NotificationSink>>,
}

impl ReadingServiceBuilder {
    pub fn new() -> Self {
        Self {
            user: None,
            store: None,
            clock: Arc::new(SystemClock),
            notification_sink: None,
        }
    }

    pub fn user(mut self, user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.user = Some(UserIdentity {
            user_id: user_id.into(),
            display_name: display_name.into(),
        });
        self
    }

    pub fn store(mut self, store: Arc<dyn ReadingStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    /// Builds the service and loads the user's entries from the store.
    pub fn build(self) -> Result<ReadingService> {
        let user = self.user.ok_or_else(|| anyhow!("reading service needs a user"))?;
        let store = self
            .store
            .ok_or_else(|| anyhow!("reading service needs a store"))?;
        let service = ReadingService {
            user,
            store,
            clock: self.clock,
            notification_sink: self.notification_sink,
            entries: RwLock::new(BTreeMap::new()),
            writer: Mutex::new(()),
        };
        service.reload()?;
        Ok(service)
    }
}

impl Default for ReadingServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingService {
    pub fn builder() -> ReadingServiceBuilder {
        ReadingServiceBuilder::new()
    }

    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Replaces the in-memory log with what the store holds.
    pub fn reload(&self) -> Result<()> {
        let _writer = self.writer.lock();
        let loaded = self
            .store
            .load_entries(&self.user.user_id)
            .with_context(|| format!("failed to load readings for `{}`", self.user.user_id))?;
        let mut entries = BTreeMap::new();
        for entry in loaded {
            if validate_day(entry.day).is_err() {
                tracing::warn!(day = entry.day, "ignoring stored reading outside the plan");
                continue;
            }
            entries.insert(entry.day, entry);
        }
        tracing::debug!(user_id = %self.user.user_id, count = entries.len(), "loaded readings");
        *self.entries.write() = entries;
        Ok(())
    }

    /// Entries in day order.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.read().values().cloned().collect()
    }

    pub fn entry(&self, day: u32) -> Option<Entry> {
        self.entries.read().get(&day).cloned()
    }

    /// Derived counters as of the clock's current day.
    pub fn derived_state(&self) -> DerivedState {
        DerivedState::compute(self.entries.read().values(), self.clock.today())
    }

    pub fn current_plan_entry(&self) -> Option<PlanEntry> {
        reading_core::plan_entry_for_day(self.derived_state().current_day)
    }

    /// The recorded entry for the current day, if any.
    pub fn current_entry(&self) -> Option<Entry> {
        self.entry(self.derived_state().current_day)
    }

    pub fn missed_days(&self) -> Vec<PlanEntry> {
        let done = completed_days(self.entries.read().values());
        resolve_missed_days(&done, self.clock.today())
    }

    pub fn calendar(&self) -> Vec<DayCell> {
        plan_calendar(self.entries.read().values(), self.clock.today())
    }

    pub fn plan(&self) -> Vec<PlanEntry> {
        reading_plan().collect()
    }

    pub fn milestone(&self) -> Milestone {
        Milestone::for_count(self.derived_state().completed_count)
    }

    /// Records `day` as read. Replaces any entry already stored for that day.
    #[instrument(skip(self, passage, notes), fields(user_id = %self.user.user_id))]
    pub fn save(
        &self,
        day: u32,
        passage: &str,
        notes: &str,
        recorded_at: Option<DateTime<Utc>>,
    ) -> Result<DerivedState, MutationError> {
        let now = self.clock.now();
        let entry = Entry::completed(day, passage, notes, recorded_at.unwrap_or(now))?;
        let activity = ActivityEvent::for_entry(self.user.display_name.clone(), &entry, now);
        self.commit(EntryChange::Upsert(entry), Some(activity), |_| Ok(()))
    }

    /// Rewrites an existing entry's text and stamps it with the current time.
    #[instrument(skip(self, passage, notes), fields(user_id = %self.user.user_id))]
    pub fn edit(
        &self,
        day: u32,
        passage: &str,
        notes: &str,
    ) -> Result<DerivedState, MutationError> {
        let entry = Entry::completed(day, passage, notes, self.clock.now())?;
        self.commit(EntryChange::Upsert(entry), None, |entries| {
            ensure_present(entries, day)
        })
    }

    #[instrument(skip(self), fields(user_id = %self.user.user_id))]
    pub fn delete(&self, day: u32) -> Result<DerivedState, MutationError> {
        validate_day(day)?;
        self.commit(EntryChange::Remove { day }, None, |entries| {
            ensure_present(entries, day)
        })
    }

    /// Hands the next daily reminder to the sink, or cancels it when disabled.
    pub fn schedule_reminder(&self, settings: &ReminderSettings) -> Option<NotificationRequest> {
        let sink = self.notification_sink.as_ref()?;
        if !settings.enabled {
            sink.cancel(NotificationKind::DailyReminder);
            tracing::info!("daily reminder cancelled");
            return None;
        }
        let next = settings.next_occurrence(self.clock.now().naive_utc());
        let request = NotificationRequest {
            kind: NotificationKind::DailyReminder,
            title: REMINDER_TITLE.to_string(),
            body: REMINDER_BODY.to_string(),
            scheduled_for: next.and_utc(),
        };
        sink.schedule(request.clone());
        tracing::info!(at = %request.scheduled_for, "daily reminder scheduled");
        Some(request)
    }

    /// Runs one mutation: check against the current log, recompute, persist, then
    /// swap the in-memory log. Nothing changes locally unless the store accepts it.
    fn commit(
        &self,
        change: EntryChange,
        activity: Option<ActivityEvent>,
        precondition: impl FnOnce(&BTreeMap<u32, Entry>) -> Result<(), ValidationError>,
    ) -> Result<DerivedState, MutationError> {
        let _writer = self.writer.lock();
        let mut next = self.entries.read().clone();
        precondition(&next)?;
        let previous_completed = completed_days(next.values()).len() as u32;
        let posts_activity = activity.is_some();
        change.apply_to(&mut next);

        let now = self.clock.now();
        let derived = DerivedState::compute(next.values(), now.date_naive());
        let mutation = Mutation {
            user_id: self.user.user_id.clone(),
            display_name: self.user.display_name.clone(),
            change,
            completed_count: derived.completed_count,
            current_streak: derived.current_streak,
            activity,
            committed_at: now,
        };

        if let Err(err) = self.store.commit_mutation(&mutation) {
            tracing::warn!(day = mutation.change.day(), %err, "reading commit failed");
            return Err(err.into());
        }

        *self.entries.write() = next;
        tracing::info!(
            day = mutation.change.day(),
            completed = derived.completed_count,
            streak = derived.current_streak,
            current_day = derived.current_day,
            "reading committed"
        );
        if posts_activity && derived.completed_count > previous_completed {
            self.announce_milestone(derived.completed_count, now);
        }
        Ok(derived)
    }

    fn announce_milestone(&self, completed_count: u32, now: DateTime<Utc>) {
        let Some(sink) = &self.notification_sink else {
            return;
        };
        let milestone = Milestone::for_count(completed_count);
        if !milestone.is_celebration() {
            return;
        }
        sink.schedule(NotificationRequest {
            kind: NotificationKind::Milestone,
            title: format!("Day {completed_count} reached"),
            body: milestone.message(),
            scheduled_for: now,
        });
    }
}

fn ensure_present(entries: &BTreeMap<u32, Entry>, day: u32) -> Result<(), ValidationError> {
    if entries.contains_key(&day) {
        Ok(())
    } else {
        Err(ValidationError::UnknownEntry { day })
    }
}
