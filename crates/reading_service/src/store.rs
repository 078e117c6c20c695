use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use reading_core::{ActivityEvent, Entry, Participant};

use crate::error::StoreError;

/// Change to a single day's entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntryChange {
    Upsert(Entry),
    Remove { day: u32 },
}

impl EntryChange {
    pub fn day(&self) -> u32 {
        match self {
            EntryChange::Upsert(entry) => entry.day,
            EntryChange::Remove { day } => *day,
        }
    }

    pub fn apply_to(&self, entries: &mut BTreeMap<u32, Entry>) {
        match self {
            EntryChange::Upsert(entry) => {
                entries.insert(entry.day, entry.clone());
            }
            EntryChange::Remove { day } => {
                entries.remove(day);
            }
        }
    }
}

/// Everything one save/edit/delete writes. Stores must apply it all or nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mutation {
    pub user_id: String,
    pub display_name: String,
    pub change: EntryChange,
    pub completed_count: u32,
    pub current_streak: u32,
    pub activity: Option<ActivityEvent>,
    pub committed_at: DateTime<Utc>,
}

/// Persistence collaborator for entries, summaries and the activity feed.
pub trait ReadingStore: Send + Sync {
    fn load_entries(&self, user_id: &str) -> Result<Vec<Entry>, StoreError>;
    fn commit_mutation(&self, mutation: &Mutation) -> Result<(), StoreError>;
    fn load_participants(&self) -> Result<Vec<Participant>, StoreError>;
    fn load_recent_activity(&self, limit: usize) -> Result<Vec<ActivityEvent>, StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub display_name: String,
    pub completed_count: u32,
    pub current_streak: u32,
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entries: BTreeMap<u32, Entry>,
}

/// Whole-store snapshot shared by the in-memory and JSON-file stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreDocument {
    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,
    #[serde(default)]
    pub activities: Vec<ActivityEvent>,
}

impl StoreDocument {
    pub fn apply(&mut self, mutation: &Mutation) {
        let user = self.users.entry(mutation.user_id.clone()).or_default();
        user.display_name = mutation.display_name.clone();
        mutation.change.apply_to(&mut user.entries);
        user.completed_count = mutation.completed_count;
        user.current_streak = mutation.current_streak;
        user.last_active = Some(mutation.committed_at);
        if let Some(activity) = &mutation.activity {
            self.activities.push(activity.clone());
        }
    }

    pub fn entries(&self, user_id: &str) -> Vec<Entry> {
        self.users
            .get(user_id)
            .map(|user| user.entries.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.users
            .values()
            .map(|user| Participant {
                identity: user.display_name.clone(),
                completed_count: user.completed_count,
                current_streak: user.current_streak,
            })
            .collect()
    }

    /// Newest first. Events sharing a timestamp keep newest-appended first.
    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityEvent> {
        let mut events: Vec<ActivityEvent> = self.activities.iter().rev().cloned().collect();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        events.truncate(limit);
        events
    }
}

/// In-process store. `set_offline(true)` makes every call fail, simulating an outage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<StoreDocument>,
    offline: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    pub fn snapshot(&self) -> StoreDocument {
        self.document.read().clone()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if *self.offline.read() {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

impl ReadingStore for MemoryStore {
    fn load_entries(&self, user_id: &str) -> Result<Vec<Entry>, StoreError> {
        self.ensure_online()?;
        Ok(self.document.read().entries(user_id))
    }

    fn commit_mutation(&self, mutation: &Mutation) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.document.write().apply(mutation);
        Ok(())
    }

    fn load_participants(&self) -> Result<Vec<Participant>, StoreError> {
        self.ensure_online()?;
        Ok(self.document.read().participants())
    }

    fn load_recent_activity(&self, limit: usize) -> Result<Vec<ActivityEvent>, StoreError> {
        self.ensure_online()?;
        Ok(self.document.read().recent_activity(limit))
    }
}

/// Single JSON document on disk. Commits write a sibling temp file and rename it
/// over the original, so a failed write leaves the previous document intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<StoreDocument>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let document = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                StoreDocument::default()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            StoreDocument::default()
        };
        tracing::debug!(path = %path.display(), users = document.users.len(), "opened reading store");
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }

    fn persist(&self, document: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_vec_pretty(document)?;
        let staging = self.staging_path();
        let written = fs::write(&staging, raw).and_then(|()| fs::rename(&staging, &self.path));
        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&staging) {
                tracing::debug!(%cleanup, path = %staging.display(), "staging file not removed");
            }
            return Err(err.into());
        }
        Ok(())
    }
}

impl ReadingStore for JsonFileStore {
    fn load_entries(&self, user_id: &str) -> Result<Vec<Entry>, StoreError> {
        Ok(self.document.lock().entries(user_id))
    }

    fn commit_mutation(&self, mutation: &Mutation) -> Result<(), StoreError> {
        let mut current = self.document.lock();
        let mut next = current.clone();
        next.apply(mutation);
        self.persist(&next)?;
        *current = next;
        Ok(())
    }

    fn load_participants(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.document.lock().participants())
    }

    fn load_recent_activity(&self, limit: usize) -> Result<Vec<ActivityEvent>, StoreError> {
        Ok(self.document.lock().recent_activity(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::clock::FixedClock;
    use crate::error::MutationError;
    use crate::service::ReadingService;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 3, hour, 0, 0).unwrap()
    }

    fn save(user: &str, day: u32, count: u32, when: DateTime<Utc>) -> Mutation {
        let entry = Entry::completed(day, "Hebrews 1-6", "", when).unwrap();
        Mutation {
            user_id: user.to_string(),
            display_name: format!("{user}-name"),
            activity: Some(ActivityEvent::for_entry(format!("{user}-name"), &entry, when)),
            change: EntryChange::Upsert(entry),
            completed_count: count,
            current_streak: 1,
            committed_at: when,
        }
    }

    #[test]
    fn apply_updates_entries_counters_and_feed_together() {
        let mut doc = StoreDocument::default();
        doc.apply(&save("ana", 1, 1, at(8)));
        let user = &doc.users["ana"];
        assert_eq!(user.entries.len(), 1);
        assert_eq!(user.completed_count, 1);
        assert_eq!(user.last_active, Some(at(8)));
        assert_eq!(doc.activities.len(), 1);

        doc.apply(&Mutation {
            change: EntryChange::Remove { day: 1 },
            completed_count: 0,
            current_streak: 0,
            activity: None,
            ..save("ana", 1, 0, at(9))
        });
        assert!(doc.users["ana"].entries.is_empty());
        assert_eq!(doc.users["ana"].completed_count, 0);
        assert_eq!(doc.activities.len(), 1, "feed is append-only");
    }

    #[test]
    fn recent_activity_is_newest_first_and_limited() {
        let mut doc = StoreDocument::default();
        doc.apply(&save("ana", 1, 1, at(8)));
        doc.apply(&save("ben", 1, 1, at(10)));
        doc.apply(&save("cy", 1, 1, at(9)));
        let recent = doc.recent_activity(2);
        let names: Vec<&str> = recent.iter().map(|event| event.identity.as_str()).collect();
        assert_eq!(names, vec!["ben-name", "cy-name"]);
    }

    #[test]
    fn memory_store_rejects_calls_while_offline() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.commit_mutation(&save("ana", 1, 1, at(8))),
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.load_participants().is_err());
        store.set_offline(false);
        store.commit_mutation(&save("ana", 1, 1, at(8))).unwrap();
        assert_eq!(store.load_entries("ana").unwrap().len(), 1);
        assert!(store.load_entries("nobody").unwrap().is_empty());
    }

    #[test]
    fn json_store_survives_reopen() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("data").join("readings.json");
        {
            let store = JsonFileStore::open(&path).expect("open store");
            store.commit_mutation(&save("ana", 1, 1, at(8))).unwrap();
            store
                .commit_mutation(&save("ana", 2, 2, at(8) + Duration::days(1)))
                .unwrap();
        }
        let reopened = JsonFileStore::open(&path).expect("reopen store");
        let entries = reopened.load_entries("ana").unwrap();
        assert_eq!(entries.iter().map(|e| e.day).collect::<Vec<_>>(), vec![1, 2]);
        let participants = reopened.load_participants().unwrap();
        assert_eq!(participants[0].completed_count, 2);
        assert_eq!(reopened.load_recent_activity(10).unwrap()[0].day, 2);
    }

    #[test]
    fn json_store_failed_rename_keeps_previous_document() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("readings.json");
        let store = Arc::new(JsonFileStore::open(&path).expect("open store"));
        let clock = Arc::new(FixedClock::new(at(8)));
        let service = ReadingService::builder()
            .user("ana", "ana-name")
            .store(store.clone())
            .with_clock(clock.clone())
            .build()
            .expect("build service");
        service.save(1, "Romans 1-8", "", None).unwrap();

        // A non-empty directory at the target makes the rename fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(matches!(
            store.commit_mutation(&save("ana", 2, 2, at(9))),
            Err(StoreError::Io(_))
        ));
        assert!(!store.staging_path().exists());
        let days: Vec<u32> = store.load_entries("ana").unwrap().iter().map(|e| e.day).collect();
        assert_eq!(days, vec![1]);
        assert_eq!(store.load_recent_activity(10).unwrap().len(), 1);

        clock.set(at(10));
        assert!(matches!(
            service.save(2, "Romans 9-16", "", None),
            Err(MutationError::Persistence(_))
        ));
        assert_eq!(service.entries().len(), 1);
        assert_eq!(service.derived_state().completed_count, 1);
        assert_eq!(store.load_participants().unwrap()[0].completed_count, 1);
        assert!(!store.staging_path().exists());
    }

    #[test]
    fn json_store_rejects_garbage_document() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Format(_))));
    }
}
