use crate::diary_entry::{DiaryEntry, EntryKey, Mood};
use crate::error::{DiaryError, Result};
use crate::storage::{Storage, ENTRIES_KEY, QUARANTINE_KEY};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Owns the entry sequence and its persisted mirror. Index 0 is the most
/// recently created entry.
pub struct DiaryState<S: Storage> {
    storage: S,
    entries: Vec<DiaryEntry>,
    quarantined: usize,
}

impl<S: Storage> DiaryState<S> {
    /// Loads the persisted snapshot, falling back to the example entries
    /// when nothing usable is stored.
    pub fn initialize(mut storage: S) -> Result<Self> {
        let loaded = load_entries(&storage)?;
        let quarantined = loaded.rejected.len();

        if !loaded.rejected.is_empty() {
            warn!(count = quarantined, "quarantining malformed diary records");
            quarantine(&mut storage, loaded.rejected)?;
        }

        let mut state = DiaryState {
            storage,
            entries: loaded.entries,
            quarantined,
        };
        if loaded.repaired {
            state.save()?;
        }

        info!(entries = state.entries.len(), "diary loaded");
        Ok(state)
    }

    /// Writes a final snapshot and hands the storage back.
    pub fn dispose(mut self) -> Result<S> {
        self.save()?;
        Ok(self.storage)
    }

    pub fn entries(&self) -> &[DiaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records moved to quarantine during `initialize`.
    pub fn quarantined(&self) -> usize {
        self.quarantined
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn get(&self, key: EntryKey) -> Option<&DiaryEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn position_of(&self, key: EntryKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    pub fn key_at(&self, position: usize) -> Option<EntryKey> {
        self.entries.get(position).map(|e| e.key)
    }

    pub fn create(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        mood: impl Into<Option<Mood>>,
    ) -> Result<EntryKey> {
        let mood = mood.into().ok_or(DiaryError::MissingMood)?;
        let entry = DiaryEntry::new(self.entries.len() + 1, title.into(), content.into(), mood);
        let key = entry.key;

        info!(id = entry.id, %key, "created entry");
        self.entries.insert(0, entry);
        self.save()?;
        Ok(key)
    }

    /// Replaces title, content and mood. `id`, `date` and `key` are kept.
    pub fn update(
        &mut self,
        key: EntryKey,
        title: impl Into<String>,
        content: impl Into<String>,
        mood: impl Into<Option<Mood>>,
    ) -> Result<()> {
        let mood = mood.into().ok_or(DiaryError::MissingMood)?;
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.key == key)
            .ok_or(DiaryError::EntryNotFound(key))?;

        entry.title = title.into();
        entry.content = content.into();
        entry.mood = mood;

        info!(id = entry.id, %key, "updated entry");
        self.save()
    }

    /// Removes the entry, shifting every later position up by one.
    pub fn delete(&mut self, key: EntryKey) -> Result<DiaryEntry> {
        let position = self.position_of(key).ok_or(DiaryError::EntryNotFound(key))?;
        let removed = self.entries.remove(position);

        info!(id = removed.id, %key, position, "deleted entry");
        self.save()?;
        Ok(removed)
    }

    pub fn search(&self, query: &str) -> Vec<(usize, &DiaryEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(query))
            .collect()
    }

    pub fn save(&mut self) -> Result<()> {
        let serialized = serde_json::to_string(&self.entries)?;
        self.storage.set_item(ENTRIES_KEY, &serialized)?;
        debug!(entries = self.entries.len(), "snapshot saved");
        Ok(())
    }
}

struct Loaded {
    entries: Vec<DiaryEntry>,
    rejected: Vec<Value>,
    repaired: bool,
}

fn load_entries<S: Storage>(storage: &S) -> Result<Loaded> {
    let defaults = |rejected: Vec<Value>| Loaded {
        repaired: !rejected.is_empty(),
        entries: example_entries(),
        rejected,
    };

    let Some(raw) = storage.get_item(ENTRIES_KEY)? else {
        return Ok(defaults(Vec::new()));
    };

    let records = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(records)) => records,
        Ok(Value::Null) => return Ok(defaults(Vec::new())),
        Ok(other) => {
            warn!("stored snapshot is not a list of entries");
            return Ok(defaults(vec![other]));
        }
        Err(e) => {
            warn!(error = %e, "stored snapshot is not valid JSON, using example entries");
            return Ok(defaults(vec![Value::String(raw)]));
        }
    };

    let mut entries = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    let mut seen = HashSet::new();
    let mut repaired = false;

    for record in records {
        let key_ok = record
            .get("key")
            .is_some_and(|k| serde_json::from_value::<EntryKey>(k.clone()).is_ok());
        let mut candidate = record.clone();
        if !key_ok {
            if let Some(fields) = candidate.as_object_mut() {
                fields.remove("key");
            }
        }

        match serde_json::from_value::<DiaryEntry>(candidate) {
            Ok(mut entry) => {
                if !key_ok || !seen.insert(entry.key) {
                    entry.key = EntryKey::generate();
                    seen.insert(entry.key);
                    repaired = true;
                }
                entries.push(entry);
            }
            Err(e) => {
                warn!(error = %e, "rejecting diary record");
                rejected.push(record);
            }
        }
    }

    Ok(Loaded {
        repaired: repaired || !rejected.is_empty(),
        entries,
        rejected,
    })
}

fn quarantine<S: Storage>(storage: &mut S, records: Vec<Value>) -> Result<()> {
    let mut held = match storage.get_item(QUARANTINE_KEY)? {
        None => Vec::new(),
        Some(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(held)) => held,
            Ok(other) => vec![other],
            Err(_) => vec![Value::String(raw)],
        },
    };
    held.extend(records);
    storage.set_item(QUARANTINE_KEY, &serde_json::to_string(&held)?)
}

fn seed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// The pair of entries a fresh diary starts with.
pub fn example_entries() -> Vec<DiaryEntry> {
    vec![
        DiaryEntry {
            id: 1,
            title: "A Peaceful Day in Nature".to_string(),
            content: "Today I went for a walk in the forest. The gentle breeze through the trees \
                      reminded me of a Ghibli film. I saw a little cat by the stream, and it made \
                      me think of Totoro. The world feels so magical when you slow down and \
                      really look at it."
                .to_string(),
            mood: Mood::Happy,
            date: seed_date(2026, 2, 4),
            key: EntryKey::generate(),
        },
        DiaryEntry {
            id: 2,
            title: "Dreams and Tea".to_string(),
            content: "I made some chamomile tea this afternoon and sat by the window. The rain \
                      was falling gently, creating patterns on the glass. I thought about my \
                      dreams and where I want to go. Sometimes the quiet moments are the most \
                      precious."
                .to_string(),
            mood: Mood::Loved,
            date: seed_date(2026, 2, 3),
            key: EntryKey::generate(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn stored(state: &DiaryState<MemoryStorage>) -> Vec<DiaryEntry> {
        let raw = state.storage().get_item(ENTRIES_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_seeds_examples_when_storage_empty() {
        let state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        let ids: Vec<usize> = state.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(state.entries()[0].title, "A Peaceful Day in Nature");
        assert_eq!(state.entries()[1].mood, Mood::Loved);
        // Seeding alone does not write anything.
        assert_eq!(state.storage().get_item(ENTRIES_KEY).unwrap(), None);
    }

    #[test]
    fn test_unparsable_snapshot_falls_back_to_examples() {
        let storage = MemoryStorage::new().with_item(ENTRIES_KEY, "{not json");
        let state = DiaryState::initialize(storage).unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.quarantined(), 1);
    }

    #[test]
    fn test_unparsable_snapshot_text_survives_mutation() {
        let raw = r#"[{"id":1,"title":"Truncated entry""#;
        let storage = MemoryStorage::new().with_item(ENTRIES_KEY, raw);
        let mut state = DiaryState::initialize(storage).unwrap();
        state.create("T", "C", Mood::Happy).unwrap();

        let held: Vec<Value> =
            serde_json::from_str(&state.storage().get_item(QUARANTINE_KEY).unwrap().unwrap())
                .unwrap();
        assert_eq!(held, vec![Value::String(raw.to_string())]);
    }

    #[test]
    fn test_null_or_malformed_key_is_regenerated() {
        let raw = r#"[
            {"id":1,"title":"Null key","content":"a","mood":"😊","date":"2026-02-04T00:00:00Z","key":null},
            {"id":2,"title":"Bad key","content":"b","mood":"😌","date":"2026-02-03T00:00:00Z","key":"not-a-uuid"}
        ]"#;
        let storage = MemoryStorage::new().with_item(ENTRIES_KEY, raw);
        let state = DiaryState::initialize(storage).unwrap();

        assert_eq!(state.quarantined(), 0);
        assert_eq!(state.len(), 2);
        assert_eq!(state.entries()[0].title, "Null key");
        assert_eq!(state.entries()[1].title, "Bad key");
        assert_ne!(state.entries()[0].key, state.entries()[1].key);
        assert_eq!(stored(&state), state.entries().to_vec());
    }

    #[test]
    fn test_quarantine_keeps_prior_non_array_value() {
        let storage = MemoryStorage::new()
            .with_item(QUARANTINE_KEY, r#"{"earlier":"data"}"#)
            .with_item(ENTRIES_KEY, r#"[{"broken":true}]"#);
        let state = DiaryState::initialize(storage).unwrap();

        let held: Vec<Value> =
            serde_json::from_str(&state.storage().get_item(QUARANTINE_KEY).unwrap().unwrap())
                .unwrap();
        assert_eq!(held.len(), 2);
        assert_eq!(held[0]["earlier"], "data");
        assert_eq!(held[1]["broken"], true);
    }

    #[test]
    fn test_quarantine_keeps_prior_unparsable_text() {
        let storage = MemoryStorage::new()
            .with_item(QUARANTINE_KEY, "garbage{")
            .with_item(ENTRIES_KEY, r#"[{"broken":true}]"#);
        let state = DiaryState::initialize(storage).unwrap();

        let held: Vec<Value> =
            serde_json::from_str(&state.storage().get_item(QUARANTINE_KEY).unwrap().unwrap())
                .unwrap();
        assert_eq!(held[0], Value::String("garbage{".to_string()));
        assert_eq!(held.len(), 2);
    }

    #[test]
    fn test_null_snapshot_falls_back_to_examples() {
        let storage = MemoryStorage::new().with_item(ENTRIES_KEY, "null");
        let state = DiaryState::initialize(storage).unwrap();
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_empty_array_is_kept() {
        let storage = MemoryStorage::new().with_item(ENTRIES_KEY, "[]");
        let state = DiaryState::initialize(storage).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_non_array_snapshot_is_quarantined() {
        let storage = MemoryStorage::new().with_item(ENTRIES_KEY, r#"{"title":"oops"}"#);
        let state = DiaryState::initialize(storage).unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.quarantined(), 1);

        let held: Vec<Value> =
            serde_json::from_str(&state.storage().get_item(QUARANTINE_KEY).unwrap().unwrap())
                .unwrap();
        assert_eq!(held[0]["title"], "oops");
    }

    #[test]
    fn test_malformed_records_are_quarantined() {
        let raw = r#"[
            {"id":1,"title":"Good","content":"kept","mood":"😊","date":"2026-02-04T00:00:00.000Z"},
            {"id":2,"title":"No mood","content":"x","date":"2026-02-04T00:00:00.000Z"},
            {"id":3,"title":"Bad mood","content":"x","mood":"🦄","date":"2026-02-04T00:00:00.000Z"},
            {"id":"4","title":7}
        ]"#;
        let storage = MemoryStorage::new().with_item(ENTRIES_KEY, raw);
        let state = DiaryState::initialize(storage).unwrap();

        assert_eq!(state.len(), 1);
        assert_eq!(state.entries()[0].title, "Good");
        assert_eq!(state.quarantined(), 3);

        // The cleaned snapshot replaces the malformed one right away.
        assert_eq!(stored(&state), state.entries().to_vec());
    }

    #[test]
    fn test_quarantine_appends_to_existing_records() {
        let storage = MemoryStorage::new()
            .with_item(QUARANTINE_KEY, r#"[{"old":true}]"#)
            .with_item(ENTRIES_KEY, r#"[{"broken":true}]"#);
        let state = DiaryState::initialize(storage).unwrap();

        let held: Vec<Value> =
            serde_json::from_str(&state.storage().get_item(QUARANTINE_KEY).unwrap().unwrap())
                .unwrap();
        assert_eq!(held.len(), 2);
    }

    #[test]
    fn test_duplicate_keys_are_regenerated() {
        let entry = DiaryEntry::new(1, "A".into(), "a".into(), Mood::Calm);
        let mut twin = entry.clone();
        twin.id = 2;
        let raw = serde_json::to_string(&vec![entry, twin]).unwrap();

        let storage = MemoryStorage::new().with_item(ENTRIES_KEY, &raw);
        let state = DiaryState::initialize(storage).unwrap();
        assert_ne!(state.entries()[0].key, state.entries()[1].key);
    }

    #[test]
    fn test_create_prepends_and_persists() {
        let mut state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        let before: Vec<EntryKey> = state.entries().iter().map(|e| e.key).collect();

        let key = state.create("T", "C", Mood::Happy).unwrap();

        assert_eq!(state.len(), 3);
        assert_eq!(state.key_at(0), Some(key));
        assert_eq!(state.entries()[0].id, 3);
        assert_eq!(state.key_at(1), Some(before[0]));
        assert_eq!(state.key_at(2), Some(before[1]));
        assert_eq!(stored(&state), state.entries().to_vec());
    }

    #[test]
    fn test_create_without_mood_fails() {
        let mut state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        let err = state.create("T", "C", None).unwrap_err();
        assert!(matches!(err, DiaryError::MissingMood));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_update_preserves_identity_fields() {
        let mut state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        let key = state.create("T", "C", Mood::Happy).unwrap();
        let original = state.get(key).unwrap().clone();

        state
            .update(key, "New Title", "New Content", Mood::Loved)
            .unwrap();

        let updated = &state.entries()[0];
        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.content, "New Content");
        assert_eq!(updated.mood, Mood::Loved);
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.date, original.date);
        assert_eq!(updated.key, original.key);
        assert_eq!(stored(&state)[0].title, "New Title");
    }

    #[test]
    fn test_update_missing_mood_leaves_entry_untouched() {
        let mut state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        let key = state.key_at(0).unwrap();
        assert!(matches!(
            state.update(key, "x", "y", None),
            Err(DiaryError::MissingMood)
        ));
        assert_eq!(state.entries()[0].title, "A Peaceful Day in Nature");
    }

    #[test]
    fn test_delete_shifts_positions() {
        let mut state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        state.create("Third", "c", Mood::Calm).unwrap();
        state.create("Fourth", "c", Mood::Sad).unwrap();
        let keys: Vec<EntryKey> = state.entries().iter().map(|e| e.key).collect();

        let removed = state.delete(keys[1]).unwrap();

        assert_eq!(removed.title, "Third");
        assert_eq!(state.len(), 3);
        assert_eq!(state.key_at(0), Some(keys[0]));
        assert_eq!(state.key_at(1), Some(keys[2]));
        assert_eq!(state.key_at(2), Some(keys[3]));
    }

    #[test]
    fn test_mutations_after_delete_resolve_by_key() {
        let mut state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        let first = state.key_at(0).unwrap();
        let second = state.key_at(1).unwrap();

        // An edit captured before the delete still hits the right entry.
        state.delete(first).unwrap();
        state.update(second, "Still me", "c", Mood::Sad).unwrap();
        assert_eq!(state.entries()[0].title, "Still me");

        assert!(matches!(
            state.update(first, "gone", "c", Mood::Sad),
            Err(DiaryError::EntryNotFound(k)) if k == first
        ));
        assert!(matches!(state.delete(first), Err(DiaryError::EntryNotFound(_))));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_ids_repeat_after_delete() {
        let mut state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        let first = state.key_at(0).unwrap();
        state.delete(first).unwrap();
        let key = state.create("T", "C", Mood::Happy).unwrap();

        // `id` is count + 1, so it collides with the remaining seed entry.
        assert_eq!(state.get(key).unwrap().id, 2);
        assert_eq!(state.entries()[1].id, 2);
    }

    #[test]
    fn test_search() {
        let mut state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        state.create("Market", "bought TEA leaves", Mood::Happy).unwrap();

        let hits: Vec<usize> = state.search("tea").into_iter().map(|(p, _)| p).collect();
        assert_eq!(hits, vec![0, 2]);
        assert!(state.search("volcano").is_empty());
    }

    #[test]
    fn test_dispose_returns_storage_with_snapshot() {
        let state = DiaryState::initialize(MemoryStorage::new()).unwrap();
        let storage = state.dispose().unwrap();
        let raw = storage.get_item(ENTRIES_KEY).unwrap().unwrap();
        let entries: Vec<DiaryEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries.len(), 2);
    }
}
