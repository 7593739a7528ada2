use crate::decode::{decode_draft, decode_last_performance, decode_saved_workouts};
use crate::models::{LastPerformance, PerformanceEntry, SavedWorkout, WorkoutDraft};
use crate::store::KeyValueStore;
use chrono::Utc;
use serde::Serialize;
use std::io;
use thiserror::Error;
use tracing::{debug, error};

pub const DRAFT_KEY: &str = "WORKOUT_BUILDER_V1";
pub const SAVED_WORKOUTS_KEY: &str = "WORKOUT_SAVED_V1";
pub const LAST_PERFORMANCE_KEY: &str = "WORKOUT_LAST_PERFORMANCE_V1";
pub const DEFAULT_SAVED_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type DataResult<T> = Result<T, DataError>;

/// Typed access to the draft, saved-workout list and last-performance map.
#[derive(Debug)]
pub struct DataManager<S> {
    store: S,
    saved_limit: usize,
}

impl<S: KeyValueStore> DataManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_saved_limit(store, DEFAULT_SAVED_LIMIT)
    }

    pub fn with_saved_limit(store: S, saved_limit: usize) -> Self {
        Self {
            store,
            saved_limit: saved_limit.max(1),
        }
    }

    pub fn saved_limit(&self) -> usize {
        self.saved_limit
    }

    pub fn load_draft(&self) -> WorkoutDraft {
        decode_draft(self.store.get(DRAFT_KEY).as_ref())
    }

    pub fn save_draft(&mut self, draft: &WorkoutDraft) {
        self.write(DRAFT_KEY, draft);
    }

    pub fn clear_draft(&mut self) -> WorkoutDraft {
        let draft = WorkoutDraft::default();
        self.save_draft(&draft);
        draft
    }

    pub fn load_saved_workouts(&self) -> Vec<SavedWorkout> {
        decode_saved_workouts(self.store.get(SAVED_WORKOUTS_KEY).as_ref())
    }

    /// Prepends a copy of `draft` and trims the list to the configured limit.
    pub fn save_workout(&mut self, draft: &WorkoutDraft) -> SavedWorkout {
        let saved = SavedWorkout {
            draft: draft.clone(),
            saved_at: Utc::now().to_rfc3339(),
        };
        let mut workouts = self.load_saved_workouts();
        workouts.insert(0, saved.clone());
        workouts.truncate(self.saved_limit);
        debug!(count = workouts.len(), "saved workout");
        self.write(SAVED_WORKOUTS_KEY, &workouts);
        saved
    }

    pub fn saved_workout(&self, index: usize) -> Option<SavedWorkout> {
        self.load_saved_workouts().into_iter().nth(index)
    }

    pub fn delete_saved_workout(&mut self, index: usize) -> Option<SavedWorkout> {
        let mut workouts = self.load_saved_workouts();
        if index >= workouts.len() {
            return None;
        }
        let removed = workouts.remove(index);
        self.write(SAVED_WORKOUTS_KEY, &workouts);
        Some(removed)
    }

    pub fn load_last_performance(&self) -> LastPerformance {
        decode_last_performance(self.store.get(LAST_PERFORMANCE_KEY).as_ref())
    }

    /// Merges new entries; blank fields keep the previously stored value.
    pub fn record_performance(&mut self, updates: Vec<(String, PerformanceEntry)>) {
        if updates.is_empty() {
            return;
        }
        let mut performance = self.load_last_performance();
        for (exercise_id, update) in updates {
            let entry = performance.entry(exercise_id).or_default();
            if !update.reps.trim().is_empty() {
                entry.reps = update.reps;
            }
            if !update.weight.trim().is_empty() {
                entry.weight = update.weight;
            }
        }
        self.write(LAST_PERFORMANCE_KEY, &performance);
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.store.set(key, value),
            Err(err) => error!(key, %err, "failed to encode document"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DataManager, DRAFT_KEY, LAST_PERFORMANCE_KEY};
    use crate::models::{Block, PerformanceEntry, WorkoutDraft, WorkoutItem};
    use crate::store::{FileStore, KeyValueStore, MemoryStore};
    use serde_json::json;

    fn sample_draft(name: &str) -> WorkoutDraft {
        let mut squat = WorkoutItem::new("item-1", "Goblet Squat");
        squat.exercise_id = Some("goblet-squat".to_string());
        squat.sets = 4;
        squat.reps = 8;
        squat.weight = "24 kg".to_string();
        squat.block_id = Some("block-1".to_string());
        let mut plank = WorkoutItem::new("item-2", "Plank");
        plank.is_timed = true;
        plank.duration_sec = 40;
        plank.rest_override_enabled = true;
        plank.rest_sec = 15;
        let mut block = Block::new("block-1", "Strength", false);
        block.rest_override_enabled = true;
        block.rest_sec = 90;
        WorkoutDraft {
            name: name.to_string(),
            global_rest_sec: 45,
            auto_start_rest: false,
            items: vec![squat, plank],
            blocks: vec![block],
        }
    }

    #[test]
    fn draft_round_trip_preserves_every_field() {
        let mut manager = DataManager::new(MemoryStore::new());
        let draft = sample_draft("Lower");

        manager.save_draft(&draft);

        assert_eq!(manager.load_draft(), draft);
    }

    #[test]
    fn draft_round_trip_through_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let draft = sample_draft("Lower");
        {
            let store = FileStore::new(dir.path()).expect("create store");
            let mut manager = DataManager::new(store);
            manager.save_draft(&draft);
        }
        let manager = DataManager::new(FileStore::new(dir.path()).expect("reopen store"));

        assert_eq!(manager.load_draft(), draft);
    }

    #[test]
    fn saved_workouts_are_capped_most_recent_first() {
        let mut manager = DataManager::new(MemoryStore::new());
        for index in 0..21 {
            manager.save_workout(&sample_draft(&format!("Workout {index}")));
        }

        let saved = manager.load_saved_workouts();
        assert_eq!(saved.len(), 20);
        assert_eq!(saved[0].draft.name, "Workout 20");
        assert_eq!(saved[19].draft.name, "Workout 1");
        assert!(!saved[0].saved_at.is_empty());
    }

    #[test]
    fn delete_and_fetch_saved_workouts() {
        let mut manager = DataManager::new(MemoryStore::new());
        manager.save_workout(&sample_draft("First"));
        manager.save_workout(&sample_draft("Second"));

        assert_eq!(
            manager.saved_workout(1).map(|saved| saved.draft.name),
            Some("First".to_string())
        );
        assert!(manager.delete_saved_workout(5).is_none());
        let removed = manager.delete_saved_workout(0).expect("removed");
        assert_eq!(removed.draft.name, "Second");
        assert_eq!(manager.load_saved_workouts().len(), 1);
    }

    #[test]
    fn malformed_documents_read_as_defaults() {
        let mut store = MemoryStore::new();
        store.set(DRAFT_KEY, json!("garbage"));
        store.set(LAST_PERFORMANCE_KEY, json!([1, 2, 3]));
        let manager = DataManager::new(store);

        assert_eq!(manager.load_draft(), WorkoutDraft::default());
        assert!(manager.load_last_performance().is_empty());
    }

    #[test]
    fn performance_updates_merge_non_blank_fields() {
        let mut manager = DataManager::new(MemoryStore::new());
        manager.record_performance(vec![(
            "row".to_string(),
            PerformanceEntry {
                reps: "10".to_string(),
                weight: "30 kg".to_string(),
            },
        )]);
        manager.record_performance(vec![(
            "row".to_string(),
            PerformanceEntry {
                reps: String::new(),
                weight: "32 kg".to_string(),
            },
        )]);

        let performance = manager.load_last_performance();
        assert_eq!(performance["row"].reps, "10");
        assert_eq!(performance["row"].weight, "32 kg");
    }

    #[test]
    fn clear_draft_resets_to_defaults() {
        let mut manager = DataManager::new(MemoryStore::new());
        manager.save_draft(&sample_draft("Lower"));

        let cleared = manager.clear_draft();

        assert_eq!(cleared, WorkoutDraft::default());
        assert_eq!(manager.load_draft(), WorkoutDraft::default());
    }
}
