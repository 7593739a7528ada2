use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_GLOBAL_REST_SEC: u32 = 60;
pub const DEFAULT_SETS: u32 = 3;
pub const DEFAULT_REPS: u32 = 10;
pub const DEFAULT_DURATION_SEC: u32 = 45;
pub const DEFAULT_REST_SEC: u32 = 60;
pub const DEFAULT_ROUNDS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutItem {
    pub id: String,
    pub exercise_id: Option<String>,
    pub name: String,
    pub group: String,
    pub sets: u32,
    pub reps: u32,
    pub is_timed: bool,
    pub duration_sec: u32,
    pub weight: String,
    pub rest_override_enabled: bool,
    pub rest_sec: u32,
    pub block_id: Option<String>,
}

impl WorkoutItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            exercise_id: None,
            name: name.into(),
            group: String::new(),
            sets: DEFAULT_SETS,
            reps: DEFAULT_REPS,
            is_timed: false,
            duration_sec: DEFAULT_DURATION_SEC,
            weight: String::new(),
            rest_override_enabled: false,
            rest_sec: DEFAULT_REST_SEC,
            block_id: None,
        }
    }

    /// Planned work for one set: reps, or seconds when timed.
    pub fn target(&self) -> u32 {
        if self.is_timed {
            self.duration_sec
        } else {
            self.reps
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub name: String,
    pub rounds: u32,
    pub is_circuit: bool,
    /// Built from linked items: members keep their own sets and drop out of
    /// rounds past them. Other circuits run every member each round.
    #[serde(default)]
    pub is_chain: bool,
    pub rest_override_enabled: bool,
    pub rest_sec: u32,
}

impl Block {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_circuit: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rounds: DEFAULT_ROUNDS,
            is_circuit,
            is_chain: false,
            rest_override_enabled: false,
            rest_sec: DEFAULT_REST_SEC,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDraft {
    pub name: String,
    pub global_rest_sec: u32,
    pub auto_start_rest: bool,
    pub items: Vec<WorkoutItem>,
    pub blocks: Vec<Block>,
}

impl Default for WorkoutDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            global_rest_sec: DEFAULT_GLOBAL_REST_SEC,
            auto_start_rest: true,
            items: Vec::new(),
            blocks: Vec::new(),
        }
    }
}

impl WorkoutDraft {
    pub fn item(&self, item_id: &str) -> Option<&WorkoutItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut WorkoutItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == block_id)
    }

    pub fn block_mut(&mut self, block_id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == block_id)
    }

    /// Block an item belongs to; dangling ids resolve to `None`.
    pub fn block_of(&self, item: &WorkoutItem) -> Option<&Block> {
        item.block_id.as_deref().and_then(|id| self.block(id))
    }

    pub fn members_of<'a>(&'a self, block_id: &'a str) -> impl Iterator<Item = &'a WorkoutItem> {
        self.items
            .iter()
            .filter(move |item| item.block_id.as_deref() == Some(block_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWorkout {
    #[serde(flatten)]
    pub draft: WorkoutDraft,
    pub saved_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEntry {
    pub reps: String,
    pub weight: String,
}

pub type LastPerformance = BTreeMap<String, PerformanceEntry>;

/// What the user typed for the set in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
    pub reps: Option<u32>,
    pub weight: String,
    pub notes: String,
}

impl SetEntry {
    pub fn has_actuals(&self) -> bool {
        self.reps.is_some() || !self.weight.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletedBy {
    SetComplete,
    Timer,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLog {
    pub item_id: String,
    pub exercise_id: Option<String>,
    pub set_number: u32,
    pub queue_index: usize,
    pub is_timed: bool,
    pub target: u32,
    pub actual_reps: Option<u32>,
    pub weight: String,
    pub notes: String,
    pub completed_by: CompletedBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub group: String,
    pub tags: Vec<String>,
    pub equipment: Vec<String>,
    pub level: String,
    pub steps: Vec<String>,
    pub cues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySet {
    pub set_number: u32,
    pub line: String,
    pub confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    pub item_id: String,
    pub name: String,
    pub sets: Vec<SummarySet>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub workout_name: String,
    pub items: Vec<SummaryItem>,
    pub sets_logged: u32,
    pub sets_confirmed: u32,
}
