use crate::models::{CompletedBy, SetEntry, SetLog, WorkoutItem};
use crate::run_queue::Step;
use std::collections::HashMap;

/// Append-only record of the sets finished during one run.
#[derive(Debug, Default)]
pub struct RunLog {
    logs: Vec<SetLog>,
    last_inputs: HashMap<String, SetEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the log for a finished step. `entered` is what the user typed
    /// for it; without one only the planned target and weight are kept.
    pub fn record(
        &mut self,
        queue_index: usize,
        step: &Step,
        item: Option<&WorkoutItem>,
        entered: Option<&SetEntry>,
        completed_by: CompletedBy,
    ) -> &SetLog {
        let (actual_reps, weight, notes) = match entered {
            Some(entry) => (entry.reps, entry.weight.trim(), entry.notes.trim()),
            None => (None, item.map(|item| item.weight.trim()).unwrap_or(""), ""),
        };
        let log = SetLog {
            item_id: step.item_id.clone(),
            exercise_id: item.and_then(|item| item.exercise_id.clone()),
            set_number: step.set_number,
            queue_index,
            is_timed: item.map(|item| item.is_timed).unwrap_or(false),
            target: item.map(WorkoutItem::target).unwrap_or(0),
            actual_reps,
            weight: weight.to_string(),
            notes: notes.to_string(),
            completed_by,
        };
        if let Some(entry) = entered {
            self.last_inputs.insert(step.item_id.clone(), entry.clone());
        }
        self.logs.push(log);
        &self.logs[self.logs.len() - 1]
    }

    pub fn last_input(&self, item_id: &str) -> Option<&SetEntry> {
        self.last_inputs.get(item_id)
    }

    pub fn logs(&self) -> &[SetLog] {
        &self.logs
    }
}
