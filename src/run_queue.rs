use crate::models::WorkoutDraft;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One set (or one circuit round) of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub item_id: String,
    pub set_number: u32,
    pub total_sets: u32,
    pub is_circuit_step: bool,
    /// Block id for grouped steps, the item id for standalone ones.
    pub grouping_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunQueue {
    steps: Vec<Step>,
}

impl RunQueue {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when `index` and the step after it run back to back inside one circuit round.
    pub fn continues_round(&self, index: usize) -> bool {
        match (self.steps.get(index), self.steps.get(index + 1)) {
            (Some(step), Some(next)) => {
                step.is_circuit_step
                    && next.is_circuit_step
                    && step.grouping_key == next.grouping_key
                    && step.set_number == next.set_number
            }
            _ => false,
        }
    }
}

pub fn build_run_queue(draft: &WorkoutDraft) -> RunQueue {
    let mut steps = Vec::new();
    let mut processed_blocks: HashSet<&str> = HashSet::new();

    for item in &draft.items {
        let Some(block) = draft.block_of(item) else {
            push_sequential(&mut steps, &item.id, item.sets, &item.id);
            continue;
        };
        if !processed_blocks.insert(block.id.as_str()) {
            continue;
        }

        if block.is_circuit {
            let rounds = block.rounds.max(1);
            for round in 1..=rounds {
                for member in draft.members_of(&block.id) {
                    if !block.is_chain || member.sets >= round {
                        steps.push(Step {
                            item_id: member.id.clone(),
                            set_number: round,
                            total_sets: rounds,
                            is_circuit_step: true,
                            grouping_key: block.id.clone(),
                        });
                    }
                }
            }
        } else {
            for member in draft.members_of(&block.id) {
                push_sequential(&mut steps, &member.id, member.sets, &block.id);
            }
        }
    }

    RunQueue { steps }
}

fn push_sequential(steps: &mut Vec<Step>, item_id: &str, sets: u32, grouping_key: &str) {
    let total_sets = sets.max(1);
    for set_number in 1..=total_sets {
        steps.push(Step {
            item_id: item_id.to_string(),
            set_number,
            total_sets,
            is_circuit_step: false,
            grouping_key: grouping_key.to_string(),
        });
    }
}

/// Rest that follows the step at `index`.
///
/// Zero between members of the same circuit round and after the final step;
/// otherwise block override, then item override, then the draft's global rest.
pub fn effective_rest_sec(draft: &WorkoutDraft, queue: &RunQueue, index: usize) -> u32 {
    let Some(step) = queue.get(index) else {
        return 0;
    };
    if queue.continues_round(index) || index + 1 >= queue.len() {
        return 0;
    }
    let Some(item) = draft.item(&step.item_id) else {
        return draft.global_rest_sec;
    };
    if let Some(block) = draft.block_of(item) {
        if block.rest_override_enabled {
            return block.rest_sec;
        }
    }
    if item.rest_override_enabled {
        return item.rest_sec;
    }
    draft.global_rest_sec
}
