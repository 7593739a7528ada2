//! Validating decoders for persisted documents.
//!
//! Every field falls back to its default on its own, so one bad field never
//! discards the rest of a document. Legacy `circuitWithNext` chains are
//! migrated into circuit blocks.

use crate::models::{
    Block, LastPerformance, PerformanceEntry, SavedWorkout, WorkoutDraft, WorkoutItem,
    DEFAULT_DURATION_SEC, DEFAULT_GLOBAL_REST_SEC, DEFAULT_REPS, DEFAULT_REST_SEC, DEFAULT_ROUNDS,
    DEFAULT_SETS,
};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn decode_draft(value: Option<&Value>) -> WorkoutDraft {
    let Some(value) = value else {
        return WorkoutDraft::default();
    };
    let Some(object) = value.as_object() else {
        warn!("draft document is not an object, using an empty plan");
        return WorkoutDraft::default();
    };
    draft_from_object(object)
}

pub fn decode_saved_workouts(value: Option<&Value>) -> Vec<SavedWorkout> {
    let Some(value) = value else {
        return Vec::new();
    };
    let Some(entries) = value.as_array() else {
        warn!("saved workouts document is not an array, resetting");
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|object| SavedWorkout {
            draft: draft_from_object(object),
            saved_at: string_field(object, "savedAt", ""),
        })
        .collect()
}

pub fn decode_last_performance(value: Option<&Value>) -> LastPerformance {
    let mut performance = LastPerformance::new();
    let Some(value) = value else {
        return performance;
    };
    let Some(object) = value.as_object() else {
        warn!("last performance document is not an object, resetting");
        return performance;
    };
    for (exercise_id, entry) in object {
        let Some(entry) = entry.as_object() else {
            continue;
        };
        performance.insert(
            exercise_id.clone(),
            PerformanceEntry {
                reps: string_field(entry, "reps", ""),
                weight: string_field(entry, "weight", ""),
            },
        );
    }
    performance
}

fn draft_from_object(object: &Map<String, Value>) -> WorkoutDraft {
    let mut blocks: Vec<Block> = object
        .get("blocks")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(decode_block).collect())
        .unwrap_or_default();
    let raw_items: Vec<&Map<String, Value>> = object
        .get("items")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default();
    let mut items: Vec<WorkoutItem> = raw_items.iter().map(|raw| decode_item(raw)).collect();

    let known: HashSet<String> = blocks.iter().map(|block| block.id.clone()).collect();
    for item in &mut items {
        if let Some(block_id) = &item.block_id {
            if !known.contains(block_id) {
                warn!(item_id = %item.id, %block_id, "clearing reference to missing block");
                item.block_id = None;
            }
        }
    }

    migrate_chains(&raw_items, &mut items, &mut blocks);

    WorkoutDraft {
        name: string_field(object, "name", ""),
        global_rest_sec: number_field(object, "globalRestSec", DEFAULT_GLOBAL_REST_SEC, 0),
        auto_start_rest: object
            .get("autoStartRest")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        items,
        blocks,
    }
}

fn decode_item(object: &Map<String, Value>) -> WorkoutItem {
    let id = optional_string(object, "id")
        .or_else(|| optional_string(object, "uid"))
        .unwrap_or_else(new_id);
    let exercise_id = optional_string(object, "exerciseId");
    let name = optional_string(object, "name")
        .or_else(|| exercise_id.clone())
        .unwrap_or_else(|| "Exercise".to_string());
    WorkoutItem {
        id,
        exercise_id,
        name,
        group: string_field(object, "group", ""),
        sets: number_field(object, "sets", DEFAULT_SETS, 1),
        reps: number_field(object, "reps", DEFAULT_REPS, 1),
        is_timed: bool_field(object, "isTimed"),
        duration_sec: number_field(object, "durationSec", DEFAULT_DURATION_SEC, 1),
        weight: string_field(object, "weight", ""),
        rest_override_enabled: bool_field(object, "restOverrideEnabled"),
        rest_sec: number_field(object, "restSec", DEFAULT_REST_SEC, 0),
        block_id: optional_string(object, "blockId"),
    }
}

fn decode_block(value: &Value) -> Option<Block> {
    let object = value.as_object()?;
    Some(Block {
        id: optional_string(object, "id").unwrap_or_else(new_id),
        name: string_field(object, "name", "Block"),
        rounds: number_field(object, "rounds", DEFAULT_ROUNDS, 1),
        is_circuit: object
            .get("isCircuit")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        is_chain: bool_field(object, "isChain"),
        rest_override_enabled: bool_field(object, "restOverrideEnabled"),
        rest_sec: number_field(object, "restSec", DEFAULT_REST_SEC, 0),
    })
}

/// Turns runs of `circuitWithNext` items into circuit blocks. Rounds are the
/// chain's largest set count and members keep their own sets, so shorter
/// members still drop out of the later rounds.
fn migrate_chains(
    raw_items: &[&Map<String, Value>],
    items: &mut [WorkoutItem],
    blocks: &mut Vec<Block>,
) {
    let linked: Vec<bool> = raw_items
        .iter()
        .zip(items.iter())
        .map(|(raw, item)| item.block_id.is_none() && bool_field(raw, "circuitWithNext"))
        .collect();

    let mut start = 0;
    while start < items.len() {
        let mut end = start;
        while end + 1 < items.len() && linked[end] && items[end + 1].block_id.is_none() {
            end += 1;
        }
        if end > start {
            let chain = &mut items[start..=end];
            let rounds = chain.iter().map(|item| item.sets).max().unwrap_or(1);
            let mut block = Block::new(new_id(), format!("Circuit {}", blocks.len() + 1), true);
            block.rounds = rounds;
            block.is_chain = true;
            for item in chain.iter_mut() {
                item.block_id = Some(block.id.clone());
            }
            blocks.push(block);
        }
        start = end + 1;
    }
}

fn optional_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn string_field(object: &Map<String, Value>, key: &str, default: &str) -> String {
    match object.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        _ => default.to_string(),
    }
}

fn bool_field(object: &Map<String, Value>, key: &str) -> bool {
    match object.get(key) {
        Some(Value::Bool(value)) => *value,
        Some(Value::String(value)) => value == "true",
        _ => false,
    }
}

/// Numbers or numeric strings, floored and clamped to `min`; anything else is `default`.
fn number_field(object: &Map<String, Value>, key: &str, default: u32, min: u32) -> u32 {
    let parsed = match object.get(key) {
        Some(Value::Number(value)) => value.as_f64(),
        Some(Value::String(value)) => value.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(value) if value.is_finite() => clamp_number(value, min),
        _ => default,
    }
}

fn clamp_number(value: f64, min: u32) -> u32 {
    let floored = value.floor();
    if floored <= min as f64 {
        min
    } else if floored >= u32::MAX as f64 {
        u32::MAX
    } else {
        floored as u32
    }
}
