//! User-facing plan actions. Each one reads the stored draft, applies a
//! single edit and writes the draft back.

use crate::app_error::{AppError, AppErrorKind};
use crate::catalog::ExerciseCatalog;
use crate::data_manager::DataManager;
use crate::events::{emit_app_error, EventSink};
use crate::models::{Block, SavedWorkout, WorkoutDraft, WorkoutItem};
use crate::plan::{BlockEdit, ItemEdit};
use crate::store::KeyValueStore;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

fn edit_draft<S, T>(
    data_manager: &mut DataManager<S>,
    apply: impl FnOnce(&mut WorkoutDraft) -> Result<T, AppError>,
) -> Result<T, AppError>
where
    S: KeyValueStore,
{
    let mut draft = data_manager.load_draft();
    let result = apply(&mut draft)?;
    data_manager.save_draft(&draft);
    Ok(result)
}

fn require(found: bool, what: &str, id: &str) -> Result<(), AppError> {
    if found {
        Ok(())
    } else {
        Err(AppError::not_found(what, id))
    }
}

pub fn current_plan<S: KeyValueStore>(data_manager: &DataManager<S>) -> WorkoutDraft {
    data_manager.load_draft()
}

pub fn add_exercise<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    catalog: &dyn ExerciseCatalog,
    exercise_id: &str,
) -> Result<WorkoutItem, AppError> {
    let exercise = catalog
        .exercise(exercise_id)
        .ok_or_else(|| AppError::not_found("exercise", exercise_id))?;
    let performance = data_manager.load_last_performance();
    let recall = performance.get(exercise_id);
    edit_draft(data_manager, |draft| Ok(draft.add_exercise(exercise, recall).clone()))
}

pub fn add_freeform<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    name: &str,
    group: &str,
) -> Result<WorkoutItem, AppError> {
    if name.trim().is_empty() {
        return Err(AppError::new(AppErrorKind::Plan, "Exercise name is required", true));
    }
    edit_draft(data_manager, |draft| Ok(draft.add_freeform(name, group).clone()))
}

pub fn move_item<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    item_id: &str,
    direction: Direction,
) -> Result<bool, AppError> {
    edit_draft(data_manager, |draft| {
        require(draft.item(item_id).is_some(), "item", item_id)?;
        Ok(match direction {
            Direction::Up => draft.move_item_up(item_id),
            Direction::Down => draft.move_item_down(item_id),
        })
    })
}

pub fn remove_item<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    item_id: &str,
) -> Result<WorkoutItem, AppError> {
    edit_draft(data_manager, |draft| {
        draft
            .remove_item(item_id)
            .ok_or_else(|| AppError::not_found("item", item_id))
    })
}

pub fn edit_item<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    item_id: &str,
    edit: ItemEdit,
) -> Result<WorkoutItem, AppError> {
    edit_draft(data_manager, |draft| {
        require(draft.edit_item(item_id, edit), "item", item_id)?;
        draft
            .item(item_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("item", item_id))
    })
}

/// Returns the id of the circuit the two items now share, or `None` for the last item.
pub fn link_with_next<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    item_id: &str,
) -> Result<Option<String>, AppError> {
    edit_draft(data_manager, |draft| {
        require(draft.item(item_id).is_some(), "item", item_id)?;
        Ok(draft.link_with_next(item_id))
    })
}

pub fn unlink<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    item_id: &str,
) -> Result<bool, AppError> {
    edit_draft(data_manager, |draft| {
        require(draft.item(item_id).is_some(), "item", item_id)?;
        Ok(draft.unlink(item_id))
    })
}

pub fn assign_block<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    item_id: &str,
    block_id: Option<&str>,
) -> Result<(), AppError> {
    edit_draft(data_manager, |draft| {
        require(draft.item(item_id).is_some(), "item", item_id)?;
        if let Some(block_id) = block_id {
            require(draft.block(block_id).is_some(), "block", block_id)?;
        }
        draft.assign_block(item_id, block_id);
        Ok(())
    })
}

pub fn set_plan_name<S: KeyValueStore>(data_manager: &mut DataManager<S>, name: &str) {
    let mut draft = data_manager.load_draft();
    draft.set_name(name);
    data_manager.save_draft(&draft);
}

pub fn set_global_rest<S: KeyValueStore>(data_manager: &mut DataManager<S>, seconds: i64) {
    let mut draft = data_manager.load_draft();
    draft.set_global_rest(seconds);
    data_manager.save_draft(&draft);
}

pub fn set_auto_start_rest<S: KeyValueStore>(data_manager: &mut DataManager<S>, enabled: bool) {
    let mut draft = data_manager.load_draft();
    draft.set_auto_start_rest(enabled);
    data_manager.save_draft(&draft);
}

pub fn create_block<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    name: &str,
    is_circuit: bool,
) -> Result<Block, AppError> {
    edit_draft(data_manager, |draft| Ok(draft.create_block(name, is_circuit).clone()))
}

pub fn edit_block<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    block_id: &str,
    edit: BlockEdit,
) -> Result<Block, AppError> {
    edit_draft(data_manager, |draft| {
        require(draft.edit_block(block_id, edit), "block", block_id)?;
        draft
            .block(block_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("block", block_id))
    })
}

pub fn remove_block<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    block_id: &str,
) -> Result<Block, AppError> {
    edit_draft(data_manager, |draft| {
        draft
            .remove_block(block_id)
            .ok_or_else(|| AppError::not_found("block", block_id))
    })
}

pub fn save_plan<S: KeyValueStore>(data_manager: &mut DataManager<S>) -> SavedWorkout {
    let draft = data_manager.load_draft();
    let saved = data_manager.save_workout(&draft);
    debug!(name = %saved.draft.name, "plan saved");
    saved
}

pub fn list_saved<S: KeyValueStore>(data_manager: &DataManager<S>) -> Vec<SavedWorkout> {
    data_manager.load_saved_workouts()
}

/// Replaces the draft with a copy of a saved workout.
pub fn load_saved_plan<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    index: usize,
) -> Result<WorkoutDraft, AppError> {
    let saved = data_manager
        .saved_workout(index)
        .ok_or_else(|| AppError::not_found("saved workout", index))?;
    data_manager.save_draft(&saved.draft);
    Ok(saved.draft)
}

pub fn delete_saved_plan<S: KeyValueStore>(
    data_manager: &mut DataManager<S>,
    index: usize,
) -> Result<SavedWorkout, AppError> {
    data_manager
        .delete_saved_workout(index)
        .ok_or_else(|| AppError::not_found("saved workout", index))
}

pub fn clear_plan<S: KeyValueStore>(data_manager: &mut DataManager<S>) -> WorkoutDraft {
    data_manager.clear_draft()
}

/// Logs the error, forwards it to the sink and hands it back for display.
pub fn report_error(sink: &mut dyn EventSink, error: AppError) -> AppError {
    emit_app_error(sink, error.payload());
    match error.detail() {
        Some(detail) => error!(kind = ?error.kind(), %detail, "{}", error.message()),
        None => error!(kind = ?error.kind(), "{}", error.message()),
    }
    error
}

#[cfg(test)]
mod tests {
    use super::{
        add_exercise, add_freeform, assign_block, clear_plan, create_block, delete_saved_plan,
        edit_block, edit_item, link_with_next, list_saved, load_saved_plan, move_item,
        remove_block, remove_item, report_error, save_plan, set_global_rest, set_plan_name,
        Direction,
    };
    use crate::app_error::{AppError, AppErrorKind};
    use crate::catalog::MemoryCatalog;
    use crate::data_manager::DataManager;
    use crate::events::{RecordingSink, RunEvent};
    use crate::models::PerformanceEntry;
    use crate::plan::{BlockEdit, ItemEdit};
    use crate::store::MemoryStore;

    fn manager() -> DataManager<MemoryStore> {
        DataManager::new(MemoryStore::new())
    }

    #[test]
    fn every_edit_is_persisted() {
        let mut manager = manager();
        let catalog = MemoryCatalog::builtin();
        manager.record_performance(vec![(
            "goblet-squat".to_string(),
            PerformanceEntry {
                reps: "12".to_string(),
                weight: "16 kg".to_string(),
            },
        )]);

        let squat = add_exercise(&mut manager, &catalog, "goblet-squat").expect("add squat");
        let carry = add_freeform(&mut manager, "Farmer Carry", "grip").expect("add carry");
        set_plan_name(&mut manager, "  Lower  ");
        set_global_rest(&mut manager, 75);
        edit_item(&mut manager, &carry.id, ItemEdit::Timed(true)).expect("timed");
        assert!(move_item(&mut manager, &carry.id, Direction::Up).expect("move"));

        let draft = manager.load_draft();
        assert_eq!(draft.name, "Lower");
        assert_eq!(draft.global_rest_sec, 75);
        assert_eq!(draft.items[0].id, carry.id);
        assert!(draft.items[0].is_timed);
        assert_eq!(draft.items[1].id, squat.id);
        assert_eq!(draft.items[1].reps, 12);
        assert_eq!(draft.items[1].weight, "16 kg");
    }

    #[test]
    fn unknown_ids_are_plan_errors() {
        let mut manager = manager();
        let catalog = MemoryCatalog::builtin();

        let error = add_exercise(&mut manager, &catalog, "nope").expect_err("missing exercise");
        assert_eq!(error.kind(), AppErrorKind::Plan);
        assert!(remove_item(&mut manager, "nope").is_err());
        assert!(edit_item(&mut manager, "nope", ItemEdit::Reps(3)).is_err());
        assert!(add_freeform(&mut manager, "   ", "").is_err());
        assert!(load_saved_plan(&mut manager, 0).is_err());
        assert!(delete_saved_plan(&mut manager, 0).is_err());
    }

    #[test]
    fn block_lifecycle() {
        let mut manager = manager();
        let a = add_freeform(&mut manager, "A", "").expect("a");
        let b = add_freeform(&mut manager, "B", "").expect("b");

        let block = create_block(&mut manager, "Finisher", true).expect("block");
        assert!(assign_block(&mut manager, &a.id, Some("missing")).is_err());
        assign_block(&mut manager, &a.id, Some(&block.id)).expect("assign a");
        assign_block(&mut manager, &b.id, Some(&block.id)).expect("assign b");
        let edited = edit_block(&mut manager, &block.id, BlockEdit::Rounds(5)).expect("rounds");
        assert_eq!(edited.rounds, 5);
        assert!(manager.load_draft().items.iter().all(|item| item.sets == 5));

        remove_block(&mut manager, &block.id).expect("remove");
        let draft = manager.load_draft();
        assert!(draft.blocks.is_empty());
        assert!(draft.items.iter().all(|item| item.block_id.is_none()));
    }

    #[test]
    fn link_with_next_persists_the_circuit() {
        let mut manager = manager();
        let a = add_freeform(&mut manager, "A", "").expect("a");
        add_freeform(&mut manager, "B", "").expect("b");

        let block_id = link_with_next(&mut manager, &a.id)
            .expect("link")
            .expect("block id");

        let draft = manager.load_draft();
        assert!(draft.items.iter().all(|item| item.block_id.as_deref() == Some(&*block_id)));
    }

    #[test]
    fn save_load_and_clear_plans() {
        let mut manager = manager();
        add_freeform(&mut manager, "A", "").expect("a");
        set_plan_name(&mut manager, "Morning");
        let saved = save_plan(&mut manager);

        let cleared = clear_plan(&mut manager);
        assert!(cleared.items.is_empty());

        let loaded = load_saved_plan(&mut manager, 0).expect("load");
        assert_eq!(loaded, saved.draft);
        assert_eq!(manager.load_draft(), saved.draft);
        assert_eq!(list_saved(&manager).len(), 1);
        delete_saved_plan(&mut manager, 0).expect("delete");
        assert!(list_saved(&manager).is_empty());
    }

    #[test]
    fn reported_errors_reach_the_sink() {
        let mut sink = RecordingSink::new();

        let error = report_error(&mut sink, AppError::not_found("item", "x"));

        assert_eq!(error.message(), "No such item");
        let [RunEvent::AppError(payload)] = sink.events() else {
            panic!("expected one error event");
        };
        assert_eq!(payload.kind, AppErrorKind::Plan);
    }
}
