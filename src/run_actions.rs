use crate::app_error::AppError;
use crate::data_manager::DataManager;
use crate::events::{
    emit_rest_started, emit_run_finished, emit_run_paused, emit_run_resumed, emit_run_stopped,
    emit_step_changed, emit_timer_tick, EventSink, RestStartedPayload, StepChangedPayload,
};
use crate::models::{Phase, SetEntry, WorkoutSummary};
use crate::run_engine::{RunEngine, Transition};
use crate::store::KeyValueStore;
use tracing::{debug, info};

fn step_changed_payload(engine: &RunEngine, queue_index: usize) -> Option<StepChangedPayload> {
    let queue = engine.queue()?;
    let step = queue.get(queue_index)?;
    let item = engine.item(&step.item_id);
    let (item_name, duration_sec, target) = match item {
        Some(item) if item.is_timed => (
            item.name.clone(),
            Some(item.duration_sec),
            format!("{}s", item.duration_sec),
        ),
        Some(item) => (item.name.clone(), None, format!("{} reps", item.reps)),
        None => (step.item_id.clone(), None, String::new()),
    };
    Some(StepChangedPayload {
        queue_index,
        queue_len: queue.len(),
        item_id: step.item_id.clone(),
        item_name,
        set_number: step.set_number,
        total_sets: step.total_sets,
        is_circuit_step: step.is_circuit_step,
        duration_sec,
        target,
    })
}

fn rest_started_payload(
    engine: &RunEngine,
    queue_index: usize,
    rest_sec: u32,
) -> RestStartedPayload {
    let next_item_name = engine
        .queue()
        .and_then(|queue| queue.get(queue_index + 1))
        .and_then(|step| engine.item(&step.item_id))
        .map(|item| item.name.clone());
    RestStartedPayload {
        queue_index,
        rest_sec,
        auto_start: engine.has_countdown(),
        next_item_name,
    }
}

/// Persists queued performance updates and reports the transition.
fn settle<S: KeyValueStore>(
    engine: &mut RunEngine,
    data_manager: &mut DataManager<S>,
    transition: &Transition,
    sink: &mut dyn EventSink,
) {
    let updates = engine.take_performance_updates();
    if !updates.is_empty() {
        debug!(count = updates.len(), "recording last performance");
        data_manager.record_performance(updates);
    }
    match transition {
        Transition::NoChange => {}
        Transition::Tick { remaining_sec } => {
            let phase = engine.phase().unwrap_or(Phase::Work);
            emit_timer_tick(sink, *remaining_sec, phase);
        }
        Transition::Work { queue_index } => {
            if let Some(payload) = step_changed_payload(engine, *queue_index) {
                emit_step_changed(sink, payload);
            }
            if let Some(remaining) = engine.remaining_sec() {
                emit_timer_tick(sink, remaining, Phase::Work);
            }
        }
        Transition::Rest {
            queue_index,
            rest_sec,
        } => {
            let payload = rest_started_payload(engine, *queue_index, *rest_sec);
            emit_rest_started(sink, payload);
        }
        Transition::Finished(summary) => {
            info!(sets = summary.sets_logged, "workout complete");
            emit_run_finished(sink, summary.clone());
        }
        Transition::Stopped => emit_run_stopped(sink),
    }
}

/// Starts a run over the stored draft. Returns false when the plan is empty.
pub fn start_run<S: KeyValueStore>(
    engine: &mut RunEngine,
    data_manager: &mut DataManager<S>,
    sink: &mut dyn EventSink,
) -> Result<bool, AppError> {
    let draft = data_manager.load_draft();
    let recall = data_manager.load_last_performance();
    let transition = engine.start(&draft, recall)?;
    let started = transition != Transition::NoChange;
    if started {
        info!(name = %draft.name, items = draft.items.len(), "workout started");
    }
    settle(engine, data_manager, &transition, sink);
    Ok(started)
}

pub fn tick<S: KeyValueStore>(
    engine: &mut RunEngine,
    data_manager: &mut DataManager<S>,
    sink: &mut dyn EventSink,
) -> Result<Transition, AppError> {
    let transition = engine.tick()?;
    settle(engine, data_manager, &transition, sink);
    Ok(transition)
}

pub fn pause_run(engine: &mut RunEngine, sink: &mut dyn EventSink) -> Result<(), AppError> {
    engine.pause()?;
    emit_run_paused(sink);
    Ok(())
}

pub fn resume_run(engine: &mut RunEngine, sink: &mut dyn EventSink) -> Result<(), AppError> {
    engine.resume()?;
    emit_run_resumed(sink);
    Ok(())
}

/// Returns the new paused flag.
pub fn toggle_pause(engine: &mut RunEngine, sink: &mut dyn EventSink) -> Result<bool, AppError> {
    let paused = engine.toggle_pause()?;
    if paused {
        emit_run_paused(sink);
    } else {
        emit_run_resumed(sink);
    }
    Ok(paused)
}

pub fn enter_set(engine: &mut RunEngine, entry: SetEntry) -> Result<(), AppError> {
    engine.set_entry(entry)?;
    Ok(())
}

pub fn complete_set<S: KeyValueStore>(
    engine: &mut RunEngine,
    data_manager: &mut DataManager<S>,
    sink: &mut dyn EventSink,
) -> Result<Transition, AppError> {
    let transition = engine.complete_set()?;
    settle(engine, data_manager, &transition, sink);
    Ok(transition)
}

pub fn skip_step<S: KeyValueStore>(
    engine: &mut RunEngine,
    data_manager: &mut DataManager<S>,
    sink: &mut dyn EventSink,
) -> Result<Transition, AppError> {
    let transition = engine.skip()?;
    settle(engine, data_manager, &transition, sink);
    Ok(transition)
}

pub fn stop_run<S: KeyValueStore>(
    engine: &mut RunEngine,
    data_manager: &mut DataManager<S>,
    sink: &mut dyn EventSink,
) -> Result<(), AppError> {
    let transition = engine.stop()?;
    settle(engine, data_manager, &transition, sink);
    Ok(())
}

pub fn close_summary(engine: &mut RunEngine) -> Option<WorkoutSummary> {
    engine.close()
}
