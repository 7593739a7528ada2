use crate::app_error::AppErrorPayload;
use crate::models::{Phase, WorkoutSummary};
use serde::Serialize;

pub const TIMER_TICK_EVENT: &str = "timer-tick";
pub const STEP_CHANGED_EVENT: &str = "step-changed";
pub const REST_STARTED_EVENT: &str = "rest-started";
pub const RUN_PAUSED_EVENT: &str = "run-paused";
pub const RUN_RESUMED_EVENT: &str = "run-resumed";
pub const RUN_STOPPED_EVENT: &str = "run-stopped";
pub const RUN_FINISHED_EVENT: &str = "run-finished";
pub const APP_ERROR_EVENT: &str = "app-error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerTickPayload {
    pub remaining_seconds: u32,
    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepChangedPayload {
    pub queue_index: usize,
    pub queue_len: usize,
    pub item_id: String,
    pub item_name: String,
    pub set_number: u32,
    pub total_sets: u32,
    pub is_circuit_step: bool,
    /// Countdown length for timed sets.
    pub duration_sec: Option<u32>,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestStartedPayload {
    pub queue_index: usize,
    pub rest_sec: u32,
    pub auto_start: bool,
    pub next_item_name: Option<String>,
}

/// Everything the run layer reports to a front end.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum RunEvent {
    TimerTick(TimerTickPayload),
    StepChanged(StepChangedPayload),
    RestStarted(RestStartedPayload),
    RunPaused,
    RunResumed,
    RunStopped,
    RunFinished(WorkoutSummary),
    AppError(AppErrorPayload),
}

impl RunEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TimerTick(_) => TIMER_TICK_EVENT,
            Self::StepChanged(_) => STEP_CHANGED_EVENT,
            Self::RestStarted(_) => REST_STARTED_EVENT,
            Self::RunPaused => RUN_PAUSED_EVENT,
            Self::RunResumed => RUN_RESUMED_EVENT,
            Self::RunStopped => RUN_STOPPED_EVENT,
            Self::RunFinished(_) => RUN_FINISHED_EVENT,
            Self::AppError(_) => APP_ERROR_EVENT,
        }
    }
}

pub trait EventSink {
    fn emit(&mut self, event: RunEvent);
}

/// Collects events in order, for tests and replay.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<RunEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(RunEvent::name).collect()
    }

    pub fn take(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: RunEvent) {
        self.events.push(event);
    }
}

pub fn emit_timer_tick(sink: &mut dyn EventSink, remaining_seconds: u32, phase: Phase) {
    sink.emit(RunEvent::TimerTick(TimerTickPayload {
        remaining_seconds,
        phase,
    }));
}

pub fn emit_step_changed(sink: &mut dyn EventSink, payload: StepChangedPayload) {
    sink.emit(RunEvent::StepChanged(payload));
}

pub fn emit_rest_started(sink: &mut dyn EventSink, payload: RestStartedPayload) {
    sink.emit(RunEvent::RestStarted(payload));
}

pub fn emit_run_paused(sink: &mut dyn EventSink) {
    sink.emit(RunEvent::RunPaused);
}

pub fn emit_run_resumed(sink: &mut dyn EventSink) {
    sink.emit(RunEvent::RunResumed);
}

pub fn emit_run_stopped(sink: &mut dyn EventSink) {
    sink.emit(RunEvent::RunStopped);
}

pub fn emit_run_finished(sink: &mut dyn EventSink, summary: WorkoutSummary) {
    sink.emit(RunEvent::RunFinished(summary));
}

pub fn emit_app_error(sink: &mut dyn EventSink, payload: AppErrorPayload) {
    sink.emit(RunEvent::AppError(payload));
}
