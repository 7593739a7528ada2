use crate::models::{
    CompletedBy, LastPerformance, PerformanceEntry, Phase, SetEntry, SetLog, WorkoutDraft,
    WorkoutItem, WorkoutSummary,
};
use crate::run_log::RunLog;
use crate::run_queue::{build_run_queue, effective_rest_sec, RunQueue, Step};
use crate::summary::build_summary;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("Workout not running")]
    NotRunning,
    #[error("Workout already running")]
    AlreadyRunning,
    #[error("Workout already paused")]
    AlreadyPaused,
    #[error("Workout not paused")]
    NotPaused,
}

/// Where the run ended up after an action or tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    NoChange,
    Tick { remaining_sec: u32 },
    Work { queue_index: usize },
    Rest { queue_index: usize, rest_sec: u32 },
    Finished(WorkoutSummary),
    Stopped,
}

/// The one armed countdown of a run. Replacing the slot disarms the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    remaining_sec: u32,
}

impl Countdown {
    fn arm(seconds: u32) -> Self {
        Self {
            remaining_sec: seconds,
        }
    }

    /// Returns true on the tick that reaches zero.
    fn tick(&mut self) -> bool {
        self.remaining_sec = self.remaining_sec.saturating_sub(1);
        self.remaining_sec == 0
    }
}

#[derive(Debug)]
struct ActiveRun {
    draft: WorkoutDraft,
    queue: RunQueue,
    queue_index: usize,
    phase: Phase,
    countdown: Option<Countdown>,
    rest_sec: u32,
    paused: bool,
    pending: SetEntry,
    entry_touched: bool,
    log: RunLog,
    recall: LastPerformance,
}

impl ActiveRun {
    fn current_step(&self) -> Option<&Step> {
        self.queue.get(self.queue_index)
    }

    fn current_item(&self) -> Option<&WorkoutItem> {
        self.current_step()
            .and_then(|step| self.draft.item(&step.item_id))
    }

    fn prefill(&self, step: &Step) -> SetEntry {
        if let Some(entry) = self.log.last_input(&step.item_id) {
            return entry.clone();
        }
        let item = self.draft.item(&step.item_id);
        let recalled = item
            .and_then(|item| item.exercise_id.as_deref())
            .and_then(|exercise_id| self.recall.get(exercise_id));
        match recalled {
            Some(performance) => SetEntry {
                reps: performance.reps.trim().parse().ok(),
                weight: performance.weight.clone(),
                notes: String::new(),
            },
            None => SetEntry {
                reps: None,
                weight: item.map(|item| item.weight.clone()).unwrap_or_default(),
                notes: String::new(),
            },
        }
    }
}

#[derive(Debug, Default)]
enum RunStatus {
    #[default]
    Idle,
    Running(Box<ActiveRun>),
    Finished(WorkoutSummary),
    Stopped,
}

#[derive(Debug, Default)]
pub struct RunEngine {
    status: RunStatus,
    performance_updates: Vec<(String, PerformanceEntry)>,
}

impl RunEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, RunStatus::Running(_))
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.status, RunStatus::Stopped)
    }

    pub fn summary(&self) -> Option<&WorkoutSummary> {
        match &self.status {
            RunStatus::Finished(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.active().map(|run| run.paused).unwrap_or(false)
    }

    pub fn phase(&self) -> Option<Phase> {
        self.active().map(|run| run.phase)
    }

    pub fn queue(&self) -> Option<&RunQueue> {
        self.active().map(|run| &run.queue)
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.active().and_then(ActiveRun::current_step)
    }

    pub fn current_item(&self) -> Option<&WorkoutItem> {
        self.active().and_then(ActiveRun::current_item)
    }

    /// Countdown value, or the rest length while waiting on a manual rest.
    /// `None` during untimed work.
    pub fn remaining_sec(&self) -> Option<u32> {
        let run = self.active()?;
        match (run.countdown, run.phase) {
            (Some(countdown), _) => Some(countdown.remaining_sec),
            (None, Phase::Rest) => Some(run.rest_sec),
            (None, Phase::Work) => None,
        }
    }

    /// True while a WORK or REST countdown is armed.
    pub fn has_countdown(&self) -> bool {
        self.active().is_some_and(|run| run.countdown.is_some())
    }

    /// Looks an item up in the plan snapshot the run was started with.
    pub fn item(&self, item_id: &str) -> Option<&WorkoutItem> {
        self.active().and_then(|run| run.draft.item(item_id))
    }

    pub fn pending_entry(&self) -> Option<&SetEntry> {
        self.active().map(|run| &run.pending)
    }

    pub fn logs(&self) -> &[SetLog] {
        self.active().map(|run| run.log.logs()).unwrap_or(&[])
    }

    pub fn start(
        &mut self,
        draft: &WorkoutDraft,
        recall: LastPerformance,
    ) -> Result<Transition, RunError> {
        if self.is_running() {
            return Err(RunError::AlreadyRunning);
        }
        let queue = build_run_queue(draft);
        if queue.is_empty() {
            debug!("ignoring start for an empty plan");
            return Ok(Transition::NoChange);
        }
        debug!(steps = queue.len(), "starting workout");
        self.performance_updates.clear();
        self.status = RunStatus::Running(Box::new(ActiveRun {
            draft: draft.clone(),
            queue,
            queue_index: 0,
            phase: Phase::Work,
            countdown: None,
            rest_sec: 0,
            paused: false,
            pending: SetEntry::default(),
            entry_touched: false,
            log: RunLog::new(),
            recall,
        }));
        Ok(self.enter_work(0))
    }

    pub fn pause(&mut self) -> Result<(), RunError> {
        let run = self.active_mut()?;
        if run.paused {
            return Err(RunError::AlreadyPaused);
        }
        run.paused = true;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), RunError> {
        let run = self.active_mut()?;
        if !run.paused {
            return Err(RunError::NotPaused);
        }
        run.paused = false;
        Ok(())
    }

    /// Returns the new paused flag.
    pub fn toggle_pause(&mut self) -> Result<bool, RunError> {
        if self.active_mut()?.paused {
            self.resume()?;
            Ok(false)
        } else {
            self.pause()?;
            Ok(true)
        }
    }

    /// Replaces what is entered for the set in progress.
    pub fn set_entry(&mut self, entry: SetEntry) -> Result<(), RunError> {
        let run = self.active_mut()?;
        run.pending = entry;
        run.entry_touched = true;
        Ok(())
    }

    pub fn tick(&mut self) -> Result<Transition, RunError> {
        let run = self.active_mut()?;
        if run.paused {
            return Ok(Transition::NoChange);
        }
        let Some(countdown) = run.countdown.as_mut() else {
            return Ok(Transition::NoChange);
        };
        if !countdown.tick() {
            return Ok(Transition::Tick {
                remaining_sec: countdown.remaining_sec,
            });
        }
        run.countdown = None;
        let phase = run.phase;
        match phase {
            Phase::Work => Ok(self.complete_work(CompletedBy::Timer)),
            Phase::Rest => Ok(self.advance()),
        }
    }

    /// Manual completion for rep-based sets; ignored for timed sets and during rest.
    pub fn complete_set(&mut self) -> Result<Transition, RunError> {
        let run = self.active_mut()?;
        let timed = run.current_item().map(|item| item.is_timed).unwrap_or(false);
        if run.phase != Phase::Work || timed {
            return Ok(Transition::NoChange);
        }
        Ok(self.complete_work(CompletedBy::SetComplete))
    }

    pub fn skip(&mut self) -> Result<Transition, RunError> {
        let run = self.active_mut()?;
        run.countdown = None;
        let phase = run.phase;
        match phase {
            Phase::Work => Ok(self.complete_work(CompletedBy::Skip)),
            Phase::Rest => Ok(self.advance()),
        }
    }

    pub fn stop(&mut self) -> Result<Transition, RunError> {
        let run = self.active_mut()?;
        run.countdown = None;
        debug!(logged = run.log.logs().len(), "workout stopped");
        self.status = RunStatus::Stopped;
        self.performance_updates.clear();
        Ok(Transition::Stopped)
    }

    /// Dismisses the finished or stopped view.
    pub fn close(&mut self) -> Option<WorkoutSummary> {
        match std::mem::take(&mut self.status) {
            RunStatus::Finished(summary) => Some(summary),
            RunStatus::Running(run) => {
                self.status = RunStatus::Running(run);
                None
            }
            RunStatus::Idle | RunStatus::Stopped => None,
        }
    }

    /// Last-performance changes produced by completed sets since the previous call.
    pub fn take_performance_updates(&mut self) -> Vec<(String, PerformanceEntry)> {
        std::mem::take(&mut self.performance_updates)
    }

    fn active(&self) -> Option<&ActiveRun> {
        match &self.status {
            RunStatus::Running(run) => Some(run.as_ref()),
            _ => None,
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveRun, RunError> {
        match &mut self.status {
            RunStatus::Running(run) => Ok(run.as_mut()),
            _ => Err(RunError::NotRunning),
        }
    }

    fn enter_work(&mut self, queue_index: usize) -> Transition {
        let RunStatus::Running(run) = &mut self.status else {
            return Transition::NoChange;
        };
        let Some(step) = run.queue.get(queue_index).cloned() else {
            return self.finish();
        };
        run.pending = run.prefill(&step);
        run.entry_touched = false;
        run.queue_index = queue_index;
        run.phase = Phase::Work;
        run.rest_sec = 0;
        run.countdown = run
            .draft
            .item(&step.item_id)
            .filter(|item| item.is_timed)
            .map(|item| Countdown::arm(item.duration_sec.max(1)));
        debug!(
            queue_index,
            item_id = %step.item_id,
            set = step.set_number,
            "work phase"
        );
        Transition::Work { queue_index }
    }

    fn complete_work(&mut self, completed_by: CompletedBy) -> Transition {
        let RunStatus::Running(run) = &mut self.status else {
            return Transition::NoChange;
        };
        let queue_index = run.queue_index;
        let Some(step) = run.queue.get(queue_index).cloned() else {
            return self.finish();
        };
        let item = run.draft.item(&step.item_id).cloned();
        let entry = run.pending.clone();
        let entered = run.entry_touched.then_some(&entry);
        run.log.record(queue_index, &step, item.as_ref(), entered, completed_by);

        if run.entry_touched && entry.has_actuals() {
            if let Some(exercise_id) = item.as_ref().and_then(|item| item.exercise_id.clone()) {
                self.performance_updates.push((
                    exercise_id,
                    PerformanceEntry {
                        reps: entry.reps.map(|reps| reps.to_string()).unwrap_or_default(),
                        weight: entry.weight.trim().to_string(),
                    },
                ));
            }
        }

        let RunStatus::Running(run) = &mut self.status else {
            return Transition::NoChange;
        };
        let rest_sec = effective_rest_sec(&run.draft, &run.queue, queue_index);
        if queue_index + 1 >= run.queue.len() || rest_sec == 0 {
            return self.advance();
        }
        run.phase = Phase::Rest;
        run.rest_sec = rest_sec;
        run.countdown = if run.draft.auto_start_rest {
            Some(Countdown::arm(rest_sec))
        } else {
            None
        };
        debug!(queue_index, rest_sec, "rest phase");
        Transition::Rest {
            queue_index,
            rest_sec,
        }
    }

    fn advance(&mut self) -> Transition {
        let RunStatus::Running(run) = &mut self.status else {
            return Transition::NoChange;
        };
        let next = run.queue_index + 1;
        if next >= run.queue.len() {
            return self.finish();
        }
        self.enter_work(next)
    }

    fn finish(&mut self) -> Transition {
        let RunStatus::Running(run) = &mut self.status else {
            return Transition::NoChange;
        };
        run.countdown = None;
        let summary = build_summary(&run.draft.name, &run.draft.items, run.log.logs());
        debug!(logged = summary.sets_logged, "workout finished");
        self.status = RunStatus::Finished(summary.clone());
        Transition::Finished(summary)
    }
}
