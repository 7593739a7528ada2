use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use workout_planner::catalog::ExerciseCatalog;
use workout_planner::commands::report_error;
use workout_planner::events::{EventSink, RunEvent};
use workout_planner::models::{Phase, WorkoutDraft};
use workout_planner::run_actions;
use workout_planner::summary::render_summary;
use workout_planner::{
    build_run_queue, effective_rest_sec, AppError, DataManager, KeyValueStore, RunEngine,
    Transition,
};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub fn fmt_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Prints run events as they happen. Countdown ticks rewrite the current line.
#[derive(Debug, Default)]
pub struct TerminalSink {
    ticking: bool,
}

impl TerminalSink {
    fn end_tick_line(&mut self) {
        if self.ticking {
            println!();
            self.ticking = false;
        }
    }
}

impl EventSink for TerminalSink {
    fn emit(&mut self, event: RunEvent) {
        match event {
            RunEvent::TimerTick(payload) => {
                let label = match payload.phase {
                    Phase::Work => "work",
                    Phase::Rest => "rest",
                };
                print!("\r  {label} {}   ", fmt_time(payload.remaining_seconds));
                let _ = io::stdout().flush();
                self.ticking = true;
            }
            RunEvent::StepChanged(payload) => {
                self.end_tick_line();
                let circuit = if payload.is_circuit_step { " (circuit)" } else { "" };
                println!(
                    "[{}/{}] {} - set {}/{}{circuit}, target {}",
                    payload.queue_index + 1,
                    payload.queue_len,
                    payload.item_name,
                    payload.set_number,
                    payload.total_sets,
                    payload.target,
                );
            }
            RunEvent::RestStarted(payload) => {
                self.end_tick_line();
                let next = payload
                    .next_item_name
                    .map(|name| format!(", next: {name}"))
                    .unwrap_or_default();
                if payload.auto_start {
                    println!("Rest {}{next}", fmt_time(payload.rest_sec));
                } else {
                    println!("Rest {}{next} (s to continue)", fmt_time(payload.rest_sec));
                }
            }
            RunEvent::RunPaused => {
                self.end_tick_line();
                println!("Paused");
            }
            RunEvent::RunResumed => println!("Resumed"),
            RunEvent::RunStopped => {
                self.end_tick_line();
                println!("Workout stopped");
            }
            RunEvent::RunFinished(_) => self.end_tick_line(),
            RunEvent::AppError(payload) => {
                self.end_tick_line();
                println!("! {}", payload.message);
            }
        }
    }
}

/// A line typed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunInput {
    TogglePause,
    Complete,
    Skip,
    Stop,
    Reps(Option<u32>),
    Weight(String),
    Notes(String),
    Status,
    Help,
    Unknown(String),
}

pub fn parse_run_input(line: &str) -> RunInput {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word {
        "" => RunInput::Status,
        "p" | "pause" | "resume" => RunInput::TogglePause,
        "c" | "done" => RunInput::Complete,
        "s" | "skip" => RunInput::Skip,
        "q" | "stop" => RunInput::Stop,
        "r" | "reps" => RunInput::Reps(rest.parse().ok()),
        "w" | "weight" => RunInput::Weight(rest.to_string()),
        "n" | "notes" => RunInput::Notes(rest.to_string()),
        "?" | "h" | "help" => RunInput::Help,
        _ => RunInput::Unknown(line.to_string()),
    }
}

fn print_run_help() {
    println!("  c  complete set      s  skip        p  pause/resume   q  stop");
    println!("  r <n>  actual reps   w <text>  weight   n <text>  notes   enter  status");
}

fn print_status(engine: &RunEngine) {
    let (Some(step), Some(entry)) = (engine.current_step(), engine.pending_entry()) else {
        return;
    };
    let name = engine
        .current_item()
        .map(|item| item.name.as_str())
        .unwrap_or("Exercise");
    let phase = match engine.phase() {
        Some(Phase::Rest) => "resting after",
        _ => "working on",
    };
    let reps = entry
        .reps
        .map(|reps| reps.to_string())
        .unwrap_or_else(|| "-".to_string());
    let weight: &str = if entry.weight.is_empty() { "-" } else { &entry.weight };
    let paused = if engine.is_paused() { " (paused)" } else { "" };
    println!(
        "  {phase} {name} set {}/{}{paused}; reps {reps}, weight {weight}",
        step.set_number, step.total_sets
    );
    if !entry.notes.is_empty() {
        println!("  notes: {}", entry.notes);
    }
}

enum Message {
    Line(String),
    Closed,
}

/// When the next countdown tick is due. Arming a countdown schedules its
/// first tick a full interval out and drops whatever was scheduled before.
#[derive(Debug, Default)]
struct TickSchedule {
    next: Option<Instant>,
}

impl TickSchedule {
    fn wait(&self, now: Instant) -> Option<Duration> {
        self.next.map(|next| next.saturating_duration_since(now))
    }

    /// Moves past a tick that just fired, keeping the cadence.
    fn advance(&mut self) {
        self.next = self.next.map(|next| next + TICK_INTERVAL);
    }

    fn follow(&mut self, transition: &Transition, has_countdown: bool, now: Instant) {
        let armed = matches!(transition, Transition::Work { .. } | Transition::Rest { .. });
        if !has_countdown {
            self.next = None;
        } else if armed || self.next.is_none() {
            self.next = Some(now + TICK_INTERVAL);
        }
    }
}

/// Next typed line, or `None` when the scheduled tick is due first.
fn next_message(receiver: &Receiver<Message>, schedule: &TickSchedule) -> Option<Message> {
    let received = match schedule.wait(Instant::now()) {
        Some(wait) => match receiver.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => return None,
            received => received.ok(),
        },
        None => receiver.recv().ok(),
    };
    Some(received.unwrap_or(Message::Closed))
}

fn spawn_reader(sender: Sender<Message>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(Message::Line(line)).is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Closed);
    });
}

fn handle_input<S: KeyValueStore>(
    input: RunInput,
    engine: &mut RunEngine,
    data_manager: &mut DataManager<S>,
    sink: &mut TerminalSink,
) -> Result<Transition, AppError> {
    let mut entry = engine.pending_entry().cloned().unwrap_or_default();
    match input {
        RunInput::TogglePause => {
            run_actions::toggle_pause(engine, sink)?;
        }
        RunInput::Complete => return run_actions::complete_set(engine, data_manager, sink),
        RunInput::Skip => return run_actions::skip_step(engine, data_manager, sink),
        RunInput::Stop => {
            run_actions::stop_run(engine, data_manager, sink)?;
            return Ok(Transition::Stopped);
        }
        RunInput::Reps(reps) => {
            entry.reps = reps;
            run_actions::enter_set(engine, entry)?;
        }
        RunInput::Weight(weight) => {
            entry.weight = weight;
            run_actions::enter_set(engine, entry)?;
        }
        RunInput::Notes(notes) => {
            entry.notes = notes;
            run_actions::enter_set(engine, entry)?;
        }
        RunInput::Status => print_status(engine),
        RunInput::Help => print_run_help(),
        RunInput::Unknown(line) => println!("  unknown command: {line} (? for help)"),
    }
    Ok(Transition::NoChange)
}

/// Runs the stored plan interactively until it finishes, is stopped or stdin closes.
pub fn run_workout<S: KeyValueStore>(data_manager: &mut DataManager<S>) -> Result<(), AppError> {
    let mut engine = RunEngine::new();
    let mut sink = TerminalSink::default();
    if !run_actions::start_run(&mut engine, data_manager, &mut sink)? {
        println!("The plan is empty. Add exercises first.");
        return Ok(());
    }
    print_run_help();

    let (sender, receiver) = mpsc::channel();
    spawn_reader(sender);
    let mut schedule = TickSchedule::default();
    schedule.follow(
        &Transition::Work { queue_index: 0 },
        engine.has_countdown(),
        Instant::now(),
    );

    while engine.is_running() {
        let result = match next_message(&receiver, &schedule) {
            None => {
                schedule.advance();
                run_actions::tick(&mut engine, data_manager, &mut sink)
            }
            Some(Message::Line(line)) => {
                handle_input(parse_run_input(&line), &mut engine, data_manager, &mut sink)
            }
            Some(Message::Closed) => {
                debug!("stdin closed, stopping run");
                run_actions::stop_run(&mut engine, data_manager, &mut sink)
                    .map(|()| Transition::Stopped)
            }
        };
        match result {
            Ok(transition) => schedule.follow(&transition, engine.has_countdown(), Instant::now()),
            Err(error) => {
                report_error(&mut sink, error);
            }
        }
    }

    if let Some(summary) = run_actions::close_summary(&mut engine) {
        println!();
        for line in render_summary(&summary) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn print_library(catalog: &dyn ExerciseCatalog, group: Option<&str>) {
    for exercise in catalog.exercises() {
        if group.is_some_and(|group| group != exercise.group) {
            continue;
        }
        let tags: Vec<&str> = exercise
            .tags
            .iter()
            .map(|tag| catalog.tag_label(tag).unwrap_or(tag))
            .collect();
        println!(
            "{:<22} {:<34} {:<28} {}",
            exercise.id,
            exercise.name,
            catalog.group_display(&exercise.group),
            tags.join(", ")
        );
    }
}

pub fn print_plan(draft: &WorkoutDraft) {
    let title: &str = if draft.name.is_empty() {
        "Untitled workout"
    } else {
        &draft.name
    };
    let auto = if draft.auto_start_rest { "auto" } else { "manual" };
    println!("{title} (rest {}s, {auto} rest)", draft.global_rest_sec);
    if draft.items.is_empty() {
        println!("  no exercises yet");
    }
    for (index, item) in draft.items.iter().enumerate() {
        let work = if item.is_timed {
            format!("{} x {}s", item.sets, item.duration_sec)
        } else {
            format!("{} x {}", item.sets, item.reps)
        };
        let mut details = Vec::new();
        if !item.weight.is_empty() {
            details.push(item.weight.clone());
        }
        if item.rest_override_enabled {
            details.push(format!("rest {}s", item.rest_sec));
        }
        if let Some(block) = draft.block_of(item) {
            details.push(format!("in {}", block.name));
        }
        let details = if details.is_empty() {
            String::new()
        } else {
            format!(" [{}]", details.join(", "))
        };
        println!(
            "{:>3}. {} {work}{details}  ({})",
            index + 1,
            item.name,
            short_id(&item.id)
        );
    }
    for (index, block) in draft.blocks.iter().enumerate() {
        let kind = if block.is_chain && block.is_circuit {
            format!("linked circuit, up to {} rounds", block.rounds)
        } else if block.is_circuit {
            format!("circuit, {} rounds", block.rounds)
        } else {
            "sequential".to_string()
        };
        let rest = if block.rest_override_enabled {
            format!(", rest {}s", block.rest_sec)
        } else {
            String::new()
        };
        let members = draft.members_of(&block.id).count();
        println!(
            "  block {}: {} ({kind}{rest}, {members} exercises)  ({})",
            index + 1,
            block.name,
            short_id(&block.id)
        );
    }
}

pub fn print_queue(draft: &WorkoutDraft) {
    let queue = build_run_queue(draft);
    if queue.is_empty() {
        println!("The plan is empty.");
        return;
    }
    for (index, step) in queue.steps().iter().enumerate() {
        let name = draft
            .item(&step.item_id)
            .map(|item| item.name.as_str())
            .unwrap_or("Exercise");
        let rest = effective_rest_sec(draft, &queue, index);
        println!(
            "{:>3}. {name} {}/{}  rest {}",
            index + 1,
            step.set_number,
            step.total_sets,
            fmt_time(rest)
        );
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Accepts a 1-based position, a full id or a unique id prefix.
fn resolve<'a>(
    ids: impl Iterator<Item = &'a str>,
    reference: &str,
    what: &str,
) -> Result<String, AppError> {
    let ids: Vec<&str> = ids.collect();
    if let Ok(position) = reference.parse::<usize>() {
        if let Some(id) = position.checked_sub(1).and_then(|index| ids.get(index)) {
            return Ok(id.to_string());
        }
    }
    if let Some(id) = ids.iter().find(|id| **id == reference) {
        return Ok(id.to_string());
    }
    let mut matches = ids.iter().filter(|id| id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(id), None) if !reference.is_empty() => Ok(id.to_string()),
        _ => Err(AppError::not_found(what, reference)),
    }
}

pub fn resolve_item(draft: &WorkoutDraft, reference: &str) -> Result<String, AppError> {
    resolve(draft.items.iter().map(|item| item.id.as_str()), reference, "item")
}

pub fn resolve_block(draft: &WorkoutDraft, reference: &str) -> Result<String, AppError> {
    resolve(draft.blocks.iter().map(|block| block.id.as_str()), reference, "block")
}

#[cfg(test)]
mod tests {
    use super::{fmt_time, parse_run_input, resolve_item, RunInput, TickSchedule, TICK_INTERVAL};
    use std::time::{Duration, Instant};
    use workout_planner::models::{WorkoutDraft, WorkoutItem};
    use workout_planner::Transition;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(fmt_time(0), "0:00");
        assert_eq!(fmt_time(45), "0:45");
        assert_eq!(fmt_time(125), "2:05");
    }

    #[test]
    fn parses_run_input() {
        assert_eq!(parse_run_input("c"), RunInput::Complete);
        assert_eq!(parse_run_input(" r 12 "), RunInput::Reps(Some(12)));
        assert_eq!(parse_run_input("r"), RunInput::Reps(None));
        assert_eq!(parse_run_input("w 24 kg"), RunInput::Weight("24 kg".to_string()));
        assert_eq!(parse_run_input(""), RunInput::Status);
        assert_eq!(parse_run_input("dance"), RunInput::Unknown("dance".to_string()));
    }

    #[test]
    fn arming_a_countdown_restarts_the_tick_interval() {
        let start = Instant::now();
        let mut schedule = TickSchedule::default();
        schedule.follow(&Transition::Work { queue_index: 0 }, true, start);
        assert_eq!(schedule.wait(start), Some(TICK_INTERVAL));

        // two ticks on cadence, then a skip just before the third arms a new countdown
        schedule.advance();
        schedule.follow(&Transition::Tick { remaining_sec: 2 }, true, start + TICK_INTERVAL);
        schedule.advance();
        let skipped_at = start + Duration::from_millis(2900);
        assert_eq!(schedule.wait(skipped_at), Some(Duration::from_millis(100)));
        schedule.follow(&Transition::Work { queue_index: 1 }, true, skipped_at);

        assert_eq!(schedule.wait(skipped_at), Some(TICK_INTERVAL));
        assert_eq!(schedule.wait(skipped_at + TICK_INTERVAL), Some(Duration::ZERO));
    }

    #[test]
    fn ticks_stop_without_a_countdown_and_keep_cadence_while_paused() {
        let start = Instant::now();
        let mut schedule = TickSchedule::default();
        schedule.follow(&Transition::Rest { queue_index: 0, rest_sec: 30 }, true, start);

        schedule.advance();
        let late = start + Duration::from_millis(1200);
        schedule.follow(&Transition::NoChange, true, late);
        assert_eq!(schedule.wait(late), Some(Duration::from_millis(800)));

        schedule.follow(&Transition::Work { queue_index: 1 }, false, late);
        assert_eq!(schedule.wait(late), None);
    }

    #[test]
    fn resolves_items_by_position_or_id() {
        let draft = WorkoutDraft {
            items: vec![
                WorkoutItem::new("abc123", "A"),
                WorkoutItem::new("abd456", "B"),
            ],
            ..WorkoutDraft::default()
        };

        assert_eq!(resolve_item(&draft, "2").expect("position"), "abd456");
        assert_eq!(resolve_item(&draft, "abc123").expect("id"), "abc123");
        assert_eq!(resolve_item(&draft, "abd").expect("prefix"), "abd456");
        assert!(resolve_item(&draft, "ab").is_err());
        assert!(resolve_item(&draft, "3").is_err());
    }
}
