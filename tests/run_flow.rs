use workout_planner::commands::{self, Direction};
use workout_planner::events::{RecordingSink, RunEvent};
use workout_planner::models::{Phase, SetEntry};
use workout_planner::plan::ItemEdit;
use workout_planner::run_actions;
use workout_planner::{
    build_run_queue, effective_rest_sec, DataManager, FileStore, MemoryCatalog, MemoryStore,
    RunEngine, Transition,
};

fn labels(manager: &DataManager<MemoryStore>) -> Vec<(String, u32)> {
    let draft = manager.load_draft();
    build_run_queue(&draft)
        .steps()
        .iter()
        .map(|step| {
            let name = draft.item(&step.item_id).map(|item| item.name.clone());
            (name.unwrap_or_default(), step.set_number)
        })
        .collect()
}

fn label(name: &str, set: u32) -> (String, u32) {
    (name.to_string(), set)
}

#[test]
fn sequential_plan_runs_to_a_summary() {
    let mut manager = DataManager::new(MemoryStore::new());
    let a = commands::add_freeform(&mut manager, "A", "").expect("add a");
    let b = commands::add_freeform(&mut manager, "B", "").expect("add b");
    commands::edit_item(&mut manager, &a.id, ItemEdit::Sets(3)).expect("a sets");
    commands::edit_item(&mut manager, &b.id, ItemEdit::Sets(2)).expect("b sets");
    commands::edit_item(&mut manager, &b.id, ItemEdit::Reps(8)).expect("b reps");
    commands::set_global_rest(&mut manager, 30);

    assert_eq!(
        labels(&manager),
        vec![label("A", 1), label("A", 2), label("A", 3), label("B", 1), label("B", 2)]
    );

    let mut engine = RunEngine::new();
    let mut sink = RecordingSink::new();
    assert!(run_actions::start_run(&mut engine, &mut manager, &mut sink).expect("start"));

    let mut phases = vec![engine.phase()];
    let mut finished = None;
    for _ in 0..5 {
        let transition =
            run_actions::complete_set(&mut engine, &mut manager, &mut sink).expect("complete");
        phases.push(engine.phase());
        if let Transition::Finished(summary) = transition {
            finished = Some(summary);
            break;
        }
        assert_eq!(engine.remaining_sec(), Some(30));
        let mut ticks = 0;
        while engine.phase() == Some(Phase::Rest) {
            run_actions::tick(&mut engine, &mut manager, &mut sink).expect("tick");
            ticks += 1;
        }
        assert_eq!(ticks, 30);
        phases.push(engine.phase());
    }

    let summary = finished.expect("run finished");
    assert_eq!(summary.sets_logged, 5);
    assert_eq!(summary.items.len(), 2);
    assert_eq!(summary.items[0].sets.len(), 3);
    assert_eq!(summary.items[1].sets.len(), 2);
    assert_eq!(
        phases,
        vec![
            Some(Phase::Work),
            Some(Phase::Rest),
            Some(Phase::Work),
            Some(Phase::Rest),
            Some(Phase::Work),
            Some(Phase::Rest),
            Some(Phase::Work),
            Some(Phase::Rest),
            Some(Phase::Work),
            None,
        ]
    );
    assert!(matches!(sink.events().last(), Some(RunEvent::RunFinished(_))));
    assert_eq!(run_actions::close_summary(&mut engine), Some(summary));
}

#[test]
fn linked_items_form_a_circuit_with_drop_out() {
    let mut manager = DataManager::new(MemoryStore::new());
    let a = commands::add_freeform(&mut manager, "A", "").expect("add a");
    let b = commands::add_freeform(&mut manager, "B", "").expect("add b");
    commands::edit_item(&mut manager, &a.id, ItemEdit::Sets(2)).expect("a sets");
    commands::edit_item(&mut manager, &b.id, ItemEdit::Sets(3)).expect("b sets");
    commands::set_global_rest(&mut manager, 45);

    commands::link_with_next(&mut manager, &a.id)
        .expect("link")
        .expect("circuit");

    assert_eq!(
        labels(&manager),
        vec![label("A", 1), label("B", 1), label("A", 2), label("B", 2), label("B", 3)]
    );
    let draft = manager.load_draft();
    let queue = build_run_queue(&draft);
    let rests: Vec<u32> = (0..queue.len())
        .map(|index| effective_rest_sec(&draft, &queue, index))
        .collect();
    assert_eq!(rests, vec![0, 45, 0, 45, 0]);
}

#[test]
fn entered_actuals_are_recalled_next_time() {
    let mut manager = DataManager::new(MemoryStore::new());
    let catalog = MemoryCatalog::builtin();
    let row = commands::add_exercise(&mut manager, &catalog, "one-arm-row").expect("add row");
    commands::edit_item(&mut manager, &row.id, ItemEdit::Sets(1)).expect("sets");

    let mut engine = RunEngine::new();
    let mut sink = RecordingSink::new();
    run_actions::start_run(&mut engine, &mut manager, &mut sink).expect("start");
    run_actions::enter_set(
        &mut engine,
        SetEntry {
            reps: Some(11),
            weight: "22 kg".to_string(),
            notes: "easy".to_string(),
        },
    )
    .expect("entry");
    let transition =
        run_actions::complete_set(&mut engine, &mut manager, &mut sink).expect("complete");
    assert!(matches!(transition, Transition::Finished(_)));
    run_actions::close_summary(&mut engine);

    let again = commands::add_exercise(&mut manager, &catalog, "one-arm-row").expect("add again");
    assert_eq!(again.reps, 11);
    assert_eq!(again.weight, "22 kg");

    run_actions::start_run(&mut engine, &mut manager, &mut sink).expect("restart");
    let prefill = engine.pending_entry().expect("pending entry");
    assert_eq!(prefill.reps, Some(11));
    assert_eq!(prefill.weight, "22 kg");
}

#[test]
fn saved_list_keeps_the_twenty_most_recent() {
    let mut manager = DataManager::new(MemoryStore::new());
    for index in 0..21 {
        commands::set_plan_name(&mut manager, &format!("Plan {index}"));
        commands::save_plan(&mut manager);
    }

    let saved = commands::list_saved(&manager);
    assert_eq!(saved.len(), 20);
    assert_eq!(saved[0].draft.name, "Plan 20");
    assert_eq!(saved[19].draft.name, "Plan 1");
}

#[test]
fn plans_survive_a_restart_on_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let catalog = MemoryCatalog::builtin();
    let expected = {
        let store = FileStore::new(dir.path()).expect("store");
        let mut manager = DataManager::new(store);
        commands::add_exercise(&mut manager, &catalog, "goblet-squat").expect("squat");
        let plank = commands::add_exercise(&mut manager, &catalog, "plank").expect("plank");
        commands::edit_item(&mut manager, &plank.id, ItemEdit::Timed(true)).expect("timed");
        commands::move_item(&mut manager, &plank.id, Direction::Up).expect("move");
        commands::set_plan_name(&mut manager, "Full body");
        commands::save_plan(&mut manager);
        manager.load_draft()
    };

    let manager = DataManager::new(FileStore::new(dir.path()).expect("reopen"));
    assert_eq!(manager.load_draft(), expected);
    assert_eq!(manager.load_draft().items[0].name, "Front Plank");
    assert_eq!(commands::list_saved(&manager)[0].draft, expected);
}
