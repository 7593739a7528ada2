mod terminal;

use clap::{Parser, Subcommand, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use workout_planner::commands::{self, Direction};
use workout_planner::plan::{BlockEdit, ItemEdit};
use workout_planner::{
    logging, AppConfig, AppError, DataManager, FileStore, KeyValueStore, MemoryCatalog,
};

#[derive(Parser)]
#[command(
    name = "workout-planner",
    version,
    about = "Build workout plans and run them with a set and rest timer"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the workout documents
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// How many saved workouts to keep
    #[arg(long, global = true)]
    saved_limit: Option<usize>,

    /// Log filter, e.g. "debug" or "workout_planner=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in exercise library
    Library {
        /// Only show one group, e.g. "legs"
        #[arg(long)]
        group: Option<String>,
    },
    /// Show the current plan
    Show,
    /// Show the run order with the rest after each step
    Queue,
    /// Add a library exercise by id
    Add { exercise_id: String },
    /// Add an exercise that is not in the library
    AddCustom {
        name: String,
        #[arg(long, default_value = "")]
        group: String,
    },
    /// Move an exercise up or down
    Move {
        /// Position or id of the exercise
        item: String,
        #[arg(value_enum)]
        direction: MoveDirection,
    },
    /// Remove an exercise
    Remove { item: String },
    /// Change an exercise's sets, reps, timing, weight or rest
    Edit {
        item: String,
        #[arg(long, allow_negative_numbers = true)]
        sets: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        reps: Option<i64>,
        /// Work duration in seconds for timed exercises
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
        #[arg(long)]
        timed: Option<bool>,
        #[arg(long)]
        weight: Option<String>,
        /// Rest override in seconds; enables the override
        #[arg(long, allow_negative_numbers = true)]
        rest: Option<i64>,
        /// Turn the rest override on or off
        #[arg(long)]
        rest_override: Option<bool>,
    },
    /// Run an exercise and the one after it as a circuit
    Link { item: String },
    /// Take an exercise out of its block or circuit
    Unlink { item: String },
    /// Manage blocks
    Block {
        #[command(subcommand)]
        action: BlockCommand,
    },
    /// Change the plan name and default rest
    Plan {
        #[arg(long)]
        name: Option<String>,
        /// Default rest in seconds
        #[arg(long, allow_negative_numbers = true)]
        rest: Option<i64>,
        /// Start rest countdowns automatically
        #[arg(long)]
        auto_rest: Option<bool>,
    },
    /// Save a copy of the current plan
    Save,
    /// List saved workouts, most recent first
    Saved,
    /// Replace the current plan with a saved workout
    Load { index: NonZeroUsize },
    /// Delete a saved workout
    Delete { index: NonZeroUsize },
    /// Start over with an empty plan
    Clear,
    /// Run the current plan
    Run,
}

#[derive(Subcommand)]
enum BlockCommand {
    /// Create an empty block
    Create {
        #[arg(default_value = "")]
        name: String,
        /// Run members one after another instead of as a circuit
        #[arg(long)]
        sequential: bool,
    },
    /// Change a block's name, rounds, kind or rest
    Edit {
        block: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        rounds: Option<i64>,
        #[arg(long)]
        circuit: Option<bool>,
        /// Rest override in seconds; enables the override
        #[arg(long, allow_negative_numbers = true)]
        rest: Option<i64>,
        #[arg(long)]
        rest_override: Option<bool>,
    },
    /// Delete a block; its exercises stay in the plan
    Remove { block: String },
    /// Put an exercise into a block, or take it out when no block is given
    Assign { item: String, block: Option<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}

fn item_edits(
    sets: Option<i64>,
    reps: Option<i64>,
    duration: Option<i64>,
    timed: Option<bool>,
    weight: Option<String>,
    rest: Option<i64>,
    rest_override: Option<bool>,
) -> Vec<ItemEdit> {
    let rest_override = rest_override.or(rest.map(|_| true));
    [
        sets.map(ItemEdit::Sets),
        reps.map(ItemEdit::Reps),
        duration.map(ItemEdit::DurationSec),
        timed.map(ItemEdit::Timed),
        weight.map(ItemEdit::Weight),
        rest.map(ItemEdit::RestSec),
        rest_override.map(ItemEdit::RestOverride),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn block_edits(
    name: Option<String>,
    rounds: Option<i64>,
    circuit: Option<bool>,
    rest: Option<i64>,
    rest_override: Option<bool>,
) -> Vec<BlockEdit> {
    let rest_override = rest_override.or(rest.map(|_| true));
    // Circuit first so a new rounds value syncs member sets.
    [
        circuit.map(BlockEdit::Circuit),
        name.map(BlockEdit::Name),
        rounds.map(BlockEdit::Rounds),
        rest.map(BlockEdit::RestSec),
        rest_override.map(BlockEdit::RestOverride),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn execute<S: KeyValueStore>(
    command: Command,
    data_manager: &mut DataManager<S>,
) -> Result<(), AppError> {
    let catalog = MemoryCatalog::builtin();
    match command {
        Command::Library { group } => terminal::print_library(&catalog, group.as_deref()),
        Command::Show => terminal::print_plan(&commands::current_plan(data_manager)),
        Command::Queue => terminal::print_queue(&commands::current_plan(data_manager)),
        Command::Add { exercise_id } => {
            let item = commands::add_exercise(data_manager, &catalog, &exercise_id)?;
            println!("Added {} ({} x {})", item.name, item.sets, item.reps);
        }
        Command::AddCustom { name, group } => {
            let item = commands::add_freeform(data_manager, &name, &group)?;
            println!("Added {}", item.name);
        }
        Command::Move { item, direction } => {
            let item_id = terminal::resolve_item(&commands::current_plan(data_manager), &item)?;
            if !commands::move_item(data_manager, &item_id, direction.into())? {
                println!("Already at the edge of the plan");
            }
        }
        Command::Remove { item } => {
            let item_id = terminal::resolve_item(&commands::current_plan(data_manager), &item)?;
            let removed = commands::remove_item(data_manager, &item_id)?;
            println!("Removed {}", removed.name);
        }
        Command::Edit {
            item,
            sets,
            reps,
            duration,
            timed,
            weight,
            rest,
            rest_override,
        } => {
            let item_id = terminal::resolve_item(&commands::current_plan(data_manager), &item)?;
            let edits = item_edits(sets, reps, duration, timed, weight, rest, rest_override);
            for edit in edits {
                commands::edit_item(data_manager, &item_id, edit)?;
            }
            terminal::print_plan(&commands::current_plan(data_manager));
        }
        Command::Link { item } => {
            let item_id = terminal::resolve_item(&commands::current_plan(data_manager), &item)?;
            match commands::link_with_next(data_manager, &item_id)? {
                Some(_) => terminal::print_plan(&commands::current_plan(data_manager)),
                None => println!("The last exercise has nothing to link with"),
            }
        }
        Command::Unlink { item } => {
            let item_id = terminal::resolve_item(&commands::current_plan(data_manager), &item)?;
            if !commands::unlink(data_manager, &item_id)? {
                println!("That exercise is not in a block");
            }
        }
        Command::Block { action } => execute_block(action, data_manager)?,
        Command::Plan {
            name,
            rest,
            auto_rest,
        } => {
            if let Some(name) = name {
                commands::set_plan_name(data_manager, &name);
            }
            if let Some(rest) = rest {
                commands::set_global_rest(data_manager, rest);
            }
            if let Some(auto_rest) = auto_rest {
                commands::set_auto_start_rest(data_manager, auto_rest);
            }
            terminal::print_plan(&commands::current_plan(data_manager));
        }
        Command::Save => {
            let saved = commands::save_plan(data_manager);
            println!("Saved at {}", saved.saved_at);
        }
        Command::Saved => {
            let saved = commands::list_saved(data_manager);
            if saved.is_empty() {
                println!("No saved workouts");
            } else {
                println!("{} of {} kept", saved.len(), data_manager.saved_limit());
            }
            for (index, workout) in saved.iter().enumerate() {
                let name = if workout.draft.name.is_empty() {
                    "Untitled workout"
                } else {
                    workout.draft.name.as_str()
                };
                println!(
                    "{:>3}. {name} ({} exercises) {}",
                    index + 1,
                    workout.draft.items.len(),
                    workout.saved_at
                );
            }
        }
        Command::Load { index } => {
            let draft = commands::load_saved_plan(data_manager, index.get() - 1)?;
            terminal::print_plan(&draft);
        }
        Command::Delete { index } => {
            let removed = commands::delete_saved_plan(data_manager, index.get() - 1)?;
            println!("Deleted {}", removed.saved_at);
        }
        Command::Clear => {
            commands::clear_plan(data_manager);
            println!("Plan cleared");
        }
        Command::Run => terminal::run_workout(data_manager)?,
    }
    Ok(())
}

fn execute_block<S: KeyValueStore>(
    action: BlockCommand,
    data_manager: &mut DataManager<S>,
) -> Result<(), AppError> {
    match action {
        BlockCommand::Create { name, sequential } => {
            let block = commands::create_block(data_manager, &name, !sequential)?;
            println!("Created {}", block.name);
        }
        BlockCommand::Edit {
            block,
            name,
            rounds,
            circuit,
            rest,
            rest_override,
        } => {
            let block_id = terminal::resolve_block(&commands::current_plan(data_manager), &block)?;
            for edit in block_edits(name, rounds, circuit, rest, rest_override) {
                commands::edit_block(data_manager, &block_id, edit)?;
            }
            terminal::print_plan(&commands::current_plan(data_manager));
        }
        BlockCommand::Remove { block } => {
            let block_id = terminal::resolve_block(&commands::current_plan(data_manager), &block)?;
            let removed = commands::remove_block(data_manager, &block_id)?;
            println!("Removed {}", removed.name);
        }
        BlockCommand::Assign { item, block } => {
            let draft = commands::current_plan(data_manager);
            let item_id = terminal::resolve_item(&draft, &item)?;
            let block_id = block
                .map(|block| terminal::resolve_block(&draft, &block))
                .transpose()?;
            commands::assign_block(data_manager, &item_id, block_id.as_deref())?;
            terminal::print_plan(&commands::current_plan(data_manager));
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = AppConfig::from_env();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(saved_limit) = cli.saved_limit {
        config.saved_limit = saved_limit;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }
    logging::init(&config.log_level)?;

    let store = FileStore::new(&config.data_dir)?;
    debug!(data_dir = %store.base_dir().display(), "opening workout data");
    let mut data_manager = DataManager::with_saved_limit(store, config.saved_limit);
    execute(cli.command, &mut data_manager)
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
