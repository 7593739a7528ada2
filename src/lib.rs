pub mod app_error;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod data_manager;
pub mod decode;
pub mod events;
pub mod logging;
pub mod models;
pub mod plan;
pub mod run_actions;
pub mod run_engine;
pub mod run_log;
pub mod run_queue;
pub mod store;
pub mod summary;

pub use app_error::{AppError, AppErrorKind};
pub use catalog::{ExerciseCatalog, MemoryCatalog};
pub use config::AppConfig;
pub use data_manager::{DataError, DataManager, DataResult};
pub use events::{EventSink, RunEvent};
pub use models::{Block, Phase, SetEntry, SetLog, WorkoutDraft, WorkoutItem, WorkoutSummary};
pub use run_engine::{RunEngine, RunError, Transition};
pub use run_queue::{build_run_queue, effective_rest_sec, RunQueue, Step};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use summary::{build_summary, render_summary};
