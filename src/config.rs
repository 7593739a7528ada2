use crate::data_manager::DEFAULT_SAVED_LIMIT;
use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DATA_DIR_ENV: &str = "WORKOUT_DATA_DIR";
pub const SAVED_LIMIT_ENV: &str = "WORKOUT_SAVED_LIMIT";
pub const LOG_LEVEL_ENV: &str = "WORKOUT_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "info";

const APP_DIR_NAME: &str = "workout-planner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub saved_limit: usize,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            saved_limit: DEFAULT_SAVED_LIMIT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source; unset or blank values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(dir) = value(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(limit) = value(SAVED_LIMIT_ENV) {
            match limit.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => config.saved_limit = limit,
                _ => warn!(%limit, "ignoring invalid {SAVED_LIMIT_ENV}"),
            }
        }
        if let Some(level) = value(LOG_LEVEL_ENV) {
            config.log_level = level.trim().to_string();
        }
        config
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DATA_DIR_ENV, LOG_LEVEL_ENV, SAVED_LIMIT_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);

        assert_eq!(config.saved_limit, 20);
        assert_eq!(config.log_level, "info");
        assert!(config.data_dir.ends_with("workout-planner"));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            (DATA_DIR_ENV, "/tmp/workouts"),
            (SAVED_LIMIT_ENV, " 5 "),
            (LOG_LEVEL_ENV, "debug"),
        ]);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/workouts"));
        assert_eq!(config.saved_limit, 5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn invalid_limit_keeps_default() {
        assert_eq!(config_from(&[(SAVED_LIMIT_ENV, "0")]).saved_limit, 20);
        assert_eq!(config_from(&[(SAVED_LIMIT_ENV, "many")]).saved_limit, 20);
        assert_eq!(config_from(&[(DATA_DIR_ENV, "  ")]), config_from(&[]));
    }
}
