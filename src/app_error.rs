use crate::data_manager::DataError;
use crate::run_engine::RunError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppErrorKind {
    System,
    Data,
    Plan,
    Run,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppErrorPayload {
    pub kind: AppErrorKind,
    pub message: String,
    pub detail: Option<String>,
    pub recoverable: bool,
}

#[derive(Debug, Clone)]
pub struct AppError {
    kind: AppErrorKind,
    message: String,
    detail: Option<String>,
    recoverable: bool,
}

impl AppError {
    pub fn new(kind: AppErrorKind, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            recoverable,
        }
    }

    pub fn with_detail(
        kind: AppErrorKind,
        message: impl Into<String>,
        detail: impl Into<String>,
        recoverable: bool,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: Some(detail.into()),
            recoverable,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::System, message, false)
    }

    /// An edit referenced an item, block or saved workout that does not exist.
    pub fn not_found(what: &str, id: impl fmt::Display) -> Self {
        Self::with_detail(
            AppErrorKind::Plan,
            format!("No such {what}"),
            format!("{what} not found: {id}"),
            true,
        )
    }

    pub fn kind(&self) -> AppErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn payload(&self) -> AppErrorPayload {
        AppErrorPayload {
            kind: self.kind,
            message: self.message.clone(),
            detail: self.detail.clone(),
            recoverable: self.recoverable,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({detail})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for AppError {}

impl From<RunError> for AppError {
    fn from(error: RunError) -> Self {
        let detail = error.to_string();
        let message = match error {
            RunError::NotRunning => "No workout is running",
            RunError::AlreadyRunning => "A workout is already running",
            RunError::AlreadyPaused => "The workout is already paused",
            RunError::NotPaused => "The workout is not paused",
        };
        Self::with_detail(AppErrorKind::Run, message, detail, true)
    }
}

impl From<DataError> for AppError {
    fn from(error: DataError) -> Self {
        let detail = error.to_string();
        let message = match error {
            DataError::Io(_) => "Failed to read or write workout data",
            DataError::Serde(_) => "Failed to parse workout data",
        };
        Self::with_detail(AppErrorKind::Data, message, detail, true)
    }
}
