use housing_compliance::config::ConfigError;
use housing_compliance::snapshot::SnapshotError;
use housing_compliance::telemetry::TelemetryError;
use housing_compliance::{DeadlineError, DraftError, EngineError, TableError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Input(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Engine(err) => write!(f, "{}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "output error: {}", err),
            AppError::Input(message) => write!(f, "invalid input: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Engine(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Input(_) => None,
        }
    }
}

impl From<EngineError> for AppError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Engine(value.into())
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Engine(value.into())
    }
}

impl From<TableError> for AppError {
    fn from(value: TableError) -> Self {
        Self::Engine(value.into())
    }
}

impl From<SnapshotError> for AppError {
    fn from(value: SnapshotError) -> Self {
        Self::Engine(value.into())
    }
}

impl From<DeadlineError> for AppError {
    fn from(value: DeadlineError) -> Self {
        Self::Engine(value.into())
    }
}

impl From<DraftError> for AppError {
    fn from(value: DraftError) -> Self {
        Self::Engine(value.into())
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
