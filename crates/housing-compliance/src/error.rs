use crate::config::ConfigError;
use crate::deadlines::DeadlineError;
use crate::drafts::DraftError;
use crate::snapshot::SnapshotError;
use crate::tables::TableError;
use crate::telemetry::TelemetryError;

/// Any engine failure, for callers that chain components with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("deadline error: {0}")]
    Deadline(#[from] DeadlineError),
    #[error("draft error: {0}")]
    Draft(#[from] DraftError),
}
