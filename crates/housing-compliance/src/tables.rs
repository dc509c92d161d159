use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Serialize;

use crate::deadlines::OffsetTable;
use crate::drafts::TemplateLibrary;
use crate::rules::RuleSet;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed table JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("schedule {schedule} milestone {milestone} has an offset the calculator rejects")]
    InvalidMilestone { schedule: String, milestone: String },
    #[error("rule {rule} references unknown threshold {threshold}")]
    UnknownThreshold { rule: String, threshold: String },
    #[error("rule id {0} is declared more than once")]
    DuplicateRule(String),
    #[error("template {0} has no formal variant")]
    MissingFormalVariant(String),
    #[error("template {id} failed to compile: {message}")]
    Template { id: String, message: String },
}

/// Read-only configuration shared by every evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct EngineTables {
    pub rules: RuleSet,
    pub offsets: OffsetTable,
    pub templates: TemplateLibrary,
}

impl EngineTables {
    pub fn versions(&self) -> TableVersions {
        TableVersions {
            rules: self.rules.version().to_string(),
            offsets: self.offsets.version.clone(),
            templates: self.templates.version().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableVersions {
    pub rules: String,
    pub offsets: String,
    pub templates: String,
}

pub(crate) fn open_table(path: &Path) -> Result<BufReader<File>, TableError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })
}
