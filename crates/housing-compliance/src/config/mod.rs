use std::env;
use std::fmt;
use std::path::PathBuf;

use tracing::info;

use crate::deadlines::OffsetTable;
use crate::drafts::TemplateLibrary;
use crate::rules::RuleSet;
use crate::tables::{open_table, EngineTables, TableError};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the engine and its consumers.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub tables: TablePaths,
}

impl EngineConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(value) => LogFormat::parse(&value).ok_or(ConfigError::InvalidLogFormat(value))?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level, format },
            tables: TablePaths {
                rules: optional_path("ENGINE_RULES_PATH"),
                offsets: optional_path("ENGINE_OFFSETS_PATH"),
                templates: optional_path("ENGINE_TEMPLATES_PATH"),
            },
        })
    }

    /// Built-in tables, each replaced by its JSON file when a path is configured.
    pub fn tables(&self) -> Result<EngineTables, TableError> {
        let rules = match &self.tables.rules {
            Some(path) => RuleSet::from_json_reader(open_table(path)?)?,
            None => RuleSet::default(),
        };
        let offsets = match &self.tables.offsets {
            Some(path) => OffsetTable::from_json_reader(open_table(path)?)?,
            None => OffsetTable::default(),
        };
        let templates = match &self.tables.templates {
            Some(path) => TemplateLibrary::from_json_reader(open_table(path)?)?,
            None => TemplateLibrary::default(),
        };

        let tables = EngineTables {
            rules,
            offsets,
            templates,
        };
        let versions = tables.versions();
        info!(
            rules = %versions.rules,
            offsets = %versions.offsets,
            templates = %versions.templates,
            "engine tables loaded"
        );
        Ok(tables)
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Optional replacement files for the built-in tables.
#[derive(Debug, Clone, Default)]
pub struct TablePaths {
    pub rules: Option<PathBuf>,
    pub offsets: Option<PathBuf>,
    pub templates: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidLogFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be compact or pretty, got '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
