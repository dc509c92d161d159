mod ledger;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Entity, EntityId, Tenant};

#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(err) => write!(f, "failed to read snapshot: {}", err),
            SnapshotError::Json(err) => write!(f, "invalid snapshot JSON: {}", err),
            SnapshotError::Csv(err) => write!(f, "invalid rent ledger CSV data: {}", err),
            SnapshotError::InvalidField { line, field, value } => write!(
                f,
                "rent ledger line {}: cannot parse {} from '{}'",
                line, field, value
            ),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(err) => Some(err),
            SnapshotError::Json(err) => Some(err),
            SnapshotError::Csv(err) => Some(err),
            SnapshotError::InvalidField { .. } => None,
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<csv::Error> for SnapshotError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// One immutable evaluation input: every tenant, property and case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    pub entities: Vec<Entity>,
}

impl Snapshot {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            captured_at: None,
            entities,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_reader(reader)?;
        debug!(entities = snapshot.entities.len(), "snapshot loaded");
        Ok(snapshot)
    }

    pub fn find(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id().as_str() == id)
    }

    /// Linked tenant and property records for a case, or the home of a tenant.
    pub fn related_to(&self, entity: &Entity) -> Vec<Entity> {
        let links: Vec<&EntityId> = match entity {
            Entity::Case(case) => case
                .tenant_id
                .iter()
                .chain(case.property_id.iter())
                .collect(),
            Entity::Tenant(tenant) => tenant.property_id.iter().collect(),
            Entity::Property(_) => Vec::new(),
        };

        links
            .into_iter()
            .filter_map(|id| self.find(id.as_str()).cloned())
            .collect()
    }

    /// Replace tenants with matching ids and append the rest, keeping order.
    pub fn merge_tenants(&mut self, tenants: Vec<Tenant>) {
        for tenant in tenants {
            let existing = self
                .entities
                .iter_mut()
                .find(|entity| matches!(entity, Entity::Tenant(t) if t.id == tenant.id));
            match existing {
                Some(slot) => *slot = Entity::Tenant(tenant),
                None => self.entities.push(Entity::Tenant(tenant)),
            }
        }
    }
}

/// Map a rent-ledger CSV export to tenant records.
pub fn import_rent_ledger<R: Read>(reader: R) -> Result<Vec<Tenant>, SnapshotError> {
    let tenants = ledger::parse_ledger(reader)?;
    debug!(tenants = tenants.len(), "rent ledger imported");
    Ok(tenants)
}
