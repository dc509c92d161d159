//! Persona visibility: which slice of the portfolio a caller may see.

mod kpi;

pub use kpi::{aggregate, aggregate_with, KpiSet};

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Entity, Ownership};

/// Fixed set of dashboard personas. Unrecognised identifiers are kept so
/// they can be reported, but they never see anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PersonaRole {
    PortfolioExecutive,
    ServiceHead,
    TeamManager,
    Caseworker,
    FieldOperative,
    Unknown(String),
}

impl PersonaRole {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "portfolio-executive" | "executive" | "coo" => Self::PortfolioExecutive,
            "service-head" | "head-of-service" => Self::ServiceHead,
            "team-manager" | "manager" => Self::TeamManager,
            "caseworker" | "housing-officer" | "officer" => Self::Caseworker,
            "field-operative" | "operative" => Self::FieldOperative,
            _ => Self::Unknown(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PortfolioExecutive => "portfolio-executive",
            Self::ServiceHead => "service-head",
            Self::TeamManager => "team-manager",
            Self::Caseworker => "caseworker",
            Self::FieldOperative => "field-operative",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::PortfolioExecutive => "Portfolio executive",
            Self::ServiceHead => "Head of service",
            Self::TeamManager => "Team manager",
            Self::Caseworker => "Housing officer",
            Self::FieldOperative => "Field operative",
            Self::Unknown(_) => "Unknown role",
        }
    }

    pub fn is_portfolio_wide(&self) -> bool {
        matches!(self, Self::PortfolioExecutive | Self::ServiceHead)
    }
}

impl From<String> for PersonaRole {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PersonaRole> for String {
    fn from(role: PersonaRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for PersonaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patch, team and caseload identifiers a scoped persona is assigned to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFilter {
    #[serde(default)]
    pub patch_ids: BTreeSet<String>,
    #[serde(default)]
    pub team_ids: BTreeSet<String>,
    #[serde(default)]
    pub owners: BTreeSet<String>,
}

impl ScopeFilter {
    pub fn patches<I, S>(patches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patch_ids: patches.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patch_ids.is_empty() && self.team_ids.is_empty() && self.owners.is_empty()
    }

    /// True when any assignment attribute of the record intersects the filter.
    pub fn matches(&self, ownership: &Ownership) -> bool {
        let patch = ownership
            .patch_id
            .as_ref()
            .is_some_and(|patch| self.patch_ids.contains(patch));
        let team = ownership
            .team_id
            .as_ref()
            .is_some_and(|team| self.team_ids.contains(team));
        let owner = ownership
            .owners
            .iter()
            .any(|owner| self.owners.contains(owner));
        patch || team || owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    All,
    Scoped(ScopeFilter),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaScope {
    pub role: PersonaRole,
    pub assignment: Assignment,
}

impl PersonaScope {
    pub fn new(role: PersonaRole, assignment: Assignment) -> Self {
        Self { role, assignment }
    }

    pub fn portfolio() -> Self {
        Self::new(PersonaRole::PortfolioExecutive, Assignment::All)
    }

    pub fn is_visible(&self, entity: &Entity) -> bool {
        if matches!(self.role, PersonaRole::Unknown(_)) {
            return false;
        }
        if self.role.is_portfolio_wide() {
            return true;
        }

        // "All" is a portfolio-wide grant; any other role holding it sees nothing.
        let assigned = match &self.assignment {
            Assignment::All => false,
            Assignment::Scoped(filter) => filter.matches(entity.ownership()),
        };

        match self.role {
            // Operatives work job lists: open cases only.
            PersonaRole::FieldOperative => {
                assigned && entity.as_case().is_some_and(|case| case.is_open())
            }
            _ => assigned,
        }
    }

    pub fn label(&self) -> String {
        match &self.assignment {
            Assignment::All => format!("{} (all)", self.role.label()),
            Assignment::Scoped(filter) => {
                let mut parts = Vec::new();
                if !filter.patch_ids.is_empty() {
                    parts.push(format!("patches {}", join(&filter.patch_ids)));
                }
                if !filter.team_ids.is_empty() {
                    parts.push(format!("teams {}", join(&filter.team_ids)));
                }
                if !filter.owners.is_empty() {
                    parts.push(format!("caseload {}", join(&filter.owners)));
                }
                if parts.is_empty() {
                    format!("{} (unassigned)", self.role.label())
                } else {
                    format!("{} ({})", self.role.label(), parts.join("; "))
                }
            }
        }
    }
}

fn join(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Entities visible to the persona, in input order. Never errors: unknown
/// roles, empty assignments and scoped roles holding `All` produce an empty slice.
pub fn scope(persona: &PersonaScope, entities: &[Entity]) -> Vec<Entity> {
    if let PersonaRole::Unknown(raw) = &persona.role {
        warn!(role = %raw, "unknown persona role; scoping to no entities");
        return Vec::new();
    }
    if persona.assignment == Assignment::All && !persona.role.is_portfolio_wide() {
        warn!(
            role = %persona.role,
            "portfolio-wide assignment on a scoped role; scoping to no entities"
        );
        return Vec::new();
    }

    let visible: Vec<Entity> = entities
        .iter()
        .filter(|entity| persona.is_visible(entity))
        .cloned()
        .collect();

    debug!(
        role = %persona.role,
        total = entities.len(),
        visible = visible.len(),
        "scoped entity set"
    );

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Case, CaseCategory, CasePriority, CaseStatus, ComplianceState, EntityId, Property,
    };
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn property(id: &str, patch: &str) -> Entity {
        Entity::Property(Property {
            id: EntityId::new(id),
            address: format!("{id} Riverside Crescent"),
            postcode: None,
            ownership: Ownership::patch(patch),
            compliance: ComplianceState::Compliant,
            damp_risk: 10,
            certificates: Vec::new(),
            is_void: false,
        })
    }

    fn repair(id: &str, operative: &str, status: CaseStatus) -> Entity {
        Entity::Case(Case {
            id: EntityId::new(id),
            reference: format!("REP-{id}"),
            category: CaseCategory::Repair,
            status,
            priority: CasePriority::Routine,
            created_at: Utc.with_ymd_and_hms(2026, 1, 12, 9, 0, 0).single().expect("valid"),
            subject: Some("Leaking tap".to_string()),
            tenant_id: None,
            property_id: None,
            ownership: Ownership {
                patch_id: Some("north".to_string()),
                team_id: None,
                owners: vec![operative.to_string()],
            },
            complaint_stage: None,
            hazard: None,
            recurrence_risk: None,
            escalation_risk: None,
            damp_risk_score: None,
            milestones_completed: BTreeMap::new(),
        })
    }

    #[test]
    fn parses_role_aliases() {
        assert_eq!(PersonaRole::parse("COO"), PersonaRole::PortfolioExecutive);
        assert_eq!(PersonaRole::parse("head-of-service"), PersonaRole::ServiceHead);
        assert_eq!(PersonaRole::parse(" housing-officer "), PersonaRole::Caseworker);
        assert_eq!(
            PersonaRole::parse("auditor"),
            PersonaRole::Unknown("auditor".to_string())
        );
    }

    #[test]
    fn portfolio_roles_see_everything() {
        let entities = vec![property("p1", "north"), property("p2", "south")];
        assert_eq!(scope(&PersonaScope::portfolio(), &entities), entities);

        let head = PersonaScope::new(
            PersonaRole::ServiceHead,
            Assignment::Scoped(ScopeFilter::patches(["east"])),
        );
        assert_eq!(scope(&head, &entities).len(), 2);
    }

    #[test]
    fn caseworker_sees_assigned_patch_only() {
        let entities = vec![
            property("p1", "north"),
            property("p2", "south"),
            property("p3", "north"),
        ];
        let persona = PersonaScope::new(
            PersonaRole::Caseworker,
            Assignment::Scoped(ScopeFilter::patches(["north"])),
        );
        let visible = scope(&persona, &entities);
        let ids: Vec<&str> = visible.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(ids, ["p1", "p3"]);
    }

    #[test]
    fn operatives_see_only_their_open_jobs() {
        let entities = vec![
            property("p1", "north"),
            repair("r1", "Dan Hughes", CaseStatus::Open),
            repair("r2", "Dan Hughes", CaseStatus::Completed),
            repair("r3", "Amy Cole", CaseStatus::InProgress),
        ];
        let persona = PersonaScope::new(
            PersonaRole::FieldOperative,
            Assignment::Scoped(ScopeFilter {
                owners: ["Dan Hughes".to_string()].into_iter().collect(),
                ..ScopeFilter::default()
            }),
        );
        let visible = scope(&persona, &entities);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id().as_str(), "r1");
    }

    #[test]
    fn unknown_role_and_empty_assignment_scope_to_nothing() {
        let entities = vec![property("p1", "north")];
        let unknown = PersonaScope::new(PersonaRole::parse("auditor"), Assignment::All);
        assert!(scope(&unknown, &entities).is_empty());

        let unassigned = PersonaScope::new(
            PersonaRole::TeamManager,
            Assignment::Scoped(ScopeFilter::default()),
        );
        assert!(scope(&unassigned, &entities).is_empty());
        assert_eq!(unassigned.label(), "Team manager (unassigned)");
    }

    #[test]
    fn scoped_roles_cannot_be_widened_to_the_portfolio() {
        let entities = vec![property("p1", "north"), property("p2", "south")];
        for role in [
            PersonaRole::TeamManager,
            PersonaRole::Caseworker,
            PersonaRole::FieldOperative,
        ] {
            let persona = PersonaScope::new(role, Assignment::All);
            assert!(scope(&persona, &entities).is_empty());
            assert!(!persona.is_visible(&entities[0]));
        }

        let head = PersonaScope::new(PersonaRole::ServiceHead, Assignment::All);
        assert_eq!(scope(&head, &entities), entities);
    }

    #[test]
    fn role_round_trips_through_json_as_a_string() {
        let persona = PersonaScope::new(PersonaRole::TeamManager, Assignment::All);
        let json = serde_json::to_string(&persona).expect("serialise");
        assert_eq!(json, r#"{"role":"team-manager","assignment":"all"}"#);
        let back: PersonaScope = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, persona);
    }
}
