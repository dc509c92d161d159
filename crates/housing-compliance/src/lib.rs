//! Compliance deadline and decision-support engine for social-housing
//! dashboards.
//!
//! Every operation is a pure function over an in-memory snapshot with `now`
//! passed explicitly: deadline resolution, SLA timer status, persona scoping
//! with scoped KPIs, threshold rule evaluation and templated drafting.

pub mod config;
pub mod deadlines;
pub mod domain;
pub mod drafts;
pub mod error;
pub mod fields;
pub mod report;
pub mod rules;
pub mod scope;
pub mod snapshot;
pub mod tables;
pub mod telemetry;
pub mod timers;

pub use deadlines::{resolve, Deadline, DeadlineError, OffsetKind, OffsetTable};
pub use domain::{Case, Entity, EntityId, EntityRef, Property, Tenant};
pub use drafts::{draft, Draft, DraftError, TemplateLibrary, Tone};
pub use error::EngineError;
pub use report::CaseloadReport;
pub use rules::{evaluate, evaluate_all, Finding, RuleContext, RuleSet, Severity};
pub use scope::{
    aggregate, aggregate_with, scope, Assignment, KpiSet, PersonaRole, PersonaScope, ScopeFilter,
};
pub use snapshot::Snapshot;
pub use tables::{EngineTables, TableError};
pub use timers::{timer_status, CaseTimers, TimerStatus};
