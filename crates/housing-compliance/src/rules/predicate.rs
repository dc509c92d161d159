use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::thresholds::Thresholds;
use crate::domain::{
    CaseCategory, CasePriority, ComplianceState, Entity, EntityKind, HazardClass,
    VulnerabilityCategory,
};
use crate::timers::TimerStatus;

/// Numeric attributes a rule can compare against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    RentBalance,
    WeeksInArrears,
    ArrearsRisk,
    ContactsLast30Days,
    DaysSinceLastContact,
    VulnerabilityCount,
    DaysOpen,
    RecurrenceRisk,
    EscalationRisk,
    DampRisk,
    DaysUntilCertificateExpiry,
}

impl Attribute {
    /// `None` when the entity does not carry the attribute.
    pub fn value(self, entity: &Entity, now: DateTime<Utc>) -> Option<f64> {
        match (self, entity) {
            (Self::RentBalance, Entity::Tenant(tenant)) => Some(tenant.rent_balance),
            (Self::WeeksInArrears, Entity::Tenant(tenant)) => Some(tenant.weeks_in_arrears()),
            (Self::ArrearsRisk, Entity::Tenant(tenant)) => Some(f64::from(tenant.arrears_risk)),
            (Self::ContactsLast30Days, Entity::Tenant(tenant)) => {
                Some(f64::from(tenant.contact_count_30_days))
            }
            (Self::DaysSinceLastContact, Entity::Tenant(tenant)) => tenant
                .last_contact
                .map(|date| (now.date_naive() - date).num_days() as f64),
            (Self::VulnerabilityCount, Entity::Tenant(tenant)) => {
                Some(tenant.vulnerability_markers.len() as f64)
            }
            (Self::DaysOpen, Entity::Case(case)) => {
                Some((now - case.created_at).num_days() as f64)
            }
            (Self::RecurrenceRisk, Entity::Case(case)) => case.recurrence_risk.map(f64::from),
            (Self::EscalationRisk, Entity::Case(case)) => case.escalation_risk.map(f64::from),
            (Self::DampRisk, Entity::Case(case)) => case.damp_risk_score.map(f64::from),
            (Self::DampRisk, Entity::Property(property)) => Some(f64::from(property.damp_risk)),
            (Self::DaysUntilCertificateExpiry, Entity::Property(property)) => property
                .earliest_certificate_expiry()
                .map(|expiry| (expiry - now.date_naive()).num_days() as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    Below { attribute: Attribute, threshold: String },
    Above { attribute: Attribute, threshold: String },
    AtMost { attribute: Attribute, threshold: String },
    AtLeast { attribute: Attribute, threshold: String },
    Kind { kind: EntityKind },
    Category { category: CaseCategory },
    Priority { priority: CasePriority },
    Hazard { hazard: HazardClass },
    Open,
    Vulnerable {
        #[serde(default)]
        category: Option<VulnerabilityCategory>,
    },
    Compliance { state: ComplianceState },
    DeadlineBreached,
    DeadlineAtRisk,
    All { predicates: Vec<Predicate> },
    Any { predicates: Vec<Predicate> },
    Not { predicate: Box<Predicate> },
}

/// Everything a predicate may look at for one entity.
pub(crate) struct Subject<'a> {
    pub entity: &'a Entity,
    pub now: DateTime<Utc>,
    pub thresholds: &'a Thresholds,
    /// Aggregate live deadline status for cases with a schedule.
    pub timer: Option<TimerStatus>,
}

/// The first numeric comparison that held, exposed to message templates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Evidence {
    pub value: Option<f64>,
    pub threshold: Option<f64>,
}

impl Predicate {
    pub(crate) fn matches(&self, subject: &Subject<'_>, evidence: &mut Evidence) -> bool {
        match self {
            Self::Below {
                attribute,
                threshold,
            } => compare(subject, *attribute, threshold, evidence, |v, t| v < t),
            Self::Above {
                attribute,
                threshold,
            } => compare(subject, *attribute, threshold, evidence, |v, t| v > t),
            Self::AtMost {
                attribute,
                threshold,
            } => compare(subject, *attribute, threshold, evidence, |v, t| v <= t),
            Self::AtLeast {
                attribute,
                threshold,
            } => compare(subject, *attribute, threshold, evidence, |v, t| v >= t),
            Self::Kind { kind } => subject.entity.kind() == *kind,
            Self::Category { category } => subject
                .entity
                .as_case()
                .is_some_and(|case| case.category == *category),
            Self::Priority { priority } => subject
                .entity
                .as_case()
                .is_some_and(|case| case.priority == *priority),
            Self::Hazard { hazard } => subject
                .entity
                .as_case()
                .is_some_and(|case| case.hazard == Some(*hazard)),
            Self::Open => subject.entity.as_case().is_some_and(|case| case.is_open()),
            Self::Vulnerable { category } => {
                let markers = subject.entity.vulnerability_markers();
                match category {
                    Some(category) => markers.iter().any(|marker| marker.category == *category),
                    None => !markers.is_empty(),
                }
            }
            Self::Compliance { state } => subject
                .entity
                .as_property()
                .is_some_and(|property| property.compliance == *state),
            Self::DeadlineBreached => subject.timer == Some(TimerStatus::Breached),
            Self::DeadlineAtRisk => subject.timer == Some(TimerStatus::AtRisk),
            Self::All { predicates } => {
                let mut scratch = *evidence;
                let matched = predicates
                    .iter()
                    .all(|predicate| predicate.matches(subject, &mut scratch));
                if matched {
                    *evidence = scratch;
                }
                matched
            }
            Self::Any { predicates } => predicates.iter().any(|predicate| {
                // A branch that fails must not leave its comparisons behind.
                let mut scratch = *evidence;
                let matched = predicate.matches(subject, &mut scratch);
                if matched {
                    *evidence = scratch;
                }
                matched
            }),
            Self::Not { predicate } => {
                let mut scratch = Evidence::default();
                !predicate.matches(subject, &mut scratch)
            }
        }
    }

    /// Threshold names referenced anywhere in the predicate tree.
    pub fn thresholds(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_thresholds(&mut names);
        names
    }

    fn collect_thresholds<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Below { threshold, .. }
            | Self::Above { threshold, .. }
            | Self::AtMost { threshold, .. }
            | Self::AtLeast { threshold, .. } => names.push(threshold),
            Self::All { predicates } | Self::Any { predicates } => {
                for predicate in predicates {
                    predicate.collect_thresholds(names);
                }
            }
            Self::Not { predicate } => predicate.collect_thresholds(names),
            _ => {}
        }
    }

    /// Whether evaluating the predicate needs the case's deadline status.
    pub(crate) fn needs_timers(&self) -> bool {
        match self {
            Self::DeadlineBreached | Self::DeadlineAtRisk => true,
            Self::All { predicates } | Self::Any { predicates } => {
                predicates.iter().any(Predicate::needs_timers)
            }
            Self::Not { predicate } => predicate.needs_timers(),
            _ => false,
        }
    }
}

fn compare(
    subject: &Subject<'_>,
    attribute: Attribute,
    threshold: &str,
    evidence: &mut Evidence,
    holds: impl Fn(f64, f64) -> bool,
) -> bool {
    let (Some(value), Some(limit)) = (
        attribute.value(subject.entity, subject.now),
        subject.thresholds.get(threshold),
    ) else {
        return false;
    };

    let matched = holds(value, limit);
    if matched && evidence.value.is_none() {
        evidence.value = Some(value);
        evidence.threshold = Some(limit);
    }
    matched
}

/// Shorthand constructors for building rule tables in code.
pub mod build {
    use super::{Attribute, Predicate};

    pub fn below(attribute: Attribute, threshold: &str) -> Predicate {
        Predicate::Below {
            attribute,
            threshold: threshold.to_string(),
        }
    }

    pub fn above(attribute: Attribute, threshold: &str) -> Predicate {
        Predicate::Above {
            attribute,
            threshold: threshold.to_string(),
        }
    }

    pub fn at_most(attribute: Attribute, threshold: &str) -> Predicate {
        Predicate::AtMost {
            attribute,
            threshold: threshold.to_string(),
        }
    }

    pub fn at_least(attribute: Attribute, threshold: &str) -> Predicate {
        Predicate::AtLeast {
            attribute,
            threshold: threshold.to_string(),
        }
    }

    pub fn all(predicates: Vec<Predicate>) -> Predicate {
        Predicate::All { predicates }
    }
}
