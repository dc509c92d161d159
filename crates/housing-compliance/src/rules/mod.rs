//! Declarative rule table evaluated uniformly over entity snapshots.

mod catalog;
mod predicate;
pub mod thresholds;

pub use predicate::{build, Attribute, Predicate};
pub use thresholds::Thresholds;

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::deadlines::OffsetTable;
use crate::domain::{Entity, EntityRef};
use crate::drafts::render_text;
use crate::fields::FieldContext;
use crate::tables::TableError;
use crate::timers::CaseTimers;
use predicate::{Evidence, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Urgent,
    Attention,
    Info,
}

impl Severity {
    pub const fn ordered() -> [Self; 3] {
        [Self::Urgent, Self::Attention, Self::Info]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::Attention => "Attention",
            Self::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub severity: Severity,
    /// Lower values sort first within a severity bucket.
    #[serde(default)]
    pub priority: u16,
    pub predicate: Predicate,
    /// Rendered against the entity's fields plus `value` and `threshold`.
    pub message: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Versioned, validated, read-only rule table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    version: String,
    thresholds: Thresholds,
    rules: Vec<Rule>,
    #[serde(skip)]
    needs_timers: bool,
}

#[derive(Debug, Deserialize)]
struct RuleSetFile {
    version: String,
    #[serde(default)]
    thresholds: BTreeMap<String, f64>,
    rules: Vec<Rule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::assemble(
            catalog::VERSION.to_string(),
            Thresholds::default(),
            catalog::default_rules(),
        )
    }
}

impl RuleSet {
    pub fn new(
        version: impl Into<String>,
        thresholds: Thresholds,
        rules: Vec<Rule>,
    ) -> Result<Self, TableError> {
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(TableError::DuplicateRule(rule.id.clone()));
            }
            if let Some(missing) = rule
                .predicate
                .thresholds()
                .into_iter()
                .find(|name| !thresholds.contains(name))
            {
                return Err(TableError::UnknownThreshold {
                    rule: rule.id.clone(),
                    threshold: missing.to_string(),
                });
            }
        }

        Ok(Self::assemble(version.into(), thresholds, rules))
    }

    /// Thresholds in the file override the defaults; rules replace the catalogue.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let file: RuleSetFile = serde_json::from_reader(reader).map_err(TableError::Json)?;
        Self::new(
            file.version,
            Thresholds::with_overrides(file.thresholds),
            file.rules,
        )
    }

    fn assemble(version: String, thresholds: Thresholds, rules: Vec<Rule>) -> Self {
        let needs_timers = rules.iter().any(|rule| rule.predicate.needs_timers());
        Self {
            version,
            thresholds,
            rules,
            needs_timers,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }
}

/// Evaluation inputs beyond the entity itself.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub now: DateTime<Utc>,
    pub offsets: &'a OffsetTable,
}

impl<'a> RuleContext<'a> {
    pub fn new(now: DateTime<Utc>, offsets: &'a OffsetTable) -> Self {
        Self { now, offsets }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub rule_id: String,
    pub entity: EntityRef,
    pub severity: Severity,
    pub priority: u16,
    pub message: String,
    pub action: Option<String>,
    pub confidence: Option<f32>,
}

/// Apply every rule to one entity. Total and side-effect free: rules never
/// short-circuit each other and an unrenderable message falls back to its
/// raw template.
pub fn evaluate(entity: &Entity, rules: &RuleSet, ctx: &RuleContext<'_>) -> Vec<Finding> {
    let timer = if rules.needs_timers {
        case_timer_status(entity, ctx)
    } else {
        None
    };
    let subject = Subject {
        entity,
        now: ctx.now,
        thresholds: &rules.thresholds,
        timer,
    };
    let fields = FieldContext::for_entity(entity);

    let mut findings: Vec<Finding> = rules
        .rules
        .iter()
        .filter_map(|rule| {
            let mut evidence = Evidence::default();
            if !rule.predicate.matches(&subject, &mut evidence) {
                return None;
            }
            Some(Finding {
                rule_id: rule.id.clone(),
                entity: entity.reference(),
                severity: rule.severity,
                priority: rule.priority,
                message: render_message(rule, &fields, evidence),
                action: rule.action.clone(),
                confidence: rule.confidence,
            })
        })
        .collect();

    // Stable: equal (severity, priority) keep declaration order.
    findings.sort_by_key(|finding| (finding.severity, finding.priority));
    findings
}

/// Findings for a whole scoped set, ordered by severity, priority, entity id,
/// then rule declaration order.
pub fn evaluate_all(entities: &[Entity], rules: &RuleSet, ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings: Vec<Finding> = entities
        .iter()
        .flat_map(|entity| evaluate(entity, rules, ctx))
        .collect();

    findings.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then(a.priority.cmp(&b.priority))
            .then_with(|| a.entity.id.cmp(&b.entity.id))
    });

    debug!(
        entities = entities.len(),
        findings = findings.len(),
        rules = %rules.version,
        "evaluated rule set"
    );
    findings
}

fn case_timer_status(
    entity: &Entity,
    ctx: &RuleContext<'_>,
) -> Option<crate::timers::TimerStatus> {
    let case = entity.as_case()?;
    match CaseTimers::for_case(case, ctx.offsets, ctx.now) {
        Ok(timers) => timers.current,
        Err(err) => {
            warn!(case = %case.id, error = %err, "skipping deadline rules for case");
            None
        }
    }
}

fn render_message(rule: &Rule, fields: &FieldContext, evidence: Evidence) -> String {
    let mut fields = fields.clone();
    if let Some(value) = evidence.value {
        fields.insert("value", format_number(value));
    }
    if let Some(threshold) = evidence.threshold {
        fields.insert("threshold", format_number(threshold));
    }

    match render_text(&rule.message, &fields) {
        Ok(text) => text,
        Err(err) => {
            debug!(rule = %rule.id, error = %err, "rule message left unrendered");
            rule.message.clone()
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests;
