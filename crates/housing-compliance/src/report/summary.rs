use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::deadlines::DeadlineError;
use crate::domain::{Entity, EntityId};
use crate::rules::{evaluate_all, Finding, RuleContext, Severity};
use crate::scope::{aggregate_with, scope, KpiSet, PersonaScope};
use crate::tables::{EngineTables, TableVersions};
use crate::timers::{escalation_for, CaseTimers, EscalationLevel};

use super::views::{CaseEscalation, CaseloadSummary, KpiView, SeverityCountEntry};

#[derive(Debug)]
pub struct CaseloadReport {
    pub persona: PersonaScope,
    pub generated_at: DateTime<Utc>,
    pub versions: TableVersions,
    pub visible_entities: usize,
    pub kpis: KpiSet,
    pub findings: Vec<Finding>,
    /// Open cases with at least one scheduled milestone, in scope order.
    pub timers: Vec<CaseTimers>,
    /// Cases needing escalation, most senior level first.
    pub escalations: Vec<CaseEscalation>,
    /// Cases whose schedule could not be resolved; reported, never dropped silently.
    pub deadline_errors: Vec<(EntityId, DeadlineError)>,
}

impl CaseloadReport {
    pub fn build(
        persona: &PersonaScope,
        entities: &[Entity],
        tables: &EngineTables,
        now: DateTime<Utc>,
    ) -> Self {
        let visible = scope(persona, entities);
        let kpis = aggregate_with(&visible, tables.rules.thresholds());
        let ctx = RuleContext::new(now, &tables.offsets);
        let findings = evaluate_all(&visible, &tables.rules, &ctx);

        let mut timers = Vec::new();
        let mut deadline_errors = Vec::new();
        for case in visible.iter().filter_map(Entity::as_case) {
            if !case.is_open() {
                continue;
            }
            match CaseTimers::for_case(case, &tables.offsets, now) {
                Ok(case_timers) if !case_timers.milestones.is_empty() => timers.push(case_timers),
                Ok(_) => {}
                Err(err) => {
                    warn!(case = %case.id, error = %err, "case deadlines could not be resolved");
                    deadline_errors.push((case.id.clone(), err));
                }
            }
        }

        let mut escalations: Vec<CaseEscalation> = timers
            .iter()
            .map(|case_timers| CaseEscalation {
                case_id: case_timers.case_id.clone(),
                reference: case_timers.reference.clone(),
                escalation: escalation_for(case_timers, now),
            })
            .filter(|entry| entry.escalation.level > EscalationLevel::None)
            .collect();
        escalations.sort_by(|a, b| {
            b.escalation
                .level
                .cmp(&a.escalation.level)
                .then(a.escalation.days_remaining.cmp(&b.escalation.days_remaining))
                .then_with(|| a.case_id.cmp(&b.case_id))
        });

        debug!(
            persona = %persona.label(),
            visible = visible.len(),
            findings = findings.len(),
            timers = timers.len(),
            escalations = escalations.len(),
            "caseload report built"
        );

        Self {
            persona: persona.clone(),
            generated_at: now,
            versions: tables.versions(),
            visible_entities: visible.len(),
            kpis,
            findings,
            timers,
            escalations,
            deadline_errors,
        }
    }

    pub fn findings_with(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |finding| finding.severity == severity)
    }

    pub fn summary(&self) -> CaseloadSummary {
        let severity_counts = Severity::ordered()
            .into_iter()
            .map(|severity| SeverityCountEntry {
                severity,
                severity_label: severity.label(),
                count: self.findings_with(severity).count(),
            })
            .collect();

        CaseloadSummary {
            persona: self.persona.label(),
            generated_at: self.generated_at,
            versions: self.versions.clone(),
            visible_entities: self.visible_entities,
            kpis: KpiView::from_kpis(&self.kpis),
            severity_counts,
            findings: self.findings.iter().map(Finding::to_view).collect(),
            timers: self.timers.iter().map(CaseTimers::to_view).collect(),
            escalations: self
                .escalations
                .iter()
                .map(CaseEscalation::to_view)
                .collect(),
            deadline_errors: self
                .deadline_errors
                .iter()
                .map(|(id, err)| format!("{id}: {err}"))
                .collect(),
        }
    }
}
