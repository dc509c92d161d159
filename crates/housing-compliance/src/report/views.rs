use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{CaseCategory, EntityId, EntityRef};
use crate::rules::{Finding, Severity};
use crate::scope::KpiSet;
use crate::tables::TableVersions;
use crate::timers::{CaseTimers, Escalation, EscalationLevel, TimerStatus};

#[derive(Debug, Clone, Serialize)]
pub struct OpenCaseEntry {
    pub category: CaseCategory,
    pub category_label: &'static str,
    pub open: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiView {
    pub total_units: usize,
    pub void_units: usize,
    pub total_tenancies: usize,
    pub tenants_in_arrears: usize,
    pub high_risk_tenancies: usize,
    pub vulnerable_tenancies: usize,
    pub total_arrears: f64,
    pub compliance_percentage: f64,
    pub open_cases: Vec<OpenCaseEntry>,
}

impl KpiView {
    pub fn from_kpis(kpis: &KpiSet) -> Self {
        let open_cases = CaseCategory::ordered()
            .into_iter()
            .map(|category| OpenCaseEntry {
                category,
                category_label: category.label(),
                open: kpis.open_cases_for(category),
            })
            .collect();

        Self {
            total_units: kpis.total_units,
            void_units: kpis.void_units,
            total_tenancies: kpis.total_tenancies,
            tenants_in_arrears: kpis.tenants_in_arrears,
            high_risk_tenancies: kpis.high_risk_tenancies,
            vulnerable_tenancies: kpis.vulnerable_tenancies,
            total_arrears: kpis.total_arrears,
            compliance_percentage: kpis.compliance_percentage,
            open_cases,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeverityCountEntry {
    pub severity: Severity,
    pub severity_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindingView {
    pub rule_id: String,
    pub entity: EntityRef,
    pub severity: Severity,
    pub severity_label: &'static str,
    pub message: String,
    pub action: Option<String>,
    pub confidence: Option<f32>,
}

impl Finding {
    pub fn to_view(&self) -> FindingView {
        FindingView {
            rule_id: self.rule_id.clone(),
            entity: self.entity.clone(),
            severity: self.severity,
            severity_label: self.severity.label(),
            message: self.message.clone(),
            action: self.action.clone(),
            confidence: self.confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseTimerView {
    pub case_id: EntityId,
    pub reference: String,
    pub status: Option<TimerStatus>,
    pub status_label: &'static str,
    pub milestone: Option<String>,
    pub due: Option<DateTime<Utc>>,
    pub days_remaining: Option<i64>,
    pub missed: Vec<String>,
}

impl CaseTimers {
    pub fn to_view(&self) -> CaseTimerView {
        let driving = self.driving_milestone();
        CaseTimerView {
            case_id: self.case_id.clone(),
            reference: self.reference.clone(),
            status: self.current,
            status_label: self
                .current
                .map(TimerStatus::label)
                .unwrap_or("Complete"),
            milestone: driving.map(|m| m.name.clone()),
            due: driving.map(|m| m.deadline.due),
            days_remaining: driving.map(|m| m.days_remaining),
            missed: self.missed.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EscalationView {
    pub case_id: EntityId,
    pub reference: String,
    pub level: EscalationLevel,
    pub escalated_to: Option<&'static str>,
    pub milestone: Option<String>,
    pub days_remaining: Option<i64>,
    pub reason: Option<String>,
}

/// One escalated case in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseEscalation {
    pub case_id: EntityId,
    pub reference: String,
    pub escalation: Escalation,
}

impl CaseEscalation {
    pub fn to_view(&self) -> EscalationView {
        EscalationView {
            case_id: self.case_id.clone(),
            reference: self.reference.clone(),
            level: self.escalation.level,
            escalated_to: self.escalation.level.escalated_to(),
            milestone: self.escalation.milestone.clone(),
            days_remaining: self.escalation.days_remaining,
            reason: self.escalation.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseloadSummary {
    pub persona: String,
    pub generated_at: DateTime<Utc>,
    pub versions: TableVersions,
    pub visible_entities: usize,
    pub kpis: KpiView,
    pub severity_counts: Vec<SeverityCountEntry>,
    pub findings: Vec<FindingView>,
    pub timers: Vec<CaseTimerView>,
    pub escalations: Vec<EscalationView>,
    pub deadline_errors: Vec<String>,
}
