use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::deadlines::OffsetTable;
use crate::domain::{
    Case, CaseCategory, CasePriority, CaseStatus, ComplianceState, Entity, EntityId,
    MarkerSeverity, Ownership, Property, SafetyCertificate, Tenant, VulnerabilityCategory,
    VulnerabilityMarker,
};
use crate::rules::{evaluate, Finding, RuleContext, RuleSet};

/// Monday 9 February 2026, 09:00 UTC.
pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 9, 9, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn tenant(id: &str, balance: f64) -> Tenant {
    Tenant {
        id: EntityId::new(id),
        title: Some("Mr".to_string()),
        first_name: "David".to_string(),
        last_name: "Chen".to_string(),
        property_id: Some(EntityId::new("prop-1")),
        ownership: Ownership {
            patch_id: Some("north".to_string()),
            team_id: Some("team-a".to_string()),
            owners: vec!["Sarah Mitchell".to_string()],
        },
        rent_balance: balance,
        weekly_charge: 150.0,
        arrears_risk: 35,
        contact_count_30_days: 1,
        last_contact: Some(date(2026, 1, 20)),
        vulnerability_markers: Vec::new(),
        universal_credit: None,
    }
}

pub(super) fn marker(marker_type: &str, category: VulnerabilityCategory) -> VulnerabilityMarker {
    VulnerabilityMarker {
        marker_type: marker_type.to_string(),
        category,
        severity: MarkerSeverity::High,
    }
}

pub(super) fn case(id: &str, category: CaseCategory, opened_days_ago: i64) -> Case {
    Case {
        id: EntityId::new(id),
        reference: format!("REF-{id}"),
        category,
        status: CaseStatus::Open,
        priority: CasePriority::Routine,
        created_at: now() - Duration::days(opened_days_ago),
        subject: Some("Boiler not heating".to_string()),
        tenant_id: Some(EntityId::new("tenant-1")),
        property_id: Some(EntityId::new("prop-1")),
        ownership: Ownership::patch("north"),
        complaint_stage: None,
        hazard: None,
        recurrence_risk: None,
        escalation_risk: None,
        damp_risk_score: None,
        milestones_completed: BTreeMap::new(),
    }
}

pub(super) fn property(id: &str, compliance: ComplianceState) -> Property {
    Property {
        id: EntityId::new(id),
        address: "14 Riverside Crescent".to_string(),
        postcode: Some("E1 4QR".to_string()),
        ownership: Ownership::patch("north"),
        compliance,
        damp_risk: 20,
        certificates: vec![SafetyCertificate {
            kind: "gas-safety".to_string(),
            expires_on: date(2026, 11, 1),
        }],
        is_void: false,
    }
}

pub(super) fn run(entity: &Entity) -> Vec<Finding> {
    let offsets = OffsetTable::statutory();
    let ctx = RuleContext::new(now(), &offsets);
    evaluate(entity, &RuleSet::default(), &ctx)
}

pub(super) fn rule_ids(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|f| f.rule_id.as_str()).collect()
}
