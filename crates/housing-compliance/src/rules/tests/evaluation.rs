use chrono::Duration;

use super::common::*;
use crate::domain::{CaseCategory, ComplaintStage, ComplianceState, Entity, VulnerabilityCategory};
use crate::rules::Severity;

#[test]
fn minor_arrears_yield_a_single_attention_finding() {
    let findings = run(&Entity::Tenant(tenant("tenant-1", -600.0)));

    let attention: Vec<_> = findings
        .iter()
        .filter(|finding| finding.severity == Severity::Attention)
        .collect();
    assert_eq!(attention.len(), 1);
    assert_eq!(attention[0].rule_id, "tenant-arrears-minor");
    assert_eq!(
        attention[0].action.as_deref(),
        Some("send arrears support letter")
    );
    assert_eq!(attention[0].message, "Rent account is £600.00 in arrears");

    // Four weeks of rent owed is an early-intervention observation only.
    assert_eq!(
        rule_ids(&findings),
        ["tenant-arrears-minor", "tenant-arrears-warning"]
    );
}

#[test]
fn severe_arrears_replace_the_minor_rule() {
    let findings = run(&Entity::Tenant(tenant("tenant-2", -1200.0)));
    assert_eq!(
        rule_ids(&findings),
        ["tenant-arrears-severe", "tenant-arrears-action"]
    );
    assert_eq!(findings[0].severity, Severity::Urgent);
    assert_eq!(findings[1].message, "8.0 weeks of rent owed");
}

#[test]
fn safeguarding_marker_is_urgent() {
    let mut record = tenant("tenant-3", 50.0);
    record
        .vulnerability_markers
        .push(marker("domestic-abuse", VulnerabilityCategory::Safeguarding));

    let findings = run(&Entity::Tenant(record));
    assert_eq!(
        rule_ids(&findings),
        ["tenant-safeguarding", "tenant-vulnerability"]
    );
    assert_eq!(findings[0].message, "Safeguarding marker recorded for Mr Chen");
    assert_eq!(findings[1].action, None);
}

#[test]
fn silent_tenant_needs_a_recorded_contact_date() {
    let mut silent = tenant("tenant-4", 0.0);
    silent.last_contact = Some(date(2025, 7, 1));
    let findings = run(&Entity::Tenant(silent.clone()));
    assert_eq!(rule_ids(&findings), ["tenant-silent"]);
    assert_eq!(findings[0].message, "No contact with Mr Chen for 223 days");

    silent.last_contact = None;
    assert!(run(&Entity::Tenant(silent)).is_empty());
}

#[test]
fn long_running_repair_with_recurrence_risk() {
    let mut repair = case("r1", CaseCategory::Repair, 40);
    repair.recurrence_risk = Some(75);

    let findings = run(&Entity::Case(repair.clone()));
    assert_eq!(rule_ids(&findings), ["repair-recurrence", "repair-delay"]);
    assert_eq!(findings[1].message, "REF-r1 has been open for 40 days");

    repair.status = crate::domain::CaseStatus::Completed;
    assert!(run(&Entity::Case(repair)).is_empty());
}

#[test]
fn breached_complaint_deadline_is_urgent() {
    let mut complaint = case("c1", CaseCategory::Complaint, 20);
    complaint.complaint_stage = Some(ComplaintStage::One);
    complaint.escalation_risk = Some(85);

    let findings = run(&Entity::Case(complaint));
    assert_eq!(
        rule_ids(&findings),
        ["case-deadline-breached", "complaint-ombudsman-high"]
    );
    assert_eq!(
        findings[1].message,
        "REF-c1 has a 85% Ombudsman escalation risk"
    );
}

#[test]
fn complaint_due_today_is_at_risk_once_acknowledged() {
    // Opened Monday 26 January: respond falls due exactly now.
    let mut complaint = case("c2", CaseCategory::Complaint, 14);
    complaint
        .milestones_completed
        .insert("acknowledge".to_string(), now() - Duration::days(12));

    let findings = run(&Entity::Case(complaint));
    assert_eq!(rule_ids(&findings), ["case-deadline-at-risk"]);
    assert_eq!(findings[0].severity, Severity::Attention);
}

#[test]
fn property_rules_cover_certificates_and_damp() {
    let mut unit = property("prop-9", ComplianceState::NonCompliant);
    unit.certificates[0].expires_on = date(2026, 2, 20);
    unit.damp_risk = 65;

    let findings = run(&Entity::Property(unit));
    assert_eq!(
        rule_ids(&findings),
        [
            "property-non-compliant",
            "property-certificate-expiring",
            "property-damp-risk"
        ]
    );
    assert_eq!(
        findings[1].message,
        "A safety certificate at 14 Riverside Crescent expires on 20 February 2026"
    );
}

#[test]
fn quiet_entities_yield_no_findings() {
    assert!(run(&Entity::Tenant(tenant("tenant-5", 25.0))).is_empty());
    assert!(run(&Entity::Property(property("prop-2", ComplianceState::Compliant))).is_empty());
    assert!(run(&Entity::Case(case("asb-1", CaseCategory::Asb, 3))).is_empty());
}
