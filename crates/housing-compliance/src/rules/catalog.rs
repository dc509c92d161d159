use super::predicate::build::{above, all, at_least, at_most, below};
use super::predicate::{Attribute, Predicate};
use super::thresholds::*;
use super::{Rule, Severity};
use crate::domain::{CaseCategory, ComplianceState, EntityKind, HazardClass, VulnerabilityCategory};

pub(super) const VERSION: &str = "housing-rules-2026.1";

fn rule(
    id: &str,
    severity: Severity,
    priority: u16,
    predicate: Predicate,
    message: &str,
    action: Option<&str>,
) -> Rule {
    Rule {
        id: id.to_string(),
        severity,
        priority,
        predicate,
        message: message.to_string(),
        action: action.map(str::to_string),
        confidence: None,
    }
}

fn open_case(category: CaseCategory, extra: Predicate) -> Predicate {
    all(vec![Predicate::Category { category }, Predicate::Open, extra])
}

pub(super) fn default_rules() -> Vec<Rule> {
    use Attribute::*;
    use Severity::*;

    vec![
        // Tenancies
        rule(
            "tenant-safeguarding",
            Urgent,
            5,
            Predicate::Vulnerable {
                category: Some(VulnerabilityCategory::Safeguarding),
            },
            "Safeguarding marker recorded for {{name}}",
            Some("review the safeguarding plan before any contact"),
        ),
        rule(
            "tenant-arrears-severe",
            Urgent,
            10,
            below(RentBalance, ARREARS_SEVERE),
            "Rent account is {{arrears}} in arrears, beyond the severe threshold",
            Some("arrange an arrears review meeting"),
        ),
        rule(
            "tenant-arrears-legal",
            Urgent,
            15,
            at_least(WeeksInArrears, ARREARS_LEGAL_WEEKS),
            "{{weeks_in_arrears}} weeks of rent owed; the pre-action protocol applies",
            Some("review for Notice of Seeking Possession under the pre-action protocol"),
        ),
        rule(
            "tenant-arrears-minor",
            Attention,
            20,
            all(vec![
                below(RentBalance, ARREARS_MINOR),
                at_least(RentBalance, ARREARS_SEVERE),
            ]),
            "Rent account is {{arrears}} in arrears",
            Some("send arrears support letter"),
        ),
        rule(
            "tenant-arrears-action",
            Attention,
            25,
            all(vec![
                at_least(WeeksInArrears, ARREARS_ACTION_WEEKS),
                below(WeeksInArrears, ARREARS_LEGAL_WEEKS),
            ]),
            "{{weeks_in_arrears}} weeks of rent owed",
            Some("agree a repayment plan"),
        ),
        rule(
            "tenant-arrears-risk",
            Attention,
            30,
            above(ArrearsRisk, ARREARS_RISK_HIGH),
            "Predicted arrears risk of {{value}} for {{name}}",
            Some("offer a benefits check and payment plan"),
        ),
        rule(
            "tenant-contact-frequency",
            Attention,
            35,
            above(ContactsLast30Days, CONTACT_FREQUENCY),
            "{{value}} contacts in the last 30 days",
            Some("assign a single point of contact"),
        ),
        rule(
            "tenant-silent",
            Attention,
            40,
            above(DaysSinceLastContact, SILENT_TENANT_DAYS),
            "No contact with {{name}} for {{value}} days",
            Some("schedule a welfare check visit"),
        ),
        rule(
            "tenant-vulnerability",
            Info,
            50,
            Predicate::Vulnerable { category: None },
            "Vulnerability markers recorded; use supportive communication",
            None,
        ),
        rule(
            "tenant-arrears-warning",
            Info,
            60,
            all(vec![
                at_least(WeeksInArrears, ARREARS_WARNING_WEEKS),
                below(WeeksInArrears, ARREARS_ACTION_WEEKS),
            ]),
            "{{weeks_in_arrears}} weeks of rent owed",
            Some("make early-intervention contact"),
        ),
        // Cases
        rule(
            "case-deadline-breached",
            Urgent,
            1,
            all(vec![Predicate::Open, Predicate::DeadlineBreached]),
            "{{reference}} has breached a statutory deadline",
            Some("escalate to the Director of Housing"),
        ),
        rule(
            "case-hazard-emergency",
            Urgent,
            2,
            all(vec![
                Predicate::Open,
                Predicate::Hazard {
                    hazard: HazardClass::Emergency,
                },
            ]),
            "{{reference}} is an emergency hazard",
            Some("arrange an emergency inspection within 24 hours"),
        ),
        rule(
            "complaint-ombudsman-high",
            Urgent,
            10,
            open_case(
                CaseCategory::Complaint,
                at_least(EscalationRisk, ESCALATION_RISK_HIGH),
            ),
            "{{reference}} has a {{value}}% Ombudsman escalation risk",
            Some("arrange a senior manager review"),
        ),
        rule(
            "case-deadline-at-risk",
            Attention,
            5,
            all(vec![Predicate::Open, Predicate::DeadlineAtRisk]),
            "{{reference}} is approaching a statutory deadline",
            Some("prioritise the next milestone"),
        ),
        rule(
            "complaint-ombudsman-elevated",
            Attention,
            20,
            open_case(
                CaseCategory::Complaint,
                all(vec![
                    at_least(EscalationRisk, ESCALATION_RISK_ELEVATED),
                    below(EscalationRisk, ESCALATION_RISK_HIGH),
                ]),
            ),
            "{{reference}} has a {{value}}% Ombudsman escalation risk",
            Some("contact the complainant proactively"),
        ),
        rule(
            "repair-recurrence",
            Attention,
            30,
            open_case(CaseCategory::Repair, above(RecurrenceRisk, RECURRENCE_RISK)),
            "{{reference}} has a {{value}}% recurrence risk",
            Some("inspect for the root cause before the next visit"),
        ),
        rule(
            "repair-delay",
            Attention,
            35,
            open_case(CaseCategory::Repair, above(DaysOpen, REPAIR_DELAY_DAYS)),
            "{{reference}} has been open for {{value}} days",
            Some("send a holding update to the tenant"),
        ),
        // Properties
        rule(
            "property-non-compliant",
            Urgent,
            10,
            Predicate::Compliance {
                state: ComplianceState::NonCompliant,
            },
            "{{address}} has an expired safety certificate",
            Some("book a certificate renewal inspection immediately"),
        ),
        rule(
            "property-certificate-expiring",
            Attention,
            20,
            all(vec![
                Predicate::Kind {
                    kind: EntityKind::Property,
                },
                at_most(DaysUntilCertificateExpiry, CERTIFICATE_EXPIRY_DAYS),
            ]),
            "A safety certificate at {{address}} expires on {{certificate_expiry}}",
            Some("schedule the renewal inspection"),
        ),
        rule(
            "property-damp-risk",
            Attention,
            30,
            all(vec![
                Predicate::Kind {
                    kind: EntityKind::Property,
                },
                above(DampRisk, DAMP_RISK_ELEVATED),
            ]),
            "{{address}} has a damp risk score of {{value}}",
            Some("send damp prevention advice"),
        ),
    ]
}
