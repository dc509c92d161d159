use super::common::*;
use crate::deadlines::OffsetTable;
use crate::domain::{CaseCategory, ComplianceState, Entity, VulnerabilityCategory};
use crate::rules::{
    build, evaluate, evaluate_all, Attribute, Predicate, Rule, RuleContext, RuleSet, Severity,
    Thresholds,
};
use crate::rules::thresholds::{ARREARS_MINOR, ARREARS_RISK_HIGH};

fn portfolio() -> Vec<Entity> {
    let mut vulnerable = tenant("tenant-b", -650.0);
    vulnerable
        .vulnerability_markers
        .push(marker("mental-health", VulnerabilityCategory::Health));

    let mut repair = case("case-z", CaseCategory::Repair, 35);
    repair.recurrence_risk = Some(90);

    vec![
        Entity::Tenant(tenant("tenant-c", -1500.0)),
        Entity::Case(repair),
        Entity::Tenant(vulnerable),
        Entity::Property(property("prop-a", ComplianceState::NonCompliant)),
    ]
}

#[test]
fn merged_findings_are_bucketed_by_severity_then_priority_then_entity() {
    let offsets = OffsetTable::statutory();
    let ctx = RuleContext::new(now(), &offsets);
    let findings = evaluate_all(&portfolio(), &RuleSet::default(), &ctx);

    let keys: Vec<(Severity, u16, &str)> = findings
        .iter()
        .map(|f| (f.severity, f.priority, f.entity.id.as_str()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);

    assert_eq!(findings[0].severity, Severity::Urgent);
    assert_eq!(findings.last().map(|f| f.severity), Some(Severity::Info));
    // Both priority-10 urgent findings, ordered by entity id.
    let urgent_ten: Vec<&str> = findings
        .iter()
        .filter(|f| f.severity == Severity::Urgent && f.priority == 10)
        .map(|f| f.entity.id.as_str())
        .collect();
    assert_eq!(urgent_ten, ["prop-a", "tenant-c"]);
}

#[test]
fn evaluation_is_deterministic_and_input_order_independent() {
    let offsets = OffsetTable::statutory();
    let ctx = RuleContext::new(now(), &offsets);
    let rules = RuleSet::default();
    let entities = portfolio();

    let first = evaluate_all(&entities, &rules, &ctx);
    let second = evaluate_all(&entities, &rules, &ctx);
    assert_eq!(first, second);

    let mut reversed = entities.clone();
    reversed.reverse();
    assert_eq!(evaluate_all(&reversed, &rules, &ctx), first);
}

#[test]
fn equal_priority_keeps_declaration_order() {
    let rule = |id: &str| Rule {
        id: id.to_string(),
        severity: Severity::Attention,
        priority: 1,
        predicate: build::below(Attribute::RentBalance, ARREARS_MINOR),
        message: format!("{id} fired"),
        action: None,
        confidence: Some(0.5),
    };
    let rules = RuleSet::new(
        "tie-break",
        Thresholds::default(),
        vec![rule("second-declared-first"), rule("alpha")],
    )
    .expect("valid rule set");

    let offsets = OffsetTable::statutory();
    let ctx = RuleContext::new(now(), &offsets);
    let findings = evaluate(&Entity::Tenant(tenant("t", -900.0)), &rules, &ctx);
    assert_eq!(rule_ids(&findings), ["second-declared-first", "alpha"]);
    assert_eq!(findings[0].confidence, Some(0.5));
}

#[test]
fn message_values_come_from_the_branch_that_matched() {
    // The first branch's balance comparison holds but its risk check fails.
    let predicate = Predicate::Any {
        predicates: vec![
            build::all(vec![
                build::below(Attribute::RentBalance, ARREARS_MINOR),
                build::above(Attribute::ArrearsRisk, ARREARS_RISK_HIGH),
            ]),
            build::at_most(Attribute::ArrearsRisk, ARREARS_RISK_HIGH),
        ],
    };
    let rules = RuleSet::new(
        "evidence",
        Thresholds::default(),
        vec![Rule {
            id: "risk-within-limit".to_string(),
            severity: Severity::Info,
            priority: 1,
            predicate,
            message: "{{value}} against {{threshold}}".to_string(),
            action: None,
            confidence: None,
        }],
    )
    .expect("valid rule set");

    let offsets = OffsetTable::statutory();
    let ctx = RuleContext::new(now(), &offsets);
    let findings = evaluate(&Entity::Tenant(tenant("t", -600.0)), &rules, &ctx);
    assert_eq!(rule_ids(&findings), ["risk-within-limit"]);
    assert_eq!(findings[0].message, "35 against 70");
}
