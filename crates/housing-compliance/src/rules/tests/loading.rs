use std::io::Cursor;

use super::common::*;
use crate::deadlines::OffsetTable;
use crate::domain::Entity;
use crate::rules::{evaluate, RuleContext, RuleSet, Severity};
use crate::tables::TableError;

#[test]
fn default_catalogue_passes_validation() {
    let defaults = RuleSet::default();
    let rebuilt = RuleSet::new(
        defaults.version(),
        defaults.thresholds().clone(),
        defaults.rules().to_vec(),
    )
    .expect("built-in rules validate");
    assert_eq!(rebuilt, defaults);
    assert!(defaults.get("tenant-arrears-minor").is_some());
}

#[test]
fn loads_rules_and_threshold_overrides_from_json() {
    let json = r#"{
        "version": "pilot-2026.2",
        "thresholds": { "arrears_minor": -700 },
        "rules": [
            {
                "id": "arrears-pilot",
                "severity": "attention",
                "priority": 3,
                "predicate": {
                    "type": "all",
                    "predicates": [
                        { "type": "below", "attribute": "rent_balance", "threshold": "arrears_minor" },
                        { "type": "not", "predicate": { "type": "vulnerable" } }
                    ]
                },
                "message": "{{name}} owes {{arrears}} (limit {{threshold}})",
                "action": "send arrears support letter",
                "confidence": 0.8
            }
        ]
    }"#;
    let rules = RuleSet::from_json_reader(Cursor::new(json)).expect("valid rule table");
    assert_eq!(rules.version(), "pilot-2026.2");
    assert_eq!(rules.thresholds().get("arrears_minor"), Some(-700.0));
    assert_eq!(rules.thresholds().get("arrears_severe"), Some(-1000.0));

    let offsets = OffsetTable::statutory();
    let ctx = RuleContext::new(now(), &offsets);
    assert!(evaluate(&Entity::Tenant(tenant("t1", -600.0)), &rules, &ctx).is_empty());

    let findings = evaluate(&Entity::Tenant(tenant("t2", -750.0)), &rules, &ctx);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Attention);
    assert_eq!(findings[0].message, "Mr Chen owes £750.00 (limit -700)");
    assert_eq!(findings[0].confidence, Some(0.8));
}

#[test]
fn rejects_unknown_thresholds_and_duplicate_ids() {
    let unknown = r#"{
        "version": "bad",
        "rules": [{
            "id": "r1", "severity": "info",
            "predicate": { "type": "above", "attribute": "arrears_risk", "threshold": "nope" },
            "message": "x"
        }]
    }"#;
    match RuleSet::from_json_reader(Cursor::new(unknown)) {
        Err(TableError::UnknownThreshold { rule, threshold }) => {
            assert_eq!(rule, "r1");
            assert_eq!(threshold, "nope");
        }
        other => panic!("expected unknown threshold, got {other:?}"),
    }

    let duplicate = r#"{
        "version": "bad",
        "rules": [
            { "id": "dup", "severity": "info", "predicate": { "type": "open" }, "message": "a" },
            { "id": "dup", "severity": "info", "predicate": { "type": "open" }, "message": "b" }
        ]
    }"#;
    match RuleSet::from_json_reader(Cursor::new(duplicate)) {
        Err(TableError::DuplicateRule(id)) => assert_eq!(id, "dup"),
        other => panic!("expected duplicate rule, got {other:?}"),
    }
}

#[test]
fn unrenderable_message_falls_back_to_template() {
    let json = r#"{
        "version": "fallback",
        "rules": [{
            "id": "needs-reference",
            "severity": "info",
            "predicate": { "type": "kind", "kind": "tenant" },
            "message": "Case {{reference}} needs review"
        }]
    }"#;
    let rules = RuleSet::from_json_reader(Cursor::new(json)).expect("valid rule table");
    let offsets = OffsetTable::statutory();
    let ctx = RuleContext::new(now(), &offsets);
    let findings = evaluate(&Entity::Tenant(tenant("t3", 0.0)), &rules, &ctx);
    assert_eq!(findings[0].message, "Case {{reference}} needs review");
}
