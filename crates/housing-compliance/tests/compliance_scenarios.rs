use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use housing_compliance::deadlines::COMPLAINT_STAGE_ONE;
use housing_compliance::domain::{
    CasePriority, CaseStatus, ComplaintStage, ComplianceState, MarkerSeverity, Ownership,
    VulnerabilityCategory, VulnerabilityMarker,
};
use housing_compliance::{
    aggregate, draft, evaluate, resolve, scope, timer_status, Assignment, Case, CaseloadReport,
    Deadline, EngineTables, Entity, EntityId, OffsetKind, OffsetTable, PersonaRole, PersonaScope,
    Property, RuleContext, RuleSet, ScopeFilter, Severity, TemplateLibrary, Tenant, TimerStatus,
    Tone,
};

fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .expect("valid instant")
}

fn now() -> DateTime<Utc> {
    instant(2026, 2, 9, 9)
}

fn ownership(patch: &str, owner: &str) -> Ownership {
    Ownership {
        patch_id: Some(patch.to_string()),
        team_id: None,
        owners: vec![owner.to_string()],
    }
}

fn tenant(id: &str, patch: &str, balance: f64) -> Tenant {
    Tenant {
        id: EntityId::new(id),
        title: Some("Ms".to_string()),
        first_name: "Grace".to_string(),
        last_name: "Okafor".to_string(),
        property_id: None,
        ownership: ownership(patch, "Sarah Mitchell"),
        rent_balance: balance,
        weekly_charge: 200.0,
        arrears_risk: 35,
        contact_count_30_days: 1,
        last_contact: NaiveDate::from_ymd_opt(2026, 2, 2),
        vulnerability_markers: Vec::new(),
        universal_credit: None,
    }
}

fn property(id: &str, patch: &str, compliance: ComplianceState) -> Property {
    Property {
        id: EntityId::new(id),
        address: format!("{id} Weir Street"),
        postcode: None,
        ownership: ownership(patch, "Sarah Mitchell"),
        compliance,
        damp_risk: 10,
        certificates: Vec::new(),
        is_void: false,
    }
}

fn complaint(id: &str, patch: &str, created_at: DateTime<Utc>) -> Case {
    Case {
        id: EntityId::new(id),
        reference: format!("CMP-{id}"),
        category: housing_compliance::domain::CaseCategory::Complaint,
        status: CaseStatus::Open,
        priority: CasePriority::Routine,
        created_at,
        subject: Some("Missed appointment".to_string()),
        tenant_id: None,
        property_id: None,
        ownership: ownership(patch, "Kevin Brown"),
        complaint_stage: Some(ComplaintStage::One),
        hazard: None,
        recurrence_risk: None,
        escalation_risk: None,
        damp_risk_score: None,
        milestones_completed: BTreeMap::new(),
    }
}

#[test]
fn friday_stage_one_complaint_skips_the_weekend() {
    let friday = instant(2026, 2, 6, 14);
    assert_eq!(friday.weekday(), Weekday::Fri);

    let acknowledge = resolve(friday, 5.0, OffsetKind::WorkingDays).expect("valid offset");
    assert_eq!(acknowledge, instant(2026, 2, 13, 14));
    assert_eq!(acknowledge.weekday(), Weekday::Fri);
    assert_ne!(acknowledge, friday + Duration::days(5));

    let respond = resolve(friday, 10.0, OffsetKind::WorkingDays).expect("valid offset");
    assert_eq!(respond, instant(2026, 2, 20, 14));

    let case = complaint("c-1", "north", friday);
    let offsets = OffsetTable::statutory();
    assert_eq!(OffsetTable::schedule_key(&case), Some(COMPLAINT_STAGE_ONE));

    let deadlines = offsets.case_deadlines(&case).expect("schedule resolves");
    let named: Vec<(&str, DateTime<Utc>)> = deadlines
        .iter()
        .map(|named| (named.name.as_str(), named.deadline.due))
        .collect();
    assert_eq!(named, [("acknowledge", acknowledge), ("respond", respond)]);
}

#[test]
fn timer_status_follows_the_remaining_window() {
    let start = instant(2026, 2, 2, 9);
    let deadline = Deadline::new(start, 4.0, OffsetKind::CalendarDays).expect("valid deadline");

    assert_eq!(timer_status(&deadline, start, None), TimerStatus::OnTrack);
    assert_eq!(
        timer_status(&deadline, instant(2026, 2, 5, 12), None),
        TimerStatus::AtRisk
    );
    assert_eq!(
        timer_status(&deadline, instant(2026, 2, 6, 10), None),
        TimerStatus::Breached
    );
    assert_eq!(
        timer_status(&deadline, instant(2026, 2, 6, 10), Some(instant(2026, 2, 5, 12))),
        TimerStatus::Met
    );
}

#[test]
fn minor_arrears_yield_one_attention_finding_and_a_formal_letter() {
    let entity = Entity::Tenant(tenant("t-1", "north", -600.0));
    let offsets = OffsetTable::statutory();
    let ctx = RuleContext::new(now(), &offsets);

    let findings = evaluate(&entity, &RuleSet::default(), &ctx);
    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.severity, Severity::Attention);
    assert_eq!(
        finding.action.as_deref(),
        Some("send arrears support letter")
    );
    assert_eq!(finding.message, "Rent account is £600.00 in arrears");

    let letter = draft(
        &TemplateLibrary::default(),
        "arrears-support",
        &entity,
        Some(Tone::Formal),
    )
    .expect("draft renders");
    assert_eq!(letter.tone, Tone::Formal);
    assert!(letter.text.starts_with("Dear Ms Okafor"));
    assert!(letter.text.contains("£600.00"));
}

#[test]
fn mental_health_marker_forces_a_supportive_tone() {
    let mut vulnerable = tenant("t-1", "north", -600.0);
    vulnerable.vulnerability_markers.push(VulnerabilityMarker {
        marker_type: "mental-health".to_string(),
        category: VulnerabilityCategory::Health,
        severity: MarkerSeverity::Medium,
    });
    let entity = Entity::Tenant(vulnerable);
    let library = TemplateLibrary::default();

    let supportive = draft(&library, "arrears-support", &entity, Some(Tone::Formal))
        .expect("draft renders");
    assert_eq!(supportive.tone, Tone::Supportive);

    let again = draft(&library, "arrears-support", &entity, Some(Tone::Formal))
        .expect("draft renders");
    assert_eq!(supportive, again);
}

fn hundred_entities() -> Vec<Entity> {
    let patches = ["south", "east", "west", "central"];
    let mut entities = Vec::with_capacity(100);
    for index in 0..100usize {
        let north = index % 8 == 0 && index < 96;
        let patch = if north {
            "north"
        } else {
            patches[index % patches.len()]
        };
        let id = format!("e-{index:03}");
        let entity = match index % 3 {
            0 => Entity::Tenant(tenant(&id, patch, -(index as f64) * 10.0)),
            1 => Entity::Property(property(&id, patch, ComplianceState::Compliant)),
            _ => Entity::Case(complaint(&id, patch, now() - Duration::days(2))),
        };
        entities.push(entity);
    }
    entities
}

#[test]
fn north_caseworker_sees_exactly_the_north_patch() {
    let entities = hundred_entities();
    let north: Vec<&Entity> = entities
        .iter()
        .filter(|entity| entity.ownership().patch_id.as_deref() == Some("north"))
        .collect();
    assert_eq!(north.len(), 12);

    let persona = PersonaScope::new(
        PersonaRole::parse("caseworker"),
        Assignment::Scoped(ScopeFilter::patches(["north"])),
    );
    let scoped = scope(&persona, &entities);
    assert_eq!(scoped.len(), 12);
    assert!(scoped.iter().all(|entity| north.contains(&entity)));

    let kpis = aggregate(&scoped);
    let expected_tenancies = north
        .iter()
        .filter(|entity| entity.as_tenant().is_some())
        .count();
    let expected_units = north
        .iter()
        .filter(|entity| entity.as_property().is_some())
        .count();
    assert_eq!(kpis.total_tenancies, expected_tenancies);
    assert_eq!(kpis.total_units, expected_units);
    assert_eq!(
        kpis.open_case_total(),
        12 - expected_tenancies - expected_units
    );
    assert_ne!(kpis, aggregate(&entities));

    let report = CaseloadReport::build(&persona, &entities, &EngineTables::default(), now());
    assert_eq!(report.visible_entities, 12);
    assert_eq!(report.kpis, kpis);
}

#[test]
fn portfolio_scope_is_the_identity() {
    let entities = hundred_entities();
    assert_eq!(scope(&PersonaScope::portfolio(), &entities), entities);
}
