use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use clap::Args;
use housing_compliance::domain::{
    CaseCategory, CasePriority, CaseStatus, ComplaintStage, ComplianceState, HazardClass,
    MarkerSeverity, Ownership, SafetyCertificate, UniversalCreditStatus, VulnerabilityCategory,
    VulnerabilityMarker,
};
use housing_compliance::snapshot::Snapshot;
use housing_compliance::timers::escalation_for;
use housing_compliance::{
    Case, CaseTimers, CaseloadReport, EngineTables, Entity, EntityId, PersonaScope, Property,
    Tenant, Tone,
};
use std::collections::BTreeMap;

use crate::commands::{render_case_timers, render_report};
use crate::error::AppError;
use crate::infra::{parse_instant, persona, resolve_now};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Evaluation instant, RFC 3339 or YYYY-MM-DD (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Persona role for the scoped half of the demo
    #[arg(long, default_value = "caseworker")]
    pub(crate) role: String,
    /// Patch assigned to the scoped persona (repeatable)
    #[arg(long = "patch", default_value = "north")]
    pub(crate) patches: Vec<String>,
    /// List every finding rather than severity counts only
    #[arg(long)]
    pub(crate) list_findings: bool,
}

pub(crate) fn run_demo(args: DemoArgs, tables: &EngineTables) -> Result<(), AppError> {
    let DemoArgs {
        now,
        role,
        patches,
        list_findings,
    } = args;
    let now = resolve_now(now);
    let snapshot = sample_snapshot(now);

    println!("Housing compliance demo");
    println!(
        "Sample portfolio: {} records, evaluated at {}",
        snapshot.entities.len(),
        now
    );

    println!("\n== Portfolio view ==");
    let portfolio = CaseloadReport::build(&PersonaScope::portfolio(), &snapshot.entities, tables, now);
    render_report(&portfolio.summary(), list_findings);

    println!("\n== Scoped view ==");
    let scoped_persona = persona(&role, &patches, &[], &[]);
    let scoped = CaseloadReport::build(&scoped_persona, &snapshot.entities, tables, now);
    render_report(&scoped.summary(), true);

    println!("\n== Statutory deadlines ==");
    for case in snapshot.entities.iter().filter_map(Entity::as_case) {
        let timers = CaseTimers::for_case(case, &tables.offsets, now)?;
        if timers.milestones.is_empty() {
            continue;
        }
        render_case_timers(&timers, &escalation_for(&timers, now));
    }

    println!("\n== Letters ==");
    for finding in portfolio
        .findings
        .iter()
        .filter(|finding| finding.action.as_deref() == Some("send arrears support letter"))
    {
        let Some(entity) = snapshot.find(finding.entity.id.as_str()) else {
            continue;
        };
        let related = snapshot.related_to(entity);
        let draft =
            tables
                .templates
                .draft_with_related("arrears-support", entity, &related, Some(Tone::Formal))?;
        println!(
            "\n--- {} for {} (requested formal, sent {}) ---",
            draft.template, finding.entity, draft.tone
        );
        println!("{}", draft.text);
    }

    Ok(())
}

fn ownership(patch: &str, owner: &str) -> Ownership {
    Ownership {
        patch_id: Some(patch.to_string()),
        team_id: Some(format!("{patch}-team")),
        owners: vec![owner.to_string()],
    }
}

/// Most recent Friday 14:00 at or before `now`.
fn previous_friday(now: DateTime<Utc>) -> DateTime<Utc> {
    let back = (now.weekday().num_days_from_monday() + 7 - Weekday::Fri.num_days_from_monday()) % 7;
    let day = now.date_naive() - Duration::days(i64::from(back));
    let candidate = day
        .and_hms_opt(14, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now);
    if candidate > now {
        candidate - Duration::days(7)
    } else {
        candidate
    }
}

fn sample_snapshot(now: DateTime<Utc>) -> Snapshot {
    let today = now.date_naive();

    let properties = vec![
        Property {
            id: EntityId::new("prop-14rc"),
            address: "14 Riverside Crescent".to_string(),
            postcode: Some("E1 4QR".to_string()),
            ownership: ownership("north", "Sarah Mitchell"),
            compliance: ComplianceState::Compliant,
            damp_risk: 22,
            certificates: vec![SafetyCertificate {
                kind: "gas-safety".to_string(),
                expires_on: today + Duration::days(240),
            }],
            is_void: false,
        },
        Property {
            id: EntityId::new("prop-3ws"),
            address: "3 Weir Street".to_string(),
            postcode: Some("E1 6TT".to_string()),
            ownership: ownership("north", "Sarah Mitchell"),
            compliance: ComplianceState::Expiring,
            damp_risk: 68,
            certificates: vec![SafetyCertificate {
                kind: "eicr".to_string(),
                expires_on: today + Duration::days(12),
            }],
            is_void: false,
        },
        Property {
            id: EntityId::new("prop-27ml"),
            address: "27 Mill Lane".to_string(),
            postcode: Some("E2 8PL".to_string()),
            ownership: ownership("south", "James Wilson"),
            compliance: ComplianceState::NonCompliant,
            damp_risk: 15,
            certificates: Vec::new(),
            is_void: true,
        },
    ];

    let tenants = vec![
        Tenant {
            id: EntityId::new("ten-chen"),
            title: Some("Mr".to_string()),
            first_name: "David".to_string(),
            last_name: "Chen".to_string(),
            property_id: Some(EntityId::new("prop-14rc")),
            ownership: ownership("north", "Sarah Mitchell"),
            rent_balance: -600.0,
            weekly_charge: 200.0,
            arrears_risk: 45,
            contact_count_30_days: 2,
            last_contact: Some(today - Duration::days(9)),
            vulnerability_markers: Vec::new(),
            universal_credit: Some(UniversalCreditStatus::Claiming),
        },
        Tenant {
            id: EntityId::new("ten-okafor"),
            title: Some("Mrs".to_string()),
            first_name: "Grace".to_string(),
            last_name: "Okafor".to_string(),
            property_id: Some(EntityId::new("prop-3ws")),
            ownership: ownership("north", "Sarah Mitchell"),
            rent_balance: -842.5,
            weekly_charge: 121.0,
            arrears_risk: 72,
            contact_count_30_days: 6,
            last_contact: Some(today - Duration::days(2)),
            vulnerability_markers: vec![VulnerabilityMarker {
                marker_type: "mental-health".to_string(),
                category: VulnerabilityCategory::Health,
                severity: MarkerSeverity::Medium,
            }],
            universal_credit: Some(UniversalCreditStatus::Transitioning),
        },
        Tenant {
            id: EntityId::new("ten-reed"),
            title: None,
            first_name: "Amy".to_string(),
            last_name: "Reed".to_string(),
            property_id: None,
            ownership: ownership("south", "James Wilson"),
            rent_balance: 40.0,
            weekly_charge: 110.0,
            arrears_risk: 10,
            contact_count_30_days: 0,
            last_contact: Some(today - Duration::days(210)),
            vulnerability_markers: Vec::new(),
            universal_credit: None,
        },
    ];

    let cases = vec![
        Case {
            id: EntityId::new("case-cmp-31"),
            reference: "CMP-2026-00031".to_string(),
            category: CaseCategory::Complaint,
            status: CaseStatus::Open,
            priority: CasePriority::Routine,
            created_at: previous_friday(now),
            subject: Some("Missed repair appointment".to_string()),
            tenant_id: Some(EntityId::new("ten-chen")),
            property_id: Some(EntityId::new("prop-14rc")),
            ownership: ownership("north", "Kevin Brown"),
            complaint_stage: Some(ComplaintStage::One),
            hazard: None,
            recurrence_risk: None,
            escalation_risk: Some(64),
            damp_risk_score: None,
            milestones_completed: BTreeMap::new(),
        },
        Case {
            id: EntityId::new("case-dm-12"),
            reference: "DM-2026-00012".to_string(),
            category: CaseCategory::DampMould,
            status: CaseStatus::InProgress,
            priority: CasePriority::Urgent,
            created_at: now - Duration::days(12),
            subject: Some("Black mould in bedroom".to_string()),
            tenant_id: Some(EntityId::new("ten-okafor")),
            property_id: Some(EntityId::new("prop-3ws")),
            ownership: ownership("north", "Kevin Brown"),
            complaint_stage: None,
            hazard: Some(HazardClass::Significant),
            recurrence_risk: Some(66),
            escalation_risk: None,
            damp_risk_score: Some(74),
            milestones_completed: BTreeMap::from([(
                "investigate".to_string(),
                now - Duration::days(6),
            )]),
        },
        Case {
            id: EntityId::new("case-rep-88"),
            reference: "REP-2026-00088".to_string(),
            category: CaseCategory::Repair,
            status: CaseStatus::Open,
            priority: CasePriority::Routine,
            created_at: now - Duration::days(40),
            subject: Some("Leaking kitchen tap".to_string()),
            tenant_id: Some(EntityId::new("ten-reed")),
            property_id: None,
            ownership: ownership("south", "James Wilson"),
            complaint_stage: None,
            hazard: None,
            recurrence_risk: None,
            escalation_risk: None,
            damp_risk_score: None,
            milestones_completed: BTreeMap::new(),
        },
    ];

    let entities = properties
        .into_iter()
        .map(Entity::Property)
        .chain(tenants.into_iter().map(Entity::Tenant))
        .chain(cases.into_iter().map(Entity::Case))
        .collect();

    Snapshot {
        captured_at: Some(now),
        entities,
    }
}
