use chrono::{DateTime, Utc};
use clap::Args;
use housing_compliance::deadlines::{remaining_days, remaining_working_days};
use housing_compliance::report::CaseloadSummary;
use housing_compliance::timers::{escalation_for, Escalation};
use housing_compliance::{
    timer_status, CaseTimers, CaseloadReport, Deadline, EngineTables, OffsetKind, Tone,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::error::AppError;
use crate::infra::{load_snapshot, parse_instant, parse_offset_kind, parse_tone, persona, resolve_now};

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Entity snapshot (JSON)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Optional rent-ledger CSV export merged over the snapshot's tenants
    #[arg(long)]
    pub(crate) ledger: Option<PathBuf>,
    /// Persona role, e.g. caseworker, team-manager, portfolio-executive
    #[arg(long, default_value = "portfolio-executive")]
    pub(crate) role: String,
    /// Patch assigned to the persona (repeatable)
    #[arg(long = "patch")]
    pub(crate) patches: Vec<String>,
    /// Team assigned to the persona (repeatable)
    #[arg(long = "team")]
    pub(crate) teams: Vec<String>,
    /// Officer whose caseload the persona carries (repeatable)
    #[arg(long = "owner")]
    pub(crate) owners: Vec<String>,
    /// Evaluation instant, RFC 3339 or YYYY-MM-DD (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Print the summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DeadlinesArgs {
    /// Entity snapshot (JSON) holding the case
    #[arg(long, requires = "case")]
    pub(crate) snapshot: Option<PathBuf>,
    /// Case whose statutory schedule should be listed
    #[arg(long, requires = "snapshot")]
    pub(crate) case: Option<String>,
    /// Start instant for a single ad hoc deadline
    #[arg(long, value_parser = parse_instant, conflicts_with = "case", requires = "offset")]
    pub(crate) start: Option<DateTime<Utc>>,
    /// Offset for the ad hoc deadline
    #[arg(long, requires = "start")]
    pub(crate) offset: Option<f64>,
    /// Offset kind: calendar-hours, calendar-days or working-days
    #[arg(long, value_parser = parse_offset_kind, default_value = "working-days")]
    pub(crate) kind: OffsetKind,
    /// Evaluation instant, RFC 3339 or YYYY-MM-DD (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Print the schedule as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DraftArgs {
    /// Entity snapshot (JSON)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Optional rent-ledger CSV export merged over the snapshot's tenants
    #[arg(long)]
    pub(crate) ledger: Option<PathBuf>,
    /// Entity the letter is about
    #[arg(long)]
    pub(crate) entity: String,
    /// Draft template id, e.g. arrears-support
    #[arg(long)]
    pub(crate) template: String,
    /// Requested tone; vulnerability markers override it with supportive
    #[arg(long, value_parser = parse_tone)]
    pub(crate) tone: Option<Tone>,
    /// Instant recorded against the draft, RFC 3339 or YYYY-MM-DD (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
}

pub(crate) fn run_report(args: ReportArgs, tables: &EngineTables) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        ledger,
        role,
        patches,
        teams,
        owners,
        now,
        json,
    } = args;

    let snapshot = load_snapshot(&snapshot, ledger.as_deref())?;
    let persona = persona(&role, &patches, &teams, &owners);
    let now = resolve_now(now);

    let report = CaseloadReport::build(&persona, &snapshot.entities, tables, now);
    let summary = report.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        render_report(&summary, true);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CaseScheduleOutput<'a> {
    now: DateTime<Utc>,
    timers: &'a CaseTimers,
    escalation: &'a Escalation,
}

#[derive(Debug, Serialize)]
struct AdHocDeadlineOutput<'a> {
    now: DateTime<Utc>,
    deadline: &'a Deadline,
    status: &'static str,
    days_remaining: i64,
    working_days_remaining: u32,
}

pub(crate) fn run_deadlines(args: DeadlinesArgs, tables: &EngineTables) -> Result<(), AppError> {
    let DeadlinesArgs {
        snapshot,
        case,
        start,
        offset,
        kind,
        now,
        json,
    } = args;
    let now = resolve_now(now);

    match (snapshot, case, start, offset) {
        (Some(snapshot), Some(case_id), _, _) => {
            let snapshot = load_snapshot(&snapshot, None)?;
            let case = snapshot
                .find(&case_id)
                .and_then(|entity| entity.as_case())
                .ok_or_else(|| AppError::Input(format!("no case '{case_id}' in snapshot")))?;

            let timers = CaseTimers::for_case(case, &tables.offsets, now)?;
            let escalation = escalation_for(&timers, now);
            if json {
                let output = CaseScheduleOutput {
                    now,
                    timers: &timers,
                    escalation: &escalation,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                render_case_timers(&timers, &escalation);
            }
            Ok(())
        }
        (_, _, Some(start), Some(offset)) => {
            let deadline = Deadline::new(start, offset, kind)?;
            let status = timer_status(&deadline, now, None);
            let output = AdHocDeadlineOutput {
                now,
                deadline: &deadline,
                status: status.label(),
                days_remaining: remaining_days(now, deadline.due),
                working_days_remaining: remaining_working_days(now, deadline.due),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!(
                    "{} + {} {} -> due {}",
                    output.deadline.start,
                    offset,
                    kind.unit_label(),
                    output.deadline.due
                );
                println!(
                    "Status at {}: {} ({} day(s), {} working day(s) remaining)",
                    now, output.status, output.days_remaining, output.working_days_remaining
                );
            }
            Ok(())
        }
        _ => Err(AppError::Input(
            "pass --snapshot with --case, or --start with --offset".to_string(),
        )),
    }
}

pub(crate) fn run_draft(args: DraftArgs, tables: &EngineTables) -> Result<(), AppError> {
    let DraftArgs {
        snapshot,
        ledger,
        entity,
        template,
        tone,
        now,
    } = args;

    let snapshot = load_snapshot(&snapshot, ledger.as_deref())?;
    let target = snapshot
        .find(&entity)
        .ok_or_else(|| AppError::Input(format!("no entity '{entity}' in snapshot")))?;
    let related = snapshot.related_to(target);
    let draft = tables
        .templates
        .draft_with_related(&template, target, &related, tone)?;

    info!(template = %draft.template, tone = %draft.tone, entity = %target.reference(), "draft ready");
    println!(
        "Draft {} for {} ({} tone, {})",
        draft.template,
        target.reference(),
        draft.tone,
        resolve_now(now).format("%-d %B %Y")
    );
    if tone.is_some_and(|requested| requested != draft.tone) {
        println!("Tone changed to {} because of recorded vulnerability markers", draft.tone);
    }
    println!("\n{}", draft.text);
    Ok(())
}

pub(crate) fn render_report(summary: &CaseloadSummary, list_findings: bool) {
    println!("Caseload report for {}", summary.persona);
    println!(
        "Evaluated {} over {} visible record(s); rules {}, offsets {}, templates {}",
        summary.generated_at,
        summary.visible_entities,
        summary.versions.rules,
        summary.versions.offsets,
        summary.versions.templates
    );

    let kpis = &summary.kpis;
    println!("\nKey figures");
    println!(
        "- Units: {} ({} void), compliance {:.1}%",
        kpis.total_units, kpis.void_units, kpis.compliance_percentage
    );
    println!(
        "- Tenancies: {} ({} in arrears, {} high risk, {} with vulnerabilities)",
        kpis.total_tenancies,
        kpis.tenants_in_arrears,
        kpis.high_risk_tenancies,
        kpis.vulnerable_tenancies
    );
    println!("- Total arrears: £{:.2}", kpis.total_arrears);
    for entry in &kpis.open_cases {
        println!("- Open {} cases: {}", entry.category_label, entry.open);
    }

    println!("\nFindings");
    for count in &summary.severity_counts {
        println!("- {}: {}", count.severity_label, count.count);
    }
    if list_findings {
        for finding in &summary.findings {
            let action = finding
                .action
                .as_deref()
                .map(|action| format!(" -> {action}"))
                .unwrap_or_default();
            println!(
                "  [{}] {} {}{}",
                finding.severity_label, finding.entity, finding.message, action
            );
        }
    }

    if summary.timers.is_empty() {
        println!("\nCase deadlines: none");
    } else {
        println!("\nCase deadlines");
        for timer in &summary.timers {
            let next = match (&timer.milestone, timer.due, timer.days_remaining) {
                (Some(milestone), Some(due), Some(days)) => {
                    format!(", next {milestone} due {due} ({days} day(s))")
                }
                _ => String::new(),
            };
            println!("- {}: {}{}", timer.reference, timer.status_label, next);
            if !timer.missed.is_empty() {
                println!("  missed: {}", timer.missed.join(", "));
            }
        }
    }

    if summary.escalations.is_empty() {
        println!("\nEscalations: none");
    } else {
        println!("\nEscalations");
        for escalation in &summary.escalations {
            println!(
                "- {} -> {} ({})",
                escalation.reference,
                escalation.escalated_to.unwrap_or("watch list"),
                escalation.reason.as_deref().unwrap_or("deadline approaching")
            );
        }
    }

    for error in &summary.deadline_errors {
        println!("! {error}");
    }
}

pub(crate) fn render_case_timers(timers: &CaseTimers, escalation: &Escalation) {
    let status = timers
        .current
        .map(|status| status.label())
        .unwrap_or("Complete");
    println!("{} ({})", timers.reference, status);

    if timers.milestones.is_empty() {
        println!("- no statutory milestones for this case");
    }
    for milestone in &timers.milestones {
        let completion = milestone
            .completed_at
            .map(|at| format!(", completed {at}"))
            .unwrap_or_default();
        println!(
            "- {}: due {} | {} | {} day(s){}",
            milestone.name,
            milestone.deadline.due,
            milestone.status.label(),
            milestone.days_remaining,
            completion
        );
    }

    if let Some(role) = escalation.level.escalated_to() {
        println!(
            "Escalate to {}: {}",
            role,
            escalation.reason.as_deref().unwrap_or("deadline approaching")
        );
    }
}
