use chrono::{DateTime, NaiveDate, Utc};
use housing_compliance::snapshot::{import_rent_ledger, Snapshot};
use housing_compliance::{Assignment, OffsetKind, PersonaRole, PersonaScope, ScopeFilter, Tone};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use crate::error::AppError;

/// RFC 3339 instant, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as an RFC 3339 instant or YYYY-MM-DD"))
}

pub(crate) fn parse_tone(raw: &str) -> Result<Tone, String> {
    raw.parse()
}

pub(crate) fn parse_offset_kind(raw: &str) -> Result<OffsetKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "calendar-hours" | "hours" => Ok(OffsetKind::CalendarHours),
        "calendar-days" | "days" => Ok(OffsetKind::CalendarDays),
        "working-days" | "wd" => Ok(OffsetKind::WorkingDays),
        other => Err(format!(
            "unknown offset kind '{other}' (expected calendar-hours, calendar-days or working-days)"
        )),
    }
}

pub(crate) fn resolve_now(now: Option<DateTime<Utc>>) -> DateTime<Utc> {
    now.unwrap_or_else(Utc::now)
}

/// JSON snapshot, optionally refreshed with tenants from a rent-ledger CSV.
pub(crate) fn load_snapshot(path: &Path, ledger: Option<&Path>) -> Result<Snapshot, AppError> {
    let mut snapshot = Snapshot::from_path(path)?;
    if let Some(ledger) = ledger {
        let tenants = import_rent_ledger(BufReader::new(File::open(ledger)?))?;
        info!(tenants = tenants.len(), ledger = %ledger.display(), "merged rent ledger");
        snapshot.merge_tenants(tenants);
    }
    Ok(snapshot)
}

pub(crate) fn persona(
    role: &str,
    patches: &[String],
    teams: &[String],
    owners: &[String],
) -> PersonaScope {
    let role = PersonaRole::parse(role);
    if role.is_portfolio_wide() {
        return PersonaScope::new(role, Assignment::All);
    }

    let filter = ScopeFilter {
        patch_ids: patches.iter().cloned().collect(),
        team_ids: teams.iter().cloned().collect(),
        owners: owners.iter().cloned().collect(),
    };
    PersonaScope::new(role, Assignment::Scoped(filter))
}
