use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::SnapshotError;
use crate::domain::{EntityId, Ownership, Tenant, UniversalCreditStatus};

pub(crate) fn parse_ledger<R: Read>(reader: R) -> Result<Vec<Tenant>, SnapshotError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut tenants = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: LedgerRow = record.deserialize(Some(&headers))?;
        tenants.push(row.into_tenant(line)?);
    }

    Ok(tenants)
}

#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Tenant ID")]
    tenant_id: String,
    #[serde(rename = "Title", default, deserialize_with = "empty_string_as_none")]
    title: Option<String>,
    #[serde(rename = "First Name")]
    first_name: String,
    #[serde(rename = "Last Name")]
    last_name: String,
    #[serde(rename = "Property ID", default, deserialize_with = "empty_string_as_none")]
    property_id: Option<String>,
    #[serde(rename = "Patch", default, deserialize_with = "empty_string_as_none")]
    patch: Option<String>,
    #[serde(rename = "Team", default, deserialize_with = "empty_string_as_none")]
    team: Option<String>,
    #[serde(rename = "Officer", default, deserialize_with = "empty_string_as_none")]
    officer: Option<String>,
    #[serde(rename = "Balance")]
    balance: String,
    #[serde(rename = "Weekly Charge", default, deserialize_with = "empty_string_as_none")]
    weekly_charge: Option<String>,
    #[serde(rename = "Arrears Risk", default, deserialize_with = "empty_string_as_none")]
    arrears_risk: Option<String>,
    #[serde(rename = "Last Contact", default, deserialize_with = "empty_string_as_none")]
    last_contact: Option<String>,
    #[serde(rename = "UC Status", default, deserialize_with = "empty_string_as_none")]
    universal_credit: Option<String>,
}

impl LedgerRow {
    fn into_tenant(self, line: u64) -> Result<Tenant, SnapshotError> {
        let invalid = |field: &'static str, value: &str| SnapshotError::InvalidField {
            line,
            field,
            value: value.to_string(),
        };

        let rent_balance = parse_money(&self.balance).ok_or_else(|| invalid("Balance", &self.balance))?;
        let weekly_charge = match self.weekly_charge.as_deref() {
            Some(value) => parse_money(value).ok_or_else(|| invalid("Weekly Charge", value))?,
            None => 0.0,
        };
        let arrears_risk = match self.arrears_risk.as_deref() {
            Some(value) => value
                .parse::<u8>()
                .ok()
                .filter(|score| *score <= 100)
                .ok_or_else(|| invalid("Arrears Risk", value))?,
            None => 0,
        };
        let last_contact = match self.last_contact.as_deref() {
            Some(value) => Some(parse_date(value).ok_or_else(|| invalid("Last Contact", value))?),
            None => None,
        };
        let universal_credit = match self.universal_credit.as_deref() {
            Some(value) => Some(
                parse_universal_credit(value).ok_or_else(|| invalid("UC Status", value))?,
            ),
            None => None,
        };

        Ok(Tenant {
            id: EntityId::new(self.tenant_id),
            title: self.title,
            first_name: self.first_name,
            last_name: self.last_name,
            property_id: self.property_id.map(EntityId::new),
            ownership: Ownership {
                patch_id: self.patch,
                team_id: self.team,
                owners: self.officer.into_iter().collect(),
            },
            rent_balance,
            weekly_charge,
            arrears_risk,
            contact_count_30_days: 0,
            last_contact,
            vulnerability_markers: Vec::new(),
            universal_credit,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts `-600`, `-£600.00`, `£1,250.50` and `(600.00)` for a debit.
fn parse_money(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let cleaned: String = body.chars().filter(|c| *c != '£' && *c != ',').collect();
    let amount = cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -amount } else { amount })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}

fn parse_universal_credit(value: &str) -> Option<UniversalCreditStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "claiming" => Some(UniversalCreditStatus::Claiming),
        "transitioning" => Some(UniversalCreditStatus::Transitioning),
        "managed-migration" | "managed migration" => Some(UniversalCreditStatus::ManagedMigration),
        "none" | "no" => Some(UniversalCreditStatus::None),
        _ => None,
    }
}
