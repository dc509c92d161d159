use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ARREARS_MINOR: &str = "arrears_minor";
pub const ARREARS_SEVERE: &str = "arrears_severe";
pub const ARREARS_WARNING_WEEKS: &str = "arrears_warning_weeks";
pub const ARREARS_ACTION_WEEKS: &str = "arrears_action_weeks";
pub const ARREARS_LEGAL_WEEKS: &str = "arrears_legal_weeks";
pub const ARREARS_RISK_HIGH: &str = "arrears_risk_high";
pub const CONTACT_FREQUENCY: &str = "contact_frequency";
pub const SILENT_TENANT_DAYS: &str = "silent_tenant_days";
pub const REPAIR_DELAY_DAYS: &str = "repair_delay_days";
pub const RECURRENCE_RISK: &str = "recurrence_risk";
pub const ESCALATION_RISK_ELEVATED: &str = "escalation_risk_elevated";
pub const ESCALATION_RISK_HIGH: &str = "escalation_risk_high";
pub const DAMP_RISK_ELEVATED: &str = "damp_risk_elevated";
pub const CERTIFICATE_EXPIRY_DAYS: &str = "certificate_expiry_days";

/// Default values, in the units of the attribute each threshold is compared with.
pub const DEFAULTS: [(&str, f64); 14] = [
    (ARREARS_MINOR, -500.0),
    (ARREARS_SEVERE, -1000.0),
    (ARREARS_WARNING_WEEKS, 4.0),
    (ARREARS_ACTION_WEEKS, 8.0),
    (ARREARS_LEGAL_WEEKS, 12.0),
    (ARREARS_RISK_HIGH, 70.0),
    (CONTACT_FREQUENCY, 5.0),
    (SILENT_TENANT_DAYS, 180.0),
    (REPAIR_DELAY_DAYS, 28.0),
    (RECURRENCE_RISK, 60.0),
    (ESCALATION_RISK_ELEVATED, 60.0),
    (ESCALATION_RISK_HIGH, 80.0),
    (DAMP_RISK_ELEVATED, 50.0),
    (CERTIFICATE_EXPIRY_DAYS, 30.0),
];

/// Named numeric thresholds referenced by rule predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thresholds(BTreeMap<String, f64>);

impl Default for Thresholds {
    fn default() -> Self {
        Self(
            DEFAULTS
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        )
    }
}

impl Thresholds {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Defaults overlaid with the given values.
    pub fn with_overrides(overrides: BTreeMap<String, f64>) -> Self {
        let mut thresholds = Self::default();
        thresholds.0.extend(overrides);
        thresholds
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}
