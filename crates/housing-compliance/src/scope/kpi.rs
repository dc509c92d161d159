use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{CaseCategory, ComplianceState, Entity};
use crate::rules::thresholds::{Thresholds, ARREARS_RISK_HIGH};

/// Arrears risk score above which a tenancy counts as high risk when the
/// threshold table does not name one.
pub const HIGH_ARREARS_RISK: f64 = 70.0;

/// Aggregates over one scoped entity set. Callers with different scopes on
/// the same snapshot get different, each internally consistent, figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSet {
    pub total_units: usize,
    pub void_units: usize,
    pub total_tenancies: usize,
    pub tenants_in_arrears: usize,
    pub high_risk_tenancies: usize,
    pub vulnerable_tenancies: usize,
    /// Sum of arrears in pounds; credit balances do not offset it.
    pub total_arrears: f64,
    pub open_cases: BTreeMap<CaseCategory, usize>,
    /// Share of units with no compliance issue; 0.0 for an empty scope.
    pub compliance_percentage: f64,
}

impl Default for KpiSet {
    fn default() -> Self {
        Self {
            total_units: 0,
            void_units: 0,
            total_tenancies: 0,
            tenants_in_arrears: 0,
            high_risk_tenancies: 0,
            vulnerable_tenancies: 0,
            total_arrears: 0.0,
            open_cases: CaseCategory::ordered()
                .into_iter()
                .map(|category| (category, 0))
                .collect(),
            compliance_percentage: 0.0,
        }
    }
}

impl KpiSet {
    pub fn open_case_total(&self) -> usize {
        self.open_cases.values().sum()
    }

    pub fn open_cases_for(&self, category: CaseCategory) -> usize {
        self.open_cases.get(&category).copied().unwrap_or(0)
    }
}

pub fn aggregate(entities: &[Entity]) -> KpiSet {
    aggregate_with(entities, &Thresholds::default())
}

/// As [`aggregate`], with the high-risk cut-off taken from the rule table's
/// `arrears_risk_high` so KPIs and findings agree.
pub fn aggregate_with(entities: &[Entity], thresholds: &Thresholds) -> KpiSet {
    let high_risk = thresholds
        .get(ARREARS_RISK_HIGH)
        .unwrap_or(HIGH_ARREARS_RISK);
    let mut kpis = KpiSet::default();
    let mut compliant_units = 0usize;

    for entity in entities {
        match entity {
            Entity::Tenant(tenant) => {
                kpis.total_tenancies += 1;
                if tenant.in_arrears() {
                    kpis.tenants_in_arrears += 1;
                    kpis.total_arrears += tenant.arrears_amount();
                }
                if f64::from(tenant.arrears_risk) > high_risk {
                    kpis.high_risk_tenancies += 1;
                }
                if !tenant.vulnerability_markers.is_empty() {
                    kpis.vulnerable_tenancies += 1;
                }
            }
            Entity::Property(property) => {
                kpis.total_units += 1;
                if property.is_void {
                    kpis.void_units += 1;
                }
                if property.compliance == ComplianceState::Compliant {
                    compliant_units += 1;
                }
            }
            Entity::Case(case) => {
                if case.is_open() {
                    *kpis.open_cases.entry(case.category).or_insert(0) += 1;
                }
            }
        }
    }

    if kpis.total_units > 0 {
        kpis.compliance_percentage = compliant_units as f64 / kpis.total_units as f64 * 100.0;
    }

    kpis
}
