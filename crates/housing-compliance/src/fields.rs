//! Flat string fields extracted from entities for message and draft rendering.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Case, Entity, Property, Tenant, UniversalCreditStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldContext(BTreeMap<String, String>);

impl FieldContext {
    pub fn for_entity(entity: &Entity) -> Self {
        let mut fields = Self::default();
        match entity {
            Entity::Tenant(tenant) => fields.add_tenant(tenant),
            Entity::Property(property) => fields.add_property(property),
            Entity::Case(case) => fields.add_case(case),
        }
        fields
    }

    /// Primary entity fields win; related entities only fill gaps.
    pub fn with_related(entity: &Entity, related: &[Entity]) -> Self {
        let mut fields = Self::for_entity(entity);
        for other in related {
            fields.merge_missing(Self::for_entity(other));
        }
        fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Present and non-blank.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.trim().is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn insert_missing(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn merge_missing(&mut self, other: FieldContext) {
        for (key, value) in other.0 {
            self.0.entry(key).or_insert(value);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn add_tenant(&mut self, tenant: &Tenant) {
        self.insert("tenant_id", tenant.id.as_str());
        self.insert("first_name", tenant.first_name.as_str());
        self.insert("last_name", tenant.last_name.as_str());
        self.insert(
            "full_name",
            format!("{} {}", tenant.first_name, tenant.last_name),
        );
        self.insert("name", tenant.display_name());
        self.insert("salutation", format!("Dear {}", tenant.display_name()));
        if let Some(title) = &tenant.title {
            self.insert("title", title.as_str());
        }
        self.insert("balance", format_currency(tenant.rent_balance.abs()));
        self.insert("arrears", format_currency(tenant.arrears_amount()));
        if tenant.weekly_charge > 0.0 {
            self.insert("weekly_charge", format_currency(tenant.weekly_charge));
        }
        if tenant.in_arrears() && tenant.weekly_charge > 0.0 {
            self.insert("weeks_in_arrears", format!("{:.1}", tenant.weeks_in_arrears()));
        }
        if let Some(date) = tenant.last_contact {
            self.insert("last_contact", date.format("%-d %B %Y").to_string());
        }
        if let Some(status) = tenant.universal_credit {
            self.insert("universal_credit", universal_credit_label(status));
        }
        if let Some(officer) = tenant.ownership.owners.first() {
            self.insert("officer", officer.as_str());
        }
        self.add_patch(tenant.ownership.patch_id.as_deref());
    }

    fn add_property(&mut self, property: &Property) {
        self.insert("property_id", property.id.as_str());
        self.insert("address", property.address.as_str());
        if let Some(postcode) = &property.postcode {
            self.insert("postcode", postcode.as_str());
        }
        self.insert("compliance", property.compliance.label());
        self.insert("damp_risk", property.damp_risk.to_string());
        if let Some(expiry) = property.earliest_certificate_expiry() {
            self.insert("certificate_expiry", expiry.format("%-d %B %Y").to_string());
        }
        self.add_patch(property.ownership.patch_id.as_deref());
    }

    fn add_case(&mut self, case: &Case) {
        self.insert("case_id", case.id.as_str());
        self.insert("reference", case.reference.as_str());
        self.insert("category", case.category.label());
        self.insert("reported_on", case.created_at.format("%-d %B %Y").to_string());
        if let Some(subject) = &case.subject {
            self.insert("subject", subject.as_str());
            self.insert("subject_lower", subject.to_lowercase());
        }
        if let Some(handler) = case.handler() {
            self.insert("handler", handler);
        }
        if let Some(stage) = case.complaint_stage {
            self.insert("complaint_stage", u8::from(stage).to_string());
        }
        if let Some(score) = case.escalation_risk {
            self.insert("escalation_risk", score.to_string());
        }
        if let Some(score) = case.recurrence_risk {
            self.insert("recurrence_risk", score.to_string());
        }
        self.add_patch(case.ownership.patch_id.as_deref());
    }

    fn add_patch(&mut self, patch: Option<&str>) {
        if let Some(patch) = patch {
            self.insert("patch", patch);
        }
    }
}

fn universal_credit_label(status: UniversalCreditStatus) -> &'static str {
    match status {
        UniversalCreditStatus::Claiming => "claiming Universal Credit",
        UniversalCreditStatus::Transitioning => "transitioning to Universal Credit",
        UniversalCreditStatus::ManagedMigration => "in managed migration to Universal Credit",
        UniversalCreditStatus::None => "not claiming Universal Credit",
    }
}

/// Pounds with thousands separators, e.g. `£1,250.00`.
pub fn format_currency(amount: f64) -> String {
    let pence = (amount.abs() * 100.0).round() as u64;
    let pounds = (pence / 100).to_string();
    let mut grouped = String::with_capacity(pounds.len() + pounds.len() / 3);
    for (index, digit) in pounds.chars().enumerate() {
        if index > 0 && (pounds.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && pence > 0 { "-" } else { "" };
    format!("{sign}£{grouped}.{:02}", pence % 100)
}
