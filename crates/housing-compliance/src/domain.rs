use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper shared by tenants, properties and cases.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Assignment attributes that persona scoping matches against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    #[serde(default)]
    pub patch_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    /// Officers, handlers or operatives carrying the record in their caseload.
    #[serde(default)]
    pub owners: Vec<String>,
}

impl Ownership {
    pub fn patch(patch_id: impl Into<String>) -> Self {
        Self {
            patch_id: Some(patch_id.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VulnerabilityCategory {
    Health,
    Welfare,
    Safeguarding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityMarker {
    /// Free-text marker type recorded by the housing officer, e.g. `mental-health`.
    pub marker_type: String,
    #[serde(default = "default_marker_category")]
    pub category: VulnerabilityCategory,
    #[serde(default = "default_marker_severity")]
    pub severity: MarkerSeverity,
}

fn default_marker_category() -> VulnerabilityCategory {
    VulnerabilityCategory::Welfare
}

fn default_marker_severity() -> MarkerSeverity {
    MarkerSeverity::Medium
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UniversalCreditStatus {
    Claiming,
    Transitioning,
    ManagedMigration,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: EntityId,
    #[serde(default)]
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub property_id: Option<EntityId>,
    #[serde(flatten)]
    pub ownership: Ownership,
    /// Negative balances are arrears, in pounds.
    #[serde(default)]
    pub rent_balance: f64,
    #[serde(default)]
    pub weekly_charge: f64,
    #[serde(default)]
    pub arrears_risk: u8,
    #[serde(default)]
    pub contact_count_30_days: u32,
    #[serde(default)]
    pub last_contact: Option<NaiveDate>,
    #[serde(default)]
    pub vulnerability_markers: Vec<VulnerabilityMarker>,
    #[serde(default)]
    pub universal_credit: Option<UniversalCreditStatus>,
}

impl Tenant {
    pub fn display_name(&self) -> String {
        match &self.title {
            Some(title) => format!("{} {}", title, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    pub fn in_arrears(&self) -> bool {
        self.rent_balance < 0.0
    }

    pub fn arrears_amount(&self) -> f64 {
        if self.in_arrears() {
            self.rent_balance.abs()
        } else {
            0.0
        }
    }

    /// Weeks of rent owed; zero when the account is in credit or the charge is unknown.
    pub fn weeks_in_arrears(&self) -> f64 {
        if !self.in_arrears() || self.weekly_charge <= 0.0 {
            return 0.0;
        }
        self.arrears_amount() / self.weekly_charge
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceState {
    Compliant,
    Expiring,
    NonCompliant,
}

impl ComplianceState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::Expiring => "Expiring",
            Self::NonCompliant => "Non-compliant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyCertificate {
    pub kind: String,
    pub expires_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: EntityId,
    pub address: String,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(flatten)]
    pub ownership: Ownership,
    pub compliance: ComplianceState,
    #[serde(default)]
    pub damp_risk: u8,
    #[serde(default)]
    pub certificates: Vec<SafetyCertificate>,
    #[serde(default)]
    pub is_void: bool,
}

impl Property {
    pub fn earliest_certificate_expiry(&self) -> Option<NaiveDate> {
        self.certificates.iter().map(|cert| cert.expires_on).min()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseCategory {
    Repair,
    Complaint,
    Asb,
    DampMould,
    Financial,
}

impl CaseCategory {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Repair,
            Self::Complaint,
            Self::Asb,
            Self::DampMould,
            Self::Financial,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Repair => "Repairs",
            Self::Complaint => "Complaints",
            Self::Asb => "Anti-social behaviour",
            Self::DampMould => "Damp & mould",
            Self::Financial => "Financial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseStatus {
    Open,
    InProgress,
    OnHold,
    Completed,
    Closed,
    Cancelled,
}

impl CaseStatus {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::InProgress | Self::OnHold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CasePriority {
    Emergency,
    Urgent,
    Routine,
    Planned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HazardClass {
    Emergency,
    Significant,
}

/// Complaint handling stage; serialised as the bare stage number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ComplaintStage {
    One,
    Two,
}

impl TryFrom<u8> for ComplaintStage {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("complaint stage must be 1 or 2, found {other}")),
        }
    }
}

impl From<ComplaintStage> for u8 {
    fn from(stage: ComplaintStage) -> Self {
        match stage {
            ComplaintStage::One => 1,
            ComplaintStage::Two => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: EntityId,
    pub reference: String,
    pub category: CaseCategory,
    pub status: CaseStatus,
    #[serde(default = "default_case_priority")]
    pub priority: CasePriority,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<EntityId>,
    #[serde(default)]
    pub property_id: Option<EntityId>,
    #[serde(flatten)]
    pub ownership: Ownership,
    #[serde(default)]
    pub complaint_stage: Option<ComplaintStage>,
    #[serde(default)]
    pub hazard: Option<HazardClass>,
    #[serde(default)]
    pub recurrence_risk: Option<u8>,
    #[serde(default)]
    pub escalation_risk: Option<u8>,
    #[serde(default)]
    pub damp_risk_score: Option<u8>,
    /// Completion instants keyed by milestone name (`acknowledge`, `respond`, ...).
    #[serde(default)]
    pub milestones_completed: BTreeMap<String, DateTime<Utc>>,
}

fn default_case_priority() -> CasePriority {
    CasePriority::Routine
}

impl Case {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn completed_at(&self, milestone: &str) -> Option<DateTime<Utc>> {
        self.milestones_completed.get(milestone).copied()
    }

    /// Handler is the first listed owner.
    pub fn handler(&self) -> Option<&str> {
        self.ownership.owners.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Tenant,
    Property,
    Case,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Property => "property",
            Self::Case => "case",
        }
    }
}

/// Immutable input record for one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Tenant(Tenant),
    Property(Property),
    Case(Case),
}

impl Entity {
    pub fn id(&self) -> &EntityId {
        match self {
            Entity::Tenant(tenant) => &tenant.id,
            Entity::Property(property) => &property.id,
            Entity::Case(case) => &case.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Tenant(_) => EntityKind::Tenant,
            Entity::Property(_) => EntityKind::Property,
            Entity::Case(_) => EntityKind::Case,
        }
    }

    pub fn ownership(&self) -> &Ownership {
        match self {
            Entity::Tenant(tenant) => &tenant.ownership,
            Entity::Property(property) => &property.ownership,
            Entity::Case(case) => &case.ownership,
        }
    }

    pub fn reference(&self) -> EntityRef {
        EntityRef {
            kind: self.kind(),
            id: self.id().clone(),
        }
    }

    pub fn as_tenant(&self) -> Option<&Tenant> {
        match self {
            Entity::Tenant(tenant) => Some(tenant),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Entity::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_case(&self) -> Option<&Case> {
        match self {
            Entity::Case(case) => Some(case),
            _ => None,
        }
    }

    pub fn vulnerability_markers(&self) -> &[VulnerabilityMarker] {
        match self {
            Entity::Tenant(tenant) => &tenant.vulnerability_markers,
            _ => &[],
        }
    }
}

/// Lightweight pointer to the entity a finding is about.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.label(), self.id)
    }
}
