use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Deadline, DeadlineError, OffsetKind};
use crate::domain::{Case, CaseCategory, ComplaintStage, HazardClass};
use crate::tables::TableError;

pub const COMPLAINT_STAGE_ONE: &str = "complaint-stage-1";
pub const COMPLAINT_STAGE_TWO: &str = "complaint-stage-2";
pub const HAZARD_EMERGENCY: &str = "hazard-emergency";
pub const HAZARD_SIGNIFICANT: &str = "hazard-significant";

/// Schedule key naming one case family in the offset table.
pub type ScheduleKey = String;

/// One named milestone in a case family's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSpec {
    pub name: String,
    pub offset: f64,
    pub kind: OffsetKind,
}

impl MilestoneSpec {
    fn new(name: &str, offset: f64, kind: OffsetKind) -> Self {
        Self {
            name: name.to_string(),
            offset,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedDeadline {
    pub name: String,
    pub deadline: Deadline,
}

/// Versioned case-family -> ordered milestone table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetTable {
    pub version: String,
    pub schedules: BTreeMap<ScheduleKey, Vec<MilestoneSpec>>,
}

impl Default for OffsetTable {
    fn default() -> Self {
        Self::statutory()
    }
}

impl OffsetTable {
    /// Complaint Handling Code stages and the damp & mould hazard timetable.
    ///
    /// Significant-hazard milestones are cumulative from the report: investigate
    /// in 10 WD, written summary 3 WD later, safety works 5 WD after that, and
    /// full repair within roughly twelve weeks (60 WD).
    pub fn statutory() -> Self {
        use OffsetKind::*;

        let mut schedules = BTreeMap::new();
        schedules.insert(
            COMPLAINT_STAGE_ONE.to_string(),
            vec![
                MilestoneSpec::new("acknowledge", 5.0, WorkingDays),
                MilestoneSpec::new("respond", 10.0, WorkingDays),
            ],
        );
        schedules.insert(
            COMPLAINT_STAGE_TWO.to_string(),
            vec![
                MilestoneSpec::new("acknowledge", 5.0, WorkingDays),
                MilestoneSpec::new("respond", 20.0, WorkingDays),
            ],
        );
        schedules.insert(
            HAZARD_EMERGENCY.to_string(),
            vec![MilestoneSpec::new("emergency", 24.0, CalendarHours)],
        );
        schedules.insert(
            HAZARD_SIGNIFICANT.to_string(),
            vec![
                MilestoneSpec::new("investigate", 10.0, WorkingDays),
                MilestoneSpec::new("summarise", 13.0, WorkingDays),
                MilestoneSpec::new("safety-works", 18.0, WorkingDays),
                MilestoneSpec::new("full-repair", 60.0, WorkingDays),
            ],
        );

        Self {
            version: "statutory-2026.1".to_string(),
            schedules,
        }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let table: Self = serde_json::from_reader(reader).map_err(TableError::Json)?;
        table.validate()?;
        Ok(table)
    }

    /// Reject offsets the calculator would refuse, so bad tables fail at load time.
    pub fn validate(&self) -> Result<(), TableError> {
        for (key, milestones) in &self.schedules {
            for milestone in milestones {
                let valid = milestone.offset.is_finite()
                    && milestone.offset >= 0.0
                    && (milestone.kind != OffsetKind::WorkingDays || milestone.offset.fract() == 0.0);
                if !valid {
                    return Err(TableError::InvalidMilestone {
                        schedule: key.clone(),
                        milestone: milestone.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn schedule(&self, key: &str) -> Option<&[MilestoneSpec]> {
        self.schedules.get(key).map(Vec::as_slice)
    }

    /// Schedule key for a case, or `None` for families without statutory deadlines.
    pub fn schedule_key(case: &Case) -> Option<&'static str> {
        match (case.category, case.complaint_stage, case.hazard) {
            (CaseCategory::Complaint, Some(ComplaintStage::Two), _) => Some(COMPLAINT_STAGE_TWO),
            (CaseCategory::Complaint, _, _) => Some(COMPLAINT_STAGE_ONE),
            (CaseCategory::Repair | CaseCategory::DampMould, _, Some(HazardClass::Emergency)) => {
                Some(HAZARD_EMERGENCY)
            }
            (CaseCategory::Repair | CaseCategory::DampMould, _, Some(HazardClass::Significant)) => {
                Some(HAZARD_SIGNIFICANT)
            }
            _ => None,
        }
    }

    /// Resolve every milestone of the case's family from its creation instant.
    pub fn case_deadlines(&self, case: &Case) -> Result<Vec<NamedDeadline>, DeadlineError> {
        let Some(key) = Self::schedule_key(case) else {
            return Ok(Vec::new());
        };

        let Some(milestones) = self.schedule(key) else {
            warn!(
                case = %case.id,
                schedule = key,
                version = %self.version,
                "offset table has no schedule for case family"
            );
            return Ok(Vec::new());
        };

        milestones
            .iter()
            .map(|milestone| {
                Deadline::new(case.created_at, milestone.offset, milestone.kind).map(|deadline| {
                    NamedDeadline {
                        name: milestone.name.clone(),
                        deadline,
                    }
                })
            })
            .collect()
    }
}
