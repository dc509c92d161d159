//! Live SLA status for deadlines, recomputed on every read.

mod escalation;

pub use escalation::{escalation_for, Escalation, EscalationLevel};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deadlines::{remaining_days, Deadline, DeadlineError, OffsetTable};
use crate::domain::{Case, EntityId};

/// Remaining share of the window below which a live deadline is at risk.
pub const AT_RISK_FRACTION: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerStatus {
    OnTrack,
    AtRisk,
    Breached,
    Met,
    Missed,
}

impl TimerStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnTrack => "On track",
            Self::AtRisk => "At risk",
            Self::Breached => "Breached",
            Self::Met => "Met",
            Self::Missed => "Missed",
        }
    }

    /// Terminal statuses are frozen at the completion instant.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Met | Self::Missed)
    }

    /// Current-risk ranking for live statuses; `None` for terminal ones.
    pub const fn risk_rank(self) -> Option<u8> {
        match self {
            Self::Breached => Some(3),
            Self::AtRisk => Some(2),
            Self::OnTrack => Some(1),
            Self::Met | Self::Missed => None,
        }
    }
}

/// Pure status of one deadline at `now`.
pub fn timer_status(
    deadline: &Deadline,
    now: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
) -> TimerStatus {
    if let Some(completed) = completed_at {
        return if completed <= deadline.due {
            TimerStatus::Met
        } else {
            TimerStatus::Missed
        };
    }

    if now > deadline.due {
        return TimerStatus::Breached;
    }

    let window = (deadline.due - deadline.start).num_milliseconds();
    let remaining = (deadline.due - now).num_milliseconds();
    if window <= 0 {
        // Zero-length window: only the due instant itself is still live.
        return if remaining == 0 {
            TimerStatus::AtRisk
        } else {
            TimerStatus::OnTrack
        };
    }

    let fraction = remaining as f64 / window as f64;
    if (0.0..AT_RISK_FRACTION).contains(&fraction) {
        TimerStatus::AtRisk
    } else {
        TimerStatus::OnTrack
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneTimer {
    pub name: String,
    pub deadline: Deadline,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: TimerStatus,
    pub days_remaining: i64,
}

/// Per-milestone statuses for one case plus its aggregate current risk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseTimers {
    pub case_id: EntityId,
    pub reference: String,
    pub milestones: Vec<MilestoneTimer>,
    /// Worst live status; `None` when every milestone is terminal or none exist.
    pub current: Option<TimerStatus>,
    /// Milestones completed late, kept apart from current risk for audit.
    pub missed: Vec<String>,
}

impl CaseTimers {
    pub fn for_case(
        case: &Case,
        offsets: &OffsetTable,
        now: DateTime<Utc>,
    ) -> Result<Self, DeadlineError> {
        let milestones: Vec<MilestoneTimer> = offsets
            .case_deadlines(case)?
            .into_iter()
            .map(|named| {
                let completed_at = case.completed_at(&named.name);
                MilestoneTimer {
                    status: timer_status(&named.deadline, now, completed_at),
                    days_remaining: remaining_days(now, named.deadline.due),
                    name: named.name,
                    deadline: named.deadline,
                    completed_at,
                }
            })
            .collect();

        Ok(Self::from_milestones(
            case.id.clone(),
            case.reference.clone(),
            milestones,
        ))
    }

    pub fn from_milestones(
        case_id: EntityId,
        reference: String,
        milestones: Vec<MilestoneTimer>,
    ) -> Self {
        let current = aggregate_status(milestones.iter().map(|m| m.status));
        let missed = milestones
            .iter()
            .filter(|m| m.status == TimerStatus::Missed)
            .map(|m| m.name.clone())
            .collect();

        Self {
            case_id,
            reference,
            milestones,
            current,
            missed,
        }
    }

    /// The live milestone driving the aggregate status, earliest due first on ties.
    pub fn driving_milestone(&self) -> Option<&MilestoneTimer> {
        self.milestones
            .iter()
            .filter(|m| !m.status.is_terminal())
            .min_by(|a, b| {
                b.status
                    .risk_rank()
                    .cmp(&a.status.risk_rank())
                    .then(a.deadline.due.cmp(&b.deadline.due))
            })
    }
}

/// Worst live status: breached > at-risk > on-track. Terminal statuses are ignored.
pub fn aggregate_status<I>(statuses: I) -> Option<TimerStatus>
where
    I: IntoIterator<Item = TimerStatus>,
{
    statuses
        .into_iter()
        .filter(|status| !status.is_terminal())
        .max_by_key(|status| status.risk_rank())
}
