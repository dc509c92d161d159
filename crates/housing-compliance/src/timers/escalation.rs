use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CaseTimers, TimerStatus};
use crate::deadlines::remaining_days;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscalationLevel {
    None,
    Watch,
    Manager,
    Director,
}

impl EscalationLevel {
    pub const fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Watch => 1,
            Self::Manager => 2,
            Self::Director => 3,
        }
    }

    /// Role the case is escalated to; watch-level cases stay with the handler.
    pub const fn escalated_to(self) -> Option<&'static str> {
        match self {
            Self::Manager => Some("Housing Manager"),
            Self::Director => Some("Director of Housing"),
            Self::None | Self::Watch => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Escalation {
    pub level: EscalationLevel,
    pub milestone: Option<String>,
    pub days_remaining: Option<i64>,
    pub reason: Option<String>,
}

/// Escalation for the next live milestone: breached goes to the director,
/// two days or fewer to the manager, five days or fewer is watched.
pub fn escalation_for(timers: &CaseTimers, now: DateTime<Utc>) -> Escalation {
    let next = timers
        .milestones
        .iter()
        .filter(|m| !m.status.is_terminal())
        .min_by_key(|m| m.deadline.due);

    let Some(next) = next else {
        return Escalation {
            level: EscalationLevel::None,
            milestone: None,
            days_remaining: None,
            reason: None,
        };
    };

    let days = remaining_days(now, next.deadline.due);
    // Same boundary as the timer: the due instant itself is not yet breached.
    let breached = next.status == TimerStatus::Breached;

    let (level, reason) = if breached {
        (
            EscalationLevel::Director,
            Some(format!("{} deadline breached", timers.reference)),
        )
    } else if days <= 2 {
        (
            EscalationLevel::Manager,
            Some(format!("only {days} day(s) remaining to {}", next.name)),
        )
    } else if days <= 5 {
        (EscalationLevel::Watch, None)
    } else {
        (EscalationLevel::None, None)
    };

    Escalation {
        level,
        milestone: Some(next.name.clone()),
        days_remaining: Some(days),
        reason,
    }
}
