//! The fatal/config/soft-shortfall/invariant-violation error taxonomy,
//! expressed as typed Rust values instead of exceptions (C12).

use crate::model::{DivisionId, EventId, ScheduledEvent, TeamId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal and config errors: anything in this enum aborts `generate` with
/// `success = false` and no partial draft, except [`GenerateError::InvariantViolated`]
/// which carries the partial draft that tripped a post-generation self-check.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("season `{0}` was not found")]
    MissingSeason(String),
    #[error("season `{0}` has no teams")]
    NoTeams(String),
    #[error("games were requested but no fields are configured for season `{0}`")]
    NoFieldsForGames(String),
    #[error("could not parse date `{0}`")]
    MalformedDate(String),
    #[error("could not parse time `{0}`")]
    MalformedTime(String),
    #[error("division `{0}` is referenced but does not exist")]
    UnknownDivision(String),
    #[error("divisions `{0}` and `{1}` share the same scheduling order")]
    DuplicateSchedulingOrder(String, String),
    #[error("`{field}` must be positive")]
    NonPositiveDuration { field: &'static str },
    #[error("an `added` availability override had no start/end time, which this implementation rejects rather than silently defaulting to an all-day window (resource `{0}`, date `{1}`)")]
    AmbiguousAddedOverride(String, String),
    #[error("invariant `{check}` was violated after rebalancing: {details}")]
    InvariantViolated {
        check: &'static str,
        details: String,
        partial_draft: Vec<ScheduledEvent>,
    },
}

/// Non-fatal shortfalls surfaced alongside a (possibly partial) result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleWarning {
    InsufficientResources { division_id: DivisionId, team_id: TeamId, week: u32 },
    UnbalancedHomeAway { division_id: DivisionId, team_a: TeamId, team_b: TeamId, diff: u32 },
    FieldOverutilization { resource: String, date: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogCategory {
    Info,
    InsufficientResources,
    UnbalancedHomeAway,
    FieldOverutilization,
    Rebalance,
}

/// One structured record of a scheduling decision or warning; collected into
/// `GenerateResult::scheduling_log` and also emitted through the `log` crate
/// at the call site so an operator tailing logs sees the same information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingLogEntry {
    pub category: LogCategory,
    pub message: String,
    pub division_id: Option<DivisionId>,
    pub team_id: Option<TeamId>,
    pub event_id: Option<EventId>,
}

impl SchedulingLogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            category: LogCategory::Info,
            message: message.into(),
            division_id: None,
            team_id: None,
            event_id: None,
        }
    }

    pub fn with_division(mut self, division_id: DivisionId) -> Self {
        self.division_id = Some(division_id);
        self
    }

    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn with_category(mut self, category: LogCategory) -> Self {
        self.category = category;
        self
    }
}
