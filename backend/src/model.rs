//! The entities from the data model: seasons, divisions, teams, resources,
//! availability rules and overrides, and the scheduled events the draft
//! loop produces.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(SeasonId);
id_newtype!(DivisionId);
id_newtype!(TeamId);
id_newtype!(FieldId);
id_newtype!(CageId);
id_newtype!(EventId);

/// A field or cage, the two resource kinds a [`ResourceId`] can name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceId {
    Field(FieldId),
    Cage(CageId),
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceId::Field(id) => write!(f, "field:{id}"),
            ResourceId::Cage(id) => write!(f, "cage:{id}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Field,
    Cage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Game,
    Practice,
    Cage,
    PairedPractice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Scheduled,
    Completed,
    Cancelled,
    Postponed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonStatus {
    Draft,
    Active,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blackout {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub division_ids: Option<Vec<DivisionId>>,
    pub blocked_event_types: Vec<EventType>,
}

impl Blackout {
    pub fn covers(&self, date: NaiveDate, division: &DivisionId, event_type: EventType) -> bool {
        if date < self.start || date > self.end {
            return false;
        }
        if let Some(ids) = &self.division_ids {
            if !ids.contains(division) {
                return false;
            }
        }
        self.blocked_event_types.contains(&event_type)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub games_start_date: NaiveDate,
    pub status: SeasonStatus,
    pub blackouts: Vec<Blackout>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub name: String,
    pub scheduling_order: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPreferencePriority {
    Required,
    Preferred,
    Acceptable,
    Avoid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDayPreference {
    pub day_of_week: u8,
    pub priority: DayPreferencePriority,
    pub max_games_per_day: Option<u32>,
}

/// Per-(division, season) configuration knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivisionConfig {
    pub division_id: DivisionId,
    pub practices_per_week: u32,
    pub practice_duration_hours: f32,
    pub games_per_week: u32,
    pub game_duration_hours: f32,
    pub game_arrive_before_hours: f32,
    pub game_day_preferences: Vec<GameDayPreference>,
    pub cage_sessions_per_week: u32,
    pub cage_session_duration_hours: f32,
    pub field_preferences: Vec<FieldId>,
    pub game_week_overrides: std::collections::BTreeMap<u32, u32>,
    pub max_games_per_season: Option<u32>,
    pub sunday_paired_practice_enabled: bool,
    pub sunday_paired_practice_duration_hours: f32,
    pub sunday_paired_practice_field_id: Option<FieldId>,
    pub sunday_paired_practice_cage_id: Option<CageId>,
    pub game_spacing_enabled: bool,
    pub practice_arrive_before_minutes: u32,
    pub min_consecutive_day_gap: u32,
    /// Per-division ceiling for `|homeGames - awayGames|` (Invariant 5).
    pub home_away_diff_ceiling: u32,
}

impl DivisionConfig {
    pub fn game_duration_minutes(&self) -> u32 {
        (self.game_duration_hours * 60.0).round() as u32
    }

    pub fn game_arrive_before_minutes(&self) -> u32 {
        (self.game_arrive_before_hours * 60.0).round() as u32
    }

    pub fn practice_duration_minutes(&self) -> u32 {
        (self.practice_duration_hours * 60.0).round() as u32
    }

    pub fn cage_session_duration_minutes(&self) -> u32 {
        (self.cage_session_duration_hours * 60.0).round() as u32
    }

    pub fn games_per_week_for(&self, week_number: u32) -> u32 {
        self.game_week_overrides
            .get(&week_number)
            .copied()
            .unwrap_or(self.games_per_week)
    }

    pub fn preference_for_day(&self, day_of_week: u8) -> Option<&GameDayPreference> {
        self.game_day_preferences
            .iter()
            .find(|p| p.day_of_week == day_of_week)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub season_id: SeasonId,
    pub division_id: DivisionId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub division_compatibility: Vec<DivisionId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cage {
    pub id: CageId,
    pub name: String,
    pub division_compatibility: Vec<DivisionId>,
}

impl Field {
    pub fn compatible_with(&self, division: &DivisionId) -> bool {
        self.division_compatibility.is_empty() || self.division_compatibility.contains(division)
    }
}

impl Cage {
    pub fn compatible_with(&self, division: &DivisionId) -> bool {
        self.division_compatibility.is_empty() || self.division_compatibility.contains(division)
    }
}

/// A weekly recurring window of availability for a field or a cage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub resource_id: ResourceId,
    pub day_of_week: u8,
    pub start_minute: u16,
    pub end_minute: u16,
    pub single_event_only: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideType {
    Blackout,
    Added,
}

/// A one-off change to a resource's availability on a specific date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub override_type: OverrideType,
    pub start_minute: Option<u16>,
    pub end_minute: Option<u16>,
    pub single_event_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Booking {
    Game { home_team_id: TeamId, away_team_id: TeamId },
    SingleTeam { team_id: TeamId },
    PairedPractice { team_a_id: TeamId, team_b_id: TeamId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: EventId,
    pub season_id: SeasonId,
    pub division_id: DivisionId,
    pub event_type: EventType,
    pub date: NaiveDate,
    pub start_minute: u16,
    pub end_minute: u16,
    pub field_id: Option<FieldId>,
    pub cage_id: Option<CageId>,
    pub booking: Booking,
    pub status: EventStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ScheduledEvent {
    pub fn overlaps(&self, other: &ScheduledEvent) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }

    pub fn teams(&self) -> Vec<TeamId> {
        match &self.booking {
            Booking::Game { home_team_id, away_team_id } => {
                vec![home_team_id.clone(), away_team_id.clone()]
            }
            Booking::SingleTeam { team_id } => vec![team_id.clone()],
            Booking::PairedPractice { team_a_id, team_b_id } => {
                vec![team_a_id.clone(), team_b_id.clone()]
            }
        }
    }

    pub fn field_category(&self) -> bool {
        self.field_id.is_some()
    }

    pub fn cage_category(&self) -> bool {
        self.cage_id.is_some()
    }
}
