//! Read-only input traits and a write-only output trait the core consumes
//! at its boundary (C13). The core never talks to a real database or HTTP
//! service directly; [`InMemoryRepository`] stands in for that layer for
//! the CLI demo and the test suite.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::model::{
    Cage, DateOverride, Division, DivisionConfig, DivisionId, Field, ScheduledEvent, Season, SeasonId, Team,
    WeeklyAvailability,
};

/// Everything `generate` reads before it starts scheduling. All methods are
/// synchronous: the core performs no I/O of its own, so there is no reason
/// to force async on every collaborator. A real adapter over HTTP or SQL is
/// free to wrap a blocking call underneath.
pub trait SeasonRepository {
    fn get_season(&self, id: &SeasonId) -> Result<Season, GenerateError>;
    fn list_divisions(&self, season_id: &SeasonId) -> Result<Vec<Division>, GenerateError>;
    fn list_division_configs(&self, season_id: &SeasonId) -> Result<Vec<DivisionConfig>, GenerateError>;
    fn list_teams(&self, season_id: &SeasonId) -> Result<Vec<Team>, GenerateError>;
    fn list_fields(&self, season_id: &SeasonId) -> Result<Vec<Field>, GenerateError>;
    fn list_cages(&self, season_id: &SeasonId) -> Result<Vec<Cage>, GenerateError>;
    fn list_field_availabilities(&self, season_id: &SeasonId) -> Result<Vec<WeeklyAvailability>, GenerateError>;
    fn list_cage_availabilities(&self, season_id: &SeasonId) -> Result<Vec<WeeklyAvailability>, GenerateError>;
    fn list_field_date_overrides(&self, season_id: &SeasonId) -> Result<Vec<DateOverride>, GenerateError>;
    fn list_cage_date_overrides(&self, season_id: &SeasonId) -> Result<Vec<DateOverride>, GenerateError>;
    fn list_scheduled_events(
        &self,
        season_id: &SeasonId,
        division_id: Option<&DivisionId>,
    ) -> Result<Vec<ScheduledEvent>, GenerateError>;
}

/// Where `generate` writes its drafts once a run completes successfully.
pub trait ScheduleWriter {
    fn insert_scheduled_events_batch(&mut self, events: &[ScheduledEvent]) -> Result<(), GenerateError>;
    fn delete_scheduled_events_bulk(
        &mut self,
        season_id: &SeasonId,
        division_id: Option<&DivisionId>,
    ) -> Result<(), GenerateError>;
}

/// A `BTreeMap`-backed fixture store implementing both repository traits,
/// constructible either from in-process builder calls (used by tests) or
/// from a small JSON document (used by the CLI demo). It is the out-of-scope
/// HTTP/SQL persistence layer's stand-in, never a real backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InMemoryRepository {
    pub seasons: BTreeMap<SeasonId, Season>,
    pub divisions: BTreeMap<SeasonId, Vec<Division>>,
    pub division_configs: BTreeMap<SeasonId, Vec<DivisionConfig>>,
    pub teams: BTreeMap<SeasonId, Vec<Team>>,
    pub fields: BTreeMap<SeasonId, Vec<Field>>,
    pub cages: BTreeMap<SeasonId, Vec<Cage>>,
    pub field_availabilities: BTreeMap<SeasonId, Vec<WeeklyAvailability>>,
    pub cage_availabilities: BTreeMap<SeasonId, Vec<WeeklyAvailability>>,
    pub field_overrides: BTreeMap<SeasonId, Vec<DateOverride>>,
    pub cage_overrides: BTreeMap<SeasonId, Vec<DateOverride>>,
    pub scheduled_events: BTreeMap<SeasonId, Vec<ScheduledEvent>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.seasons.insert(season.id.clone(), season);
        self
    }

    pub fn with_division(mut self, season_id: &SeasonId, division: Division) -> Self {
        self.divisions.entry(season_id.clone()).or_default().push(division);
        self
    }

    pub fn with_division_config(mut self, season_id: &SeasonId, config: DivisionConfig) -> Self {
        self.division_configs.entry(season_id.clone()).or_default().push(config);
        self
    }

    pub fn with_team(mut self, season_id: &SeasonId, team: Team) -> Self {
        self.teams.entry(season_id.clone()).or_default().push(team);
        self
    }

    pub fn with_field(mut self, season_id: &SeasonId, field: Field) -> Self {
        self.fields.entry(season_id.clone()).or_default().push(field);
        self
    }

    pub fn with_cage(mut self, season_id: &SeasonId, cage: Cage) -> Self {
        self.cages.entry(season_id.clone()).or_default().push(cage);
        self
    }

    pub fn with_field_availability(mut self, season_id: &SeasonId, availability: WeeklyAvailability) -> Self {
        self.field_availabilities.entry(season_id.clone()).or_default().push(availability);
        self
    }

    pub fn with_cage_availability(mut self, season_id: &SeasonId, availability: WeeklyAvailability) -> Self {
        self.cage_availabilities.entry(season_id.clone()).or_default().push(availability);
        self
    }

    pub fn with_field_override(mut self, season_id: &SeasonId, o: DateOverride) -> Self {
        self.field_overrides.entry(season_id.clone()).or_default().push(o);
        self
    }

    pub fn with_cage_override(mut self, season_id: &SeasonId, o: DateOverride) -> Self {
        self.cage_overrides.entry(season_id.clone()).or_default().push(o);
        self
    }
}

impl SeasonRepository for InMemoryRepository {
    fn get_season(&self, id: &SeasonId) -> Result<Season, GenerateError> {
        self.seasons.get(id).cloned().ok_or_else(|| GenerateError::MissingSeason(id.to_string()))
    }

    fn list_divisions(&self, season_id: &SeasonId) -> Result<Vec<Division>, GenerateError> {
        Ok(self.divisions.get(season_id).cloned().unwrap_or_default())
    }

    fn list_division_configs(&self, season_id: &SeasonId) -> Result<Vec<DivisionConfig>, GenerateError> {
        Ok(self.division_configs.get(season_id).cloned().unwrap_or_default())
    }

    fn list_teams(&self, season_id: &SeasonId) -> Result<Vec<Team>, GenerateError> {
        Ok(self.teams.get(season_id).cloned().unwrap_or_default())
    }

    fn list_fields(&self, season_id: &SeasonId) -> Result<Vec<Field>, GenerateError> {
        Ok(self.fields.get(season_id).cloned().unwrap_or_default())
    }

    fn list_cages(&self, season_id: &SeasonId) -> Result<Vec<Cage>, GenerateError> {
        Ok(self.cages.get(season_id).cloned().unwrap_or_default())
    }

    fn list_field_availabilities(&self, season_id: &SeasonId) -> Result<Vec<WeeklyAvailability>, GenerateError> {
        Ok(self.field_availabilities.get(season_id).cloned().unwrap_or_default())
    }

    fn list_cage_availabilities(&self, season_id: &SeasonId) -> Result<Vec<WeeklyAvailability>, GenerateError> {
        Ok(self.cage_availabilities.get(season_id).cloned().unwrap_or_default())
    }

    fn list_field_date_overrides(&self, season_id: &SeasonId) -> Result<Vec<DateOverride>, GenerateError> {
        Ok(self.field_overrides.get(season_id).cloned().unwrap_or_default())
    }

    fn list_cage_date_overrides(&self, season_id: &SeasonId) -> Result<Vec<DateOverride>, GenerateError> {
        Ok(self.cage_overrides.get(season_id).cloned().unwrap_or_default())
    }

    fn list_scheduled_events(
        &self,
        season_id: &SeasonId,
        division_id: Option<&DivisionId>,
    ) -> Result<Vec<ScheduledEvent>, GenerateError> {
        let events = self.scheduled_events.get(season_id).cloned().unwrap_or_default();
        Ok(match division_id {
            Some(d) => events.into_iter().filter(|e| e.division_id == *d).collect(),
            None => events,
        })
    }
}

impl ScheduleWriter for InMemoryRepository {
    fn insert_scheduled_events_batch(&mut self, events: &[ScheduledEvent]) -> Result<(), GenerateError> {
        for event in events {
            self.scheduled_events.entry(event.season_id.clone()).or_default().push(event.clone());
        }
        Ok(())
    }

    fn delete_scheduled_events_bulk(
        &mut self,
        season_id: &SeasonId,
        division_id: Option<&DivisionId>,
    ) -> Result<(), GenerateError> {
        if let Some(events) = self.scheduled_events.get_mut(season_id) {
            match division_id {
                Some(d) => events.retain(|e| e.division_id != *d),
                None => events.clear(),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SeasonStatus;
    use chrono::NaiveDate;

    fn season(id: &str) -> Season {
        Season {
            id: SeasonId::from(id),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            games_start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            status: SeasonStatus::Active,
            blackouts: vec![],
        }
    }

    #[test]
    fn missing_season_is_a_typed_error() {
        let repo = InMemoryRepository::new();
        let err = repo.get_season(&SeasonId::from("nope")).unwrap_err();
        assert!(matches!(err, GenerateError::MissingSeason(_)));
    }

    #[test]
    fn builders_round_trip_through_the_repository_traits() {
        let repo = InMemoryRepository::new().with_season(season("s1"));
        let found = repo.get_season(&SeasonId::from("s1")).unwrap();
        assert_eq!(found.id, SeasonId::from("s1"));
        assert!(repo.list_teams(&SeasonId::from("s1")).unwrap().is_empty());
    }

    #[test]
    fn delete_scheduled_events_bulk_scopes_to_division_when_given() {
        use crate::model::{Booking, DivisionId, EventId, EventStatus, EventType, TeamId};
        let mut repo = InMemoryRepository::new();
        let make = |id: &str, division: &str| ScheduledEvent {
            id: EventId::from(id),
            season_id: SeasonId::from("s1"),
            division_id: DivisionId::from(division),
            event_type: EventType::Game,
            date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            start_minute: 540,
            end_minute: 600,
            field_id: None,
            cage_id: None,
            booking: Booking::Game { home_team_id: TeamId::from("a"), away_team_id: TeamId::from("b") },
            status: EventStatus::Scheduled,
            notes: None,
            created_at: 0,
            updated_at: 0,
        };
        repo.insert_scheduled_events_batch(&[make("e1", "u10"), make("e2", "u12")]).unwrap();
        repo.delete_scheduled_events_bulk(&SeasonId::from("s1"), Some(&DivisionId::from("u10"))).unwrap();
        let remaining = repo.list_scheduled_events(&SeasonId::from("s1"), None).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].division_id, DivisionId::from("u12"));
    }
}
