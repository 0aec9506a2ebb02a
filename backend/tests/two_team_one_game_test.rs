//! Scenario 1: 2 teams, 1 game. One field open Saturday 09:00-12:00, a
//! single game per week — the only candidate is Saturday 09:00, home to the
//! alphabetically-first team.

use std::collections::BTreeMap;

use backend::{
    generate, Division, DivisionConfig, DivisionId, Field, FieldId, GameDayPreference,
    DayPreferencePriority, GenerateRequest, InMemoryRepository, ResourceId, Season, SeasonId,
    SeasonStatus, Team, TeamId, WeeklyAvailability,
};
use chrono::NaiveDate;

#[test]
fn two_teams_one_game_lands_saturday_with_alphabetical_home() {
    let season_id = SeasonId::from("s1");
    let division_id = DivisionId::from("u10");

    let season = Season {
        id: season_id.clone(),
        start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
        games_start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        status: SeasonStatus::Active,
        blackouts: vec![],
    };

    let config = DivisionConfig {
        division_id: division_id.clone(),
        practices_per_week: 0,
        practice_duration_hours: 1.0,
        games_per_week: 1,
        game_duration_hours: 1.0,
        game_arrive_before_hours: 0.0,
        game_day_preferences: vec![GameDayPreference {
            day_of_week: 6,
            priority: DayPreferencePriority::Preferred,
            max_games_per_day: None,
        }],
        cage_sessions_per_week: 0,
        cage_session_duration_hours: 1.0,
        field_preferences: vec![],
        game_week_overrides: BTreeMap::new(),
        max_games_per_season: None,
        sunday_paired_practice_enabled: false,
        sunday_paired_practice_duration_hours: 1.0,
        sunday_paired_practice_field_id: None,
        sunday_paired_practice_cage_id: None,
        game_spacing_enabled: true,
        practice_arrive_before_minutes: 0,
        min_consecutive_day_gap: 1,
        home_away_diff_ceiling: 1,
    };

    let field_id = FieldId::from("f1");
    let repo = InMemoryRepository::new()
        .with_season(season)
        .with_division(&season_id, Division { id: division_id.clone(), name: "U10".into(), scheduling_order: 0 })
        .with_division_config(&season_id, config)
        .with_team(&season_id, Team { id: TeamId::from("Alpha"), season_id: season_id.clone(), division_id: division_id.clone(), name: "Alpha".into() })
        .with_team(&season_id, Team { id: TeamId::from("Bravo"), season_id: season_id.clone(), division_id: division_id.clone(), name: "Bravo".into() })
        .with_field(&season_id, Field { id: field_id.clone(), name: "Diamond".into(), division_compatibility: vec![] })
        .with_field_availability(
            &season_id,
            WeeklyAvailability {
                resource_id: ResourceId::Field(field_id),
                day_of_week: 6,
                start_minute: 9 * 60,
                end_minute: 12 * 60,
                single_event_only: false,
            },
        );

    let result = generate(&GenerateRequest::new(season_id), &repo);

    assert!(result.success, "{}", result.message);
    assert_eq!(result.events_created, 1);
    let event = &result.drafts[0];
    assert_eq!(event.date, NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
    assert_eq!(event.start_minute, 9 * 60);
    assert_eq!(event.end_minute, 10 * 60);
    match &event.booking {
        backend::Booking::Game { home_team_id, away_team_id } => {
            assert_eq!(home_team_id.0, "Alpha");
            assert_eq!(away_team_id.0, "Bravo");
        }
        other => panic!("expected a game, got {other:?}"),
    }
}
