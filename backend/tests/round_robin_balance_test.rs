//! Scenario 2: 4 teams, double round-robin (k=2). One field Sat 08:00-16:00
//! (four 1h slots a day), one game per team per week across 6 weeks so each
//! week's single round lands on its own Saturday. Expected: 12 games total,
//! every pair meets exactly twice, per-pair and per-team home/away counts
//! stay within 1.

use std::collections::{BTreeMap, HashMap};

use backend::{
    generate, Booking, Division, DivisionConfig, DivisionId, Field, FieldId, GenerateRequest,
    InMemoryRepository, ResourceId, Season, SeasonId, SeasonStatus, Team, TeamId, WeeklyAvailability,
};
use chrono::NaiveDate;

#[test]
fn four_teams_double_round_robin_covers_every_matchup_twice_with_balanced_home_away() {
    let season_id = SeasonId::from("s1");
    let division_id = DivisionId::from("u12");

    let season = Season {
        id: season_id.clone(),
        start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 4, 12).unwrap(),
        games_start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
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
        game_day_preferences: vec![],
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
    let mut repo = InMemoryRepository::new()
        .with_season(season)
        .with_division(&season_id, Division { id: division_id.clone(), name: "U12".into(), scheduling_order: 0 })
        .with_division_config(&season_id, config)
        .with_field(&season_id, Field { id: field_id.clone(), name: "Diamond".into(), division_compatibility: vec![] });

    for name in ["Ants", "Bears", "Cubs", "Ducks"] {
        repo = repo.with_team(
            &season_id,
            Team { id: TeamId::from(name), season_id: season_id.clone(), division_id: division_id.clone(), name: name.into() },
        );
    }

    // Four 1h slots Saturday 08:00-16:00.
    repo = repo.with_field_availability(
        &season_id,
        WeeklyAvailability {
            resource_id: ResourceId::Field(field_id),
            day_of_week: 6,
            start_minute: 8 * 60,
            end_minute: 16 * 60,
            single_event_only: false,
        },
    );

    let result = generate(&GenerateRequest::new(season_id), &repo);

    assert!(result.success, "{}", result.message);
    assert_eq!(result.events_created, 12);

    let mut meetings: HashMap<(String, String), u32> = HashMap::new();
    let mut pair_home: HashMap<(String, String), (u32, u32)> = HashMap::new();
    let mut team_home: HashMap<String, u32> = HashMap::new();
    let mut team_away: HashMap<String, u32> = HashMap::new();

    for event in &result.drafts {
        let Booking::Game { home_team_id, away_team_id } = &event.booking else {
            panic!("expected only games in this division");
        };
        *team_home.entry(home_team_id.0.clone()).or_insert(0) += 1;
        *team_away.entry(away_team_id.0.clone()).or_insert(0) += 1;

        let (lo, hi) = if home_team_id.0 < away_team_id.0 {
            (home_team_id.0.clone(), away_team_id.0.clone())
        } else {
            (away_team_id.0.clone(), home_team_id.0.clone())
        };
        *meetings.entry((lo.clone(), hi.clone())).or_insert(0) += 1;
        let entry = pair_home.entry((lo.clone(), hi.clone())).or_insert((0, 0));
        if home_team_id.0 == lo {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    assert_eq!(meetings.len(), 6, "C(4,2) distinct pairs");
    for count in meetings.values() {
        assert_eq!(*count, 2, "every pair should meet exactly twice");
    }
    for (lo_home, hi_home) in pair_home.values() {
        assert!((*lo_home as i64 - *hi_home as i64).abs() <= 1);
    }
    for name in ["Ants", "Bears", "Cubs", "Ducks"] {
        let home = *team_home.get(name).unwrap_or(&0) as i64;
        let away = *team_away.get(name).unwrap_or(&0) as i64;
        assert!((home - away).abs() <= 1, "{name} home/away diff should be within 1");
    }
}
