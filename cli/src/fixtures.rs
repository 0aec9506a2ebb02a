//! Built-in demo seasons plus a thin JSON loader, standing in for the
//! HTTP/SQL persistence layer the core treats as out of scope. Every
//! fixture returns an [`InMemoryRepository`] (the fixture-backed
//! [`SeasonRepository`]/[`ScheduleWriter`] implementation) together with
//! the id of the season it seeded, so callers never have to guess which
//! season in the repository they should run.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use backend::{
    Cage, CageId, DateOverride, DayPreferencePriority, Division, DivisionConfig, DivisionId, Field,
    FieldId, GameDayPreference, InMemoryRepository, OverrideType, ResourceId, Season, SeasonId,
    SeasonStatus, Team, TeamId, WeeklyAvailability,
};
use chrono::NaiveDate;

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("fixture dates are hard-coded and valid")
}

/// Two teams, one field open Saturday morning only, one game a week.
/// `fieldz-scheduler generate --fixture two-team` reproduces it end to end.
fn two_team_demo() -> (InMemoryRepository, SeasonId) {
    let season_id = SeasonId::from("demo-two-team");
    let division_id = DivisionId::from("u10");
    let field_id = FieldId::from("diamond-1");

    let season = Season {
        id: season_id.clone(),
        start_date: parse_date("2026-03-01"),
        end_date: parse_date("2026-03-07"),
        games_start_date: parse_date("2026-03-01"),
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
        field_preferences: vec![field_id.clone()],
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

    let repo = InMemoryRepository::new()
        .with_season(season)
        .with_division(&season_id, Division { id: division_id.clone(), name: "U10".into(), scheduling_order: 0 })
        .with_division_config(&season_id, config)
        .with_team(&season_id, Team { id: TeamId::from("rockies"), season_id: season_id.clone(), division_id: division_id.clone(), name: "Rockies".into() })
        .with_team(&season_id, Team { id: TeamId::from("dragons"), season_id: season_id.clone(), division_id: division_id.clone(), name: "Dragons".into() })
        .with_field(&season_id, Field { id: field_id.clone(), name: "Diamond 1".into(), division_compatibility: vec![] })
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

    (repo, season_id)
}

/// A fuller demo: four teams, a double round robin, weekly practices and
/// cage sessions, Sunday paired practices, and one date-override blackout
/// that exercises the availability resolver's subtraction path.
fn quad_division_demo() -> (InMemoryRepository, SeasonId) {
    let season_id = SeasonId::from("demo-quad");
    let division_id = DivisionId::from("majors");
    let field_a = FieldId::from("field-a");
    let field_b = FieldId::from("field-b");
    let cage_a = CageId::from("cage-a");

    let season = Season {
        id: season_id.clone(),
        start_date: parse_date("2026-04-06"),
        end_date: parse_date("2026-05-17"),
        games_start_date: parse_date("2026-04-06"),
        status: SeasonStatus::Active,
        blackouts: vec![],
    };

    let config = DivisionConfig {
        division_id: division_id.clone(),
        practices_per_week: 1,
        practice_duration_hours: 1.5,
        games_per_week: 2,
        game_duration_hours: 1.5,
        game_arrive_before_hours: 0.5,
        game_day_preferences: vec![
            GameDayPreference { day_of_week: 6, priority: DayPreferencePriority::Preferred, max_games_per_day: None },
            GameDayPreference { day_of_week: 2, priority: DayPreferencePriority::Acceptable, max_games_per_day: None },
        ],
        cage_sessions_per_week: 1,
        cage_session_duration_hours: 1.0,
        field_preferences: vec![field_a.clone(), field_b.clone()],
        game_week_overrides: BTreeMap::new(),
        max_games_per_season: None,
        sunday_paired_practice_enabled: true,
        sunday_paired_practice_duration_hours: 1.0,
        sunday_paired_practice_field_id: Some(field_b.clone()),
        sunday_paired_practice_cage_id: Some(cage_a.clone()),
        game_spacing_enabled: true,
        practice_arrive_before_minutes: 15,
        min_consecutive_day_gap: 2,
        home_away_diff_ceiling: 1,
    };

    let team_names = ["Rockies", "Dragons", "Green Machine", "Red Rubies"];
    let mut repo = InMemoryRepository::new()
        .with_season(season)
        .with_division(&season_id, Division { id: division_id.clone(), name: "Majors".into(), scheduling_order: 0 })
        .with_division_config(&season_id, config)
        .with_field(&season_id, Field { id: field_a.clone(), name: "Field A".into(), division_compatibility: vec![] })
        .with_field(&season_id, Field { id: field_b.clone(), name: "Field B".into(), division_compatibility: vec![] })
        .with_cage(&season_id, Cage { id: cage_a.clone(), name: "Batting Cage A".into(), division_compatibility: vec![] });

    for name in team_names {
        repo = repo.with_team(
            &season_id,
            Team {
                id: TeamId::from(name.to_lowercase().replace(' ', "-")),
                season_id: season_id.clone(),
                division_id: division_id.clone(),
                name: name.to_string(),
            },
        );
    }

    for (field_id, days) in [(&field_a, [2u8, 4, 6]), (&field_b, [0u8, 2, 6])] {
        for day in days {
            repo = repo.with_field_availability(
                &season_id,
                WeeklyAvailability {
                    resource_id: ResourceId::Field(field_id.clone()),
                    day_of_week: day,
                    start_minute: 8 * 60,
                    end_minute: 20 * 60,
                    single_event_only: false,
                },
            );
        }
    }
    repo = repo.with_cage_availability(
        &season_id,
        WeeklyAvailability {
            resource_id: ResourceId::Cage(cage_a),
            day_of_week: 0,
            start_minute: 8 * 60,
            end_minute: 18 * 60,
            single_event_only: false,
        },
    );
    for day in [2u8, 4] {
        repo = repo.with_cage_availability(
            &season_id,
            WeeklyAvailability {
                resource_id: ResourceId::Cage(CageId::from("cage-a")),
                day_of_week: day,
                start_minute: 16 * 60,
                end_minute: 19 * 60,
                single_event_only: true,
            },
        );
    }

    // A Wednesday-evening blackout carved out of Field A's window, so the
    // resolver has to subtract an interval from the middle.
    repo = repo.with_field_override(
        &season_id,
        DateOverride {
            resource_id: ResourceId::Field(field_a),
            date: parse_date("2026-04-15"),
            override_type: OverrideType::Blackout,
            start_minute: Some(18 * 60),
            end_minute: Some(19 * 60),
            single_event_only: false,
        },
    );

    (repo, season_id)
}

/// Resolves `name_or_path` to a repository and the season it should
/// operate on. A recognized built-in name takes precedence; anything else
/// is treated as a path to a JSON document produced by
/// [`InMemoryRepository::to_json_pretty`], and the file must contain
/// exactly one season unless `explicit_season` disambiguates.
pub fn load(name_or_path: &str, explicit_season: Option<&str>) -> Result<(InMemoryRepository, SeasonId)> {
    match name_or_path {
        "two-team" => return Ok(two_team_demo()),
        "quad-division" => return Ok(quad_division_demo()),
        _ => {}
    }

    let path = Path::new(name_or_path);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixture file `{name_or_path}` (and it did not match a built-in fixture name: two-team, quad-division)"))?;
    let repo = InMemoryRepository::from_json(&text).context("parsing fixture file as JSON")?;

    let season_id = match explicit_season {
        Some(id) => SeasonId::from(id),
        None => {
            let mut ids = repo.seasons.keys();
            let Some(first) = ids.next() else {
                bail!("fixture file `{name_or_path}` has no seasons");
            };
            if ids.next().is_some() {
                bail!("fixture file `{name_or_path}` has more than one season; pass --season to pick one");
            }
            first.clone()
        }
    };

    Ok((repo, season_id))
}

pub const BUILTIN_FIXTURE_NAMES: &[&str] = &["two-team", "quad-division"];
