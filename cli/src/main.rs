//! `fieldz-scheduler`: a demonstration harness for the core generator and
//! evaluator (C14). It loads a season from the in-memory repository —
//! seeded from a built-in fixture or a JSON document — runs `generate` or
//! `evaluate`, and prints a summary to the terminal. It never talks to a
//! network or a real database; the persistence layer is out of this
//! crate's scope.

mod fixtures;
mod report;

use anyhow::Result;
use backend::{generate, GenerateRequest, ScoringWeights, SeasonRepository};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "fieldz-scheduler", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the draft scheduler over a fixture and print the resulting drafts.
    Generate {
        /// A built-in fixture name (two-team, quad-division) or a path to a
        /// JSON document produced by a previous `--out`.
        #[arg(long)]
        fixture: String,
        /// Disambiguates which season to schedule when the fixture file
        /// holds more than one.
        #[arg(long)]
        season: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Path to a JSON document overriding a subset of `ScoringWeights`
        /// fields; unset fields keep their defaults.
        #[arg(long)]
        weights: Option<String>,
        #[arg(long)]
        clear_existing: bool,
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Writes the fixture repository, with the new drafts inserted,
        /// back out as JSON so a later `evaluate` can load it.
        #[arg(long)]
        out: Option<String>,
    },
    /// Replay a previously generated schedule and print its quality report.
    Evaluate {
        #[arg(long)]
        fixture: String,
        #[arg(long)]
        season: Option<String>,
    },
    /// List the built-in fixture names `--fixture` accepts.
    Fixtures,
}

/// Loads a partial JSON document of `ScoringWeights` fields and layers it
/// over the defaults, so a caller only has to name the factors they want to
/// retune rather than restate every weight in the struct.
fn load_weights(path: &str) -> Result<ScoringWeights> {
    let text = std::fs::read_to_string(path)?;
    let overrides: serde_json::Value = serde_json::from_str(&text)?;
    let mut merged = serde_json::to_value(ScoringWeights::default())?;
    if let (serde_json::Value::Object(base), serde_json::Value::Object(over)) = (&mut merged, overrides) {
        for (k, v) in over {
            base.insert(k, v);
        }
    }
    Ok(serde_json::from_value(merged)?)
}

fn run_generate(
    fixture: &str,
    season: Option<&str>,
    seed: Option<u64>,
    weights: Option<&str>,
    clear_existing: bool,
    max_attempts: Option<u32>,
    out: Option<&str>,
) -> Result<()> {
    let (mut repo, season_id) = fixtures::load(fixture, season)?;

    let mut request = GenerateRequest::new(season_id.clone());
    request.seed = seed;
    request.clear_existing = clear_existing;
    request.max_attempts = max_attempts;
    if let Some(path) = weights {
        request.scoring_weights = Some(load_weights(path)?);
    }

    log::info!("generating schedule for season {season_id}");
    let result = generate(&request, &repo);
    report::print_generate_result(&result);

    if result.success {
        use backend::ScheduleWriter;
        if clear_existing {
            repo.delete_scheduled_events_bulk(&season_id, None)?;
        }
        repo.insert_scheduled_events_batch(&result.drafts)?;
        if let Some(out_path) = out {
            std::fs::write(out_path, repo.to_json_pretty()?)?;
            println!("wrote {} event(s) to {out_path}", result.drafts.len());
        }
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn run_evaluate(fixture: &str, season: Option<&str>) -> Result<()> {
    let (repo, season_id) = fixtures::load(fixture, season)?;

    let season = repo.get_season(&season_id)?;
    let divisions = repo.list_divisions(&season_id)?;
    let configs = repo.list_division_configs(&season_id)?;
    let teams = repo.list_teams(&season_id)?;
    let field_weekly = repo.list_field_availabilities(&season_id)?;
    let cage_weekly = repo.list_cage_availabilities(&season_id)?;
    let field_overrides = repo.list_field_date_overrides(&season_id)?;
    let cage_overrides = repo.list_cage_date_overrides(&season_id)?;
    let events = repo.list_scheduled_events(&season_id, None)?;

    if events.is_empty() {
        anyhow::bail!(
            "fixture `{fixture}` has no scheduled events for season {season_id}; run `generate --out <path>` first"
        );
    }

    let input = backend::evaluator::EvaluationInput {
        season: &season,
        divisions: &divisions,
        configs: &configs,
        teams: &teams,
        field_weekly: &field_weekly,
        cage_weekly: &cage_weekly,
        field_overrides: &field_overrides,
        cage_overrides: &cage_overrides,
        events: &events,
    };
    let report = backend::evaluator::evaluate(&input);
    report::print_evaluation_report(&report);

    if !report.all_invariants_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.cmd {
        Commands::Generate { fixture, season, seed, weights, clear_existing, max_attempts, out } => {
            run_generate(
                &fixture,
                season.as_deref(),
                seed,
                weights.as_deref(),
                clear_existing,
                max_attempts,
                out.as_deref(),
            )?;
        }
        Commands::Evaluate { fixture, season } => {
            run_evaluate(&fixture, season.as_deref())?;
        }
        Commands::Fixtures => {
            for name in fixtures::BUILTIN_FIXTURE_NAMES {
                println!("{name}");
            }
        }
    }

    Ok(())
}
