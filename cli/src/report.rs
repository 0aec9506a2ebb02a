//! Terminal summaries for `generate` and `evaluate`, styled with `console`
//! for colored, bolded output.

use backend::evaluator::EvaluationReport;
use backend::GenerateResult;
use console::style;

pub fn print_generate_result(result: &GenerateResult) {
    if result.success {
        println!("{} {}", style("✓").green().bold(), style(&result.message).bold());
    } else {
        println!("{} {}", style("✗").red().bold(), style(&result.message).bold());
        for error in &result.errors {
            println!("  {} {error}", style("error:").red());
        }
        return;
    }

    println!("{} {}", style("events created:").dim(), result.events_created);
    println!(
        "{} games={} practices={} cages={} paired_practices={}",
        style("by type:").dim(),
        result.statistics.events_by_type.games,
        result.statistics.events_by_type.practices,
        result.statistics.events_by_type.cages,
        result.statistics.events_by_type.paired_practices,
    );

    if !result.statistics.events_by_division.is_empty() {
        println!("{}", style("by division:").dim());
        for (division, count) in &result.statistics.events_by_division {
            let avg = result.statistics.average_events_per_team.get(division).copied().unwrap_or(0.0);
            println!("  {division}: {count} event(s), {avg:.1} avg/team");
        }
    }

    if !result.warnings.is_empty() {
        println!("{} {}", style("warnings:").yellow().bold(), result.warnings.len());
        for warning in result.warnings.iter().take(10) {
            println!("  {} {warning:?}", style("-").yellow());
        }
        if result.warnings.len() > 10 {
            println!("  ... and {} more", result.warnings.len() - 10);
        }
    }

    println!("{}", style("log:").dim());
    for entry in &result.scheduling_log {
        println!("  [{:?}] {}", entry.category, entry.message);
    }
}

pub fn print_evaluation_report(report: &EvaluationReport) {
    println!("{}", style("invariants:").bold());
    for check in &report.invariants {
        if check.passed {
            println!("  {} {}", style("pass").green(), check.name);
        } else {
            println!(
                "  {} {} ({} violating event(s))",
                style("FAIL").red().bold(),
                check.name,
                check.violating_event_ids.len()
            );
        }
    }

    println!("{}", style("statistics:").bold());
    println!(
        "  games={} practices={} cages={} paired_practices={}",
        report.statistics.events_by_type.games,
        report.statistics.events_by_type.practices,
        report.statistics.events_by_type.cages,
        report.statistics.events_by_type.paired_practices,
    );
    for (division, spread) in &report.statistics.home_away_spread {
        let short_rest = report.statistics.short_rest_spread.get(division).copied().unwrap_or(0);
        println!("  {division}: home/away spread={spread}, short-rest spread={short_rest}");
    }
}
