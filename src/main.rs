//! hybrid-sizer entry point: CLI wiring and config-driven search.

use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use hybrid_sizer::catalog::EquipmentCatalog;
use hybrid_sizer::cli::Cli;
use hybrid_sizer::config::ScenarioConfig;
use hybrid_sizer::logging;
use hybrid_sizer::resource::{CsvSeriesProvider, HourlySeries, ResourceProvider};
use hybrid_sizer::search::{CancelToken, NoProgress, Progress, SearchOutcome, SearchStatus, search};

/// Resolves the scenario: `--scenario`, then `--preset`, then the industrial default.
fn load_scenario(cli: &Cli) -> ScenarioConfig {
    let loaded = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::industrial()),
    };
    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(threads) = cli.threads {
        scenario.search.threads = threads;
    }
    if let Some(max) = cli.max_solutions {
        scenario.search.max_solutions = max;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    scenario
}

fn load_catalog(cli: &Cli) -> anyhow::Result<EquipmentCatalog> {
    match &cli.catalog {
        Some(path) => EquipmentCatalog::from_toml_file(path)
            .with_context(|| format!("loading equipment catalog {}", path.display())),
        None => Ok(EquipmentCatalog::builtin()),
    }
}

fn load_series(cli: &Cli, scenario: &ScenarioConfig) -> anyhow::Result<HourlySeries> {
    let region = scenario.region.to_region();
    match &cli.series {
        Some(path) => {
            let provider = CsvSeriesProvider::from_path(path)
                .with_context(|| format!("reading resource series {}", path.display()))?;
            Ok(provider.series(&region)?)
        }
        None => Ok(scenario.profile_provider().series(&region)?),
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
    {
        bar.set_style(style);
    }
    bar
}

fn print_outcome(outcome: &SearchOutcome) {
    let s = &outcome.stats;
    println!(
        "Evaluated {} of {} candidates ({} feasible, {} pruned, {} failed)",
        s.evaluated, s.total, s.feasible, s.pruned, s.failed
    );
    if outcome.status == SearchStatus::Cancelled {
        println!("Search cancelled; {} candidates skipped", s.skipped);
    }
    println!("Reference cost: {:.0}", outcome.reference_cost);
    for solution in &outcome.solutions {
        println!();
        print!("{solution}");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let scenario = load_scenario(&cli);
    let catalog = load_catalog(&cli)?;
    let series = load_series(&cli, &scenario)?;
    let request = scenario.to_request(Arc::new(series), Arc::new(catalog));
    info!(region = %request.region.id, region_type = %request.region.region_type, "sizing");

    let cancel = CancelToken::new();
    let outcome = if cli.no_progress || cli.json {
        search(&request, &NoProgress, &cancel)?
    } else {
        let bar = progress_bar();
        let sink = {
            let bar = bar.clone();
            move |p: Progress| {
                bar.set_length(p.total as u64);
                bar.set_position(p.current as u64);
                match p.best_cost_so_far {
                    Some(cost) => bar.set_message(format!(
                        "{} | feasible {} | best {cost:.0}",
                        p.phase, p.feasible_count
                    )),
                    None => bar.set_message(format!("{} | feasible {}", p.phase, p.feasible_count)),
                }
            }
        };
        let result = search(&request, &sink, &cancel);
        bar.finish_and_clear();
        result?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}
