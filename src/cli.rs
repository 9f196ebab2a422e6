//! Command-line interface.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Sizes a hybrid wind/solar/biomass/storage system for one region.
///
/// Without `--scenario` or `--preset` the `industrial` preset is used.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").args(["scenario", "preset"])))]
pub struct Cli {
    /// Load the scenario from a TOML file
    #[arg(long, value_name = "PATH")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (industrial, residential, agricultural, forestry, mountain, test)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Equipment catalog TOML; defaults to the built-in tables
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Hourly resource CSV (8760 rows); defaults to the synthetic daily profile
    #[arg(long, value_name = "PATH")]
    pub series: Option<PathBuf>,

    /// Worker threads (0 = all cores, 1 = sequential)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Number of ranked solutions to keep
    #[arg(long)]
    pub max_solutions: Option<usize>,

    /// Print the search outcome as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::try_parse_from(["hybrid-sizer"]).unwrap();
        assert!(cli.scenario.is_none());
        assert!(cli.preset.is_none());
        assert!(!cli.json);
        assert!(cli.threads.is_none());
    }

    #[test]
    fn preset_with_overrides() {
        let cli = Cli::try_parse_from([
            "hybrid-sizer",
            "--preset",
            "test",
            "--threads",
            "2",
            "--max-solutions",
            "3",
            "--json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.preset.as_deref(), Some("test"));
        assert_eq!(cli.threads, Some(2));
        assert_eq!(cli.max_solutions, Some(3));
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn scenario_and_preset_conflict() {
        let result = Cli::try_parse_from([
            "hybrid-sizer",
            "--scenario",
            "scenarios/test.toml",
            "--preset",
            "test",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn bad_thread_count_rejected() {
        assert!(Cli::try_parse_from(["hybrid-sizer", "--threads", "many"]).is_err());
    }
}
