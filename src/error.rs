//! Error types for the sizing engine.
//!
//! Every fallible operation in the crate returns [`Result`]. Cancellation is
//! deliberately absent here: a cancelled search still succeeds and reports
//! its partial results through [`crate::search::SearchStatus::Cancelled`].

use thiserror::Error;

/// Errors raised by catalog lookup, series validation, and the search.
#[derive(Error, Debug)]
pub enum SizingError {
    /// A referenced equipment id (or a whole required category) is missing
    /// from the catalog.
    #[error("configuration error: {what} `{id}` not found in equipment catalog")]
    Configuration {
        /// Kind of equipment that was looked up (e.g. `"wind turbine"`).
        what: &'static str,
        /// The id that could not be resolved.
        id: String,
    },

    /// The whole search space was evaluated and no candidate met the
    /// feasibility threshold.
    #[error(
        "no feasible candidate after evaluating {evaluated} combinations \
         (best reliability {best_reliability:.4})"
    )]
    InfeasibleSearch {
        /// Number of candidates that were simulated.
        evaluated: usize,
        /// Highest reliability observed among all simulated candidates.
        best_reliability: f64,
    },

    /// A catalog entry carries a duplicate id or a non-positive rating.
    #[error("invalid equipment catalog: {0}")]
    InvalidCatalog(String),

    /// Resource series has the wrong length or contains unusable samples.
    #[error("invalid resource series: {0}")]
    InvalidSeries(String),

    /// Region metadata cannot drive a search.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// A candidate produced a non-finite quantity.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Search, dispatch, or scoring parameters are out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The background search task panicked or was aborted.
    #[error("search worker failed: {0}")]
    Worker(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SizingError {
    /// Shorthand for a missing catalog entry.
    pub fn missing(what: &'static str, id: impl Into<String>) -> Self {
        SizingError::Configuration {
            what,
            id: id.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SizingError>;
