//! Capacity search: range estimation, parallel enumeration, and ranking.

#[cfg(feature = "async")]
pub mod async_search;
pub mod optimizer;
pub mod progress;
pub mod range;
pub mod topk;

use serde::{Deserialize, Serialize};

#[cfg(feature = "async")]
pub use async_search::{SearchHandle, spawn_search};
pub use optimizer::{SearchOutcome, SearchRequest, SearchStats, SearchStatus, search};
pub use progress::{CancelToken, NoProgress, Progress, ProgressSink, SearchPhase};
pub use range::{AxisRange, SearchRanges, estimate_ranges};
pub use topk::{Ranked, TopK};

/// Grid shape, parallelism, and reporting cadence of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettings {
    /// Size of the retained top-K.
    pub max_solutions: usize,
    /// Worker threads; 0 uses every core, 1 runs sequentially on the caller.
    pub threads: usize,
    /// Candidates between progress reports.
    pub progress_interval: usize,
    pub max_points_per_axis: usize,
    pub wind_margin: f64,
    pub solar_margin: f64,
    pub biomass_margin: f64,
    /// Battery axis bounds in hours of peak load.
    pub battery_min_hours: f64,
    pub battery_max_hours: f64,
    /// Skip candidates whose estimated energy ratios leave the region's bands.
    pub prune_by_ratio_band: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_solutions: 20,
            threads: 0,
            progress_interval: 256,
            max_points_per_axis: 12,
            wind_margin: 1.5,
            solar_margin: 1.5,
            biomass_margin: 1.2,
            battery_min_hours: 2.0,
            battery_max_hours: 12.0,
            prune_by_ratio_band: false,
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Vec<(&'static str, String)> {
        let mut errors = Vec::new();
        if self.max_solutions == 0 {
            errors.push(("max_solutions", "must be > 0".to_string()));
        }
        if self.progress_interval == 0 {
            errors.push(("progress_interval", "must be > 0".to_string()));
        }
        if self.max_points_per_axis < 2 {
            errors.push(("max_points_per_axis", "must be >= 2".to_string()));
        }
        for (name, v) in [
            ("wind_margin", self.wind_margin),
            ("solar_margin", self.solar_margin),
            ("biomass_margin", self.biomass_margin),
        ] {
            if !v.is_finite() || v < 0.0 {
                errors.push((name, format!("must be >= 0, got {v}")));
            }
        }
        if !(self.battery_min_hours >= 0.0 && self.battery_min_hours <= self.battery_max_hours) {
            errors.push((
                "battery_min_hours",
                "need 0 <= battery_min_hours <= battery_max_hours".to_string(),
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(SearchSettings::default().validate().is_empty());
    }

    #[test]
    fn inverted_battery_hours_rejected() {
        let s = SearchSettings {
            battery_min_hours: 8.0,
            battery_max_hours: 4.0,
            ..SearchSettings::default()
        };
        assert!(s.validate().iter().any(|(f, _)| *f == "battery_min_hours"));
    }
}
