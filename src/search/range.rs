//! Per-technology capacity bounds and grid steps.

use serde::Serialize;
use tracing::debug;

use crate::devices::biomass::{daily_run_hours, sustained_rate_mw};
use crate::region::{BiomassRoute, Region};
use crate::sim::types::DispatchPolicy;

use super::SearchSettings;

/// Admissible grid steps, smallest first.
const STEP_LADDER: [f64; 11] = [0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 25.0, 50.0, 100.0, 200.0, 500.0];

/// One discretised search axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl AxisRange {
    /// Builds an axis over `[min, max]` with at most `max_points` points.
    ///
    /// The step starts at a rung chosen by the span's magnitude and moves up
    /// the ladder until the point budget is met. A degenerate span collapses
    /// to the single point `min`.
    pub fn new(min: f64, max: f64, max_points: usize) -> Self {
        let min = if min.is_finite() { min.max(0.0) } else { 0.0 };
        let max = if max.is_finite() { max.max(min) } else { min };
        let span = max - min;
        if span <= f64::EPSILON {
            return Self { min, max: min, step: 0.0 };
        }

        let max_points = max_points.max(2);
        let start = STEP_LADDER
            .iter()
            .position(|&s| s >= starting_step(span))
            .unwrap_or(0);
        let step = STEP_LADDER[start..]
            .iter()
            .copied()
            .find(|&s| point_count(span, s) <= max_points)
            .unwrap_or(span / (max_points - 1) as f64);
        Self { min, max, step }
    }

    /// Grid points from `min` in `step` increments, always ending at `max`.
    pub fn points(&self) -> Vec<f64> {
        if self.step <= 0.0 {
            return vec![self.min];
        }
        let n = self.len();
        let mut points: Vec<f64> = (0..n - 1)
            .map(|k| self.min + k as f64 * self.step)
            .collect();
        points.push(self.max);
        points
    }

    pub fn len(&self) -> usize {
        if self.step <= 0.0 {
            1
        } else {
            point_count(self.max - self.min, self.step)
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

fn starting_step(span: f64) -> f64 {
    if span < 10.0 {
        0.5
    } else if span < 50.0 {
        2.0
    } else if span < 200.0 {
        5.0
    } else {
        10.0
    }
}

fn point_count(span: f64, step: f64) -> usize {
    (span / step - 1e-9).ceil().max(0.0) as usize + 1
}

/// The four axes of a search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchRanges {
    pub wind: AxisRange,
    pub solar: AxisRange,
    pub biomass: AxisRange,
    pub battery: AxisRange,
}

impl SearchRanges {
    /// Number of candidates in the full grid.
    pub fn combinations(&self) -> usize {
        self.wind.len() * self.solar.len() * self.biomass.len() * self.battery.len()
    }
}

/// `annual_load / equivalent_hours × margin`, or zero without yield.
fn yield_bound(annual_load_mwh: f64, equivalent_hours: f64, margin: f64) -> f64 {
    if equivalent_hours > 0.0 {
        annual_load_mwh / equivalent_hours * margin
    } else {
        0.0
    }
}

/// Derives the search grid from annual load and the region's resource class.
pub fn estimate_ranges(
    region: &Region,
    route: BiomassRoute,
    policy: &DispatchPolicy,
    settings: &SearchSettings,
) -> SearchRanges {
    let points = settings.max_points_per_axis;
    let rt = region.region_type;

    let wind_max = yield_bound(
        region.annual_load_mwh,
        rt.wind_equivalent_hours(),
        settings.wind_margin,
    );
    let solar_max = yield_bound(
        region.annual_load_mwh,
        rt.solar_equivalent_hours(),
        settings.solar_margin,
    );
    let biomass_max = sustained_rate_mw(
        region.daily_biomass_t,
        region.feedstock,
        route,
        daily_run_hours(policy.biomass_run_hours),
    ) * settings.biomass_margin;

    let ranges = SearchRanges {
        wind: AxisRange::new(0.0, wind_max, points),
        solar: AxisRange::new(0.0, solar_max, points),
        biomass: AxisRange::new(0.0, biomass_max, points),
        battery: AxisRange::new(
            region.peak_load_mw * settings.battery_min_hours,
            region.peak_load_mw * settings.battery_max_hours,
            points,
        ),
    };
    debug!(
        wind_max,
        solar_max,
        biomass_max,
        combinations = ranges.combinations(),
        "estimated search ranges"
    );
    ranges
}
