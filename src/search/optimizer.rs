//! Exhaustive grid search over capacity candidates.
//!
//! Every grid point has a flat index (wind outermost, battery innermost).
//! Workers fold their share of the index space into private top-K
//! collections that are merged with a total order, so the ranked output is
//! identical for any thread count.

use std::sync::Arc;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::catalog::EquipmentCatalog;
use crate::devices::BiomassPlant;
use crate::economics::{CostModel, EconomicParams};
use crate::error::{Result, SizingError};
use crate::region::Region;
use crate::resource::HourlySeries;
use crate::scoring::{Score, Scorer, ScoringPolicy};
use crate::selection::{EquipmentCategory, EquipmentPreferences, EquipmentSelector};
use crate::sim::engine::{PreparedSeries, Simulator};
use crate::sim::kpi::SimulationResult;
use crate::sim::types::{CapacityCandidate, DispatchPolicy};
use crate::solution::Solution;

use super::SearchSettings;
use super::progress::{CancelToken, ProgressSink, ProgressTracker, SearchPhase};
use super::range::{SearchRanges, estimate_ranges};
use super::topk::{Ranked, TopK};

/// Everything one search needs, owned so it can move onto a worker thread.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub region: Region,
    pub series: Arc<HourlySeries>,
    pub catalog: Arc<EquipmentCatalog>,
    pub preferences: EquipmentPreferences,
    pub dispatch: DispatchPolicy,
    pub scoring: ScoringPolicy,
    pub economics: EconomicParams,
    pub settings: SearchSettings,
}

impl SearchRequest {
    /// A request with default policies.
    pub fn new(region: Region, series: Arc<HourlySeries>, catalog: Arc<EquipmentCatalog>) -> Self {
        Self {
            region,
            series,
            catalog,
            preferences: EquipmentPreferences::default(),
            dispatch: DispatchPolicy::default(),
            scoring: ScoringPolicy::default(),
            economics: EconomicParams::default(),
            settings: SearchSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_preferences(mut self, preferences: EquipmentPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringPolicy) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_economics(mut self, economics: EconomicParams) -> Self {
        self.economics = economics;
        self
    }

    fn validate(&self) -> Result<()> {
        self.region.validate()?;
        let mut problems: Vec<String> = Vec::new();
        let mut collect = |section: &str, errors: Vec<(&'static str, String)>| {
            problems.extend(
                errors
                    .into_iter()
                    .map(|(field, msg)| format!("{section}.{field}: {msg}")),
            );
        };
        collect("search", self.settings.validate());
        collect("dispatch", self.dispatch.validate());
        collect("scoring", self.scoring.validate());
        collect("economics", self.economics.validate());
        if problems.is_empty() {
            Ok(())
        } else {
            Err(SizingError::InvalidSettings(problems.join("; ")))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Completed,
    /// Stopped early; solutions hold the top-K committed before the stop.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SearchStats {
    /// Grid size.
    pub total: usize,
    /// Candidates simulated to completion.
    pub evaluated: usize,
    pub feasible: usize,
    /// Skipped by ratio-band pruning.
    pub pruned: usize,
    /// Candidates whose simulation failed.
    pub failed: usize,
    /// Never visited because of cancellation.
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Best first, at most `max_solutions` long.
    pub solutions: Vec<Solution>,
    pub status: SearchStatus,
    pub stats: SearchStats,
    pub ranges: SearchRanges,
    /// Best-known cost the economics score was measured against.
    pub reference_cost: f64,
}

/// Runs a complete search.
///
/// # Errors
///
/// - [`SizingError::InvalidRegion`] / [`SizingError::InvalidSettings`] for
///   unusable inputs.
/// - [`SizingError::Configuration`] when a preferred equipment id is missing
///   from the catalog; raised before any candidate is simulated.
/// - [`SizingError::InfeasibleSearch`] when the whole grid was evaluated and
///   no candidate met the feasibility threshold.
///
/// Cancellation is not an error: the outcome carries
/// [`SearchStatus::Cancelled`] and whatever was committed before the stop.
pub fn search(
    request: &SearchRequest,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<SearchOutcome> {
    let span = info_span!("search", region = %request.region.id);
    let _enter = span.enter();

    request.validate()?;
    let region = &request.region;
    let selector = EquipmentSelector::new(&request.catalog, &request.preferences, region)?;

    let ranges = estimate_ranges(region, selector.route(), &request.dispatch, &request.settings);
    if ranges.biomass.max > 0.0 {
        if selector.biomass_primary().is_empty() {
            return Err(SizingError::missing(
                EquipmentCategory::BiomassPrimary.as_str(),
                selector.route().as_str(),
            ));
        }
        if selector.biomass_secondary().is_empty() {
            return Err(SizingError::missing(
                EquipmentCategory::BiomassSecondary.as_str(),
                selector.route().as_str(),
            ));
        }
    }

    let grid = CandidateGrid::new(&ranges);
    let total = grid.len();
    let tracker = ProgressTracker::new(progress, total, request.settings.progress_interval);
    tracker.phase(SearchPhase::Estimating);

    let prepared = PreparedSeries::prepare(
        &request.series,
        region,
        selector.reference_turbine(),
        selector.route(),
        &request.dispatch,
    );
    let cost_model = CostModel::from_selector(&selector);
    let reference_cost = match request.scoring.reference_cost {
        Some(cost) => cost,
        None => grid_reference_cost(&grid, &cost_model, region, &prepared),
    };
    info!(
        candidates = total,
        turbine = %selector.reference_turbine().id,
        route = %selector.route(),
        reference_cost,
        "search started"
    );

    let simulator = Simulator::new(&prepared, &request.dispatch);
    let scorer = Scorer::new(
        &request.scoring,
        region,
        &selector,
        &request.dispatch,
        reference_cost,
        prepared.biomass_sustained_mw(),
    );
    let ctx = Evaluator {
        grid: &grid,
        simulator,
        scorer,
        cost_model,
        region,
        prepared: &prepared,
        prune: request.settings.prune_by_ratio_band,
        tracker: &tracker,
        cancel,
        capacity: request.settings.max_solutions,
    };

    tracker.phase(SearchPhase::Simulating);
    let partial = if request.settings.threads == 1 {
        ctx.run_sequential()
    } else {
        let pool = ThreadPoolBuilder::new()
            .num_threads(request.settings.threads)
            .build()?;
        pool.install(|| ctx.run_parallel())
    };

    let stats = SearchStats {
        total,
        evaluated: partial.evaluated,
        feasible: partial.feasible,
        pruned: partial.pruned,
        failed: partial.failed,
        skipped: partial.skipped,
    };
    let status = if stats.skipped > 0 {
        SearchStatus::Cancelled
    } else {
        SearchStatus::Completed
    };

    if status == SearchStatus::Completed && stats.feasible == 0 {
        tracker.phase(SearchPhase::Done);
        return Err(SizingError::InfeasibleSearch {
            evaluated: stats.evaluated,
            best_reliability: partial.best_reliability.max(0.0),
        });
    }

    tracker.phase(SearchPhase::Selecting);
    let biomass = BiomassPlant::new(region, selector.route(), request.dispatch.biomass_run_hours);
    let solutions = partial
        .top
        .into_sorted_vec()
        .into_iter()
        .enumerate()
        .map(|(i, ranked)| {
            let Evaluated {
                candidate,
                simulation,
                score,
            } = ranked.item;
            Solution::materialize(
                i + 1,
                candidate,
                simulation,
                score,
                ranked.cost,
                &selector,
                &biomass,
                &request.economics,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    for solution in &solutions {
        for issue in solution.score.issues.iter().filter(|i| i.contains("energy ratio")) {
            warn!(rank = solution.rank, "{issue}");
        }
    }
    tracker.phase(SearchPhase::Done);
    info!(
        evaluated = stats.evaluated,
        feasible = stats.feasible,
        failed = stats.failed,
        pruned = stats.pruned,
        status = ?status,
        "search finished"
    );

    Ok(SearchOutcome {
        solutions,
        status,
        stats,
        ranges,
        reference_cost,
    })
}

/// Axis points of a search, addressed by flat index.
pub(crate) struct CandidateGrid {
    wind: Vec<f64>,
    solar: Vec<f64>,
    biomass: Vec<f64>,
    battery: Vec<f64>,
}

impl CandidateGrid {
    pub(crate) fn new(ranges: &SearchRanges) -> Self {
        Self {
            wind: ranges.wind.points(),
            solar: ranges.solar.points(),
            biomass: ranges.biomass.points(),
            battery: ranges.battery.points(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.wind.len() * self.solar.len() * self.biomass.len() * self.battery.len()
    }

    pub(crate) fn candidate(&self, index: usize) -> CapacityCandidate {
        let mut rest = index;
        let battery = rest % self.battery.len();
        rest /= self.battery.len();
        let biomass = rest % self.biomass.len();
        rest /= self.biomass.len();
        let solar = rest % self.solar.len();
        let wind = rest / self.solar.len();
        CapacityCandidate::new(
            self.wind[wind],
            self.solar[solar],
            self.biomass[biomass],
            self.battery[battery],
        )
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = CapacityCandidate> + '_ {
        (0..self.len()).map(|i| self.candidate(i))
    }
}

/// Cheapest grid candidate whose nominal annual yield covers the load.
///
/// Falls back to the cheapest positive-cost candidate when none does.
fn grid_reference_cost(
    grid: &CandidateGrid,
    cost_model: &CostModel,
    region: &Region,
    prepared: &PreparedSeries,
) -> f64 {
    let rt = region.region_type;
    let biomass_hours = prepared.biomass_operating_hours() as f64;
    let mut covering = f64::INFINITY;
    let mut cheapest = f64::INFINITY;
    for c in grid.iter() {
        let cost = cost_model.estimate_capex(&c);
        if cost <= 0.0 {
            continue;
        }
        cheapest = cheapest.min(cost);
        let yield_mwh = c.wind_mw * rt.wind_equivalent_hours()
            + c.solar_mw * rt.solar_equivalent_hours()
            + c.biomass_mw.min(prepared.biomass_sustained_mw()) * biomass_hours;
        if yield_mwh >= region.annual_load_mwh {
            covering = covering.min(cost);
        }
    }
    if covering.is_finite() {
        covering
    } else if cheapest.is_finite() {
        cheapest
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
struct Evaluated {
    candidate: CapacityCandidate,
    simulation: SimulationResult,
    score: Score,
}

/// Per-worker accumulator.
struct Partial {
    top: TopK<Evaluated>,
    evaluated: usize,
    feasible: usize,
    pruned: usize,
    failed: usize,
    skipped: usize,
    best_reliability: f64,
}

impl Partial {
    fn new(capacity: usize) -> Self {
        Self {
            top: TopK::new(capacity),
            evaluated: 0,
            feasible: 0,
            pruned: 0,
            failed: 0,
            skipped: 0,
            best_reliability: f64::NEG_INFINITY,
        }
    }

    fn merge(self, other: Partial) -> Partial {
        Partial {
            top: self.top.merge(other.top),
            evaluated: self.evaluated + other.evaluated,
            feasible: self.feasible + other.feasible,
            pruned: self.pruned + other.pruned,
            failed: self.failed + other.failed,
            skipped: self.skipped + other.skipped,
            best_reliability: self.best_reliability.max(other.best_reliability),
        }
    }
}

/// Read-only state shared by every worker of one search.
struct Evaluator<'a> {
    grid: &'a CandidateGrid,
    simulator: Simulator<'a>,
    scorer: Scorer<'a>,
    cost_model: CostModel,
    region: &'a Region,
    prepared: &'a PreparedSeries,
    prune: bool,
    tracker: &'a ProgressTracker<'a>,
    cancel: &'a CancelToken,
    capacity: usize,
}

impl Evaluator<'_> {
    fn run_sequential(&self) -> Partial {
        (0..self.grid.len()).fold(Partial::new(self.capacity), |acc, i| self.step(acc, i))
    }

    fn run_parallel(&self) -> Partial {
        (0..self.grid.len())
            .into_par_iter()
            .fold(|| Partial::new(self.capacity), |acc, i| self.step(acc, i))
            .reduce(|| Partial::new(self.capacity), Partial::merge)
    }

    fn step(&self, mut acc: Partial, index: usize) -> Partial {
        if self.cancel.is_cancelled() {
            acc.skipped += 1;
        } else {
            self.evaluate(index, &mut acc);
        }
        acc
    }

    fn evaluate(&self, index: usize, acc: &mut Partial) {
        let candidate = self.grid.candidate(index);
        if self.prune && self.outside_ratio_bands(&candidate) {
            acc.pruned += 1;
            self.tracker.candidate_done(None);
            return;
        }

        let simulation = match self.simulator.run(&candidate) {
            Ok(simulation) => simulation,
            Err(e) => {
                debug!(index, error = %e, "candidate skipped");
                acc.failed += 1;
                self.tracker.candidate_done(None);
                return;
            }
        };
        acc.evaluated += 1;
        acc.best_reliability = acc.best_reliability.max(simulation.reliability);
        if !simulation.feasible {
            self.tracker.candidate_done(None);
            return;
        }

        acc.feasible += 1;
        let cost = self.cost_model.estimate_capex(&candidate);
        let score = self.scorer.score(&candidate, &simulation, cost);
        acc.top.offer(Ranked {
            score: score.total,
            cost,
            index,
            item: Evaluated {
                candidate,
                simulation,
                score,
            },
        });
        self.tracker.candidate_done(Some(cost));
    }

    /// Energy ratios from per-MW yields, checked against every band.
    fn outside_ratio_bands(&self, c: &CapacityCandidate) -> bool {
        let load = self.prepared.total_load_mwh();
        if load <= 0.0 {
            return false;
        }
        let p = self.prepared;
        let wind = c.wind_mw * p.wind_full_load_hours() / load;
        let solar = c.solar_mw * p.solar_full_load_hours() / load;
        let biomass = c.biomass_mw.min(p.biomass_sustained_mw()) * p.biomass_operating_hours() as f64
            / load;
        let bands = &self.region.ratio_constraints;
        !(bands.wind.contains(wind)
            && bands.solar.contains(solar)
            && bands.biomass.contains(biomass)
            && bands.total.contains(wind + solar + biomass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::range::AxisRange;

    fn ranges() -> SearchRanges {
        SearchRanges {
            wind: AxisRange::new(0.0, 2.0, 3),
            solar: AxisRange::new(0.0, 1.0, 3),
            biomass: AxisRange::new(0.0, 0.0, 3),
            battery: AxisRange::new(1.0, 2.0, 3),
        }
    }

    #[test]
    fn grid_index_is_wind_outer_battery_inner() {
        let grid = CandidateGrid::new(&ranges());
        assert_eq!(grid.len(), 3 * 3 * 1 * 3);
        assert_eq!(grid.candidate(0), CapacityCandidate::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(grid.candidate(1), CapacityCandidate::new(0.0, 0.0, 0.0, 1.5));
        assert_eq!(grid.candidate(3), CapacityCandidate::new(0.0, 0.5, 0.0, 1.0));
        assert_eq!(grid.candidate(26), CapacityCandidate::new(2.0, 1.0, 0.0, 2.0));
    }

    #[test]
    fn grid_iter_visits_every_point_once() {
        let grid = CandidateGrid::new(&ranges());
        let all: Vec<_> = grid.iter().collect();
        assert_eq!(all.len(), grid.len());
        for (i, a) in all.iter().enumerate() {
            assert!(all[i + 1..].iter().all(|b| b != a));
        }
    }
}
