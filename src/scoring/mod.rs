//! Composite candidate score.
//!
//! `total = reliability (0-30) + matching (0-20) + economics (0-30) + stability (0-20)`.
//! Out-of-band factors add human-readable issues but never disqualify a
//! candidate; only the reliability threshold decides feasibility.

pub mod matching;
pub mod stability;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::region::RatioBand as Band;
use crate::region::Region;
use crate::selection::EquipmentSelector;
use crate::sim::kpi::SimulationResult;
use crate::sim::types::{CapacityCandidate, DispatchPolicy};

pub const RELIABILITY_MAX: f64 = 30.0;
pub const ECONOMICS_MAX: f64 = 30.0;

/// Every threshold the scorer uses, overridable from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringPolicy {
    /// Reliability tiers scoring 30 / 26 / 22 / 18.
    pub reliability_tiers: [f64; 4],
    /// Reliability at which the linear tail below the last tier reaches zero.
    pub reliability_floor: f64,
    /// Cost-ratio tiers scoring 30 / 25 / 20 / 15.
    pub cost_ratio_tiers: [f64; 4],
    /// Cost ratio at which the linear tail above the last tier reaches zero.
    pub cost_ratio_ceiling: f64,
    /// Wind margin above cut-in (m/s) that earns the full matching score.
    pub cut_in_margin_ms: f64,
    pub ac_dc_band: Band,
    /// Storage hours at peak load.
    pub battery_duration_band: Band,
    pub reserve_margin_band: Band,
    pub ess_utilisation_band: Band,
    /// Diversity score below which an issue is raised.
    pub min_diversity_score: f64,
    /// Fixed best-known cost; computed from the search grid when absent.
    pub reference_cost: Option<f64>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            reliability_tiers: [0.999, 0.995, 0.99, 0.98],
            reliability_floor: 0.90,
            cost_ratio_tiers: [1.0, 1.1, 1.2, 1.5],
            cost_ratio_ceiling: 3.0,
            cut_in_margin_ms: 2.0,
            ac_dc_band: Band::new(1.0, 1.1),
            battery_duration_band: Band::new(4.0, 8.0),
            reserve_margin_band: Band::new(0.15, 0.25),
            ess_utilisation_band: Band::new(0.6, 0.8),
            min_diversity_score: 2.0,
            reference_cost: None,
        }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Vec<(&'static str, String)> {
        let mut errors = Vec::new();
        let descending = self.reliability_tiers.windows(2).all(|w| w[0] >= w[1]);
        if !descending || self.reliability_tiers.iter().any(|t| !(0.0..=1.0).contains(t)) {
            errors.push((
                "reliability_tiers",
                "must be descending values in [0, 1]".to_string(),
            ));
        }
        if self.reliability_floor >= self.reliability_tiers[3] || self.reliability_floor < 0.0 {
            errors.push((
                "reliability_floor",
                "must be in [0, lowest reliability tier)".to_string(),
            ));
        }
        let ascending = self.cost_ratio_tiers.windows(2).all(|w| w[0] <= w[1]);
        if !ascending || self.cost_ratio_tiers[0] <= 0.0 {
            errors.push((
                "cost_ratio_tiers",
                "must be ascending positive values".to_string(),
            ));
        }
        if self.cost_ratio_ceiling <= self.cost_ratio_tiers[3] {
            errors.push((
                "cost_ratio_ceiling",
                "must exceed the highest cost-ratio tier".to_string(),
            ));
        }
        for (name, band) in [
            ("ac_dc_band", &self.ac_dc_band),
            ("battery_duration_band", &self.battery_duration_band),
            ("reserve_margin_band", &self.reserve_margin_band),
            ("ess_utilisation_band", &self.ess_utilisation_band),
        ] {
            if band.min > band.max {
                errors.push((name, "min must not exceed max".to_string()));
            }
        }
        if self
            .reference_cost
            .is_some_and(|cost| !cost.is_finite() || cost <= 0.0)
        {
            errors.push(("reference_cost", "must be > 0".to_string()));
        }
        errors
    }
}

/// Step score of reliability with a linear tail below the last tier.
///
/// Non-decreasing in `reliability`.
pub fn reliability_score(reliability: f64, policy: &ScoringPolicy) -> f64 {
    let [t30, t26, t22, t18] = policy.reliability_tiers;
    if !reliability.is_finite() {
        return 0.0;
    }
    if reliability >= t30 {
        30.0
    } else if reliability >= t26 {
        26.0
    } else if reliability >= t22 {
        22.0
    } else if reliability >= t18 {
        18.0
    } else if reliability <= policy.reliability_floor {
        0.0
    } else {
        18.0 * (reliability - policy.reliability_floor) / (t18 - policy.reliability_floor)
    }
}

/// Step score of `cost / best_known_cost` with a linear tail above the last tier.
///
/// Non-increasing in `cost_ratio`.
pub fn economics_score(cost_ratio: f64, policy: &ScoringPolicy) -> f64 {
    let [t30, t25, t20, t15] = policy.cost_ratio_tiers;
    if !cost_ratio.is_finite() {
        return 0.0;
    }
    if cost_ratio <= t30 {
        30.0
    } else if cost_ratio <= t25 {
        25.0
    } else if cost_ratio <= t20 {
        20.0
    } else if cost_ratio <= t15 {
        15.0
    } else if cost_ratio >= policy.cost_ratio_ceiling {
        0.0
    } else {
        15.0 * (policy.cost_ratio_ceiling - cost_ratio) / (policy.cost_ratio_ceiling - t15)
    }
}

/// A candidate's composite score with its sub-totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub total: f64,
    pub reliability: f64,
    pub matching: f64,
    pub economics: f64,
    pub stability: f64,
    /// Estimated capex over the best-known cost.
    pub cost_ratio: f64,
    pub issues: Vec<String>,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} (reliability {:.1}, matching {:.1}, economics {:.1}, stability {:.1})",
            self.total, self.reliability, self.matching, self.economics, self.stability
        )
    }
}

/// Scores candidates of one search against a fixed best-known cost.
pub struct Scorer<'a> {
    policy: &'a ScoringPolicy,
    region: &'a Region,
    selector: &'a EquipmentSelector<'a>,
    dispatch: &'a DispatchPolicy,
    reference_cost: f64,
    biomass_sustained_mw: f64,
}

impl<'a> Scorer<'a> {
    pub fn new(
        policy: &'a ScoringPolicy,
        region: &'a Region,
        selector: &'a EquipmentSelector<'a>,
        dispatch: &'a DispatchPolicy,
        reference_cost: f64,
        biomass_sustained_mw: f64,
    ) -> Self {
        Self {
            policy,
            region,
            selector,
            dispatch,
            reference_cost,
            biomass_sustained_mw,
        }
    }

    pub fn reference_cost(&self) -> f64 {
        self.reference_cost
    }

    /// `cost / reference`; 1 when there is no positive reference.
    pub fn cost_ratio(&self, cost: f64) -> f64 {
        if self.reference_cost > 0.0 {
            cost / self.reference_cost
        } else if cost > 0.0 {
            f64::INFINITY
        } else {
            1.0
        }
    }

    pub fn score(&self, candidate: &CapacityCandidate, sim: &SimulationResult, cost: f64) -> Score {
        let mut issues = Vec::new();

        let reliability = reliability_score(sim.reliability, self.policy);
        if !sim.feasible {
            issues.push(format!(
                "reliability {:.2}% below the {:.2}% threshold",
                sim.reliability * 100.0,
                self.dispatch.feasibility_threshold * 100.0
            ));
        }

        let cost_ratio = self.cost_ratio(cost);
        let economics = economics_score(cost_ratio, self.policy);
        if cost_ratio > self.policy.cost_ratio_tiers[3] {
            issues.push(format!("cost ratio {cost_ratio:.2} above best known"));
        }

        let matching = self.matching(candidate, &mut issues);
        let stability = self.stability(candidate, sim, &mut issues);
        self.ratio_band_issues(sim, &mut issues);

        Score {
            total: reliability + matching + economics + stability,
            reliability,
            matching,
            economics,
            stability,
            cost_ratio,
            issues,
        }
    }

    fn matching(&self, candidate: &CapacityCandidate, issues: &mut Vec<String>) -> f64 {
        let p = self.policy;

        let wind = if candidate.wind_mw > 0.0 {
            let turbine = self.selector.reference_turbine();
            let s = matching::cut_in_score(self.region.avg_wind_speed, turbine.cut_in_ms, p);
            if s < matching::SUB_SCORE_MAX {
                issues.push(format!(
                    "average wind {:.1} m/s is close to {} cut-in {:.1} m/s",
                    self.region.avg_wind_speed, turbine.id, turbine.cut_in_ms
                ));
            }
            s
        } else {
            matching::SUB_SCORE_MAX
        };

        let solar = match self.selector.ac_dc_ratio(candidate.solar_mw) {
            Some(ratio) => {
                if !p.ac_dc_band.contains(ratio) {
                    issues.push(format!("inverter AC/DC ratio {ratio:.3} out of band"));
                }
                matching::ac_dc_score(ratio, &p.ac_dc_band)
            }
            None => matching::SUB_SCORE_MAX,
        };

        let storage = if candidate.battery_mwh > 0.0 && self.region.peak_load_mw > 0.0 {
            let hours = candidate.battery_mwh / self.region.peak_load_mw;
            if !p.battery_duration_band.contains(hours) {
                issues.push(format!("storage covers {hours:.1} h of peak load"));
            }
            matching::duration_score(hours, &p.battery_duration_band)
        } else {
            matching::SUB_SCORE_MAX
        };

        let biomass = if candidate.biomass_mw > 0.0 {
            let recommended = self.region.recommended_route();
            let chosen = self.selector.route();
            if chosen != recommended {
                issues.push(format!(
                    "{chosen} chosen where {recommended} suits {:?} feedstock",
                    self.region.feedstock
                ));
            }
            matching::route_score(chosen, recommended)
        } else {
            matching::SUB_SCORE_MAX
        };

        wind + solar + storage + biomass
    }

    fn stability(
        &self,
        candidate: &CapacityCandidate,
        sim: &SimulationResult,
        issues: &mut Vec<String>,
    ) -> f64 {
        let p = self.policy;

        let margin = stability::reserve_margin(
            candidate.wind_mw,
            candidate.solar_mw,
            candidate.biomass_mw.min(self.biomass_sustained_mw),
            candidate.battery_mwh * self.dispatch.c_rate,
            self.region.peak_load_mw,
        );
        if !p.reserve_margin_band.contains(margin) {
            issues.push(format!("reserve margin {:.0}% out of band", margin * 100.0));
        }
        let reserve = stability::reserve_score(margin, &p.reserve_margin_band);

        let utilisation = sim.ess_utilisation();
        if candidate.battery_mwh > 0.0 && !p.ess_utilisation_band.contains(utilisation) {
            issues.push(format!("storage utilisation {utilisation:.2} out of band"));
        }
        let ess = stability::ess_score(utilisation, &p.ess_utilisation_band);

        let diversity = stability::diversity_score(
            sim.wind_generation_mwh,
            sim.solar_generation_mwh,
            sim.biomass_generation_mwh,
        );
        if diversity < p.min_diversity_score {
            issues.push("generation mix dominated by one source".to_string());
        }

        reserve + ess + diversity
    }

    fn ratio_band_issues(&self, sim: &SimulationResult, issues: &mut Vec<String>) {
        let bands = &self.region.ratio_constraints;
        let ratio = &sim.energy_ratio;
        for (name, value, band) in [
            ("wind", ratio.wind, &bands.wind),
            ("solar", ratio.solar, &bands.solar),
            ("biomass", ratio.biomass, &bands.biomass),
            ("total", ratio.total, &bands.total),
        ] {
            if !band.contains(value) {
                issues.push(format!(
                    "{name} energy ratio {value:.2} outside [{:.2}, {:.2}]",
                    band.min, band.max
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EquipmentCatalog;
    use crate::region::RegionType;
    use crate::selection::EquipmentPreferences;
    use crate::sim::types::EnergyRatio;

    fn sim(reliability: f64) -> SimulationResult {
        SimulationResult {
            reliability,
            curtailment_rate: 0.05,
            total_generation_mwh: 120_000.0,
            total_load_mwh: 100_000.0,
            wind_generation_mwh: 50_000.0,
            solar_generation_mwh: 40_000.0,
            biomass_generation_mwh: 30_000.0,
            energy_ratio: EnergyRatio::new(0.5, 0.4, 0.3),
            shortage_hours: 10,
            curtailment_hours: 200,
            min_soc_mwh: 5.0,
            max_soc_mwh: 45.0,
            charged_mwh: 8_000.0,
            discharged_mwh: 7_000.0,
            unmet_mwh: (1.0 - reliability) * 100_000.0,
            curtailed_mwh: 6_000.0,
            battery_capacity_mwh: 50.0,
            feasible: reliability >= 0.98,
        }
    }

    #[test]
    fn reliability_tiers() {
        let p = ScoringPolicy::default();
        assert_eq!(reliability_score(1.0, &p), 30.0);
        assert_eq!(reliability_score(0.996, &p), 26.0);
        assert_eq!(reliability_score(0.991, &p), 22.0);
        assert_eq!(reliability_score(0.98, &p), 18.0);
        assert!((reliability_score(0.94, &p) - 9.0).abs() < 1e-9);
        assert_eq!(reliability_score(0.5, &p), 0.0);
        assert_eq!(reliability_score(f64::NAN, &p), 0.0);
    }

    #[test]
    fn reliability_score_is_monotonic() {
        let p = ScoringPolicy::default();
        let mut prev = 0.0;
        for i in 0..=1000 {
            let s = reliability_score(i as f64 / 1000.0, &p);
            assert!(s >= prev);
            prev = s;
        }
    }

    #[test]
    fn economics_score_is_non_increasing() {
        let p = ScoringPolicy::default();
        assert_eq!(economics_score(0.8, &p), 30.0);
        assert_eq!(economics_score(1.05, &p), 25.0);
        assert_eq!(economics_score(1.15, &p), 20.0);
        assert_eq!(economics_score(1.4, &p), 15.0);
        assert_eq!(economics_score(3.5, &p), 0.0);
        assert_eq!(economics_score(f64::INFINITY, &p), 0.0);
        let mut prev = f64::MAX;
        for i in 0..400 {
            let s = economics_score(0.5 + i as f64 * 0.01, &p);
            assert!(s <= prev);
            prev = s;
        }
    }

    #[test]
    fn default_policy_is_valid() {
        assert!(ScoringPolicy::default().validate().is_empty());
        let bad = ScoringPolicy {
            reliability_tiers: [0.98, 0.99, 0.995, 0.999],
            ..ScoringPolicy::default()
        };
        assert!(!bad.validate().is_empty());
    }

    #[test]
    fn composite_score_and_issues() {
        let catalog = EquipmentCatalog::builtin();
        let region = Region::new("s", RegionType::Industrial, 100_000.0, 15.0, 40.0);
        let selector = EquipmentSelector::new(&catalog, &EquipmentPreferences::default(), &region)
            .unwrap();
        let policy = ScoringPolicy::default();
        let dispatch = DispatchPolicy::default();
        let scorer = Scorer::new(&policy, &region, &selector, &dispatch, 1.0e8, 2.0);
        let candidate = CapacityCandidate::new(25.0, 30.0, 2.0, 60.0);

        let good = scorer.score(&candidate, &sim(0.999), 1.0e8);
        assert_eq!(good.reliability, 30.0);
        assert_eq!(good.economics, 30.0);
        let sum = good.reliability + good.matching + good.economics + good.stability;
        assert!((good.total - sum).abs() < 1e-12);
        assert!(good.matching <= 20.0 && good.stability <= 20.0);
        // wind 0.5 and solar 0.4 exceed the industrial bands
        assert!(good.issues.iter().any(|i| i.starts_with("wind energy ratio")));

        let worse = scorer.score(&candidate, &sim(0.95), 1.0e8);
        assert!(worse.total < good.total);
        assert!(worse.issues.iter().any(|i| i.starts_with("reliability")));

        let pricier = scorer.score(&candidate, &sim(0.999), 2.0e8);
        assert!(pricier.total < good.total);
    }

    #[test]
    fn zero_reference_cost_has_no_nan() {
        let catalog = EquipmentCatalog::builtin();
        let region = Region::new("s", RegionType::Test, 1_000.0, 1.0, 0.0);
        let selector = EquipmentSelector::new(&catalog, &EquipmentPreferences::default(), &region)
            .unwrap();
        let policy = ScoringPolicy::default();
        let dispatch = DispatchPolicy::default();
        let scorer = Scorer::new(&policy, &region, &selector, &dispatch, 0.0, 0.0);
        assert_eq!(scorer.cost_ratio(0.0), 1.0);
        let s = scorer.score(&CapacityCandidate::default(), &sim(0.5), 10.0);
        assert!(s.total.is_finite());
        assert_eq!(s.economics, 0.0);
    }
}
