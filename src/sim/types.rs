//! Core simulation types: dispatch policy, candidates, and per-hour records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating parameters for the dispatch simulation and the power models.
///
/// One policy is shared by every candidate of a search so that results are
/// comparable.
///
/// # Examples
///
/// ```
/// use hybrid_sizer::sim::types::DispatchPolicy;
///
/// let policy = DispatchPolicy::default();
/// assert_eq!(policy.initial_soc, 0.5);
/// assert!(policy.validate().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchPolicy {
    /// Starting state of charge as a fraction of capacity.
    pub initial_soc: f64,
    /// Lowest allowed state of charge (fraction).
    pub soc_min: f64,
    /// Highest allowed state of charge (fraction).
    pub soc_max: f64,
    /// Charging efficiency (0..1.0).
    pub eta_charge: f64,
    /// Discharging efficiency (0..1.0).
    pub eta_discharge: f64,
    /// Charge/discharge power per MWh of capacity (1/h).
    pub c_rate: f64,
    /// Minimum reliability for a candidate to be feasible.
    pub feasibility_threshold: f64,
    /// PV inverter efficiency.
    pub inverter_efficiency: f64,
    /// Combined PV system losses.
    pub loss_factor: f64,
    /// PV power temperature coefficient (per °C).
    pub temp_coefficient: f64,
    /// Annual operating hours of the biomass plant.
    pub biomass_run_hours: f64,
    /// Air density for physical wind curves (kg/m³).
    pub air_density: f64,
    /// η1: gearbox / drivetrain efficiency.
    pub drivetrain_efficiency: f64,
    /// η2: generator efficiency.
    pub generator_efficiency: f64,
    /// η3: power converter efficiency.
    pub converter_efficiency: f64,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            initial_soc: 0.5,
            soc_min: 0.10,
            soc_max: 0.90,
            eta_charge: 0.95,
            eta_discharge: 0.95,
            c_rate: 1.0 / 3.0,
            feasibility_threshold: 0.98,
            inverter_efficiency: 0.97,
            loss_factor: 0.90,
            temp_coefficient: -0.004,
            biomass_run_hours: 7000.0,
            air_density: 1.225,
            drivetrain_efficiency: 0.92,
            generator_efficiency: 0.95,
            converter_efficiency: 0.95,
        }
    }
}

impl DispatchPolicy {
    /// Returns `(field, message)` for every out-of-range parameter.
    pub fn validate(&self) -> Vec<(&'static str, String)> {
        let mut errors = Vec::new();
        let unit = |v: f64| (0.0..=1.0).contains(&v);
        let positive_unit = |v: f64| v > 0.0 && v <= 1.0;

        if !(unit(self.soc_min) && unit(self.soc_max) && self.soc_min <= self.soc_max) {
            errors.push(("soc_min", "need 0 <= soc_min <= soc_max <= 1".to_string()));
        }
        if !(self.soc_min..=self.soc_max).contains(&self.initial_soc) {
            errors.push(("initial_soc", "must lie within [soc_min, soc_max]".to_string()));
        }
        for (name, v) in [
            ("eta_charge", self.eta_charge),
            ("eta_discharge", self.eta_discharge),
            ("inverter_efficiency", self.inverter_efficiency),
            ("loss_factor", self.loss_factor),
            ("drivetrain_efficiency", self.drivetrain_efficiency),
            ("generator_efficiency", self.generator_efficiency),
            ("converter_efficiency", self.converter_efficiency),
        ] {
            if !positive_unit(v) {
                errors.push((name, format!("must be in (0, 1], got {v}")));
            }
        }
        if self.c_rate <= 0.0 || !self.c_rate.is_finite() {
            errors.push(("c_rate", "must be > 0".to_string()));
        }
        if !unit(self.feasibility_threshold) {
            errors.push(("feasibility_threshold", "must be in [0, 1]".to_string()));
        }
        if !(0.0..=8760.0).contains(&self.biomass_run_hours) {
            errors.push(("biomass_run_hours", "must be in [0, 8760]".to_string()));
        }
        if self.air_density <= 0.0 || !self.air_density.is_finite() {
            errors.push(("air_density", "must be > 0".to_string()));
        }
        errors
    }
}

/// Capacities of one point in the search space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CapacityCandidate {
    pub wind_mw: f64,
    pub solar_mw: f64,
    pub biomass_mw: f64,
    pub battery_mwh: f64,
}

impl CapacityCandidate {
    pub fn new(wind_mw: f64, solar_mw: f64, biomass_mw: f64, battery_mwh: f64) -> Self {
        Self {
            wind_mw,
            solar_mw,
            biomass_mw,
            battery_mwh,
        }
    }

    /// True when every capacity is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.wind_mw, self.solar_mw, self.biomass_mw, self.battery_mwh]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Installed generation capacity (MW), excluding storage.
    pub fn generation_mw(&self) -> f64 {
        self.wind_mw + self.solar_mw + self.biomass_mw
    }
}

impl fmt::Display for CapacityCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wind {:.1} MW, solar {:.1} MW, biomass {:.2} MW, battery {:.1} MWh",
            self.wind_mw, self.solar_mw, self.biomass_mw, self.battery_mwh
        )
    }
}

/// Annual source energy divided by annual load.
///
/// `total` is always the sum of the three source ratios.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyRatio {
    pub wind: f64,
    pub solar: f64,
    pub biomass: f64,
    pub total: f64,
}

impl EnergyRatio {
    pub fn new(wind: f64, solar: f64, biomass: f64) -> Self {
        Self {
            wind,
            solar,
            biomass,
            total: wind + solar + biomass,
        }
    }
}

/// Complete record of one simulated hour. All energies in MWh.
#[derive(Debug, Clone, PartialEq)]
pub struct HourRecord {
    pub hour: usize,
    pub load: f64,
    pub wind: f64,
    pub solar: f64,
    pub biomass: f64,
    /// Energy taken from the bus into storage.
    pub charged: f64,
    /// Energy delivered from storage to the bus.
    pub discharged: f64,
    /// Demand left unserved (LPS).
    pub unmet: f64,
    /// Surplus generation discarded.
    pub curtailed: f64,
    /// Stored energy after this hour.
    pub soc_mwh: f64,
}

impl HourRecord {
    pub fn generation(&self) -> f64 {
        self.wind + self.solar + self.biomass
    }
}

impl fmt::Display for HourRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "h={:>4} | load={:>7.2}  gen={:>7.2} (w={:.2} s={:.2} b={:.2}) | \
             chg={:.2} dis={:.2} soc={:.2} | unmet={:.2} curt={:.2}",
            self.hour,
            self.load,
            self.generation(),
            self.wind,
            self.solar,
            self.biomass,
            self.charged,
            self.discharged,
            self.soc_mwh,
            self.unmet,
            self.curtailed,
        )
    }
}
