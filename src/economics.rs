//! Capital cost estimation and levelised cost of energy.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::selection::{EquipmentPlan, EquipmentSelector, Technology};
use crate::sim::kpi::SimulationResult;
use crate::sim::types::CapacityCandidate;

/// Financial assumptions for annualising capex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicParams {
    pub discount_rate: f64,
    pub lifetime_years: u32,
    /// Annual O&M as a fraction of wind capex.
    pub om_wind: f64,
    pub om_solar: f64,
    pub om_storage: f64,
    pub om_biomass: f64,
    /// Delivered feedstock price ($/t).
    pub fuel_cost_per_t: f64,
}

impl Default for EconomicParams {
    fn default() -> Self {
        Self {
            discount_rate: 0.06,
            lifetime_years: 20,
            om_wind: 0.02,
            om_solar: 0.015,
            om_storage: 0.025,
            om_biomass: 0.04,
            fuel_cost_per_t: 30.0,
        }
    }
}

impl EconomicParams {
    pub fn validate(&self) -> Vec<(&'static str, String)> {
        let mut errors = Vec::new();
        if !(0.0..1.0).contains(&self.discount_rate) {
            errors.push(("discount_rate", "must be in [0, 1)".to_string()));
        }
        if self.lifetime_years == 0 {
            errors.push(("lifetime_years", "must be > 0".to_string()));
        }
        for (name, v) in [
            ("om_wind", self.om_wind),
            ("om_solar", self.om_solar),
            ("om_storage", self.om_storage),
            ("om_biomass", self.om_biomass),
            ("fuel_cost_per_t", self.fuel_cost_per_t),
        ] {
            if !v.is_finite() || v < 0.0 {
                errors.push((name, format!("must be >= 0, got {v}")));
            }
        }
        errors
    }

    /// `r(1+r)^n / ((1+r)^n − 1)`, or `1/n` at a zero rate.
    pub fn capital_recovery_factor(&self) -> f64 {
        let n = self.lifetime_years.max(1) as i32;
        let r = self.discount_rate;
        if r.abs() < 1e-12 {
            return 1.0 / n as f64;
        }
        let growth = (1.0 + r).powi(n);
        r * growth / (growth - 1.0)
    }

    fn om_fraction(&self, technology: Technology) -> f64 {
        match technology {
            Technology::Wind => self.om_wind,
            Technology::Solar => self.om_solar,
            Technology::Storage => self.om_storage,
            Technology::Biomass => self.om_biomass,
        }
    }
}

/// Linear capex per unit of capacity, derived from reference catalog items.
///
/// Used to rank candidates before any equipment is selected; the final
/// solution cost is the price of the actual equipment plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostModel {
    pub wind_per_mw: f64,
    /// Panels plus inverters at the selector's load ratio.
    pub solar_per_mw: f64,
    /// Cells plus PCS at the selector's target duration.
    pub storage_per_mwh: f64,
    /// Primary plus secondary conversion unit.
    pub biomass_per_mw: f64,
}

impl CostModel {
    pub fn from_selector(selector: &EquipmentSelector<'_>) -> Self {
        let turbine = selector.reference_turbine();
        let wind_per_mw = per_unit(turbine);

        let solar_per_mw = largest_per_unit(selector.panels())
            + largest_per_unit(selector.inverters()) * selector.inverter_load_ratio();

        let pcs_per_mwh = if selector.battery_duration_h() > 0.0 {
            largest_per_unit(selector.pcs_units()) / selector.battery_duration_h()
        } else {
            0.0
        };
        let storage_per_mwh = largest_per_unit(selector.batteries()) + pcs_per_mwh;

        let biomass_per_mw = largest_per_unit(selector.biomass_primary())
            + largest_per_unit(selector.biomass_secondary());

        Self {
            wind_per_mw,
            solar_per_mw,
            storage_per_mwh,
            biomass_per_mw,
        }
    }

    pub fn estimate_capex(&self, candidate: &CapacityCandidate) -> f64 {
        candidate.wind_mw * self.wind_per_mw
            + candidate.solar_mw * self.solar_per_mw
            + candidate.battery_mwh * self.storage_per_mwh
            + candidate.biomass_mw * self.biomass_per_mw
    }
}

fn per_unit<T: CatalogItem + ?Sized>(item: &T) -> f64 {
    let capacity = item.unit_capacity();
    if capacity > 0.0 {
        item.unit_price() / capacity
    } else {
        0.0
    }
}

/// Price per unit of capacity of the largest model; zero for an empty list.
fn largest_per_unit<T: CatalogItem>(items: &[&T]) -> f64 {
    items
        .iter()
        .max_by(|a, b| a.unit_capacity().total_cmp(&b.unit_capacity()))
        .map(|item| per_unit(*item))
        .unwrap_or(0.0)
}

/// Annualised cost picture of a solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Economics {
    pub capex: f64,
    pub annualized_capex: f64,
    pub annual_om: f64,
    pub annual_fuel_cost: f64,
    /// $/MWh of served load; `None` when nothing was served.
    pub lcoe: Option<f64>,
}

impl Economics {
    /// Evaluates a plan against its simulated year.
    ///
    /// `feedstock_t` is the annual biomass consumption in tonnes.
    pub fn evaluate(
        plan: &EquipmentPlan,
        simulation: &SimulationResult,
        feedstock_t: f64,
        params: &EconomicParams,
    ) -> Self {
        let capex = plan.total_price();
        let annualized_capex = capex * params.capital_recovery_factor();
        let annual_om = [
            Technology::Wind,
            Technology::Solar,
            Technology::Storage,
            Technology::Biomass,
        ]
        .into_iter()
        .map(|t| plan.technology_price(t) * params.om_fraction(t))
        .sum();
        let annual_fuel_cost = feedstock_t.max(0.0) * params.fuel_cost_per_t;

        let served = simulation.total_load_mwh - simulation.unmet_mwh;
        let annual_cost = annualized_capex + annual_om + annual_fuel_cost;
        let lcoe = (served > 0.0).then(|| annual_cost / served);

        Self {
            capex,
            annualized_capex,
            annual_om,
            annual_fuel_cost,
            lcoe,
        }
    }
}
