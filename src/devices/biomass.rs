//! Dispatchable biomass plant.
//!
//! Output does not depend on weather: the plant runs at a flat rate during a
//! fixed daily operating window sized from its annual run hours, and the rate
//! is capped by what the region's daily feedstock can sustain.

use crate::devices::types::{Generator, HourContext, non_negative};
use crate::region::{BiomassRoute, FeedstockType, Region};

/// Seconds per hour, converting MJ to MWh.
const MJ_PER_MWH: f64 = 3600.0;

#[derive(Debug, Clone)]
pub struct BiomassPlant {
    pub route: BiomassRoute,
    pub feedstock: FeedstockType,
    /// Hours per day the plant runs.
    pub daily_run_hours: usize,
    /// Electrical output the daily feedstock supports over the run window (MW).
    pub sustained_mw: f64,
}

impl BiomassPlant {
    /// Plant for a region's feedstock on the given route.
    pub fn new(region: &Region, route: BiomassRoute, annual_run_hours: f64) -> Self {
        let daily_run_hours = daily_run_hours(annual_run_hours);
        Self {
            route,
            feedstock: region.feedstock,
            daily_run_hours,
            sustained_mw: sustained_rate_mw(
                region.daily_biomass_t,
                region.feedstock,
                route,
                daily_run_hours,
            ),
        }
    }

    /// Rate `daily_t` tonnes of this plant's feedstock sustain over the run window (MW).
    pub fn rate_for_feedstock_mw(&self, daily_t: f64) -> f64 {
        sustained_rate_mw(daily_t, self.feedstock, self.route, self.daily_run_hours)
    }

    /// Whether the plant runs during this hour of the year.
    ///
    /// The window covers the last `daily_run_hours` of each day, leaving the
    /// outage in the early-morning demand trough.
    pub fn is_operating(&self, hour: usize) -> bool {
        hour % 24 >= 24 - self.daily_run_hours
    }

    /// Feedstock consumed (tonnes) to generate `energy_mwh`.
    pub fn feedstock_for_energy_t(&self, energy_mwh: f64) -> f64 {
        let mj_per_t =
            self.feedstock.lower_heating_value_mj_per_kg() * 1000.0 * self.route.conversion_efficiency();
        if mj_per_t <= 0.0 {
            return 0.0;
        }
        energy_mwh * MJ_PER_MWH / mj_per_t
    }
}

impl Generator for BiomassPlant {
    fn power_mw(&self, installed_mw: f64, context: &HourContext<'_>) -> f64 {
        if !self.is_operating(context.hour) {
            return 0.0;
        }
        non_negative(installed_mw).min(self.sustained_mw)
    }

    fn source_type(&self) -> &'static str {
        "Biomass"
    }
}

/// `round(annual / 365)`, kept within a day.
pub fn daily_run_hours(annual_run_hours: f64) -> usize {
    let h = non_negative(annual_run_hours / 365.0).round();
    (h as usize).min(24)
}

/// `mass_t · 1000 · LHV · η / 3600 / daily_run_hours`, in MW.
///
/// Zero when there is no feedstock or no run window.
pub fn sustained_rate_mw(
    daily_mass_t: f64,
    feedstock: FeedstockType,
    route: BiomassRoute,
    daily_run_hours: usize,
) -> f64 {
    if daily_run_hours == 0 {
        return 0.0;
    }
    let mj_per_day = non_negative(daily_mass_t)
        * 1000.0
        * feedstock.lower_heating_value_mj_per_kg()
        * route.conversion_efficiency();
    mj_per_day / MJ_PER_MWH / daily_run_hours as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionType;
    use crate::resource::ResourceSample;

    fn region(mass: f64) -> Region {
        Region::new("bio", RegionType::Agricultural, 100_000.0, 20.0, mass)
    }

    #[test]
    fn seven_thousand_hours_is_nineteen_per_day() {
        assert_eq!(daily_run_hours(7000.0), 19);
        assert_eq!(daily_run_hours(8760.0), 24);
        assert_eq!(daily_run_hours(0.0), 0);
        assert_eq!(daily_run_hours(-5.0), 0);
    }

    #[test]
    fn sustained_rate_for_crop_residue() {
        // 80 t/d × 15 MJ/kg × 0.25 = 300,000 MJ = 83.33 MWh over 19 h
        let rate = sustained_rate_mw(80.0, FeedstockType::CropResidue, BiomassRoute::DirectCombustion, 19);
        assert!((rate - 83.333_333 / 19.0).abs() < 1e-4);
    }

    #[test]
    fn output_capped_by_feedstock() {
        let plant = BiomassPlant::new(&region(80.0), BiomassRoute::DirectCombustion, 7000.0);
        let s = ResourceSample::default();
        let ctx = HourContext::new(12, &s);
        assert!((plant.power_mw(100.0, &ctx) - plant.sustained_mw).abs() < 1e-12);
        assert_eq!(plant.power_mw(1.0, &ctx), 1.0);
    }

    #[test]
    fn outage_in_early_morning() {
        let plant = BiomassPlant::new(&region(80.0), BiomassRoute::DirectCombustion, 7000.0);
        let operating = (0..24).filter(|&h| plant.is_operating(h)).count();
        assert_eq!(operating, 19);
        assert!(!plant.is_operating(0));
        assert!(!plant.is_operating(4));
        assert!(plant.is_operating(5));
        assert!(plant.is_operating(23));
    }

    #[test]
    fn no_feedstock_no_output() {
        let plant = BiomassPlant::new(&region(0.0), BiomassRoute::Gasification, 7000.0);
        let s = ResourceSample::default();
        assert_eq!(plant.power_mw(10.0, &HourContext::new(20, &s)), 0.0);
    }

    #[test]
    fn delivered_feedstock_sets_rate() {
        let plant = BiomassPlant::new(&region(80.0), BiomassRoute::DirectCombustion, 7000.0);
        assert!((plant.rate_for_feedstock_mw(80.0) - plant.sustained_mw).abs() < 1e-12);
        assert!((plant.rate_for_feedstock_mw(40.0) - plant.sustained_mw / 2.0).abs() < 1e-12);
        assert_eq!(plant.rate_for_feedstock_mw(0.0), 0.0);
    }

    #[test]
    fn feedstock_accounting_inverts_rate() {
        let plant = BiomassPlant::new(&region(80.0), BiomassRoute::DirectCombustion, 7000.0);
        let daily_energy = plant.sustained_mw * plant.daily_run_hours as f64;
        assert!((plant.feedstock_for_energy_t(daily_energy) - 80.0).abs() < 1e-9);
    }
}
