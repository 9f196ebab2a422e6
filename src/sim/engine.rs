//! Hour-by-hour dispatch of one capacity candidate against a prepared year.

use crate::catalog::WindTurbineModel;
use crate::devices::{BatteryBank, BiomassPlant, Generator, HourContext, SolarArray, WindPowerCurve};
use crate::error::{Result, SizingError};
use crate::region::{BiomassRoute, Region};
use crate::resource::HourlySeries;

use super::kpi::{DispatchTotals, SimulationResult};
use super::types::{CapacityCandidate, DispatchPolicy, HourRecord};

/// Per-hour output of one MW of each technology, computed once per search.
///
/// Wind and solar scale linearly with installed capacity. Biomass does not
/// (it is capped by feedstock), so only its operating window and the rate
/// each day's delivered feedstock sustains are kept.
#[derive(Debug, Clone)]
pub struct PreparedSeries {
    load_mw: Vec<f64>,
    wind_cf: Vec<f64>,
    solar_cf: Vec<f64>,
    biomass_on: Vec<bool>,
    /// Per-day cap from the tonnes the series delivers that day (MW).
    biomass_daily_mw: Vec<f64>,
    biomass_sustained_mw: f64,
    total_load_mwh: f64,
}

impl PreparedSeries {
    /// Evaluates the power models over every hour of `series`.
    pub fn prepare(
        series: &HourlySeries,
        region: &Region,
        turbine: &WindTurbineModel,
        route: BiomassRoute,
        policy: &DispatchPolicy,
    ) -> Self {
        let wind = WindPowerCurve::from_model(turbine, policy);
        let solar = SolarArray::new(policy);
        let biomass = BiomassPlant::new(region, route, policy.biomass_run_hours);

        let n = series.len();
        let mut load_mw = Vec::with_capacity(n);
        let mut wind_cf = Vec::with_capacity(n);
        let mut solar_cf = Vec::with_capacity(n);
        let mut biomass_on = Vec::with_capacity(n);

        for (hour, sample) in series.iter().enumerate() {
            let ctx = HourContext::new(hour, sample);
            load_mw.push(sample.load);
            wind_cf.push(wind.power_mw(1.0, &ctx));
            solar_cf.push(solar.power_mw(1.0, &ctx));
            biomass_on.push(biomass.is_operating(hour));
        }

        let biomass_daily_mw: Vec<f64> = series
            .samples()
            .chunks(24)
            .map(|day| biomass.rate_for_feedstock_mw(day.iter().map(|s| s.biomass_flow).sum()))
            .collect();

        Self {
            total_load_mwh: load_mw.iter().sum(),
            load_mw,
            wind_cf,
            solar_cf,
            biomass_on,
            biomass_sustained_mw: biomass.rate_for_feedstock_mw(series.mean_daily_biomass_t()),
            biomass_daily_mw,
        }
    }

    pub fn hours(&self) -> usize {
        self.load_mw.len()
    }

    pub fn total_load_mwh(&self) -> f64 {
        self.total_load_mwh
    }

    /// Sustained biomass rate the series' average daily feedstock supports (MW).
    pub fn biomass_sustained_mw(&self) -> f64 {
        self.biomass_sustained_mw
    }

    /// Annual wind yield per installed MW (equivalent full-load hours).
    pub fn wind_full_load_hours(&self) -> f64 {
        self.wind_cf.iter().sum()
    }

    /// Annual solar yield per installed MW (equivalent full-load hours).
    pub fn solar_full_load_hours(&self) -> f64 {
        self.solar_cf.iter().sum()
    }

    /// Hours per year the biomass plant runs.
    pub fn biomass_operating_hours(&self) -> usize {
        self.biomass_on.iter().filter(|&&on| on).count()
    }
}

/// Runs the battery state machine for a candidate over a prepared year.
///
/// Holds only shared references, so one simulator can serve many threads.
pub struct Simulator<'a> {
    prepared: &'a PreparedSeries,
    policy: &'a DispatchPolicy,
}

impl<'a> Simulator<'a> {
    pub fn new(prepared: &'a PreparedSeries, policy: &'a DispatchPolicy) -> Self {
        Self { prepared, policy }
    }

    /// Simulates the year and returns its aggregate indicators.
    ///
    /// # Errors
    ///
    /// [`SizingError::Numerical`] for a negative or non-finite candidate, or
    /// when any energy total becomes non-finite.
    pub fn run(&self, candidate: &CapacityCandidate) -> Result<SimulationResult> {
        let mut totals = DispatchTotals::default();
        self.dispatch(candidate, |record| totals.record(&record))?;
        totals.finish(candidate.battery_mwh, self.policy.feasibility_threshold)
    }

    /// Simulates the year and returns every hourly record.
    pub fn trace(&self, candidate: &CapacityCandidate) -> Result<Vec<HourRecord>> {
        let mut records = Vec::with_capacity(self.prepared.hours());
        self.dispatch(candidate, |record| records.push(record))?;
        Ok(records)
    }

    fn dispatch(
        &self,
        candidate: &CapacityCandidate,
        mut sink: impl FnMut(HourRecord),
    ) -> Result<()> {
        if !candidate.is_valid() {
            return Err(SizingError::Numerical(format!(
                "invalid candidate capacities: {candidate}"
            )));
        }

        let p = self.prepared;
        let mut battery = BatteryBank::new(candidate.battery_mwh, self.policy);

        for hour in 0..p.hours() {
            let load = p.load_mw[hour];
            let wind = candidate.wind_mw * p.wind_cf[hour];
            let solar = candidate.solar_mw * p.solar_cf[hour];
            let biomass = if p.biomass_on[hour] {
                candidate.biomass_mw.min(p.biomass_daily_mw[hour / 24])
            } else {
                0.0
            };
            let net = wind + solar + biomass - load;

            let (mut charged, mut discharged, mut unmet, mut curtailed) = (0.0, 0.0, 0.0, 0.0);
            if net < 0.0 {
                discharged = battery.discharge(-net);
                unmet = (-net - discharged).max(0.0);
            } else if net > 0.0 {
                charged = battery.charge(net);
                curtailed = (net - charged).max(0.0);
            }

            sink(HourRecord {
                hour,
                load,
                wind,
                solar,
                biomass,
                charged,
                discharged,
                unmet,
                curtailed,
                soc_mwh: battery.soc_mwh,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EquipmentCatalog;
    use crate::region::RegionType;
    use crate::resource::{HOURS_PER_YEAR, ResourceSample};

    fn region() -> Region {
        Region::new("sim", RegionType::Test, 87_600.0, 10.0, 40.0)
    }

    fn series_with_feedstock(wind_speed: f64, load: f64, daily_t: impl Fn(usize) -> f64) -> HourlySeries {
        HourlySeries::from_fn(|h| ResourceSample {
            wind_speed,
            irradiance: if (7..17).contains(&(h % 24)) { 0.8 } else { 0.0 },
            temperature: 15.0,
            load,
            biomass_flow: daily_t(h / 24) / 24.0,
        })
        .unwrap()
    }

    fn series(wind_speed: f64, load: f64) -> HourlySeries {
        series_with_feedstock(wind_speed, load, |_| region().daily_biomass_t)
    }

    fn prepare(series: &HourlySeries) -> PreparedSeries {
        let catalog = EquipmentCatalog::builtin();
        PreparedSeries::prepare(
            series,
            &region(),
            &catalog.wind_turbines[1],
            BiomassRoute::DirectCombustion,
            &DispatchPolicy::default(),
        )
    }

    fn prepared(wind_speed: f64, load: f64) -> PreparedSeries {
        prepare(&series(wind_speed, load))
    }

    #[test]
    fn full_wind_meets_flat_load() {
        let p = prepared(12.0, 10.0);
        let policy = DispatchPolicy::default();
        let sim = Simulator::new(&p, &policy);
        let r = sim.run(&CapacityCandidate::new(10.0, 0.0, 0.0, 20.0));
        let r = r.unwrap();
        assert_eq!(r.reliability, 1.0);
        assert_eq!(r.shortage_hours, 0);
        assert!((r.energy_ratio.wind - 1.0).abs() < 1e-9);
    }

    #[test]
    fn no_generation_means_battery_drains_then_shortage() {
        let p = prepared(0.0, 10.0);
        let policy = DispatchPolicy::default();
        let sim = Simulator::new(&p, &policy);
        let r = sim
            .run(&CapacityCandidate::new(0.0, 0.0, 0.0, 30.0))
            .unwrap();
        assert!(r.reliability < 0.01);
        assert_eq!(r.total_generation_mwh, 0.0);
        assert_eq!(r.curtailment_rate, 0.0);
        // 30 MWh bank drains from 15 to 3 MWh
        assert!((r.min_soc_mwh - 3.0).abs() < 1e-9);
        assert!((r.discharged_mwh - 12.0 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn trace_matches_run() {
        let p = prepared(7.0, 10.0);
        let policy = DispatchPolicy::default();
        let sim = Simulator::new(&p, &policy);
        let c = CapacityCandidate::new(8.0, 6.0, 1.0, 40.0);
        let trace = sim.trace(&c).unwrap();
        assert_eq!(trace.len(), HOURS_PER_YEAR);
        let post_hoc = SimulationResult::from_records(&trace, c.battery_mwh, 0.98);
        assert_eq!(post_hoc.unwrap(), sim.run(&c).unwrap());
    }

    #[test]
    fn hourly_energy_balances() {
        let p = prepared(7.0, 10.0);
        let policy = DispatchPolicy::default();
        let sim = Simulator::new(&p, &policy);
        let trace = sim
            .trace(&CapacityCandidate::new(12.0, 10.0, 2.0, 30.0))
            .unwrap();
        for r in &trace {
            let supply = r.generation() + r.discharged + r.unmet;
            let demand = r.load + r.charged + r.curtailed;
            assert!((supply - demand).abs() < 1e-9, "{r}");
            assert!(r.soc_mwh >= 0.0 && r.soc_mwh <= 30.0);
        }
    }

    #[test]
    fn negative_candidate_is_rejected() {
        let p = prepared(7.0, 10.0);
        let policy = DispatchPolicy::default();
        let sim = Simulator::new(&p, &policy);
        let r = sim.run(&CapacityCandidate::new(-1.0, 0.0, 0.0, 0.0));
        assert!(matches!(r, Err(SizingError::Numerical(_))));
    }

    #[test]
    fn biomass_capped_at_sustained_rate() {
        let p = prepared(0.0, 0.0);
        let policy = DispatchPolicy::default();
        let sim = Simulator::new(&p, &policy);
        let trace = sim
            .trace(&CapacityCandidate::new(0.0, 0.0, 100.0, 0.0))
            .unwrap();
        let peak = trace.iter().map(|r| r.biomass).fold(0.0, f64::max);
        assert!((peak - p.biomass_sustained_mw()).abs() < 1e-9);
        assert_eq!(p.biomass_operating_hours(), 19 * 365);
    }

    #[test]
    fn biomass_follows_delivered_feedstock() {
        let policy = DispatchPolicy::default();
        let candidate = CapacityCandidate::new(0.0, 0.0, 5.0, 0.0);

        let dry = prepare(&series_with_feedstock(0.0, 1.0, |_| 0.0));
        assert_eq!(dry.biomass_sustained_mw(), 0.0);
        let r = Simulator::new(&dry, &policy).run(&candidate).unwrap();
        assert_eq!(r.biomass_generation_mwh, 0.0);

        // deliveries only on even days
        let alternating = prepare(&series_with_feedstock(0.0, 1.0, |d| if d % 2 == 0 { 40.0 } else { 0.0 }));
        let full = prepared(0.0, 1.0);
        let trace = Simulator::new(&alternating, &policy).trace(&candidate).unwrap();
        let day_output = |day: usize| trace[day * 24..(day + 1) * 24].iter().map(|r| r.biomass).sum::<f64>();
        assert!(day_output(0) > 0.0);
        assert_eq!(day_output(1), 0.0);
        let cap = full.biomass_sustained_mw();
        assert!(trace.iter().all(|r| r.biomass <= cap + 1e-12));
        assert!(alternating.biomass_sustained_mw() > 0.0);
        assert!(alternating.biomass_sustained_mw() < cap);
    }
}
