//! Annual KPI aggregation for a dispatch run.

use std::fmt;

use serde::Serialize;

use super::types::{EnergyRatio, HourRecord};
use crate::error::{Result, SizingError};

/// Demand or surplus below this (MWh) does not count as a shortage or curtailment hour.
const HOUR_EPSILON_MWH: f64 = 1e-9;

/// Aggregate indicators of one simulated year.
///
/// Fractions (`reliability`, `curtailment_rate`) are in `[0, 1]`; energies in MWh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// `1 − Σunmet / Σload`.
    pub reliability: f64,
    /// `Σcurtailed / Σgeneration`.
    pub curtailment_rate: f64,
    pub total_generation_mwh: f64,
    pub total_load_mwh: f64,
    pub wind_generation_mwh: f64,
    pub solar_generation_mwh: f64,
    pub biomass_generation_mwh: f64,
    pub energy_ratio: EnergyRatio,
    pub shortage_hours: usize,
    pub curtailment_hours: usize,
    pub min_soc_mwh: f64,
    pub max_soc_mwh: f64,
    pub charged_mwh: f64,
    pub discharged_mwh: f64,
    pub unmet_mwh: f64,
    pub curtailed_mwh: f64,
    pub battery_capacity_mwh: f64,
    pub feasible: bool,
}

impl SimulationResult {
    /// Aggregates a complete trace after the fact.
    pub fn from_records(
        records: &[HourRecord],
        battery_capacity_mwh: f64,
        feasibility_threshold: f64,
    ) -> Result<Self> {
        let mut totals = DispatchTotals::default();
        for r in records {
            totals.record(r);
        }
        totals.finish(battery_capacity_mwh, feasibility_threshold)
    }

    /// Loss-of-power-supply probability, `Σunmet / Σload`.
    pub fn lpsp(&self) -> f64 {
        if self.total_load_mwh > 0.0 {
            self.unmet_mwh / self.total_load_mwh
        } else {
            0.0
        }
    }

    /// Discharged energy over `capacity × 365`; zero without storage.
    pub fn ess_utilisation(&self) -> f64 {
        if self.battery_capacity_mwh > 0.0 {
            self.discharged_mwh / (self.battery_capacity_mwh * 365.0)
        } else {
            0.0
        }
    }
}

/// Streaming accumulator fed one hour at a time.
#[derive(Debug, Clone)]
pub(crate) struct DispatchTotals {
    load: f64,
    wind: f64,
    solar: f64,
    biomass: f64,
    charged: f64,
    discharged: f64,
    unmet: f64,
    curtailed: f64,
    shortage_hours: usize,
    curtailment_hours: usize,
    min_soc: f64,
    max_soc: f64,
    hours: usize,
}

impl Default for DispatchTotals {
    fn default() -> Self {
        Self {
            load: 0.0,
            wind: 0.0,
            solar: 0.0,
            biomass: 0.0,
            charged: 0.0,
            discharged: 0.0,
            unmet: 0.0,
            curtailed: 0.0,
            shortage_hours: 0,
            curtailment_hours: 0,
            min_soc: f64::INFINITY,
            max_soc: f64::NEG_INFINITY,
            hours: 0,
        }
    }
}

impl DispatchTotals {
    pub(crate) fn record(&mut self, r: &HourRecord) {
        self.load += r.load;
        self.wind += r.wind;
        self.solar += r.solar;
        self.biomass += r.biomass;
        self.charged += r.charged;
        self.discharged += r.discharged;
        self.unmet += r.unmet;
        self.curtailed += r.curtailed;
        if r.unmet > HOUR_EPSILON_MWH {
            self.shortage_hours += 1;
        }
        if r.curtailed > HOUR_EPSILON_MWH {
            self.curtailment_hours += 1;
        }
        self.min_soc = self.min_soc.min(r.soc_mwh);
        self.max_soc = self.max_soc.max(r.soc_mwh);
        self.hours += 1;
    }

    /// Terminal aggregation; fails if any total went non-finite.
    pub(crate) fn finish(
        self,
        battery_capacity_mwh: f64,
        feasibility_threshold: f64,
    ) -> Result<SimulationResult> {
        let generation = self.wind + self.solar + self.biomass;
        let sums = [
            self.load,
            generation,
            self.charged,
            self.discharged,
            self.unmet,
            self.curtailed,
        ];
        if sums.iter().any(|v| !v.is_finite()) {
            return Err(SizingError::Numerical(
                "non-finite energy total in dispatch run".to_string(),
            ));
        }

        let reliability = if self.load > 0.0 {
            (1.0 - self.unmet / self.load).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let curtailment_rate = if generation > 0.0 {
            (self.curtailed / generation).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let energy_ratio = if self.load > 0.0 {
            EnergyRatio::new(
                self.wind / self.load,
                self.solar / self.load,
                self.biomass / self.load,
            )
        } else {
            EnergyRatio::default()
        };
        let (min_soc, max_soc) = if self.hours > 0 {
            (self.min_soc, self.max_soc)
        } else {
            (0.0, 0.0)
        };

        Ok(SimulationResult {
            reliability,
            curtailment_rate,
            total_generation_mwh: generation,
            total_load_mwh: self.load,
            wind_generation_mwh: self.wind,
            solar_generation_mwh: self.solar,
            biomass_generation_mwh: self.biomass,
            energy_ratio,
            shortage_hours: self.shortage_hours,
            curtailment_hours: self.curtailment_hours,
            min_soc_mwh: min_soc,
            max_soc_mwh: max_soc,
            charged_mwh: self.charged,
            discharged_mwh: self.discharged,
            unmet_mwh: self.unmet,
            curtailed_mwh: self.curtailed,
            battery_capacity_mwh,
            feasible: reliability >= feasibility_threshold,
        })
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reliability:        {:.3}%", self.reliability * 100.0)?;
        writeln!(f, "Curtailment:        {:.2}%", self.curtailment_rate * 100.0)?;
        writeln!(
            f,
            "Generation:         {:.0} MWh (wind {:.0}, solar {:.0}, biomass {:.0})",
            self.total_generation_mwh,
            self.wind_generation_mwh,
            self.solar_generation_mwh,
            self.biomass_generation_mwh
        )?;
        writeln!(
            f,
            "Energy ratio:       {:.2} (wind {:.2}, solar {:.2}, biomass {:.2})",
            self.energy_ratio.total,
            self.energy_ratio.wind,
            self.energy_ratio.solar,
            self.energy_ratio.biomass
        )?;
        writeln!(f, "Shortage hours:     {}", self.shortage_hours)?;
        write!(
            f,
            "SOC range:          {:.1}..{:.1} MWh",
            self.min_soc_mwh, self.max_soc_mwh
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(load: f64, wind: f64, unmet: f64, curtailed: f64, soc: f64) -> HourRecord {
        HourRecord {
            hour: 0,
            load,
            wind,
            solar: 0.0,
            biomass: 0.0,
            charged: 0.0,
            discharged: 0.0,
            unmet,
            curtailed,
            soc_mwh: soc,
        }
    }

    #[test]
    fn reliability_from_unmet() {
        let records = vec![rec(10.0, 8.0, 2.0, 0.0, 5.0), rec(10.0, 12.0, 0.0, 2.0, 6.0)];
        let r = SimulationResult::from_records(&records, 10.0, 0.98);
        let r = r.unwrap();
        assert_eq!(r.reliability, 0.9);
        assert_eq!(r.shortage_hours, 1);
        assert_eq!(r.curtailment_rate, 0.1);
        assert!(!r.feasible);
        assert_eq!(r.min_soc_mwh, 5.0);
    }

    #[test]
    fn zero_load_is_fully_reliable() {
        let records = vec![rec(0.0, 0.0, 0.0, 0.0, 0.0); 3];
        let r = SimulationResult::from_records(&records, 0.0, 0.98).unwrap();
        assert_eq!(r.reliability, 1.0);
        assert_eq!(r.curtailment_rate, 0.0);
        assert_eq!(r.energy_ratio.total, 0.0);
    }

    #[test]
    fn nan_total_is_numerical_error() {
        let records = vec![rec(10.0, f64::NAN, 0.0, 0.0, 0.0)];
        let r = SimulationResult::from_records(&records, 0.0, 0.98);
        assert!(matches!(r, Err(SizingError::Numerical(_))));
    }

    #[test]
    fn empty_trace() {
        let r = SimulationResult::from_records(&[], 0.0, 0.98);
        assert_eq!(r.unwrap().max_soc_mwh, 0.0);
    }
}
