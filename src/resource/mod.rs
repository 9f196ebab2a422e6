//! Hourly resource data consumed by the dispatch simulator.

mod csv_file;
pub mod profile;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};
use crate::region::Region;

pub use csv_file::CsvSeriesProvider;
pub use profile::DailyProfileProvider;

/// Hours in the simulated year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Resource and demand conditions for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSample {
    /// Hub-height wind speed (m/s).
    pub wind_speed: f64,
    /// Plane-of-array irradiance normalised to 1000 W/m², already weather adjusted.
    pub irradiance: f64,
    /// Ambient temperature (°C).
    pub temperature: f64,
    /// Electrical demand (MW, i.e. MWh over the hour).
    pub load: f64,
    /// Biomass delivered this hour (tonnes).
    pub biomass_flow: f64,
}

/// A full year of hourly samples, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    samples: Vec<ResourceSample>,
}

impl HourlySeries {
    /// Wraps exactly [`HOURS_PER_YEAR`] samples.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidSeries`] on a wrong length, a non-finite
    /// value, or a negative wind speed, irradiance, load, or biomass flow.
    pub fn new(samples: Vec<ResourceSample>) -> Result<Self> {
        if samples.len() != HOURS_PER_YEAR {
            return Err(SizingError::InvalidSeries(format!(
                "expected {HOURS_PER_YEAR} hourly samples, got {}",
                samples.len()
            )));
        }
        for (h, s) in samples.iter().enumerate() {
            let values = [s.wind_speed, s.irradiance, s.temperature, s.load, s.biomass_flow];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(SizingError::InvalidSeries(format!(
                    "hour {h}: non-finite sample"
                )));
            }
            if s.wind_speed < 0.0 || s.irradiance < 0.0 || s.load < 0.0 || s.biomass_flow < 0.0 {
                return Err(SizingError::InvalidSeries(format!(
                    "hour {h}: negative wind speed, irradiance, load, or biomass flow"
                )));
            }
        }
        Ok(Self { samples })
    }

    /// Builds a series from a per-hour function.
    pub fn from_fn(f: impl FnMut(usize) -> ResourceSample) -> Result<Self> {
        Self::new((0..HOURS_PER_YEAR).map(f).collect())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, hour: usize) -> Option<&ResourceSample> {
        self.samples.get(hour)
    }

    pub fn samples(&self) -> &[ResourceSample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceSample> {
        self.samples.iter()
    }

    pub fn total_load_mwh(&self) -> f64 {
        self.samples.iter().map(|s| s.load).sum()
    }

    pub fn peak_load_mw(&self) -> f64 {
        self.samples.iter().map(|s| s.load).fold(0.0, f64::max)
    }

    pub fn mean_wind_speed(&self) -> f64 {
        self.samples.iter().map(|s| s.wind_speed).sum::<f64>() / self.samples.len() as f64
    }

    /// Average biomass delivered per day (tonnes).
    pub fn mean_daily_biomass_t(&self) -> f64 {
        let total: f64 = self.samples.iter().map(|s| s.biomass_flow).sum();
        total / (self.samples.len() / 24) as f64
    }
}

/// Source of hourly resource conditions for a region.
///
/// Implementations must be pure: the same region and hour always give the
/// same sample.
pub trait ResourceProvider {
    /// Conditions for one hour of the year.
    fn sample(&self, region: &Region, hour: usize) -> ResourceSample;

    /// Collects the full validated year for a region.
    fn series(&self, region: &Region) -> Result<HourlySeries> {
        HourlySeries::from_fn(|h| self.sample(region, h))
    }
}
