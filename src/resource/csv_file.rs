//! Hourly series read from a CSV file.

use std::path::Path;

use serde::Deserialize;

use super::{HourlySeries, ResourceProvider, ResourceSample};
use crate::error::{Result, SizingError};
use crate::region::Region;

/// One CSV row. The `hour` column is optional and only checked for order.
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    hour: Option<usize>,
    wind_speed: f64,
    irradiance: f64,
    temperature: f64,
    load: f64,
    #[serde(default)]
    biomass_flow: f64,
}

/// Provider backed by a measured or externally generated year.
///
/// Expected header:
/// `hour,wind_speed,irradiance,temperature,load,biomass_flow`.
#[derive(Debug, Clone)]
pub struct CsvSeriesProvider {
    series: HourlySeries,
}

impl CsvSeriesProvider {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut samples = Vec::with_capacity(super::HOURS_PER_YEAR);
        for (i, row) in reader.deserialize::<Row>().enumerate() {
            let row = row?;
            if let Some(hour) = row.hour.filter(|&h| h != i) {
                return Err(SizingError::InvalidSeries(format!(
                    "row {i} is labelled hour {hour}"
                )));
            }
            samples.push(ResourceSample {
                wind_speed: row.wind_speed,
                irradiance: row.irradiance,
                temperature: row.temperature,
                load: row.load,
                biomass_flow: row.biomass_flow,
            });
        }
        Ok(Self {
            series: HourlySeries::new(samples)?,
        })
    }

    pub fn series_ref(&self) -> &HourlySeries {
        &self.series
    }
}

impl ResourceProvider for CsvSeriesProvider {
    fn sample(&self, _region: &Region, hour: usize) -> ResourceSample {
        self.series.get(hour).copied().unwrap_or_default()
    }

    fn series(&self, _region: &Region) -> Result<HourlySeries> {
        Ok(self.series.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::HOURS_PER_YEAR;
    use std::fmt::Write as _;

    fn csv_text(rows: usize) -> String {
        let mut s = String::from("hour,wind_speed,irradiance,temperature,load,biomass_flow\n");
        for h in 0..rows {
            let irr = if (6..18).contains(&(h % 24)) { 0.6 } else { 0.0 };
            let _ = writeln!(s, "{h},7.5,{irr},15.0,10.0,1.5");
        }
        s
    }

    #[test]
    fn reads_full_year() {
        let text = csv_text(HOURS_PER_YEAR);
        let provider = CsvSeriesProvider::from_reader(csv::Reader::from_reader(text.as_bytes()));
        let provider = provider.unwrap();
        assert_eq!(provider.series_ref().total_load_mwh(), 10.0 * HOURS_PER_YEAR as f64);
    }

    #[test]
    fn short_file_is_invalid_series() {
        let text = csv_text(100);
        let provider = CsvSeriesProvider::from_reader(csv::Reader::from_reader(text.as_bytes()));
        assert!(matches!(provider, Err(SizingError::InvalidSeries(_))));
    }

    #[test]
    fn out_of_order_hours_rejected() {
        let mut text = csv_text(HOURS_PER_YEAR);
        text = text.replacen("\n1,", "\n7,", 1);
        let provider = CsvSeriesProvider::from_reader(csv::Reader::from_reader(text.as_bytes()));
        assert!(provider.is_err());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("year.csv");
        std::fs::write(&path, csv_text(HOURS_PER_YEAR)).expect("write csv");
        let provider = CsvSeriesProvider::from_path(&path);
        assert!(provider.is_ok());
    }
}
