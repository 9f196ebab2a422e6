//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use hybrid_sizer::catalog::EquipmentCatalog;
use hybrid_sizer::region::{Region, RegionType};
use hybrid_sizer::resource::{DailyProfileProvider, HourlySeries, ResourceProvider, ResourceSample};
use hybrid_sizer::search::{SearchRequest, SearchSettings};

/// Steady conditions: every hour has the same wind, irradiance, and load.
pub fn constant_series(wind_speed: f64, irradiance: f64, load: f64) -> HourlySeries {
    HourlySeries::from_fn(|_| ResourceSample {
        wind_speed,
        irradiance,
        temperature: 20.0,
        load,
        biomass_flow: 0.0,
    })
    .unwrap()
}

/// Small test region (87.6 GWh/yr, 10 MW average load, no biomass).
pub fn test_region() -> Region {
    Region::new("fixture", RegionType::Test, 87_600.0, 12.0, 0.0).with_avg_wind_speed(6.5)
}

/// Test region with 30 t/day of crop residue.
pub fn biomass_region() -> Region {
    Region::new("fixture-bio", RegionType::Test, 87_600.0, 12.0, 30.0).with_avg_wind_speed(6.5)
}

/// Synthetic year for `region` from the default daily profile.
pub fn profile_series(region: &Region) -> HourlySeries {
    DailyProfileProvider::default()
        .series(region)
        .unwrap()
}

/// A coarse-grid request over `series`.
pub fn small_request(region: Region, series: HourlySeries) -> SearchRequest {
    SearchRequest::new(region, Arc::new(series), Arc::new(EquipmentCatalog::builtin()))
        .with_settings(SearchSettings {
            max_solutions: 5,
            max_points_per_axis: 4,
            progress_interval: 8,
            ..SearchSettings::default()
        })
}

/// Windy year with a six-hour lull every day and a daytime solar bell.
pub fn varied_series() -> HourlySeries {
    HourlySeries::from_fn(|h| {
        let hour_of_day = h % 24;
        let wind_speed = if (h / 6) % 4 == 0 {
            3.0
        } else {
            11.0 + (h % 5) as f64 * 0.5
        };
        let irradiance = if (6..18).contains(&hour_of_day) {
            (std::f64::consts::PI * (hour_of_day as f64 - 5.5) / 12.0).sin()
        } else {
            0.0
        };
        let load = 10.0 + 2.0 * (std::f64::consts::PI * hour_of_day as f64 / 12.0).sin();
        ResourceSample {
            wind_speed,
            irradiance,
            temperature: 18.0,
            load,
            biomass_flow: 30.0 / 24.0,
        }
    })
    .unwrap()
}
