//! TOML-based scenario configuration with validation and presets.
//!
//! A scenario names the region to size for and overrides any of the search,
//! dispatch, scoring, economics, resource-profile and equipment settings.
//! Omitted sections and fields take their defaults.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::catalog::EquipmentCatalog;
use crate::economics::EconomicParams;
use crate::region::{FeedstockType, Region, RegionType};
use crate::resource::{DailyProfileProvider, HourlySeries};
use crate::resource::profile::ProfileSettings;
use crate::scoring::ScoringPolicy;
use crate::search::{SearchRequest, SearchSettings};
use crate::selection::EquipmentPreferences;
use crate::sim::types::DispatchPolicy;

/// Top-level scenario configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub region: RegionConfig,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub dispatch: DispatchPolicy,
    #[serde(default)]
    pub scoring: ScoringPolicy,
    #[serde(default)]
    pub economics: EconomicParams,
    #[serde(default)]
    pub profile: ProfileSettings,
    #[serde(default)]
    pub equipment: EquipmentPreferences,
}

/// The `[region]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionConfig {
    pub id: String,
    pub region_type: RegionType,
    pub annual_load_mwh: f64,
    pub peak_load_mw: f64,
    pub daily_biomass_t: f64,
    pub avg_wind_speed: f64,
    /// Defaults to the region type's usual feedstock.
    pub feedstock: Option<FeedstockType>,
    /// Defaults to `id`.
    pub series_id: Option<String>,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            id: "industrial-park".to_string(),
            region_type: RegionType::Industrial,
            annual_load_mwh: 350_400.0,
            peak_load_mw: 55.0,
            daily_biomass_t: 60.0,
            avg_wind_speed: 6.2,
            feedstock: None,
            series_id: None,
        }
    }
}

impl RegionConfig {
    pub fn to_region(&self) -> Region {
        let mut region = Region::new(
            self.id.clone(),
            self.region_type,
            self.annual_load_mwh,
            self.peak_load_mw,
            self.daily_biomass_t,
        )
        .with_avg_wind_speed(self.avg_wind_speed);
        if let Some(feedstock) = self.feedstock {
            region = region.with_feedstock(feedstock);
        }
        if let Some(series_id) = &self.series_id {
            region.series_id = series_id.clone();
        }
        region
    }
}

/// A validation error with the offending field path.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Available built-in preset names.
pub const PRESETS: &[&str] = &[
    "industrial",
    "residential",
    "agricultural",
    "forestry",
    "mountain",
    "test",
];

impl ScenarioConfig {
    fn with_region(region: RegionConfig) -> Self {
        Self {
            region,
            ..Self::default()
        }
    }

    /// Industrial park: large flat load, mixed feedstock, moderate wind.
    pub fn industrial() -> Self {
        Self::default()
    }

    /// Residential town: evening-peaking load, organic waste digestion.
    pub fn residential() -> Self {
        Self::with_region(RegionConfig {
            id: "residential-town".to_string(),
            region_type: RegionType::Residential,
            annual_load_mwh: 87_600.0,
            peak_load_mw: 18.0,
            daily_biomass_t: 20.0,
            avg_wind_speed: 5.5,
            feedstock: None,
            series_id: None,
        })
    }

    /// Agricultural county: crop residue, weak wind.
    pub fn agricultural() -> Self {
        Self::with_region(RegionConfig {
            id: "agricultural-county".to_string(),
            region_type: RegionType::Agricultural,
            annual_load_mwh: 240_900.0,
            peak_load_mw: 50.0,
            daily_biomass_t: 80.0,
            avg_wind_speed: 3.5,
            feedstock: None,
            series_id: None,
        })
    }

    /// Forestry district: abundant wood, gasification route.
    pub fn forestry() -> Self {
        Self::with_region(RegionConfig {
            id: "forestry-district".to_string(),
            region_type: RegionType::Forestry,
            annual_load_mwh: 131_400.0,
            peak_load_mw: 22.0,
            daily_biomass_t: 150.0,
            avg_wind_speed: 5.8,
            feedstock: None,
            series_id: None,
        })
    }

    /// Mountain valley: strong wind, little biomass.
    pub fn mountain() -> Self {
        Self::with_region(RegionConfig {
            id: "mountain-valley".to_string(),
            region_type: RegionType::Mountain,
            annual_load_mwh: 175_200.0,
            peak_load_mw: 30.0,
            daily_biomass_t: 30.0,
            avg_wind_speed: 7.5,
            feedstock: None,
            series_id: None,
        })
    }

    /// Small, coarse grid for smoke tests (4 points per axis).
    pub fn test() -> Self {
        Self {
            region: RegionConfig {
                id: "test-microgrid".to_string(),
                region_type: RegionType::Test,
                annual_load_mwh: 8_760.0,
                peak_load_mw: 1.5,
                daily_biomass_t: 5.0,
                avg_wind_speed: 6.0,
                feedstock: None,
                series_id: None,
            },
            search: SearchSettings {
                max_solutions: 5,
                progress_interval: 16,
                max_points_per_axis: 4,
                wind_margin: 3.0,
                solar_margin: 3.0,
                battery_max_hours: 24.0,
                ..SearchSettings::default()
            },
            dispatch: DispatchPolicy {
                feasibility_threshold: 0.95,
                ..DispatchPolicy::default()
            },
            ..Self::default()
        }
    }

    /// Loads a built-in preset by name.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "industrial" => Ok(Self::industrial()),
            "residential" => Ok(Self::residential()),
            "agricultural" => Ok(Self::agricultural()),
            "forestry" => Ok(Self::forestry()),
            "mountain" => Ok(Self::mountain()),
            "test" => Ok(Self::test()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a TOML file into a `ScenarioConfig`.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a TOML string into a `ScenarioConfig`.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields, returning every error found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |section: &str, found: Vec<(&'static str, String)>| {
            errors.extend(found.into_iter().map(|(field, message)| ConfigError {
                field: format!("{section}.{field}"),
                message,
            }));
        };

        push("region", self.validate_region());
        push("search", self.search.validate());
        push("dispatch", self.dispatch.validate());
        push("scoring", self.scoring.validate());
        push("economics", self.economics.validate());
        push("profile", self.validate_profile());
        push("equipment", self.validate_equipment());

        errors
    }

    fn validate_region(&self) -> Vec<(&'static str, String)> {
        let r = &self.region;
        let mut errors = Vec::new();
        if r.id.trim().is_empty() {
            errors.push(("id", "must not be empty".to_string()));
        }
        if !(r.peak_load_mw.is_finite() && r.peak_load_mw > 0.0) {
            errors.push(("peak_load_mw", format!("must be > 0, got {}", r.peak_load_mw)));
        }
        for (name, v) in [
            ("annual_load_mwh", r.annual_load_mwh),
            ("daily_biomass_t", r.daily_biomass_t),
            ("avg_wind_speed", r.avg_wind_speed),
        ] {
            if !v.is_finite() || v < 0.0 {
                errors.push((name, format!("must be >= 0, got {v}")));
            }
        }
        errors
    }

    fn validate_profile(&self) -> Vec<(&'static str, String)> {
        let p = &self.profile;
        let mut errors = Vec::new();
        if p.sunrise_hour >= p.sunset_hour || p.sunset_hour > 24 {
            errors.push((
                "sunrise_hour",
                format!(
                    "need sunrise_hour < sunset_hour <= 24, got {}..{}",
                    p.sunrise_hour, p.sunset_hour
                ),
            ));
        }
        for (name, v) in [
            ("wind_day_std", p.wind_day_std),
            ("wind_noise_std", p.wind_noise_std),
            ("cloud_day_std", p.cloud_day_std),
            ("load_noise_std", p.load_noise_std),
        ] {
            if !v.is_finite() || v < 0.0 {
                errors.push((name, format!("must be >= 0, got {v}")));
            }
        }
        if !(0.0..1.0).contains(&p.load_amplitude) {
            errors.push((
                "load_amplitude",
                format!("must be in [0, 1), got {}", p.load_amplitude),
            ));
        }
        errors
    }

    fn validate_equipment(&self) -> Vec<(&'static str, String)> {
        let e = &self.equipment;
        let mut errors = Vec::new();
        if !(e.inverter_load_ratio.is_finite() && e.inverter_load_ratio > 0.0) {
            errors.push((
                "inverter_load_ratio",
                format!("must be > 0, got {}", e.inverter_load_ratio),
            ));
        }
        if !(e.battery_duration_h.is_finite() && e.battery_duration_h > 0.0) {
            errors.push((
                "battery_duration_h",
                format!("must be > 0, got {}", e.battery_duration_h),
            ));
        }
        errors
    }

    /// Resource provider synthesising this scenario's year.
    pub fn profile_provider(&self) -> DailyProfileProvider {
        DailyProfileProvider::new(self.profile.clone())
    }

    /// Assembles a search request over `series` and `catalog`.
    pub fn to_request(
        &self,
        series: Arc<HourlySeries>,
        catalog: Arc<EquipmentCatalog>,
    ) -> SearchRequest {
        SearchRequest::new(self.region.to_region(), series, catalog)
            .with_settings(self.search.clone())
            .with_preferences(self.equipment.clone())
            .with_dispatch(self.dispatch.clone())
            .with_scoring(self.scoring.clone())
            .with_economics(self.economics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::BiomassRoute;
    use crate::resource::ResourceProvider;

    #[test]
    fn default_preset_valid() {
        let cfg = ScenarioConfig::industrial();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let result = ScenarioConfig::from_preset("nonexistent");
        assert!(result.is_err());
        let err = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("unknown preset"));
        assert!(err.contains("industrial"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml_str = r#"
[region]
id = "valley"
region_type = "mountain"
annual_load_mwh = 100000.0
peak_load_mw = 20.0
daily_biomass_t = 10.0
avg_wind_speed = 7.0
feedstock = "manure"

[search]
max_solutions = 5
threads = 2

[dispatch]
soc_min = 0.2

[equipment]
batteries = ["LFP-280"]
biomass_route = "anaerobic_digestion"
"#;
        let cfg = ScenarioConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(cfg.region.region_type, RegionType::Mountain);
        assert_eq!(cfg.search.max_solutions, 5);
        assert_eq!(cfg.dispatch.soc_min, 0.2);
        assert_eq!(cfg.equipment.biomass_route, Some(BiomassRoute::AnaerobicDigestion));
        assert_eq!(cfg.region.to_region().feedstock, FeedstockType::Manure);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml_str = r#"
[region]
annual_load_mwh = 1000.0
bogus_field = 42
"#;
        let result = ScenarioConfig::from_toml_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        assert!(ScenarioConfig::from_toml_str("[feeder]\nmax_import_kw = 1.0\n").is_err());
    }

    #[test]
    fn validation_reports_dotted_paths() {
        let mut cfg = ScenarioConfig::test();
        cfg.region.peak_load_mw = 0.0;
        cfg.dispatch.soc_min = 0.95;
        cfg.search.max_points_per_axis = 1;
        cfg.profile.sunrise_hour = 20;
        cfg.equipment.battery_duration_h = 0.0;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        for expected in [
            "region.peak_load_mw",
            "search.max_points_per_axis",
            "profile.sunrise_hour",
            "equipment.battery_duration_h",
        ] {
            assert!(fields.iter().any(|f| f == expected), "missing {expected} in {fields:?}");
        }
        assert!(fields.iter().any(|f| f.starts_with("dispatch.")));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in PRESETS {
            let errors = ScenarioConfig::from_preset(name).unwrap().validate();
            assert!(errors.is_empty(), "preset {name} has errors: {errors:?}");
        }
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml_str = r#"
[search]
max_points_per_axis = 6
"#;
        let cfg = ScenarioConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(cfg.search.max_points_per_axis, 6);
        assert_eq!(cfg.search.max_solutions, 20);
        assert_eq!(cfg.region.peak_load_mw, 55.0);
        assert_eq!(cfg.profile.seed, 42);
    }

    #[test]
    fn scenario_files_match_presets() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        for name in PRESETS {
            let from_file = ScenarioConfig::from_toml_file(&dir.join(format!("{name}.toml"))).unwrap();
            let preset = ScenarioConfig::from_preset(name).unwrap();
            assert_eq!(from_file, preset, "scenarios/{name}.toml drifted from preset");
        }
    }

    #[test]
    fn request_carries_every_section() {
        let cfg = ScenarioConfig::test();
        let series = cfg
            .profile_provider()
            .series(&cfg.region.to_region())
            .unwrap();
        let request = cfg.to_request(Arc::new(series), Arc::new(EquipmentCatalog::builtin()));
        assert_eq!(request.region.id, "test-microgrid");
        assert_eq!(request.settings, cfg.search);
        assert_eq!(request.dispatch.feasibility_threshold, 0.95);
    }
}
