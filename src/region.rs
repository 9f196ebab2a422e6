//! Region metadata and the pure lookup tables keyed by region type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};

/// Land-use class of a region; selects resource class and constraint tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionType {
    Industrial,
    Residential,
    Agricultural,
    Forestry,
    Mountain,
    Test,
}

impl RegionType {
    /// All region types, in preset order.
    pub const ALL: [RegionType; 6] = [
        RegionType::Industrial,
        RegionType::Residential,
        RegionType::Agricultural,
        RegionType::Forestry,
        RegionType::Mountain,
        RegionType::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionType::Industrial => "industrial",
            RegionType::Residential => "residential",
            RegionType::Agricultural => "agricultural",
            RegionType::Forestry => "forestry",
            RegionType::Mountain => "mountain",
            RegionType::Test => "test",
        }
    }

    /// Wind equivalent full-load hours per year for this resource class.
    pub fn wind_equivalent_hours(&self) -> f64 {
        match self {
            RegionType::Industrial => 2000.0,
            RegionType::Residential => 1800.0,
            RegionType::Agricultural => 2200.0,
            RegionType::Forestry => 1900.0,
            RegionType::Mountain => 2600.0,
            RegionType::Test => 2000.0,
        }
    }

    /// Solar equivalent full-load hours per year for this resource class.
    pub fn solar_equivalent_hours(&self) -> f64 {
        match self {
            RegionType::Industrial => 1300.0,
            RegionType::Residential => 1250.0,
            RegionType::Agricultural => 1400.0,
            RegionType::Forestry => 1200.0,
            RegionType::Mountain => 1350.0,
            RegionType::Test => 1300.0,
        }
    }

    /// Feedstock a region of this type typically supplies.
    pub fn default_feedstock(&self) -> FeedstockType {
        match self {
            RegionType::Industrial => FeedstockType::Mixed,
            RegionType::Residential => FeedstockType::OrganicWaste,
            RegionType::Agricultural => FeedstockType::CropResidue,
            RegionType::Forestry | RegionType::Mountain => FeedstockType::Wood,
            RegionType::Test => FeedstockType::CropResidue,
        }
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Biomass feedstock available in a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedstockType {
    CropResidue,
    Wood,
    Manure,
    OrganicWaste,
    Mixed,
}

impl FeedstockType {
    /// Lower heating value in MJ/kg (biogas-equivalent for wet feedstocks).
    pub fn lower_heating_value_mj_per_kg(&self) -> f64 {
        match self {
            FeedstockType::CropResidue => 15.0,
            FeedstockType::Wood => 18.0,
            FeedstockType::Manure => 10.0,
            FeedstockType::OrganicWaste => 8.0,
            FeedstockType::Mixed => 13.0,
        }
    }
}

/// Conversion route from feedstock to electricity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomassRoute {
    /// Boiler + steam turbine.
    DirectCombustion,
    /// Gasifier + gas engine.
    Gasification,
    /// Digester + biogas engine.
    AnaerobicDigestion,
}

impl BiomassRoute {
    /// Overall feedstock-to-electricity efficiency (ηTotal).
    pub fn conversion_efficiency(&self) -> f64 {
        match self {
            BiomassRoute::DirectCombustion => 0.25,
            BiomassRoute::Gasification => 0.28,
            BiomassRoute::AnaerobicDigestion => 0.32,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BiomassRoute::DirectCombustion => "direct_combustion",
            BiomassRoute::Gasification => "gasification",
            BiomassRoute::AnaerobicDigestion => "anaerobic_digestion",
        }
    }
}

impl fmt::Display for BiomassRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the conversion route best suited to a feedstock.
pub fn recommend_biomass_route(feedstock: FeedstockType) -> BiomassRoute {
    match feedstock {
        FeedstockType::CropResidue | FeedstockType::Mixed => BiomassRoute::DirectCombustion,
        FeedstockType::Wood => BiomassRoute::Gasification,
        FeedstockType::Manure | FeedstockType::OrganicWaste => BiomassRoute::AnaerobicDigestion,
    }
}

/// Inclusive band for an energy ratio (source energy / annual load).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBand {
    pub min: f64,
    pub max: f64,
}

impl RatioBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Distance from the band; zero inside it.
    pub fn distance(&self, value: f64) -> f64 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }
}

/// Per-source and total energy-ratio bands for a region.
///
/// These are advisory: violations are reported as score issues and never
/// exclude a candidate on their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioConstraints {
    pub wind: RatioBand,
    pub solar: RatioBand,
    pub biomass: RatioBand,
    pub total: RatioBand,
}

/// Energy-ratio constraints used for a region type.
pub fn ratio_constraints(region_type: RegionType) -> RatioConstraints {
    let (wind, solar, biomass, total) = match region_type {
        RegionType::Industrial => ((0.10, 0.45), (0.10, 0.40), (0.05, 0.30), (0.95, 1.60)),
        RegionType::Residential => ((0.05, 0.35), (0.20, 0.50), (0.05, 0.25), (0.95, 1.50)),
        RegionType::Agricultural => ((0.15, 0.45), (0.15, 0.45), (0.15, 0.45), (1.00, 1.60)),
        RegionType::Forestry => ((0.10, 0.40), (0.05, 0.30), (0.25, 0.60), (1.00, 1.60)),
        RegionType::Mountain => ((0.25, 0.60), (0.10, 0.35), (0.05, 0.30), (1.00, 1.70)),
        RegionType::Test => ((0.0, 1.0), (0.0, 1.0), (0.0, 1.0), (0.90, 2.00)),
    };
    RatioConstraints {
        wind: RatioBand::new(wind.0, wind.1),
        solar: RatioBand::new(solar.0, solar.1),
        biomass: RatioBand::new(biomass.0, biomass.1),
        total: RatioBand::new(total.0, total.1),
    }
}

/// A region to be supplied by the hybrid system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub region_type: RegionType,
    /// Annual electricity demand (MWh).
    pub annual_load_mwh: f64,
    /// Peak electrical demand (MW).
    pub peak_load_mw: f64,
    /// Biomass delivered per day (tonnes).
    pub daily_biomass_t: f64,
    /// Long-run average hub-height wind speed (m/s).
    pub avg_wind_speed: f64,
    pub feedstock: FeedstockType,
    pub ratio_constraints: RatioConstraints,
    /// Key the resource provider uses to locate this region's series.
    pub series_id: String,
}

impl Region {
    /// Creates a region using the type's default feedstock and ratio bands.
    pub fn new(
        id: impl Into<String>,
        region_type: RegionType,
        annual_load_mwh: f64,
        peak_load_mw: f64,
        daily_biomass_t: f64,
    ) -> Self {
        let id = id.into();
        Self {
            series_id: id.clone(),
            id,
            region_type,
            annual_load_mwh,
            peak_load_mw,
            daily_biomass_t,
            avg_wind_speed: 6.0,
            feedstock: region_type.default_feedstock(),
            ratio_constraints: ratio_constraints(region_type),
        }
    }

    pub fn with_avg_wind_speed(mut self, avg_wind_speed: f64) -> Self {
        self.avg_wind_speed = avg_wind_speed;
        self
    }

    pub fn with_feedstock(mut self, feedstock: FeedstockType) -> Self {
        self.feedstock = feedstock;
        self
    }

    /// Average daily demand (MWh).
    pub fn daily_load_mwh(&self) -> f64 {
        self.annual_load_mwh / 365.0
    }

    /// Route recommended for this region's feedstock.
    pub fn recommended_route(&self) -> BiomassRoute {
        recommend_biomass_route(self.feedstock)
    }

    /// Rejects metadata that would make sizing meaningless.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.annual_load_mwh, "annual_load_mwh"),
            (self.peak_load_mw, "peak_load_mw"),
            (self.daily_biomass_t, "daily_biomass_t"),
            (self.avg_wind_speed, "avg_wind_speed"),
        ];
        for (value, name) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(SizingError::InvalidRegion(format!(
                    "{}: {name} must be finite and >= 0, got {value}",
                    self.id
                )));
            }
        }
        if self.peak_load_mw <= 0.0 {
            return Err(SizingError::InvalidRegion(format!(
                "{}: peak_load_mw must be > 0",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_recommendation_follows_feedstock() {
        assert_eq!(
            recommend_biomass_route(FeedstockType::CropResidue),
            BiomassRoute::DirectCombustion
        );
        assert_eq!(
            recommend_biomass_route(FeedstockType::Wood),
            BiomassRoute::Gasification
        );
        assert_eq!(
            recommend_biomass_route(FeedstockType::Manure),
            BiomassRoute::AnaerobicDigestion
        );
    }

    #[test]
    fn every_region_type_has_consistent_bands() {
        for rt in RegionType::ALL {
            let c = ratio_constraints(rt);
            for band in [c.wind, c.solar, c.biomass, c.total] {
                assert!(band.min <= band.max, "{rt}: {band:?}");
            }
            assert!(rt.wind_equivalent_hours() > 0.0);
            assert!(rt.solar_equivalent_hours() > 0.0);
        }
    }

    #[test]
    fn band_distance_is_zero_inside() {
        let band = RatioBand::new(0.1, 0.3);
        assert_eq!(band.distance(0.2), 0.0);
        assert!((band.distance(0.05) - 0.05).abs() < 1e-12);
        assert!((band.distance(0.5) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn region_defaults_come_from_type() {
        let r = Region::new("farm", RegionType::Agricultural, 100_000.0, 20.0, 50.0);
        assert_eq!(r.feedstock, FeedstockType::CropResidue);
        assert_eq!(r.ratio_constraints, ratio_constraints(RegionType::Agricultural));
        assert_eq!(r.series_id, "farm");
        assert!((r.daily_load_mwh() - 100_000.0 / 365.0).abs() < 1e-9);
    }

    #[test]
    fn validation_rejects_zero_peak() {
        let r = Region::new("bad", RegionType::Test, 1000.0, 0.0, 0.0);
        assert!(matches!(r.validate(), Err(SizingError::InvalidRegion(_))));
    }

    #[test]
    fn validation_rejects_nan_load() {
        let r = Region::new("bad", RegionType::Test, f64::NAN, 10.0, 0.0);
        assert!(r.validate().is_err());
    }
}
