//! Immutable equipment registry.
//!
//! The catalog is built once (from the built-in tables or a TOML file),
//! validated, and then shared read-only by reference into the search.

mod builtin;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};
use crate::region::BiomassRoute;

/// Anything the selector can pack: a priced unit with a rated capacity.
///
/// Capacities are in MW for power equipment and MWh for storage.
pub trait CatalogItem {
    fn id(&self) -> &str;
    fn unit_capacity(&self) -> f64;
    fn unit_price(&self) -> f64;
}

/// How a turbine's power curve is evaluated between cut-in and rated speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindCurveKind {
    /// `((v - cut_in) / (rated - cut_in))^3 * rated_power`.
    #[default]
    Cubic,
    /// Physical curve with Cp interpolated from a fixed 3-17 m/s table.
    CpTable,
    /// Physical curve with Cp(λ) from the empirical β = 0 blade model.
    Analytic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindTurbineModel {
    pub id: String,
    pub model: String,
    pub rated_power_mw: f64,
    pub rotor_diameter_m: f64,
    pub cut_in_ms: f64,
    pub rated_speed_ms: f64,
    pub cut_out_ms: f64,
    /// Rotor speed at rated wind, used for the tip-speed ratio.
    pub rated_rpm: f64,
    #[serde(default)]
    pub curve: WindCurveKind,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolarPanelModel {
    pub id: String,
    pub model: String,
    pub rated_power_kw: f64,
    pub efficiency: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InverterModel {
    pub id: String,
    pub model: String,
    pub rated_power_kw: f64,
    pub efficiency: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryChemistry {
    Lfp,
    Nmc,
    SodiumIon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatteryModel {
    pub id: String,
    pub model: String,
    pub chemistry: BatteryChemistry,
    pub capacity_kwh: f64,
    pub energy_density_wh_per_kg: f64,
    pub price: f64,
}

/// Power conversion system for a battery bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PcsModel {
    pub id: String,
    pub model: String,
    pub rated_power_kw: f64,
    pub efficiency: f64,
    pub price: f64,
}

/// Position of a unit within a biomass conversion route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomassRole {
    /// Boiler, gasifier, or digester.
    Primary,
    /// Steam turbine, gas engine, or biogas engine.
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BiomassUnitModel {
    pub id: String,
    pub model: String,
    pub route: BiomassRoute,
    pub role: BiomassRole,
    /// Electrical-equivalent rating (MW).
    pub rated_power_mw: f64,
    pub efficiency: f64,
    pub price: f64,
}

impl CatalogItem for WindTurbineModel {
    fn id(&self) -> &str {
        &self.id
    }
    fn unit_capacity(&self) -> f64 {
        self.rated_power_mw
    }
    fn unit_price(&self) -> f64 {
        self.price
    }
}

impl CatalogItem for SolarPanelModel {
    fn id(&self) -> &str {
        &self.id
    }
    fn unit_capacity(&self) -> f64 {
        self.rated_power_kw / 1000.0
    }
    fn unit_price(&self) -> f64 {
        self.price
    }
}

impl CatalogItem for InverterModel {
    fn id(&self) -> &str {
        &self.id
    }
    fn unit_capacity(&self) -> f64 {
        self.rated_power_kw / 1000.0
    }
    fn unit_price(&self) -> f64 {
        self.price
    }
}

impl CatalogItem for BatteryModel {
    fn id(&self) -> &str {
        &self.id
    }
    fn unit_capacity(&self) -> f64 {
        self.capacity_kwh / 1000.0
    }
    fn unit_price(&self) -> f64 {
        self.price
    }
}

impl CatalogItem for PcsModel {
    fn id(&self) -> &str {
        &self.id
    }
    fn unit_capacity(&self) -> f64 {
        self.rated_power_kw / 1000.0
    }
    fn unit_price(&self) -> f64 {
        self.price
    }
}

impl CatalogItem for BiomassUnitModel {
    fn id(&self) -> &str {
        &self.id
    }
    fn unit_capacity(&self) -> f64 {
        self.rated_power_mw
    }
    fn unit_price(&self) -> f64 {
        self.price
    }
}

/// Read-only equipment registry, one list per technology.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquipmentCatalog {
    pub wind_turbines: Vec<WindTurbineModel>,
    pub solar_panels: Vec<SolarPanelModel>,
    pub inverters: Vec<InverterModel>,
    pub batteries: Vec<BatteryModel>,
    pub pcs_units: Vec<PcsModel>,
    pub biomass_units: Vec<BiomassUnitModel>,
}

impl EquipmentCatalog {
    /// The built-in equipment tables.
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    /// Loads and validates a catalog from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a catalog from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(s)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks id uniqueness and that every rating and price is usable.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut check = |id: &str, capacity: f64, price: f64| -> Result<()> {
            if !seen.insert(id.to_string()) {
                return Err(SizingError::InvalidCatalog(format!("duplicate id `{id}`")));
            }
            if !capacity.is_finite() || capacity <= 0.0 {
                return Err(SizingError::InvalidCatalog(format!(
                    "`{id}` has non-positive capacity {capacity}"
                )));
            }
            if !price.is_finite() || price < 0.0 {
                return Err(SizingError::InvalidCatalog(format!(
                    "`{id}` has invalid price {price}"
                )));
            }
            Ok(())
        };

        for t in &self.wind_turbines {
            check(&t.id, t.unit_capacity(), t.price)?;
            if !(t.cut_in_ms < t.rated_speed_ms && t.rated_speed_ms < t.cut_out_ms) {
                return Err(SizingError::InvalidCatalog(format!(
                    "`{}` needs cut_in < rated < cut_out",
                    t.id
                )));
            }
            if t.rotor_diameter_m <= 0.0 {
                return Err(SizingError::InvalidCatalog(format!(
                    "`{}` has non-positive rotor diameter",
                    t.id
                )));
            }
        }
        for p in &self.solar_panels {
            check(&p.id, p.unit_capacity(), p.price)?;
        }
        for i in &self.inverters {
            check(&i.id, i.unit_capacity(), i.price)?;
        }
        for b in &self.batteries {
            check(&b.id, b.unit_capacity(), b.price)?;
        }
        for p in &self.pcs_units {
            check(&p.id, p.unit_capacity(), p.price)?;
        }
        for u in &self.biomass_units {
            check(&u.id, u.unit_capacity(), u.price)?;
        }
        Ok(())
    }

    pub fn wind_turbine(&self, id: &str) -> Result<&WindTurbineModel> {
        find(&self.wind_turbines, id, "wind turbine")
    }

    pub fn solar_panel(&self, id: &str) -> Result<&SolarPanelModel> {
        find(&self.solar_panels, id, "solar panel")
    }

    pub fn inverter(&self, id: &str) -> Result<&InverterModel> {
        find(&self.inverters, id, "inverter")
    }

    pub fn battery(&self, id: &str) -> Result<&BatteryModel> {
        find(&self.batteries, id, "battery")
    }

    pub fn pcs(&self, id: &str) -> Result<&PcsModel> {
        find(&self.pcs_units, id, "PCS")
    }

    pub fn biomass_unit(&self, id: &str) -> Result<&BiomassUnitModel> {
        find(&self.biomass_units, id, "biomass unit")
    }

    /// Biomass units of one route and role, in catalog order.
    pub fn biomass_units_for(
        &self,
        route: BiomassRoute,
        role: BiomassRole,
    ) -> impl Iterator<Item = &BiomassUnitModel> {
        self.biomass_units
            .iter()
            .filter(move |u| u.route == route && u.role == role)
    }
}

/// Resolves an id against a list, failing with a typed configuration error.
pub fn find<'a, T: CatalogItem>(items: &'a [T], id: &str, what: &'static str) -> Result<&'a T> {
    items
        .iter()
        .find(|item| item.id() == id)
        .ok_or_else(|| SizingError::missing(what, id))
}

/// Resolves a preference list, or returns every item when the list is empty.
pub fn resolve<'a, T: CatalogItem>(
    items: &'a [T],
    ids: &[String],
    what: &'static str,
) -> Result<Vec<&'a T>> {
    if ids.is_empty() {
        return Ok(items.iter().collect());
    }
    ids.iter().map(|id| find(items, id, what)).collect()
}
