//! Greedy conversion of target capacities into catalog line items.
//!
//! Each technology is packed independently, largest unit first, and any
//! remainder is covered by one extra unit of the smallest model, so a target
//! is never under-provisioned and the overshoot stays below one unit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{
    BatteryModel, BiomassRole, BiomassUnitModel, CatalogItem, EquipmentCatalog, InverterModel,
    PcsModel, SolarPanelModel, WindTurbineModel, resolve,
};
use crate::error::{Result, SizingError};
use crate::region::{BiomassRoute, Region};
use crate::sim::types::CapacityCandidate;

/// Remainders smaller than this (MW or MWh) are treated as covered.
const PACK_EPSILON: f64 = 1e-9;

/// Annual-yield derate applied to turbines in low-wind regions.
pub const LOW_WIND_DERATE: f64 = 0.6;
/// Average wind speed (m/s) below which [`LOW_WIND_DERATE`] applies.
pub const LOW_WIND_THRESHOLD_MS: f64 = 5.0;

/// Which catalog items the selector may use, and how support equipment is sized.
///
/// Empty id lists allow the whole catalog category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquipmentPreferences {
    pub wind_turbines: Vec<String>,
    pub solar_panels: Vec<String>,
    pub inverters: Vec<String>,
    pub batteries: Vec<String>,
    pub pcs_units: Vec<String>,
    pub biomass_units: Vec<String>,
    /// Turbine whose power curve drives the dispatch simulation.
    pub reference_turbine: Option<String>,
    /// Overrides the route recommended for the region's feedstock.
    pub biomass_route: Option<BiomassRoute>,
    /// Inverter AC rating per unit of panel DC capacity.
    pub inverter_load_ratio: f64,
    /// Battery discharge duration used to size the PCS (h).
    pub battery_duration_h: f64,
}

impl Default for EquipmentPreferences {
    fn default() -> Self {
        Self {
            wind_turbines: Vec::new(),
            solar_panels: Vec::new(),
            inverters: Vec::new(),
            batteries: Vec::new(),
            pcs_units: Vec::new(),
            biomass_units: Vec::new(),
            reference_turbine: None,
            biomass_route: None,
            inverter_load_ratio: 1.05,
            battery_duration_h: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    WindTurbine,
    SolarPanel,
    Inverter,
    Battery,
    Pcs,
    BiomassPrimary,
    BiomassSecondary,
}

impl EquipmentCategory {
    pub const ALL: [EquipmentCategory; 7] = [
        EquipmentCategory::WindTurbine,
        EquipmentCategory::SolarPanel,
        EquipmentCategory::Inverter,
        EquipmentCategory::Battery,
        EquipmentCategory::Pcs,
        EquipmentCategory::BiomassPrimary,
        EquipmentCategory::BiomassSecondary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::WindTurbine => "wind turbine",
            EquipmentCategory::SolarPanel => "solar panel",
            EquipmentCategory::Inverter => "inverter",
            EquipmentCategory::Battery => "battery",
            EquipmentCategory::Pcs => "PCS",
            EquipmentCategory::BiomassPrimary => "biomass primary unit",
            EquipmentCategory::BiomassSecondary => "biomass secondary unit",
        }
    }

    /// Technology whose capex this category belongs to.
    pub fn technology(&self) -> Technology {
        match self {
            EquipmentCategory::WindTurbine => Technology::Wind,
            EquipmentCategory::SolarPanel | EquipmentCategory::Inverter => Technology::Solar,
            EquipmentCategory::Battery | EquipmentCategory::Pcs => Technology::Storage,
            EquipmentCategory::BiomassPrimary | EquipmentCategory::BiomassSecondary => {
                Technology::Biomass
            }
        }
    }
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technology {
    Wind,
    Solar,
    Storage,
    Biomass,
}

/// One catalog model and how many units of it to buy.
///
/// `total_capacity == count × unit_capacity` and
/// `total_price == count × unit_price` always hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentSelection {
    pub category: EquipmentCategory,
    pub model_id: String,
    pub count: u32,
    /// MW, or MWh for batteries.
    pub unit_capacity: f64,
    pub total_capacity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

impl EquipmentSelection {
    fn new<T: CatalogItem>(category: EquipmentCategory, item: &T, count: u32) -> Self {
        let unit_capacity = item.unit_capacity();
        let unit_price = item.unit_price();
        Self {
            category,
            model_id: item.id().to_string(),
            count,
            unit_capacity,
            total_capacity: count as f64 * unit_capacity,
            unit_price,
            total_price: count as f64 * unit_price,
        }
    }
}

impl fmt::Display for EquipmentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<22} {:<10} x{:<5} {:>9.3} = {:>9.3}  ${:>14.0}",
            self.category.as_str(),
            self.model_id,
            self.count,
            self.unit_capacity,
            self.total_capacity,
            self.total_price
        )
    }
}

/// Greedy largest-first packing of `target` onto `models`.
///
/// Returns one selection per model actually used, largest unit first. An
/// empty result means the target was zero (or there is nothing to pack).
pub fn pack<T: CatalogItem>(
    category: EquipmentCategory,
    target: f64,
    models: &[&T],
) -> Vec<EquipmentSelection> {
    if !target.is_finite() || target <= PACK_EPSILON || models.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<&T> = models
        .iter()
        .copied()
        .filter(|m| m.unit_capacity() > 0.0)
        .collect();
    if order.is_empty() {
        return Vec::new();
    }
    order.sort_by(|a, b| b.unit_capacity().total_cmp(&a.unit_capacity()));

    let mut counts = vec![0u32; order.len()];
    let mut remaining = target;
    for (i, model) in order.iter().enumerate() {
        let n = ((remaining + PACK_EPSILON) / model.unit_capacity()).floor();
        if n >= 1.0 {
            counts[i] += n as u32;
            remaining -= n * model.unit_capacity();
        }
    }
    if remaining > PACK_EPSILON {
        let smallest = order.len() - 1;
        counts[smallest] += 1;
    }

    order
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(model, n)| EquipmentSelection::new(category, *model, n))
        .collect()
}

/// Equipment realising one candidate, grouped by category.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EquipmentPlan {
    pub items: Vec<EquipmentSelection>,
}

impl EquipmentPlan {
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|s| s.total_price).sum()
    }

    pub fn total_capacity(&self, category: EquipmentCategory) -> f64 {
        self.category(category).map(|s| s.total_capacity).sum()
    }

    pub fn unit_count(&self, category: EquipmentCategory) -> u32 {
        self.category(category).map(|s| s.count).sum()
    }

    /// Capex attributable to one technology.
    pub fn technology_price(&self, technology: Technology) -> f64 {
        self.items
            .iter()
            .filter(|s| s.category.technology() == technology)
            .map(|s| s.total_price)
            .sum()
    }

    pub fn category(
        &self,
        category: EquipmentCategory,
    ) -> impl Iterator<Item = &EquipmentSelection> {
        self.items.iter().filter(move |s| s.category == category)
    }
}

impl fmt::Display for EquipmentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "  {item}")?;
        }
        write!(f, "  {:<53} ${:>14.0}", "total", self.total_price())
    }
}

/// Catalog subset resolved from [`EquipmentPreferences`] for one region.
///
/// Construction fails fast on any preference id the catalog does not hold,
/// so a search never starts against a silently substituted model.
#[derive(Debug, Clone)]
pub struct EquipmentSelector<'a> {
    panels: Vec<&'a SolarPanelModel>,
    inverters: Vec<&'a InverterModel>,
    batteries: Vec<&'a BatteryModel>,
    pcs_units: Vec<&'a PcsModel>,
    biomass_primary: Vec<&'a BiomassUnitModel>,
    biomass_secondary: Vec<&'a BiomassUnitModel>,
    reference_turbine: &'a WindTurbineModel,
    route: BiomassRoute,
    inverter_load_ratio: f64,
    battery_duration_h: f64,
}

impl<'a> EquipmentSelector<'a> {
    pub fn new(
        catalog: &'a EquipmentCatalog,
        prefs: &EquipmentPreferences,
        region: &Region,
    ) -> Result<Self> {
        let turbines = non_empty(
            resolve(&catalog.wind_turbines, &prefs.wind_turbines, "wind turbine")?,
            EquipmentCategory::WindTurbine,
        )?;
        let panels = non_empty(
            resolve(&catalog.solar_panels, &prefs.solar_panels, "solar panel")?,
            EquipmentCategory::SolarPanel,
        )?;
        let inverters = non_empty(
            resolve(&catalog.inverters, &prefs.inverters, "inverter")?,
            EquipmentCategory::Inverter,
        )?;
        let batteries = preferred_chemistry(non_empty(
            resolve(&catalog.batteries, &prefs.batteries, "battery")?,
            EquipmentCategory::Battery,
        )?);
        let pcs_units = non_empty(
            resolve(&catalog.pcs_units, &prefs.pcs_units, "PCS")?,
            EquipmentCategory::Pcs,
        )?;

        let route = prefs
            .biomass_route
            .unwrap_or_else(|| region.recommended_route());
        let biomass = resolve(&catalog.biomass_units, &prefs.biomass_units, "biomass unit")?;
        let of_role = |role: BiomassRole| -> Vec<&'a BiomassUnitModel> {
            biomass
                .iter()
                .copied()
                .filter(|u| u.route == route && u.role == role)
                .collect()
        };
        let biomass_primary = of_role(BiomassRole::Primary);
        let biomass_secondary = of_role(BiomassRole::Secondary);

        let reference_turbine = match &prefs.reference_turbine {
            Some(id) => catalog.wind_turbine(id)?,
            None => auto_reference_turbine(&turbines, region.avg_wind_speed)
                .ok_or_else(|| SizingError::missing("wind turbine", "(any)"))?,
        };

        Ok(Self {
            panels,
            inverters,
            batteries,
            pcs_units,
            biomass_primary,
            biomass_secondary,
            reference_turbine,
            route,
            inverter_load_ratio: prefs.inverter_load_ratio,
            battery_duration_h: prefs.battery_duration_h,
        })
    }

    /// Turbine whose curve drives the dispatch; the only model wind is packed with.
    pub fn reference_turbine(&self) -> &'a WindTurbineModel {
        self.reference_turbine
    }

    /// Biomass route the plant will be built on.
    pub fn route(&self) -> BiomassRoute {
        self.route
    }

    pub fn inverter_load_ratio(&self) -> f64 {
        self.inverter_load_ratio
    }

    pub fn battery_duration_h(&self) -> f64 {
        self.battery_duration_h
    }

    pub fn panels(&self) -> &[&'a SolarPanelModel] {
        &self.panels
    }

    pub fn inverters(&self) -> &[&'a InverterModel] {
        &self.inverters
    }

    /// Battery models of the preferred chemistry only.
    pub fn batteries(&self) -> &[&'a BatteryModel] {
        &self.batteries
    }

    pub fn pcs_units(&self) -> &[&'a PcsModel] {
        &self.pcs_units
    }

    pub fn biomass_primary(&self) -> &[&'a BiomassUnitModel] {
        &self.biomass_primary
    }

    pub fn biomass_secondary(&self) -> &[&'a BiomassUnitModel] {
        &self.biomass_secondary
    }

    /// Packs every technology of `candidate`.
    ///
    /// Wind uses the reference turbine alone, so the plan matches the fleet
    /// that was simulated and costed.
    ///
    /// # Errors
    ///
    /// [`SizingError::Configuration`] when the candidate needs biomass
    /// equipment and the chosen route has none in the catalog.
    pub fn select(&self, candidate: &CapacityCandidate) -> Result<EquipmentPlan> {
        use EquipmentCategory as C;

        let mut items = pack(
            C::WindTurbine,
            candidate.wind_mw,
            std::slice::from_ref(&self.reference_turbine),
        );

        let panels = pack(C::SolarPanel, candidate.solar_mw, &self.panels);
        let dc_mw: f64 = panels.iter().map(|s| s.total_capacity).sum();
        items.extend(panels);
        items.extend(pack(
            C::Inverter,
            dc_mw * self.inverter_load_ratio,
            &self.inverters,
        ));

        items.extend(pack(C::Battery, candidate.battery_mwh, &self.batteries));
        items.extend(pack(C::Pcs, self.pcs_target_mw(candidate.battery_mwh), &self.pcs_units));

        if candidate.biomass_mw > PACK_EPSILON {
            if self.biomass_primary.is_empty() {
                return Err(SizingError::missing(
                    C::BiomassPrimary.as_str(),
                    self.route.as_str(),
                ));
            }
            if self.biomass_secondary.is_empty() {
                return Err(SizingError::missing(
                    C::BiomassSecondary.as_str(),
                    self.route.as_str(),
                ));
            }
            items.extend(pack(C::BiomassPrimary, candidate.biomass_mw, &self.biomass_primary));
            items.extend(pack(
                C::BiomassSecondary,
                candidate.biomass_mw,
                &self.biomass_secondary,
            ));
        }

        Ok(EquipmentPlan { items })
    }

    /// Inverter AC over panel DC for the packing of `solar_mw`; `None` without solar.
    pub fn ac_dc_ratio(&self, solar_mw: f64) -> Option<f64> {
        let dc: f64 = pack(EquipmentCategory::SolarPanel, solar_mw, &self.panels)
            .iter()
            .map(|s| s.total_capacity)
            .sum();
        if dc <= 0.0 {
            return None;
        }
        let ac: f64 = pack(
            EquipmentCategory::Inverter,
            dc * self.inverter_load_ratio,
            &self.inverters,
        )
        .iter()
        .map(|s| s.total_capacity)
        .sum();
        Some(ac / dc)
    }

    fn pcs_target_mw(&self, battery_mwh: f64) -> f64 {
        if self.battery_duration_h > 0.0 {
            battery_mwh / self.battery_duration_h
        } else {
            0.0
        }
    }
}

fn non_empty<T>(items: Vec<&T>, category: EquipmentCategory) -> Result<Vec<&T>> {
    if items.is_empty() {
        return Err(SizingError::missing(category.as_str(), "(any)"));
    }
    Ok(items)
}

/// Keeps only models sharing the chemistry of the highest energy-density model.
fn preferred_chemistry(models: Vec<&BatteryModel>) -> Vec<&BatteryModel> {
    let best = models
        .iter()
        .max_by(|a, b| {
            a.energy_density_wh_per_kg
                .total_cmp(&b.energy_density_wh_per_kg)
        })
        .map(|m| m.chemistry);
    match best {
        Some(chemistry) => models
            .into_iter()
            .filter(|m| m.chemistry == chemistry)
            .collect(),
        None => models,
    }
}

/// Largest turbine that starts below the region's average wind, falling back
/// to the lowest cut-in when none does.
fn auto_reference_turbine<'a>(
    turbines: &[&'a WindTurbineModel],
    avg_wind_speed: f64,
) -> Option<&'a WindTurbineModel> {
    let starting = turbines
        .iter()
        .copied()
        .filter(|t| t.cut_in_ms < avg_wind_speed)
        .max_by(|a, b| a.rated_power_mw.total_cmp(&b.rated_power_mw));
    starting.or_else(|| {
        turbines
            .iter()
            .copied()
            .min_by(|a, b| a.cut_in_ms.total_cmp(&b.cut_in_ms))
    })
}

/// Turbines needed to deliver `target_mwh` per year.
///
/// Each turbine yields `rated × equivalent_hours`, derated by
/// [`LOW_WIND_DERATE`] when `avg_wind_speed` is below
/// [`LOW_WIND_THRESHOLD_MS`]. `None` when the turbine yields nothing.
pub fn turbine_count_for_energy(
    target_mwh: f64,
    turbine: &WindTurbineModel,
    equivalent_hours: f64,
    avg_wind_speed: f64,
) -> Option<u32> {
    if !target_mwh.is_finite() || target_mwh <= 0.0 {
        return Some(0);
    }
    let derate = if avg_wind_speed < LOW_WIND_THRESHOLD_MS {
        LOW_WIND_DERATE
    } else {
        1.0
    };
    let annual_mwh = turbine.rated_power_mw * equivalent_hours * derate;
    if !annual_mwh.is_finite() || annual_mwh <= 0.0 {
        return None;
    }
    Some((target_mwh / annual_mwh).ceil() as u32)
}
