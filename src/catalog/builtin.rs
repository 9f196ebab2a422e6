//! Built-in equipment tables.

use super::{
    BatteryChemistry, BatteryModel, BiomassRole, BiomassUnitModel, EquipmentCatalog,
    InverterModel, PcsModel, SolarPanelModel, WindCurveKind, WindTurbineModel,
};
use crate::region::BiomassRoute;

pub(super) fn catalog() -> EquipmentCatalog {
    EquipmentCatalog {
        wind_turbines: wind_turbines(),
        solar_panels: solar_panels(),
        inverters: inverters(),
        batteries: batteries(),
        pcs_units: pcs_units(),
        biomass_units: biomass_units(),
    }
}

#[expect(clippy::too_many_arguments)]
fn turbine(
    id: &str,
    model: &str,
    rated_power_mw: f64,
    rotor_diameter_m: f64,
    (cut_in_ms, rated_speed_ms, cut_out_ms): (f64, f64, f64),
    rated_rpm: f64,
    curve: WindCurveKind,
    price: f64,
) -> WindTurbineModel {
    WindTurbineModel {
        id: id.to_string(),
        model: model.to_string(),
        rated_power_mw,
        rotor_diameter_m,
        cut_in_ms,
        rated_speed_ms,
        cut_out_ms,
        rated_rpm,
        curve,
        price,
    }
}

fn wind_turbines() -> Vec<WindTurbineModel> {
    vec![
        turbine(
            "WT-1500",
            "1.5 MW low-wind",
            1.5,
            93.0,
            (2.5, 10.0, 22.0),
            16.0,
            WindCurveKind::Cubic,
            1_250_000.0,
        ),
        turbine(
            "WT-2000",
            "2.0 MW class III",
            2.0,
            115.0,
            (2.5, 10.5, 25.0),
            13.5,
            WindCurveKind::CpTable,
            1_700_000.0,
        ),
        turbine(
            "WT-3000",
            "3.0 MW class II",
            3.0,
            130.0,
            (3.0, 11.5, 25.0),
            12.5,
            WindCurveKind::Analytic,
            2_550_000.0,
        ),
        turbine(
            "WT-4500",
            "4.5 MW class I",
            4.5,
            156.0,
            (3.5, 12.0, 25.0),
            10.5,
            WindCurveKind::CpTable,
            3_800_000.0,
        ),
    ]
}

fn solar_panels() -> Vec<SolarPanelModel> {
    [
        ("PV-400", "400 W mono PERC", 0.40, 0.205, 150.0),
        ("PV-550", "550 W mono PERC", 0.55, 0.213, 200.0),
        ("PV-650", "650 W bifacial TOPCon", 0.65, 0.224, 250.0),
    ]
    .into_iter()
    .map(|(id, model, kw, eff, price)| SolarPanelModel {
        id: id.to_string(),
        model: model.to_string(),
        rated_power_kw: kw,
        efficiency: eff,
        price,
    })
    .collect()
}

fn inverters() -> Vec<InverterModel> {
    [
        ("INV-100", "100 kW string", 100.0, 0.980, 8_500.0),
        ("INV-250", "250 kW string", 250.0, 0.985, 19_000.0),
        ("INV-3125", "3.125 MW central", 3125.0, 0.987, 175_000.0),
    ]
    .into_iter()
    .map(|(id, model, kw, eff, price)| InverterModel {
        id: id.to_string(),
        model: model.to_string(),
        rated_power_kw: kw,
        efficiency: eff,
        price,
    })
    .collect()
}

fn batteries() -> Vec<BatteryModel> {
    [
        ("LFP-280", "LFP rack 280 kWh", BatteryChemistry::Lfp, 280.0, 160.0, 61_600.0),
        ("LFP-3720", "LFP container 3.72 MWh", BatteryChemistry::Lfp, 3720.0, 165.0, 780_000.0),
        ("NMC-500", "NMC rack 500 kWh", BatteryChemistry::Nmc, 500.0, 230.0, 125_000.0),
        ("NMC-2500", "NMC container 2.5 MWh", BatteryChemistry::Nmc, 2500.0, 240.0, 590_000.0),
        ("NAI-200", "Sodium-ion rack 200 kWh", BatteryChemistry::SodiumIon, 200.0, 140.0, 40_000.0),
    ]
    .into_iter()
    .map(|(id, model, chemistry, kwh, density, price)| BatteryModel {
        id: id.to_string(),
        model: model.to_string(),
        chemistry,
        capacity_kwh: kwh,
        energy_density_wh_per_kg: density,
        price,
    })
    .collect()
}

fn pcs_units() -> Vec<PcsModel> {
    [
        ("PCS-250", "250 kW bidirectional", 250.0, 0.97, 22_000.0),
        ("PCS-630", "630 kW bidirectional", 630.0, 0.975, 48_000.0),
        ("PCS-1725", "1.725 MW skid", 1725.0, 0.98, 118_000.0),
    ]
    .into_iter()
    .map(|(id, model, kw, eff, price)| PcsModel {
        id: id.to_string(),
        model: model.to_string(),
        rated_power_kw: kw,
        efficiency: eff,
        price,
    })
    .collect()
}

fn biomass_units() -> Vec<BiomassUnitModel> {
    use BiomassRole::{Primary, Secondary};
    use BiomassRoute::{AnaerobicDigestion, DirectCombustion, Gasification};

    [
        ("BLR-5", "5 MWe grate boiler", DirectCombustion, Primary, 5.0, 0.85, 2_600_000.0),
        ("BLR-15", "15 MWe CFB boiler", DirectCombustion, Primary, 15.0, 0.88, 6_900_000.0),
        ("STG-3", "3 MW steam turbine", DirectCombustion, Secondary, 3.0, 0.30, 1_500_000.0),
        ("STG-12", "12 MW steam turbine", DirectCombustion, Secondary, 12.0, 0.33, 4_800_000.0),
        ("GSF-2", "2 MWe downdraft gasifier", Gasification, Primary, 2.0, 0.75, 1_400_000.0),
        ("GSF-6", "6 MWe fluidised gasifier", Gasification, Primary, 6.0, 0.78, 3_600_000.0),
        ("GEN-1", "1 MW syngas engine", Gasification, Secondary, 1.0, 0.36, 650_000.0),
        ("GEN-2.5", "2.5 MW syngas engine", Gasification, Secondary, 2.5, 0.38, 1_450_000.0),
        ("DIG-0.5", "0.5 MWe CSTR digester", AnaerobicDigestion, Primary, 0.5, 0.60, 700_000.0),
        ("DIG-2", "2 MWe CSTR digester", AnaerobicDigestion, Primary, 2.0, 0.62, 2_300_000.0),
        ("BGE-0.5", "0.5 MW biogas engine", AnaerobicDigestion, Secondary, 0.5, 0.40, 320_000.0),
        ("BGE-1.5", "1.5 MW biogas engine", AnaerobicDigestion, Secondary, 1.5, 0.42, 850_000.0),
    ]
    .into_iter()
    .map(|(id, model, route, role, mw, eff, price)| BiomassUnitModel {
        id: id.to_string(),
        model: model.to_string(),
        route,
        role,
        rated_power_mw: mw,
        efficiency: eff,
        price,
    })
    .collect()
}
