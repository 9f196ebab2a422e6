mod common;

use hybrid_sizer::catalog::EquipmentCatalog;
use hybrid_sizer::region::{BiomassRoute, Region, RegionType};
use hybrid_sizer::selection::{
    EquipmentCategory, EquipmentPreferences, EquipmentSelector, turbine_count_for_energy,
};
use hybrid_sizer::sim::CapacityCandidate;

fn agricultural_county() -> Region {
    Region::new("county", RegionType::Agricultural, 240_900.0, 50.0, 80.0).with_avg_wind_speed(3.5)
}

#[test]
fn low_wind_county_turbine_count_is_derated() {
    let catalog = EquipmentCatalog::builtin();
    let region = agricultural_county();
    let selector = EquipmentSelector::new(&catalog, &EquipmentPreferences::default(), &region)
        .unwrap();

    let turbine = selector.reference_turbine();
    assert_eq!(turbine.id, "WT-3000");

    // 22% of annual load from wind, 2200 h at 60% in a 3.5 m/s region
    let target = 0.22 * region.annual_load_mwh;
    let count = turbine_count_for_energy(
        target,
        turbine,
        region.region_type.wind_equivalent_hours(),
        region.avg_wind_speed,
    );
    assert_eq!(count, Some(14));

    assert_eq!(selector.route(), BiomassRoute::DirectCombustion);
}

#[test]
fn preferred_battery_rack_packs_to_cover_target() {
    let catalog = EquipmentCatalog::builtin();
    let prefs = EquipmentPreferences {
        batteries: vec!["LFP-280".to_string()],
        ..EquipmentPreferences::default()
    };
    let selector = EquipmentSelector::new(&catalog, &prefs, &agricultural_county())
        .unwrap();

    let plan = selector
        .select(&CapacityCandidate::new(0.0, 0.0, 0.0, 66.0))
        .unwrap();

    assert_eq!(plan.unit_count(EquipmentCategory::Battery), 236);
    let installed = plan.total_capacity(EquipmentCategory::Battery);
    assert!((installed - 66.08).abs() < 1e-6, "installed {installed}");
    assert!(plan.total_capacity(EquipmentCategory::Pcs) >= 66.0 / prefs.battery_duration_h);
    assert_eq!(plan.total_capacity(EquipmentCategory::WindTurbine), 0.0);
}

#[test]
fn overshoot_is_below_one_unit() {
    let catalog = EquipmentCatalog::builtin();
    let selector = EquipmentSelector::new(
        &catalog,
        &EquipmentPreferences::default(),
        &agricultural_county(),
    )
    .unwrap();

    for (wind, solar, biomass, battery) in [
        (1.0, 0.3, 0.4, 5.0),
        (37.5, 52.3, 6.0, 120.0),
        (90.0, 140.0, 17.2, 333.3),
    ] {
        let candidate = CapacityCandidate::new(wind, solar, biomass, battery);
        let plan = selector.select(&candidate).unwrap();
        for (category, target) in [
            (EquipmentCategory::WindTurbine, wind),
            (EquipmentCategory::SolarPanel, solar),
            (EquipmentCategory::Battery, battery),
            (EquipmentCategory::BiomassPrimary, biomass),
            (EquipmentCategory::BiomassSecondary, biomass),
        ] {
            let installed = plan.total_capacity(category);
            let largest = plan
                .category(category)
                .map(|s| s.unit_capacity)
                .fold(0.0, f64::max);
            assert!(installed >= target - 1e-9, "{category}: {installed} < {target}");
            assert!(installed - target < largest, "{category}: overshoot too large");
        }
        assert!(plan.total_price() > 0.0);
    }
}

#[test]
fn packed_turbines_start_at_regional_wind() {
    let catalog = EquipmentCatalog::builtin();
    let region = agricultural_county();
    let selector = EquipmentSelector::new(&catalog, &EquipmentPreferences::default(), &region)
        .unwrap();

    for wind in [3.0, 45.0, 100.0] {
        let plan = selector.select(&CapacityCandidate::new(wind, 0.0, 0.0, 0.0)).unwrap();
        for item in plan.category(EquipmentCategory::WindTurbine) {
            assert_eq!(item.model_id, selector.reference_turbine().id);
            let turbine = catalog.wind_turbine(&item.model_id).unwrap();
            assert!(turbine.cut_in_ms < region.avg_wind_speed, "{} does not start", item.model_id);
        }
    }
}

#[test]
fn route_override_changes_biomass_equipment() {
    let catalog = EquipmentCatalog::builtin();
    let prefs = EquipmentPreferences {
        biomass_route: Some(BiomassRoute::AnaerobicDigestion),
        ..EquipmentPreferences::default()
    };
    let selector = EquipmentSelector::new(&catalog, &prefs, &common::biomass_region())
        .unwrap();
    let plan = selector
        .select(&CapacityCandidate::new(0.0, 0.0, 2.5, 0.0))
        .unwrap();
    assert!(
        plan.category(EquipmentCategory::BiomassPrimary)
            .all(|s| s.model_id.starts_with("DIG"))
    );
    assert!(
        plan.category(EquipmentCategory::BiomassSecondary)
            .all(|s| s.model_id.starts_with("BGE"))
    );
}
