mod common;

use hybrid_sizer::catalog::EquipmentCatalog;
use hybrid_sizer::sim::{CapacityCandidate, DispatchPolicy, PreparedSeries, Simulator};

fn prepare(series: &hybrid_sizer::resource::HourlySeries, policy: &DispatchPolicy) -> PreparedSeries {
    let catalog = EquipmentCatalog::builtin();
    let region = common::biomass_region();
    let turbine = catalog
        .wind_turbine("WT-3000")
        .unwrap();
    PreparedSeries::prepare(series, &region, turbine, region.recommended_route(), policy)
}

#[test]
fn soc_stays_within_bounds_all_year() {
    let region = common::biomass_region();
    let series = common::profile_series(&region);
    let policy = DispatchPolicy::default();
    let prepared = prepare(&series, &policy);
    let sim = Simulator::new(&prepared, &policy);

    let candidate = CapacityCandidate::new(12.0, 15.0, 1.0, 60.0);
    let trace = sim.trace(&candidate).unwrap();
    assert_eq!(trace.len(), 8760);

    let lo = policy.soc_min * candidate.battery_mwh - 1e-9;
    let hi = policy.soc_max * candidate.battery_mwh + 1e-9;
    for r in &trace {
        assert!(
            r.soc_mwh >= lo && r.soc_mwh <= hi,
            "hour {}: soc {} outside [{lo}, {hi}]",
            r.hour,
            r.soc_mwh
        );
        assert!(r.unmet >= 0.0 && r.curtailed >= 0.0);
        assert!(r.charged == 0.0 || r.discharged == 0.0, "hour {} both charges and discharges", r.hour);
    }
}

#[test]
fn reliability_and_lpsp_are_complementary() {
    let region = common::biomass_region();
    let series = common::profile_series(&region);
    let policy = DispatchPolicy::default();
    let prepared = prepare(&series, &policy);
    let sim = Simulator::new(&prepared, &policy);

    for candidate in [
        CapacityCandidate::new(0.0, 0.0, 0.0, 0.0),
        CapacityCandidate::new(5.0, 5.0, 0.5, 20.0),
        CapacityCandidate::new(30.0, 30.0, 2.0, 120.0),
    ] {
        let result = sim.run(&candidate).unwrap();
        assert!((result.reliability + result.lpsp() - 1.0).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&result.reliability));
        assert!((0.0..=1.0).contains(&result.curtailment_rate));
        let r = result.energy_ratio;
        assert!((r.wind + r.solar + r.biomass - r.total).abs() < 1e-9);
        assert_eq!(result.feasible, result.reliability >= policy.feasibility_threshold);
    }
}

#[test]
fn more_capacity_never_lowers_reliability() {
    let region = common::biomass_region();
    let series = common::profile_series(&region);
    let policy = DispatchPolicy::default();
    let prepared = prepare(&series, &policy);
    let sim = Simulator::new(&prepared, &policy);

    let small = sim
        .run(&CapacityCandidate::new(5.0, 5.0, 0.0, 20.0))
        .unwrap();
    let large = sim
        .run(&CapacityCandidate::new(10.0, 10.0, 0.0, 20.0))
        .unwrap();
    assert!(large.reliability >= small.reliability);
}

#[test]
fn calm_region_yields_no_wind_energy_with_any_turbine() {
    // 2 m/s is below every catalog cut-in speed
    let series = common::constant_series(2.0, 0.6, 10.0);
    let region = common::test_region().with_avg_wind_speed(2.0);
    let policy = DispatchPolicy::default();
    let catalog = EquipmentCatalog::builtin();

    for turbine in &catalog.wind_turbines {
        let prepared =
            PreparedSeries::prepare(&series, &region, turbine, region.recommended_route(), &policy);
        assert_eq!(prepared.wind_full_load_hours(), 0.0, "{}", turbine.id);
        let result = Simulator::new(&prepared, &policy)
            .run(&CapacityCandidate::new(50.0, 20.0, 0.0, 40.0))
            .unwrap();
        assert_eq!(result.wind_generation_mwh, 0.0);
        assert_eq!(result.energy_ratio.wind, 0.0);
        assert!(result.solar_generation_mwh > 0.0);
        assert!(result.reliability.is_finite());
    }
}

#[test]
fn constant_surplus_is_fully_reliable() {
    let series = common::constant_series(12.0, 0.0, 10.0);
    let policy = DispatchPolicy::default();
    let prepared = prepare(&series, &policy);
    let sim = Simulator::new(&prepared, &policy);

    let result = sim
        .run(&CapacityCandidate::new(20.0, 0.0, 0.0, 0.0))
        .unwrap();
    assert_eq!(result.reliability, 1.0);
    assert_eq!(result.shortage_hours, 0);
    assert!(result.curtailed_mwh > 0.0);
}

#[test]
fn biomass_needs_feedstock_in_the_series() {
    // region reports 30 t/day, but the series delivers none
    let series = common::constant_series(0.0, 0.0, 10.0);
    let policy = DispatchPolicy::default();
    let prepared = prepare(&series, &policy);
    assert_eq!(prepared.biomass_sustained_mw(), 0.0);

    let result = Simulator::new(&prepared, &policy)
        .run(&CapacityCandidate::new(0.0, 0.0, 5.0, 0.0))
        .unwrap();
    assert_eq!(result.biomass_generation_mwh, 0.0);

    let fed = common::profile_series(&common::biomass_region());
    let prepared = prepare(&fed, &policy);
    let result = Simulator::new(&prepared, &policy)
        .run(&CapacityCandidate::new(0.0, 0.0, 5.0, 0.0))
        .unwrap();
    assert!(result.biomass_generation_mwh > 0.0);
}
