use crate::devices::types::{Generator, HourContext, non_negative};
use crate::sim::types::DispatchPolicy;

/// Standard test condition cell temperature (°C).
const STC_TEMPERATURE_C: f64 = 25.0;
/// Cell heating above ambient at full normalised irradiance (°C).
const CELL_HEATING_C: f64 = 25.0;
/// Upper bound on the temperature derate (cold, bright conditions).
const MAX_TEMPERATURE_FACTOR: f64 = 1.1;

/// A photovoltaic array modelled on normalised irradiance.
///
/// `power = installed × irradiance × panel_efficiency × inverter_efficiency × loss_factor`,
/// where `panel_efficiency` is the cell temperature derate relative to STC.
/// Irradiance arrives already weather and season adjusted.
#[derive(Debug, Clone)]
pub struct SolarArray {
    /// DC-to-AC conversion efficiency.
    pub inverter_efficiency: f64,
    /// Soiling, wiring, and mismatch losses combined.
    pub loss_factor: f64,
    /// Power temperature coefficient (per °C, negative).
    pub temp_coefficient: f64,
}

impl SolarArray {
    pub fn new(policy: &DispatchPolicy) -> Self {
        Self {
            inverter_efficiency: policy.inverter_efficiency,
            loss_factor: policy.loss_factor,
            temp_coefficient: policy.temp_coefficient,
        }
    }

    /// Temperature derate `1 + γ(T_cell − 25)` with `T_cell = T_amb + 25·irr`.
    pub fn panel_efficiency(&self, irradiance: f64, ambient_c: f64) -> f64 {
        let cell = ambient_c + CELL_HEATING_C * irradiance;
        (1.0 + self.temp_coefficient * (cell - STC_TEMPERATURE_C)).clamp(0.0, MAX_TEMPERATURE_FACTOR)
    }

    /// Output per MW of installed DC capacity.
    pub fn capacity_factor(&self, irradiance: f64, ambient_c: f64) -> f64 {
        let irr = non_negative(irradiance);
        if irr == 0.0 {
            return 0.0;
        }
        let ambient = if ambient_c.is_finite() { ambient_c } else { STC_TEMPERATURE_C };
        non_negative(
            irr * self.panel_efficiency(irr, ambient) * self.inverter_efficiency * self.loss_factor,
        )
        .min(1.0)
    }
}

impl Generator for SolarArray {
    fn power_mw(&self, installed_mw: f64, context: &HourContext<'_>) -> f64 {
        let s = context.sample;
        non_negative(installed_mw) * self.capacity_factor(s.irradiance, s.temperature)
    }

    fn source_type(&self) -> &'static str {
        "Solar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceSample;

    fn array() -> SolarArray {
        SolarArray::new(&DispatchPolicy::default())
    }

    fn ctx(sample: &ResourceSample) -> HourContext<'_> {
        HourContext::new(0, sample)
    }

    #[test]
    fn no_output_without_sun() {
        let s = ResourceSample {
            irradiance: 0.0,
            temperature: 30.0,
            ..Default::default()
        };
        assert_eq!(array().power_mw(50.0, &ctx(&s)), 0.0);
    }

    #[test]
    fn stc_output_matches_chain_losses() {
        // irr = 1.0, ambient 0 °C -> cell at 25 °C, no temperature derate
        let s = ResourceSample {
            irradiance: 1.0,
            temperature: 0.0,
            ..Default::default()
        };
        let p = array().power_mw(10.0, &ctx(&s));
        assert!((p - 10.0 * 0.97 * 0.90).abs() < 1e-9);
    }

    #[test]
    fn hot_cells_derate() {
        let a = array();
        assert!(a.panel_efficiency(1.0, 35.0) < 1.0);
        assert!((a.panel_efficiency(1.0, 35.0) - 0.86).abs() < 1e-9);
    }

    #[test]
    fn cold_cells_capped() {
        let a = array();
        assert!(a.panel_efficiency(0.1, -80.0) <= MAX_TEMPERATURE_FACTOR);
    }

    #[test]
    fn never_exceeds_installed() {
        let a = array();
        for t in [-20.0, 0.0, 25.0, 45.0] {
            for irr in [0.2, 0.8, 1.1] {
                let s = ResourceSample {
                    irradiance: irr,
                    temperature: t,
                    ..Default::default()
                };
                let p = a.power_mw(1.0, &ctx(&s));
                assert!((0.0..=1.0).contains(&p), "irr {irr} T {t}: {p}");
            }
        }
    }
}
