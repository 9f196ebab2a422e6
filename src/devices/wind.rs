use std::f64::consts::PI;

use crate::catalog::{WindCurveKind, WindTurbineModel};
use crate::devices::types::{Generator, HourContext, non_negative};
use crate::sim::types::DispatchPolicy;

/// Betz limit on the power coefficient.
pub const BETZ_LIMIT: f64 = 16.0 / 27.0;

/// Wind speeds (m/s) at which [`CP_TABLE`] is sampled.
const CP_TABLE_START_MS: f64 = 3.0;
/// Power coefficient of a modern three-blade rotor from 3 to 17 m/s in 1 m/s steps.
const CP_TABLE: [f64; 15] = [
    0.30, 0.40, 0.44, 0.46, 0.47, 0.47, 0.46, 0.44, 0.40, 0.35, 0.30, 0.25, 0.21, 0.18, 0.15,
];

/// Power curve of a single turbine model.
///
/// Output is zero below cut-in and above cut-out, and flat at rated power
/// from rated speed up to cut-out. Between cut-in and rated speed the shape
/// depends on the model's [`WindCurveKind`].
#[derive(Debug, Clone)]
pub struct WindPowerCurve {
    /// Rated electrical output (MW).
    pub rated_power_mw: f64,
    pub cut_in_ms: f64,
    pub rated_speed_ms: f64,
    pub cut_out_ms: f64,
    pub kind: WindCurveKind,
    rotor_radius_m: f64,
    /// Rotor angular speed (rad/s).
    omega: f64,
    air_density: f64,
    /// Drivetrain × generator × converter efficiency.
    chain_efficiency: f64,
}

impl WindPowerCurve {
    /// Builds the curve for a catalog turbine using the policy's air density
    /// and conversion-chain efficiencies.
    pub fn from_model(model: &WindTurbineModel, policy: &DispatchPolicy) -> Self {
        Self {
            rated_power_mw: model.rated_power_mw.max(0.0),
            cut_in_ms: model.cut_in_ms,
            rated_speed_ms: model.rated_speed_ms,
            cut_out_ms: model.cut_out_ms,
            kind: model.curve,
            rotor_radius_m: model.rotor_diameter_m / 2.0,
            omega: model.rated_rpm * 2.0 * PI / 60.0,
            air_density: policy.air_density,
            chain_efficiency: policy.drivetrain_efficiency
                * policy.generator_efficiency
                * policy.converter_efficiency,
        }
    }

    /// Output of one turbine (MW) at wind speed `v`.
    pub fn turbine_power_mw(&self, v: f64) -> f64 {
        if !v.is_finite() || v < self.cut_in_ms || v > self.cut_out_ms {
            return 0.0;
        }
        if v >= self.rated_speed_ms {
            return self.rated_power_mw;
        }

        let p = match self.kind {
            WindCurveKind::Cubic => {
                let x = (v - self.cut_in_ms) / (self.rated_speed_ms - self.cut_in_ms);
                x.powi(3) * self.rated_power_mw
            }
            WindCurveKind::CpTable => self.physical_power_mw(v, cp_from_table(v)),
            WindCurveKind::Analytic => {
                self.physical_power_mw(v, cp_analytic(self.tip_speed_ratio(v), 0.0))
            }
        };
        non_negative(p).min(self.rated_power_mw)
    }

    /// Fraction of rated output at wind speed `v`.
    pub fn capacity_factor(&self, v: f64) -> f64 {
        if self.rated_power_mw <= 0.0 {
            return 0.0;
        }
        self.turbine_power_mw(v) / self.rated_power_mw
    }

    /// λ = ωR / v.
    pub fn tip_speed_ratio(&self, v: f64) -> f64 {
        if v <= 0.0 {
            return 0.0;
        }
        self.omega * self.rotor_radius_m / v
    }

    /// `P = 1/8 · Cp · η1η2η3 · ρ · π · D² · v³`, in MW.
    fn physical_power_mw(&self, v: f64, cp: f64) -> f64 {
        let diameter = 2.0 * self.rotor_radius_m;
        let watts = 0.125 * cp * self.chain_efficiency * self.air_density * PI * diameter.powi(2)
            * v.powi(3);
        watts / 1.0e6
    }
}

impl Generator for WindPowerCurve {
    fn power_mw(&self, installed_mw: f64, context: &HourContext<'_>) -> f64 {
        non_negative(installed_mw) * self.capacity_factor(context.sample.wind_speed)
    }

    fn source_type(&self) -> &'static str {
        "Wind"
    }
}

/// Cp interpolated from the 3-17 m/s table, clamped to the end values outside it.
pub fn cp_from_table(v: f64) -> f64 {
    let last = CP_TABLE.len() - 1;
    let x = v - CP_TABLE_START_MS;
    if x <= 0.0 {
        return CP_TABLE[0];
    }
    if x >= last as f64 {
        return CP_TABLE[last];
    }
    let i = x.floor() as usize;
    let frac = x - i as f64;
    CP_TABLE[i] + (CP_TABLE[i + 1] - CP_TABLE[i]) * frac
}

/// Empirical blade-element Cp(λ, β), clamped to `[0, Betz]`.
pub fn cp_analytic(lambda: f64, pitch_deg: f64) -> f64 {
    if lambda <= 0.0 || !lambda.is_finite() {
        return 0.0;
    }
    let inv_lambda_i = 1.0 / (lambda + 0.08 * pitch_deg) - 0.035 / (pitch_deg.powi(3) + 1.0);
    let cp = 0.5176 * (116.0 * inv_lambda_i - 0.4 * pitch_deg - 5.0) * (-21.0 * inv_lambda_i).exp()
        + 0.0068 * lambda;
    cp.clamp(0.0, BETZ_LIMIT)
}
