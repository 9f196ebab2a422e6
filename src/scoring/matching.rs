//! Equipment-to-resource matching sub-scores, each worth up to 5 points.

use crate::region::BiomassRoute;

use super::{Band, ScoringPolicy};

pub const SUB_SCORE_MAX: f64 = 5.0;

/// Rewards turbines whose cut-in speed sits well below the regional average wind.
pub fn cut_in_score(avg_wind_speed: f64, cut_in_ms: f64, policy: &ScoringPolicy) -> f64 {
    if policy.cut_in_margin_ms <= 0.0 {
        return if avg_wind_speed > cut_in_ms { SUB_SCORE_MAX } else { 0.0 };
    }
    let margin = avg_wind_speed - cut_in_ms;
    (SUB_SCORE_MAX * margin / policy.cut_in_margin_ms).clamp(0.0, SUB_SCORE_MAX)
}

/// Inverter AC over panel DC.
pub fn ac_dc_score(ratio: f64, band: &Band) -> f64 {
    (SUB_SCORE_MAX - 25.0 * band.distance(ratio)).max(0.0)
}

/// Storage hours at peak load; one point lost per hour outside the band.
pub fn duration_score(hours: f64, band: &Band) -> f64 {
    (SUB_SCORE_MAX - band.distance(hours)).max(0.0)
}

pub fn route_score(chosen: BiomassRoute, recommended: BiomassRoute) -> f64 {
    if chosen == recommended { SUB_SCORE_MAX } else { 2.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_in_margin_scales_linearly() {
        let p = ScoringPolicy::default();
        assert_eq!(cut_in_score(6.0, 3.0, &p), 5.0);
        assert!((cut_in_score(4.0, 3.0, &p) - 2.5).abs() < 1e-12);
        assert_eq!(cut_in_score(2.0, 3.0, &p), 0.0);
    }

    #[test]
    fn ac_dc_inside_band_is_full() {
        let band = ScoringPolicy::default().ac_dc_band;
        assert_eq!(ac_dc_score(1.05, &band), 5.0);
        assert!((ac_dc_score(1.2, &band) - 2.5).abs() < 1e-9);
        assert_eq!(ac_dc_score(2.0, &band), 0.0);
    }

    #[test]
    fn duration_decays_per_hour() {
        let band = ScoringPolicy::default().battery_duration_band;
        assert_eq!(duration_score(6.0, &band), 5.0);
        assert_eq!(duration_score(2.0, &band), 3.0);
        assert_eq!(duration_score(12.0, &band), 1.0);
    }

    #[test]
    fn route_mismatch_scores_two() {
        assert_eq!(
            route_score(BiomassRoute::Gasification, BiomassRoute::Gasification),
            5.0
        );
        assert_eq!(
            route_score(BiomassRoute::DirectCombustion, BiomassRoute::Gasification),
            2.0
        );
    }
}
