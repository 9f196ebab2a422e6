//! Supply-stability sub-scores: reserve margin, storage use, and source diversity.

use super::Band;

pub const RESERVE_MAX: f64 = 8.0;
pub const ESS_MAX: f64 = 6.0;
pub const DIVERSITY_MAX: f64 = 6.0;

/// Variance of three shares when one source supplies everything.
const MAX_SHARE_VARIANCE: f64 = 2.0 / 9.0;

/// Share of firm capacity a wind or solar MW counts for in the reserve margin.
pub const WIND_CAPACITY_CREDIT: f64 = 0.15;
pub const SOLAR_CAPACITY_CREDIT: f64 = 0.05;

/// `(firm − peak) / peak`, with firm capacity credited per technology.
pub fn reserve_margin(
    wind_mw: f64,
    solar_mw: f64,
    biomass_mw: f64,
    battery_power_mw: f64,
    peak_load_mw: f64,
) -> f64 {
    if peak_load_mw <= 0.0 {
        return 0.0;
    }
    let firm = biomass_mw
        + battery_power_mw
        + WIND_CAPACITY_CREDIT * wind_mw
        + SOLAR_CAPACITY_CREDIT * solar_mw;
    (firm - peak_load_mw) / peak_load_mw
}

/// Full marks inside the band, zero once 0.5 away from it.
pub fn reserve_score(margin: f64, band: &Band) -> f64 {
    RESERVE_MAX * (1.0 - (band.distance(margin) / 0.5).min(1.0))
}

/// Full marks inside the band, zero once 0.6 away from it.
pub fn ess_score(utilisation: f64, band: &Band) -> f64 {
    ESS_MAX * (1.0 - (band.distance(utilisation) / 0.6).min(1.0))
}

/// `6 · (1 − var / var_max)` over the wind, solar, and biomass generation shares.
pub fn diversity_score(wind_mwh: f64, solar_mwh: f64, biomass_mwh: f64) -> f64 {
    let total = wind_mwh + solar_mwh + biomass_mwh;
    if total <= 0.0 {
        return 0.0;
    }
    let mean = 1.0 / 3.0;
    let variance = [wind_mwh, solar_mwh, biomass_mwh]
        .iter()
        .map(|e| (e / total - mean).powi(2))
        .sum::<f64>()
        / 3.0;
    (DIVERSITY_MAX * (1.0 - variance / MAX_SHARE_VARIANCE)).clamp(0.0, DIVERSITY_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringPolicy;

    #[test]
    fn reserve_margin_credits_firm_sources() {
        // 10 biomass + 2 battery + 0.15·20 wind = 15 vs 12 peak
        let m = reserve_margin(20.0, 0.0, 10.0, 2.0, 12.0);
        assert!((m - 0.25).abs() < 1e-12);
        assert_eq!(reserve_margin(1.0, 1.0, 1.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn reserve_score_in_and_out_of_band() {
        let band = ScoringPolicy::default().reserve_margin_band;
        assert_eq!(reserve_score(0.2, &band), 8.0);
        assert!((reserve_score(0.5, &band) - 4.0).abs() < 1e-9);
        assert_eq!(reserve_score(-1.0, &band), 0.0);
    }

    #[test]
    fn ess_score_band() {
        let band = ScoringPolicy::default().ess_utilisation_band;
        assert_eq!(ess_score(0.7, &band), 6.0);
        assert_eq!(ess_score(0.0, &band), 0.0);
    }

    #[test]
    fn diversity_extremes() {
        assert!((diversity_score(1.0, 1.0, 1.0) - 6.0).abs() < 1e-9);
        assert!(diversity_score(5.0, 0.0, 0.0).abs() < 1e-9);
        assert_eq!(diversity_score(0.0, 0.0, 0.0), 0.0);
    }
}
