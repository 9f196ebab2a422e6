use crate::sim::types::DispatchPolicy;

/// A battery bank stepped in one-hour intervals.
///
/// State of charge is tracked in MWh and always stays inside
/// `[soc_min, soc_max]` of capacity, which lies within `[0, capacity]`.
/// Charge and discharge are limited by the C-rate power and by the energy
/// headroom, with one-way efficiencies applied on the way in and out.
#[derive(Debug, Clone)]
pub struct BatteryBank {
    /// Usable nameplate energy (MWh).
    pub capacity_mwh: f64,

    /// Stored energy (MWh).
    pub soc_mwh: f64,

    soc_min_mwh: f64,
    soc_max_mwh: f64,

    /// Maximum charge power (MW, positive).
    pub max_charge_mw: f64,

    /// Maximum discharge power (MW, positive).
    pub max_discharge_mw: f64,

    /// Charging efficiency (0..1.0).
    pub eta_c: f64,

    /// Discharging efficiency (0..1.0).
    pub eta_d: f64,
}

impl BatteryBank {
    /// Creates a bank of `capacity_mwh` at the policy's initial SOC.
    ///
    /// A non-positive or non-finite capacity gives an inert bank that never
    /// charges or discharges.
    pub fn new(capacity_mwh: f64, policy: &DispatchPolicy) -> Self {
        let capacity = if capacity_mwh.is_finite() {
            capacity_mwh.max(0.0)
        } else {
            0.0
        };
        let power = capacity * policy.c_rate;
        Self {
            capacity_mwh: capacity,
            soc_mwh: capacity * policy.initial_soc,
            soc_min_mwh: capacity * policy.soc_min,
            soc_max_mwh: capacity * policy.soc_max,
            max_charge_mw: power,
            max_discharge_mw: power,
            eta_c: policy.eta_charge,
            eta_d: policy.eta_discharge,
        }
    }

    /// State of charge as a fraction of capacity.
    pub fn soc_fraction(&self) -> f64 {
        if self.capacity_mwh > 0.0 {
            self.soc_mwh / self.capacity_mwh
        } else {
            0.0
        }
    }

    /// Absorbs up to `surplus_mw` for one hour; returns the energy taken from the bus.
    pub fn charge(&mut self, surplus_mw: f64) -> f64 {
        if surplus_mw <= 0.0 || self.soc_mwh >= self.soc_max_mwh || self.eta_c <= 0.0 {
            return 0.0;
        }
        let headroom = (self.soc_max_mwh - self.soc_mwh) / self.eta_c;
        let accepted = surplus_mw.min(self.max_charge_mw).min(headroom).max(0.0);

        self.soc_mwh = (self.soc_mwh + accepted * self.eta_c).min(self.soc_max_mwh);
        accepted
    }

    /// Supplies up to `deficit_mw` for one hour; returns the energy delivered to the bus.
    pub fn discharge(&mut self, deficit_mw: f64) -> f64 {
        if deficit_mw <= 0.0 || self.soc_mwh <= self.soc_min_mwh || self.eta_d <= 0.0 {
            return 0.0;
        }
        let available = (self.soc_mwh - self.soc_min_mwh) * self.eta_d;
        let delivered = deficit_mw.min(self.max_discharge_mw).min(available).max(0.0);

        self.soc_mwh = (self.soc_mwh - delivered / self.eta_d).max(self.soc_min_mwh);
        delivered
    }
}
