//! Power models for each technology in the hybrid plant.

/// Battery bank state-of-charge model.
pub mod battery;
/// Dispatchable biomass plant with a daily run window.
pub mod biomass;
/// Temperature-derated photovoltaic array.
pub mod solar;
pub mod types;
/// Turbine power curves (cubic, Cp table, analytic Cp(λ)).
pub mod wind;

// Re-export the main types for convenience
pub use battery::BatteryBank;
pub use biomass::BiomassPlant;
pub use solar::SolarArray;
pub use types::{Generator, HourContext};
pub use wind::WindPowerCurve;
