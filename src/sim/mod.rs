/// Dispatch simulator over a prepared year.
pub mod engine;
pub mod kpi;
pub mod types;

pub use engine::{PreparedSeries, Simulator};
pub use kpi::SimulationResult;
pub use types::{CapacityCandidate, DispatchPolicy, EnergyRatio, HourRecord};
