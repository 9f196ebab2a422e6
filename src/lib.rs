//! Capacity optimisation for hybrid wind/solar/biomass/battery power systems.
//!
//! Given a region and a year of hourly resource data, the crate enumerates
//! capacity candidates, simulates each against the load hour by hour, scores
//! the feasible ones, and turns the best into concrete equipment plans.

pub mod catalog;
pub mod cli;
pub mod config;
/// Power curve models for each generation technology and the battery.
pub mod devices;
pub mod economics;
pub mod error;
pub mod logging;
pub mod region;
pub mod resource;
pub mod scoring;
pub mod search;
pub mod selection;
/// Dispatch simulation and KPI aggregation.
pub mod sim;
pub mod solution;

pub use error::{Result, SizingError};
