//! Common types and traits for generation models.

use crate::resource::ResourceSample;

/// Contextual information passed to generators for one simulated hour.
pub struct HourContext<'a> {
    /// Hour of the year (0..8760).
    pub hour: usize,
    /// Resource conditions for this hour.
    pub sample: &'a ResourceSample,
}

impl<'a> HourContext<'a> {
    pub fn new(hour: usize, sample: &'a ResourceSample) -> Self {
        Self { hour, sample }
    }
}

/// A generation technology that turns resource conditions into power.
///
/// Implementations are stateless: the same context and installed capacity
/// always yield the same output, so one model can be shared across threads.
pub trait Generator {
    /// Electrical output (MW) of `installed_mw` of this technology.
    ///
    /// Never negative and never above `installed_mw`.
    fn power_mw(&self, installed_mw: f64, context: &HourContext<'_>) -> f64;

    /// Returns a human-readable name for the technology.
    fn source_type(&self) -> &'static str;
}

/// Clamps a non-finite or negative value to zero.
pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
