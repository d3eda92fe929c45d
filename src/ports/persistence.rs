//! Persistence port - the two calibration slots
//!
//! The engine persists exactly two scalars: the derived slope and the
//! calibrated indicator. Each lives in its own independently addressed
//! slot, so a store can map them straight onto preference indices, NVS
//! keys or flash offsets.
//!
//! Failure contract: a failed load means "use the default"; a failed save
//! is reported through diagnostics and the in-memory state still advances.
//! The port never retries.

/// Addressed slots, mainly used to label save failures in diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Slot {
    /// Slot A: derived slope (f32)
    Slope,
    /// Slot B: calibrated indicator (bool)
    Indicator,
}

/// Port for persisting the derived calibration parameters
///
/// Operations are synchronous and bounded; the engine calls them from the
/// same logical thread as updates.
///
/// # Example Implementation
///
/// ```ignore
/// struct NvsStore { nvs: EspNvs<NvsDefault> }
///
/// impl CalibrationStore for NvsStore {
///     fn load_slope(&mut self) -> Option<f32> {
///         self.nvs.get_f32("ec_slope").ok().flatten()
///     }
///     fn save_slope(&mut self, slope: f32) -> bool {
///         self.nvs.set_f32("ec_slope", slope).is_ok()
///     }
///     // ... indicator slot ...
/// }
/// ```
pub trait CalibrationStore {
    /// Load the persisted slope, `None` when absent or unreadable
    fn load_slope(&mut self) -> Option<f32>;

    /// Save the slope; returns false on failure
    fn save_slope(&mut self, slope: f32) -> bool;

    /// Load the persisted indicator, `None` when absent or unreadable
    fn load_indicator(&mut self) -> Option<bool>;

    /// Save the indicator; returns false on failure
    fn save_indicator(&mut self, indicator: bool) -> bool;
}
