//! Diagnostics port - structured warn/debug events
//!
//! Engine and pipeline report what happened through typed events rather
//! than format strings, so an embedded adapter can route them to defmt
//! while a test double records them for assertions.

use crate::ports::persistence::Slot;

/// Event severity as consumed by the host logger
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Severity {
    Warning,
    Debug,
}

/// Everything the driver reports about itself
#[derive(Clone, Copy, Debug, PartialEq, defmt::Format)]
pub enum DiagnosticEvent {
    /// The voltage source has no valid reading yet; cycle skipped
    NoVoltageReading,
    /// Water temperature was non-finite and 25 °C was substituted
    TemperatureInvalid,
    /// Calibration incomplete; this cycle used the default conversion
    CalibrationIncomplete,
    /// Default-path conversion result for one cycle
    DefaultConversion {
        voltage_v: f32,
        temperature_c: f32,
        ec_ms: f32,
    },
    /// Calibrated-path conversion result for one cycle
    CalibratedConversion {
        voltage_v: f32,
        temperature_c: f32,
        ec_us: f32,
        ec_ms: f32,
    },
    /// Operator stored the low (1413 µS/cm) point voltage
    LowPointStored { voltage_v: f32 },
    /// Operator stored the high (12.88 mS/cm) point voltage
    HighPointStored { voltage_v: f32 },
    /// Slope recomputation skipped: a reference point is still missing
    CalibrationPointMissing,
    /// Slope recomputation skipped: both points carry the same voltage
    DegenerateCalibration { voltage_v: f32 },
    /// Calibration completed with a freshly derived K-value
    SlopeRecomputed { slope: f32 },
    /// Calibrated indicator cleared by operator reset
    IndicatorReset,
    /// A persisted value was restored at startup
    SlopeRestored { slope: f32 },
    /// The persisted indicator was restored at startup
    IndicatorRestored { indicator: bool },
    /// Saving a slot failed; in-memory state advanced anyway
    PersistFailed { slot: Slot },
}

impl DiagnosticEvent {
    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticEvent::NoVoltageReading
            | DiagnosticEvent::TemperatureInvalid
            | DiagnosticEvent::CalibrationIncomplete
            | DiagnosticEvent::CalibrationPointMissing
            | DiagnosticEvent::DegenerateCalibration { .. }
            | DiagnosticEvent::PersistFailed { .. } => Severity::Warning,
            _ => Severity::Debug,
        }
    }
}

/// Port for the diagnostics sink
///
/// Not part of core correctness: adapters may drop events entirely.
pub trait DiagnosticsPort {
    /// Record one event
    fn record(&mut self, event: DiagnosticEvent);
}
