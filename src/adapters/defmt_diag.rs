//! defmt-backed diagnostics sink
//!
//! Routes diagnostic events to the RTT log at the severity the event
//! declares, formatting each in the shape the operator expects to read.

use crate::ports::diagnostics::{DiagnosticEvent, DiagnosticsPort};

/// Diagnostics sink emitting through `defmt`
#[derive(Clone, Copy, Debug, Default)]
pub struct DefmtDiagnostics;

impl DiagnosticsPort for DefmtDiagnostics {
    fn record(&mut self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::NoVoltageReading => {
                defmt::warn!("EC probe: no valid voltage reading yet, skipping cycle");
            }
            DiagnosticEvent::TemperatureInvalid => {
                defmt::warn!("EC probe: water temperature invalid, defaulting to 25 C");
            }
            DiagnosticEvent::CalibrationIncomplete => {
                defmt::warn!("EC probe: calibration not complete, using default conversion");
            }
            DiagnosticEvent::DefaultConversion {
                voltage_v,
                temperature_c,
                ec_ms,
            } => {
                defmt::debug!(
                    "EC default conversion: {} V @ {} C -> {} mS/cm",
                    voltage_v,
                    temperature_c,
                    ec_ms
                );
            }
            DiagnosticEvent::CalibratedConversion {
                voltage_v,
                temperature_c,
                ec_us,
                ec_ms,
            } => {
                defmt::debug!(
                    "EC calibrated conversion: {} V @ {} C -> {} uS/cm, {} mS/cm",
                    voltage_v,
                    temperature_c,
                    ec_us,
                    ec_ms
                );
            }
            DiagnosticEvent::LowPointStored { voltage_v } => {
                defmt::debug!("EC calibration: stored {} V for 1413 uS/cm", voltage_v);
            }
            DiagnosticEvent::HighPointStored { voltage_v } => {
                defmt::debug!("EC calibration: stored {} V for 12.88 mS/cm", voltage_v);
            }
            DiagnosticEvent::CalibrationPointMissing => {
                defmt::warn!("EC calibration: both reference points are needed");
            }
            DiagnosticEvent::DegenerateCalibration { voltage_v } => {
                defmt::warn!(
                    "EC calibration: both points at {} V, keeping previous slope",
                    voltage_v
                );
            }
            DiagnosticEvent::SlopeRecomputed { slope } => {
                defmt::debug!("EC calibration completed: K-value = {}", slope);
            }
            DiagnosticEvent::IndicatorReset => {
                defmt::debug!("EC calibration indicator reset");
            }
            DiagnosticEvent::SlopeRestored { slope } => {
                defmt::debug!("EC probe: restored K-value = {}", slope);
            }
            DiagnosticEvent::IndicatorRestored { indicator } => {
                defmt::debug!("EC probe: restored calibration indicator = {}", indicator);
            }
            DiagnosticEvent::PersistFailed { slot } => {
                defmt::warn!("EC probe: failed to persist {}, state kept in memory", slot);
            }
        }
    }
}
