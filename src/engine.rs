//! Calibration engine service
//!
//! Owns the [`EcCalibration`] state and the injected persistence and
//! diagnostics ports. Calibration entry points are invoked from the
//! operator control channel, never from the periodic tick; both run on the
//! same logical thread, so recording a point and recomputing the slope is
//! never interleaved with an update cycle.

use crate::domain::{EcCalibration, SlopeUpdate};
use crate::ports::diagnostics::{DiagnosticEvent, DiagnosticsPort};
use crate::ports::persistence::{CalibrationStore, Slot};

/// Calibration engine: state machine plus persistence of derived parameters
///
/// Persistence is best-effort throughout: a failed save is reported through
/// diagnostics and the in-memory state still advances, degrading to
/// memory-only calibration for the session.
pub struct CalibrationEngine<S, D> {
    calibration: EcCalibration,
    store: S,
    diag: D,
}

impl<S: CalibrationStore, D: DiagnosticsPort> CalibrationEngine<S, D> {
    /// Build an engine from persisted state, defaulting what cannot be read
    ///
    /// A missing or unreadable slot falls back to the uncalibrated default
    /// (slope 1.0, indicator false). Point voltages are session-only and
    /// always start unset.
    pub fn restore(mut store: S, mut diag: D) -> Self {
        let mut calibration = EcCalibration::new();

        if let Some(slope) = store.load_slope() {
            diag.record(DiagnosticEvent::SlopeRestored { slope });
            calibration = EcCalibration::restored(slope, calibration.indicator());
        }
        if let Some(indicator) = store.load_indicator() {
            diag.record(DiagnosticEvent::IndicatorRestored { indicator });
            calibration = EcCalibration::restored(calibration.slope(), indicator);
        }

        Self {
            calibration,
            store,
            diag,
        }
    }

    /// Record the voltage measured in the low (1413 µS/cm) reference
    ///
    /// Overwrites any previous low point and unconditionally triggers a
    /// slope recomputation. The voltage itself is not persisted.
    pub fn calibrate_low(&mut self, voltage: f32) {
        self.calibration.set_low_point(voltage);
        self.diag
            .record(DiagnosticEvent::LowPointStored { voltage_v: voltage });
        self.recompute();
    }

    /// Record the voltage measured in the high (12.88 mS/cm) reference
    pub fn calibrate_high(&mut self, voltage: f32) {
        self.calibration.set_high_point(voltage);
        self.diag
            .record(DiagnosticEvent::HighPointStored { voltage_v: voltage });
        self.recompute();
    }

    /// Clear the calibrated indicator and persist the cleared flag
    ///
    /// Points and slope are kept, but calibrated-mode output stays
    /// suppressed until the probe is legitimately recalibrated.
    pub fn reset_indicator(&mut self) {
        self.calibration.clear_indicator();
        if !self.store.save_indicator(false) {
            self.diag
                .record(DiagnosticEvent::PersistFailed { slot: Slot::Indicator });
        }
        self.diag.record(DiagnosticEvent::IndicatorReset);
    }

    /// True iff both points are set, distinct, and the indicator is set
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }

    /// Current calibration state, as consumed by the conversion pipeline
    pub fn calibration(&self) -> &EcCalibration {
        &self.calibration
    }

    fn recompute(&mut self) {
        match self.calibration.recompute_slope() {
            SlopeUpdate::Recomputed(slope) => {
                // Derived parameters are persisted together; each slot
                // failure is diagnostic-only.
                if !self.store.save_slope(slope) {
                    self.diag
                        .record(DiagnosticEvent::PersistFailed { slot: Slot::Slope });
                }
                if !self.store.save_indicator(true) {
                    self.diag
                        .record(DiagnosticEvent::PersistFailed { slot: Slot::Indicator });
                }
                self.diag.record(DiagnosticEvent::SlopeRecomputed { slope });
            }
            SlopeUpdate::PointMissing => {
                self.diag.record(DiagnosticEvent::CalibrationPointMissing);
            }
            SlopeUpdate::DegeneratePoints => {
                self.diag.record(DiagnosticEvent::DegenerateCalibration {
                    voltage_v: self.calibration.low_point_v(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::diag::RecordingDiagnostics;
    use crate::adapters::memory_store::MemorySlotStore;

    /// Store whose saves always fail, for the degraded-persistence path
    struct BrokenStore;

    impl CalibrationStore for BrokenStore {
        fn load_slope(&mut self) -> Option<f32> {
            None
        }
        fn save_slope(&mut self, _slope: f32) -> bool {
            false
        }
        fn load_indicator(&mut self) -> Option<bool> {
            None
        }
        fn save_indicator(&mut self, _indicator: bool) -> bool {
            false
        }
    }

    fn calibrated_engine(
        store: MemorySlotStore,
    ) -> CalibrationEngine<MemorySlotStore, RecordingDiagnostics> {
        let mut engine = CalibrationEngine::restore(store, RecordingDiagnostics::new());
        engine.calibrate_low(0.5);
        engine.calibrate_high(2.0);
        engine
    }

    #[test]
    fn full_calibration_sets_slope_and_indicator() {
        let engine = calibrated_engine(MemorySlotStore::new());
        assert!(engine.is_calibrated());
        assert!((engine.calibration().slope() - 7644.6667).abs() < 0.01);
    }

    #[test]
    fn derived_parameters_survive_restart() {
        let engine = calibrated_engine(MemorySlotStore::new());
        let slope_before = engine.calibration().slope();
        let store = engine.store.clone();

        // "Restart": a fresh engine over the same backing store
        let revived = CalibrationEngine::restore(store, RecordingDiagnostics::new());
        assert_eq!(revived.calibration().slope(), slope_before);
        assert!(revived.calibration().indicator());
        // Point voltages are session-only, so calibrated-mode output waits
        // for a recalibration.
        assert!(!revived.is_calibrated());
    }

    #[test]
    fn reset_indicator_persists_and_survives_restart() {
        let mut engine = calibrated_engine(MemorySlotStore::new());
        engine.reset_indicator();
        assert!(!engine.is_calibrated());
        let slope_before = engine.calibration().slope();
        let store = engine.store.clone();

        let revived = CalibrationEngine::restore(store, RecordingDiagnostics::new());
        assert!(!revived.calibration().indicator());
        assert!(!revived.is_calibrated());
        assert_eq!(revived.calibration().slope(), slope_before);
    }

    #[test]
    fn empty_store_yields_defaults() {
        let engine =
            CalibrationEngine::restore(MemorySlotStore::new(), RecordingDiagnostics::new());
        assert_eq!(engine.calibration().slope(), 1.0);
        assert!(!engine.is_calibrated());
    }

    #[test]
    fn save_failure_degrades_to_memory_only() {
        let mut engine = CalibrationEngine::restore(BrokenStore, RecordingDiagnostics::new());
        engine.calibrate_low(0.5);
        engine.calibrate_high(2.0);

        // In-memory state advanced despite every save failing
        assert!(engine.is_calibrated());
        assert!(engine
            .diag
            .events()
            .contains(&DiagnosticEvent::PersistFailed { slot: Slot::Slope }));
        assert!(engine
            .diag
            .events()
            .contains(&DiagnosticEvent::PersistFailed { slot: Slot::Indicator }));
    }

    #[test]
    fn single_point_reports_missing_companion() {
        let mut engine =
            CalibrationEngine::restore(MemorySlotStore::new(), RecordingDiagnostics::new());
        engine.calibrate_low(0.5);

        assert!(!engine.is_calibrated());
        assert!(engine
            .diag
            .events()
            .contains(&DiagnosticEvent::CalibrationPointMissing));
        // Nothing derived, nothing persisted
        assert_eq!(engine.store.load_slope(), None);
    }

    #[test]
    fn equal_points_report_degenerate_calibration() {
        let mut engine =
            CalibrationEngine::restore(MemorySlotStore::new(), RecordingDiagnostics::new());
        engine.calibrate_low(1.2);
        engine.calibrate_high(1.2);

        assert!(!engine.is_calibrated());
        assert!(engine
            .diag
            .events()
            .contains(&DiagnosticEvent::DegenerateCalibration { voltage_v: 1.2 }));
        assert_eq!(engine.calibration().slope(), 1.0);
    }

    #[test]
    fn completed_calibration_logs_k_value() {
        let engine = calibrated_engine(MemorySlotStore::new());
        let recomputed = engine
            .diag
            .events()
            .iter()
            .any(|e| matches!(e, DiagnosticEvent::SlopeRecomputed { .. }));
        assert!(recomputed);
    }
}
