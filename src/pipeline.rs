//! Conversion pipeline service
//!
//! One periodic update cycle: pull fresh inputs from the sensor ports,
//! convert them under the current calibration state, and hand the result
//! to the publish sink. Invoked by the host scheduler at a fixed period;
//! cycles never overlap.

use crate::domain::{convert, ConversionPath, EcCalibration, EcReading, MeasurementSample};
use crate::ports::diagnostics::{DiagnosticEvent, DiagnosticsPort};
use crate::ports::publish::PublishSink;
use crate::ports::sensor::{TemperatureSensorPort, VoltageSensorPort};

/// Conversion pipeline: input adapter + conversion + publish, per tick
pub struct ConversionPipeline<V, T, P, D> {
    voltage_source: V,
    temperature_source: T,
    sink: P,
    diag: D,
}

impl<V, T, P, D> ConversionPipeline<V, T, P, D>
where
    V: VoltageSensorPort,
    T: TemperatureSensorPort,
    P: PublishSink,
    D: DiagnosticsPort,
{
    /// Wire the pipeline to its collaborators
    pub fn new(voltage_source: V, temperature_source: T, sink: P, diag: D) -> Self {
        Self {
            voltage_source,
            temperature_source,
            sink,
            diag,
        }
    }

    /// Run one update cycle under the given calibration state
    ///
    /// Returns the published sample and reading, or `None` when the cycle
    /// was skipped because no voltage reading was available. The output is
    /// deliberately not clamped; negative or implausible values pass
    /// through to the sink unchanged.
    pub fn run_cycle(
        &mut self,
        calibration: &EcCalibration,
    ) -> Option<(MeasurementSample, EcReading)> {
        if !self.voltage_source.has_reading() {
            self.diag.record(DiagnosticEvent::NoVoltageReading);
            return None;
        }

        let voltage = self.voltage_source.read_voltage();
        let sample = MeasurementSample::new(voltage, self.temperature_source.read_celsius());
        if sample.temperature_defaulted {
            self.diag.record(DiagnosticEvent::TemperatureInvalid);
        }

        let reading = convert(&sample, calibration);
        match reading.path {
            ConversionPath::Default => {
                self.diag.record(DiagnosticEvent::CalibrationIncomplete);
                self.diag.record(DiagnosticEvent::DefaultConversion {
                    voltage_v: sample.voltage_v,
                    temperature_c: sample.temperature_c,
                    ec_ms: reading.millisiemens,
                });
            }
            ConversionPath::TwoPoint => {
                self.diag.record(DiagnosticEvent::CalibratedConversion {
                    voltage_v: sample.voltage_v,
                    temperature_c: sample.temperature_c,
                    ec_us: reading.millisiemens * 1000.0,
                    ec_ms: reading.millisiemens,
                });
            }
        }

        self.sink.publish(reading.millisiemens);
        Some((sample, reading))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::diag::RecordingDiagnostics;
    use crate::adapters::memory_store::MemorySlotStore;
    use crate::engine::CalibrationEngine;

    struct FakeVoltage {
        available: bool,
        volts: f32,
    }

    impl VoltageSensorPort for FakeVoltage {
        fn has_reading(&self) -> bool {
            self.available
        }
        fn read_voltage(&mut self) -> f32 {
            self.volts
        }
    }

    struct FakeTemperature(f32);

    impl TemperatureSensorPort for FakeTemperature {
        fn read_celsius(&mut self) -> f32 {
            self.0
        }
    }

    #[derive(Default)]
    struct CapturingSink(Vec<f32>);

    impl PublishSink for CapturingSink {
        fn publish(&mut self, ec_ms: f32) {
            self.0.push(ec_ms);
        }
    }

    fn pipeline(
        available: bool,
        volts: f32,
        celsius: f32,
    ) -> ConversionPipeline<FakeVoltage, FakeTemperature, CapturingSink, RecordingDiagnostics> {
        ConversionPipeline::new(
            FakeVoltage { available, volts },
            FakeTemperature(celsius),
            CapturingSink::default(),
            RecordingDiagnostics::new(),
        )
    }

    #[test]
    fn missing_reading_skips_the_cycle() {
        let mut p = pipeline(false, 0.0, 25.0);
        assert!(p.run_cycle(&EcCalibration::new()).is_none());
        assert!(p.sink.0.is_empty());
        assert_eq!(p.diag.events(), &[DiagnosticEvent::NoVoltageReading]);
    }

    #[test]
    fn uncalibrated_cycle_publishes_default_mapping() {
        let mut p = pipeline(true, 1.7, 25.0);
        let (_, reading) = p.run_cycle(&EcCalibration::new()).unwrap();
        assert_eq!(reading.path, ConversionPath::Default);
        assert_eq!(p.sink.0.len(), 1);
        assert!((p.sink.0[0] - 7.5).abs() < 1e-4);
        assert!(p
            .diag
            .events()
            .contains(&DiagnosticEvent::CalibrationIncomplete));
    }

    #[test]
    fn calibrated_cycle_publishes_interpolated_value() {
        let mut engine =
            CalibrationEngine::restore(MemorySlotStore::new(), RecordingDiagnostics::new());
        engine.calibrate_low(0.5);
        engine.calibrate_high(2.0);

        let mut p = pipeline(true, 1.0, 25.0);
        let (_, reading) = p.run_cycle(engine.calibration()).unwrap();
        assert_eq!(reading.path, ConversionPath::TwoPoint);
        assert!((p.sink.0[0] - 5.2363).abs() < 1e-3);
    }

    #[test]
    fn nan_temperature_is_substituted_and_cycle_proceeds() {
        let mut p = pipeline(true, 1.7, f32::NAN);
        let (sample, reading) = p.run_cycle(&EcCalibration::new()).unwrap();
        assert_eq!(sample.temperature_c, 25.0);
        // Factor is 1.0, so output equals the non-compensated raw value
        assert!((reading.millisiemens - 7.5).abs() < 1e-4);
        assert!(p
            .diag
            .events()
            .contains(&DiagnosticEvent::TemperatureInvalid));
    }

    #[test]
    fn reset_indicator_routes_cycles_through_default_path() {
        let mut engine =
            CalibrationEngine::restore(MemorySlotStore::new(), RecordingDiagnostics::new());
        engine.calibrate_low(0.5);
        engine.calibrate_high(2.0);
        engine.reset_indicator();

        // Slope is still held internally...
        assert!((engine.calibration().slope() - 7644.6667).abs() < 0.01);

        // ...but the pipeline must publish through the default map
        let mut p = pipeline(true, 1.0, 25.0);
        let (_, reading) = p.run_cycle(engine.calibration()).unwrap();
        assert_eq!(reading.path, ConversionPath::Default);
        assert!((p.sink.0[0] - 1.0 * (15.0 / 3.4)).abs() < 1e-4);
    }
}
