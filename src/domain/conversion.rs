//! Voltage-to-EC conversion math
//!
//! Two conversion paths share the same temperature compensation:
//!
//! - **Default**: until the probe is calibrated, 0–3.4 V maps linearly to
//!   0–15 mS/cm.
//! - **Two-point**: once calibrated, EC is interpolated from the low
//!   reference anchor using the derived slope.

use crate::domain::calibration::{EcCalibration, LOW_REFERENCE_US};
use crate::domain::sample::{MeasurementSample, REFERENCE_TEMPERATURE_C};

/// Linear EC temperature coefficient per °C of deviation from 25 °C
pub const TEMPERATURE_COEFFICIENT: f32 = 0.0185;

/// Full-scale voltage of the default (uncalibrated) map
pub const DEFAULT_RANGE_V: f32 = 3.4;

/// Full-scale EC of the default map, in mS/cm
pub const DEFAULT_FULL_SCALE_MS: f32 = 15.0;

/// Which conversion path produced a reading
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum ConversionPath {
    /// Fixed default linear map (probe not calibrated)
    Default,
    /// Two-point interpolation anchored at the low reference
    TwoPoint,
}

/// A converted, compensated EC value
#[derive(Clone, Copy, Debug, defmt::Format)]
pub struct EcReading {
    /// EC in mS/cm. Not clamped: negative or implausible values pass
    /// through unchanged.
    pub millisiemens: f32,
    /// Path used for this reading
    pub path: ConversionPath,
}

/// Temperature compensation factor relative to 25 °C
#[inline]
pub fn compensation_factor(temperature_c: f32) -> f32 {
    1.0 + TEMPERATURE_COEFFICIENT * (temperature_c - REFERENCE_TEMPERATURE_C)
}

/// Convert a validated sample into an EC reading
///
/// Takes the calibrated path only when the calibration reports itself
/// complete; a restored-but-not-recalibrated state (indicator set, points
/// unset) falls back to the default map because the low anchor voltage is
/// session-only.
pub fn convert(sample: &MeasurementSample, calibration: &EcCalibration) -> EcReading {
    let factor = compensation_factor(sample.temperature_c);

    if calibration.is_calibrated() {
        let ec_us = LOW_REFERENCE_US
            + (sample.voltage_v - calibration.low_point_v()) * calibration.slope();
        EcReading {
            millisiemens: ec_us / factor / 1000.0,
            path: ConversionPath::TwoPoint,
        }
    } else {
        let ec_ms = sample.voltage_v * (DEFAULT_FULL_SCALE_MS / DEFAULT_RANGE_V);
        EcReading {
            millisiemens: ec_ms / factor,
            path: ConversionPath::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrated_05_20() -> EcCalibration {
        let mut cal = EcCalibration::new();
        cal.set_low_point(0.5);
        cal.set_high_point(2.0);
        cal.recompute_slope();
        cal
    }

    #[test]
    fn factor_is_unity_at_reference_temperature() {
        assert_eq!(compensation_factor(25.0), 1.0);
    }

    #[test]
    fn default_path_maps_full_range() {
        // 1.7 V is half of 3.4 V, so exactly half of 15 mS/cm
        let sample = MeasurementSample::new(1.7, 25.0);
        let reading = convert(&sample, &EcCalibration::new());
        assert_eq!(reading.path, ConversionPath::Default);
        assert!((reading.millisiemens - 7.5).abs() < 1e-4);
    }

    #[test]
    fn default_path_is_monotonic_in_voltage() {
        let cal = EcCalibration::new();
        let mut previous = f32::MIN;
        for step in 0..=34 {
            let v = step as f32 * 0.1;
            let ec = convert(&MeasurementSample::new(v, 25.0), &cal).millisiemens;
            assert!(ec > previous);
            previous = ec;
        }
    }

    #[test]
    fn calibrated_path_interpolates_from_low_anchor() {
        // 1413 + (1.0 - 0.5) * 7644.67 ≈ 5236.3 µS/cm → 5.236 mS/cm
        let cal = calibrated_05_20();
        let sample = MeasurementSample::new(1.0, 25.0);
        let reading = convert(&sample, &cal);
        assert_eq!(reading.path, ConversionPath::TwoPoint);
        assert!((reading.millisiemens - 5.2363).abs() < 1e-3);
    }

    #[test]
    fn compensation_divides_raw_value() {
        let cal = calibrated_05_20();
        let at_25 = convert(&MeasurementSample::new(1.0, 25.0), &cal).millisiemens;
        let at_30 = convert(&MeasurementSample::new(1.0, 30.0), &cal).millisiemens;
        let expected = at_25 / (1.0 + TEMPERATURE_COEFFICIENT * 5.0);
        assert!((at_30 - expected).abs() < 1e-5);
    }

    #[test]
    fn defaulted_temperature_means_no_compensation() {
        let cal = calibrated_05_20();
        let nan_temp = convert(&MeasurementSample::new(1.0, f32::NAN), &cal).millisiemens;
        let at_ref = convert(&MeasurementSample::new(1.0, 25.0), &cal).millisiemens;
        assert_eq!(nan_temp, at_ref);
    }

    #[test]
    fn cleared_indicator_routes_to_default_path() {
        let mut cal = calibrated_05_20();
        cal.clear_indicator();
        let reading = convert(&MeasurementSample::new(1.0, 25.0), &cal);
        // Slope is still held internally, but calibrated output is suppressed
        assert_eq!(reading.path, ConversionPath::Default);
        assert!((reading.millisiemens - 1.0 * (15.0 / 3.4)).abs() < 1e-4);
    }

    #[test]
    fn negative_output_passes_through_unclamped() {
        // Voltage below the low anchor can produce a negative EC; the
        // pipeline publishes it unchanged.
        let mut cal = EcCalibration::new();
        cal.set_low_point(1.0);
        cal.set_high_point(1.1);
        cal.recompute_slope();
        let reading = convert(&MeasurementSample::new(0.2, 25.0), &cal);
        assert!(reading.millisiemens < 0.0);
    }
}
