//! Measurement sample entity

/// Reference temperature for EC compensation, in °C
pub const REFERENCE_TEMPERATURE_C: f32 = 25.0;

/// One cycle's validated inputs: probe voltage plus water temperature.
///
/// Ephemeral; owned by the conversion pipeline for the duration of a single
/// update and rebuilt from the upstream sensors every cycle.
#[derive(Clone, Copy, Debug, defmt::Format)]
pub struct MeasurementSample {
    /// Probe voltage in volts
    pub voltage_v: f32,
    /// Water temperature in °C, defaulted to 25.0 when the upstream
    /// reading was non-finite
    pub temperature_c: f32,
    /// True when the temperature default was substituted
    pub temperature_defaulted: bool,
}

impl MeasurementSample {
    /// Build a sample, validating the temperature reading
    ///
    /// A NaN or infinite temperature is replaced with 25 °C, which makes the
    /// compensation factor exactly 1.0 (no compensation).
    pub fn new(voltage_v: f32, temperature_c: f32) -> Self {
        if temperature_c.is_finite() {
            Self {
                voltage_v,
                temperature_c,
                temperature_defaulted: false,
            }
        } else {
            Self {
                voltage_v,
                temperature_c: REFERENCE_TEMPERATURE_C,
                temperature_defaulted: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_temperature_is_kept() {
        let s = MeasurementSample::new(1.0, 18.5);
        assert_eq!(s.temperature_c, 18.5);
        assert!(!s.temperature_defaulted);
    }

    #[test]
    fn nan_temperature_defaults_to_reference() {
        let s = MeasurementSample::new(1.0, f32::NAN);
        assert_eq!(s.temperature_c, REFERENCE_TEMPERATURE_C);
        assert!(s.temperature_defaulted);
    }

    #[test]
    fn infinite_temperature_defaults_to_reference() {
        let s = MeasurementSample::new(1.0, f32::INFINITY);
        assert_eq!(s.temperature_c, REFERENCE_TEMPERATURE_C);
        assert!(s.temperature_defaulted);
    }
}
