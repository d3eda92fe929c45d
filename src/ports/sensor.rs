//! Sensor ports - abstractions for the upstream readings
//!
//! The EC pipeline pulls two values per cycle: the probe voltage from an
//! ADC-backed source and the water temperature from a companion sensor.
//! These traits keep the pipeline independent of the concrete hardware
//! (external ADC, onboard ADC channel, mock, etc.).

/// Port for the ADC-backed probe voltage source
///
/// The pipeline only calls [`read_voltage`](Self::read_voltage) after
/// [`has_reading`](Self::has_reading) reports true; a source that has not
/// produced a value yet simply answers false and the cycle is skipped.
pub trait VoltageSensorPort {
    /// Whether a valid reading is currently available
    fn has_reading(&self) -> bool;

    /// Latest probe voltage, in volts
    fn read_voltage(&mut self) -> f32;
}

/// Port for the water temperature source
///
/// The returned value may be non-finite (sensor not ready, wire fault);
/// the pipeline detects this and substitutes the 25 °C reference.
pub trait TemperatureSensorPort {
    /// Latest water temperature, in °C
    fn read_celsius(&mut self) -> f32;
}
