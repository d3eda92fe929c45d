//! RP2350 ADC sensor adapters
//!
//! Two input adapters over the shared ADC block: the probe voltage on an
//! external ADC pin, and the water temperature approximated by the onboard
//! temperature sensor. The single `Adc` peripheral is shared through a
//! `RefCell`; reads are blocking and sequential on the one executor, a
//! conversion takes microseconds against an update period of seconds.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU16, Ordering};

use embassy_rp::adc::{Adc, Blocking, Channel as AdcChannel};

use crate::ports::sensor::{TemperatureSensorPort, VoltageSensorPort};

/// ADC full-scale reference voltage on the RP2350
const ADC_VREF_V: f32 = 3.3;

/// 12-bit conversion range
const ADC_FULL_SCALE: f32 = 4096.0;

/// Shared handle to the one ADC block
pub type SharedAdc<'a> = &'a RefCell<Adc<'a, Blocking>>;

/// Probe voltage source on an ADC input pin
///
/// Scales the raw 12-bit conversion to volts. Reports no reading until the
/// first successful conversion, which makes the pipeline skip early cycles
/// instead of publishing garbage.
pub struct AdcVoltageSource<'a> {
    adc: SharedAdc<'a>,
    channel: AdcChannel<'a>,
    /// Last raw conversion (for diagnostics)
    last_raw: AtomicU16,
    has_reading: bool,
}

impl<'a> AdcVoltageSource<'a> {
    /// Create a probe voltage source over the given ADC channel
    pub fn new(adc: SharedAdc<'a>, channel: AdcChannel<'a>) -> Self {
        Self {
            adc,
            channel,
            last_raw: AtomicU16::new(0),
            has_reading: false,
        }
    }

    /// Last raw ADC value
    pub fn last_raw_value(&self) -> u16 {
        self.last_raw.load(Ordering::Relaxed)
    }
}

impl<'a> VoltageSensorPort for AdcVoltageSource<'a> {
    fn has_reading(&self) -> bool {
        self.has_reading
    }

    fn read_voltage(&mut self) -> f32 {
        let raw = match self.adc.borrow_mut().blocking_read(&mut self.channel) {
            Ok(raw) => {
                self.last_raw.store(raw, Ordering::Relaxed);
                self.has_reading = true;
                raw
            }
            // Keep the previous conversion; the port contract has no error
            // channel and the value is refreshed next cycle.
            Err(_) => self.last_raw.load(Ordering::Relaxed),
        };
        raw as f32 * ADC_VREF_V / ADC_FULL_SCALE
    }
}

/// Water temperature approximated by the RP2350 onboard sensor
///
/// Linear empirical mapping from the raw conversion; integrations with a
/// real water temperature probe implement [`TemperatureSensorPort`] over
/// their own bus instead.
pub struct OnboardTempSource<'a> {
    adc: SharedAdc<'a>,
    channel: AdcChannel<'a>,
    scale: f32,
    offset: f32,
}

impl<'a> OnboardTempSource<'a> {
    /// Empirical RP2350 scale: raw ~57 at room temperature (~27 C)
    pub const DEFAULT_SCALE: f32 = 0.474;

    /// Create a temperature source over the onboard sensor channel
    pub fn new(adc: SharedAdc<'a>, channel: AdcChannel<'a>) -> Self {
        Self {
            adc,
            channel,
            scale: Self::DEFAULT_SCALE,
            offset: 0.0,
        }
    }

    /// Override the linear mapping for a bench-calibrated board
    pub fn with_mapping(mut self, scale: f32, offset: f32) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }
}

impl<'a> TemperatureSensorPort for OnboardTempSource<'a> {
    fn read_celsius(&mut self) -> f32 {
        match self.adc.borrow_mut().blocking_read(&mut self.channel) {
            Ok(raw) => raw as f32 * self.scale + self.offset,
            // Non-finite signals "invalid" to the pipeline, which then
            // substitutes the 25 C reference.
            Err(_) => f32::NAN,
        }
    }
}
