//! Domain layer - pure business logic independent of infrastructure
//!
//! This module contains the calibration state machine and the conversion
//! math. It performs no I/O; persistence and diagnostics are handled by
//! the service layer through ports.

pub mod calibration;
pub mod conversion;
pub mod sample;

pub use calibration::{EcCalibration, SlopeUpdate, HIGH_REFERENCE_US, LOW_REFERENCE_US};
pub use conversion::{compensation_factor, convert, ConversionPath, EcReading};
pub use sample::MeasurementSample;
