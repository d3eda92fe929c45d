//! Electrical-conductivity (EC) probe driver
//!
//! Converts a raw ADC voltage into a temperature-compensated EC measurement,
//! with a two-point calibration procedure (1413 µS/cm and 12.88 mS/cm
//! reference solutions) whose derived parameters survive power cycles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - EcCalibration state + slope derivation                        │
//! │  - Conversion math (compensation, default map, interpolation)    │
//! │  - MeasurementSample entity                                      │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Services                                     │
//! │  - CalibrationEngine: calibrate/reset, persist slope + flag      │
//! │  - ConversionPipeline: one periodic update cycle                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - VoltageSensorPort / TemperatureSensorPort: upstream inputs    │
//! │  - CalibrationStore: two persisted slots (slope, indicator)      │
//! │  - PublishSink: downstream EC consumer                           │
//! │  - DiagnosticsPort: structured warn/debug events                 │
//! │  - ControlPort: out-of-band operator commands                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters                                     │
//! │  - MemorySlotStore: in-memory calibration store                  │
//! │  - DefmtDiagnostics / NullDiagnostics / RecordingDiagnostics     │
//! │  - AdcVoltageSource / OnboardTempSource: RP2350 ADC (firmware)   │
//! │  - UsbCdcControl: COBS/postcard control channel (firmware)       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Benefits
//!
//! - **Testable** - every collaborator is a port with an in-crate double
//! - **Graceful degradation** - missing inputs, degenerate calibration and
//!   persistence failures never escalate; the driver falls back to defaults
//! - **Portable core** - domain and services are `no_std`; hardware adapters
//!   live behind the `firmware` feature

#![cfg_attr(not(feature = "std"), no_std)]

// ============================================================================
// Protocol (shared between host and device)
// ============================================================================

pub mod cal_protocol;

pub use cal_protocol::{CalCommand, CalResponse, ErrorCode};

// ============================================================================
// Hexagonal Architecture
// ============================================================================

/// Domain layer - pure calibration and conversion logic
pub mod domain;

/// Ports - traits defining boundaries
pub mod ports;

/// Adapters - concrete implementations
pub mod adapters;

/// Calibration engine service
pub mod engine;

/// Conversion pipeline service
pub mod pipeline;

// Re-export key domain types
pub use domain::{EcCalibration, EcReading, MeasurementSample, SlopeUpdate};

// Re-export key port traits
pub use ports::{
    CalibrationStore, ControlPort, DiagnosticsPort, PublishSink, TemperatureSensorPort,
    VoltageSensorPort,
};

// Re-export services
pub use engine::CalibrationEngine;
pub use pipeline::ConversionPipeline;
