//! Ports (interfaces) defining the boundaries of the application
//!
//! Ports are traits that define how the domain interacts with external
//! systems. They allow the core to remain independent of specific
//! implementations:
//!
//! - **VoltageSensorPort / TemperatureSensorPort**: upstream readings
//! - **CalibrationStore**: the two persisted calibration slots
//! - **PublishSink**: where converted EC values go
//! - **DiagnosticsPort**: structured warn/debug events
//! - **ControlPort**: the out-of-band operator channel

pub mod control;
pub mod diagnostics;
pub mod persistence;
pub mod publish;
pub mod sensor;

pub use control::{ControlError, ControlPort};
pub use diagnostics::{DiagnosticEvent, DiagnosticsPort, Severity};
pub use persistence::{CalibrationStore, Slot};
pub use publish::PublishSink;
pub use sensor::{TemperatureSensorPort, VoltageSensorPort};
