//! Adapters - concrete implementations of ports
//!
//! Adapters connect the core to the outside world by implementing the port
//! traits. Each adapter knows how to work with a specific technology.
//!
//! # Available Adapters
//!
//! - **memory_store**: in-memory calibration store (demos, tests)
//! - **diag**: no-op and recording diagnostics sinks
//! - **defmt_diag**: defmt-backed diagnostics sink (firmware)
//! - **rp_adc**: RP2350 ADC probe voltage / onboard temperature (firmware)
//! - **usb_cdc**: COBS/postcard control channel over USB CDC ACM (firmware)

pub mod diag;
pub mod memory_store;

#[cfg(feature = "firmware")]
pub mod defmt_diag;
#[cfg(feature = "firmware")]
pub mod rp_adc;
#[cfg(feature = "firmware")]
pub mod usb_cdc;

pub use diag::NullDiagnostics;
#[cfg(feature = "std")]
pub use diag::RecordingDiagnostics;
pub use memory_store::MemorySlotStore;

#[cfg(feature = "firmware")]
pub use defmt_diag::DefmtDiagnostics;
#[cfg(feature = "firmware")]
pub use rp_adc::{AdcVoltageSource, OnboardTempSource};
#[cfg(feature = "firmware")]
pub use usb_cdc::UsbCdcControl;
