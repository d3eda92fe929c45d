//! Shared protocol for the EC probe control channel
//!
//! This module defines the messages exchanged between the host shell and
//! the device for calibration and live readout.
//!
//! Messages are serialized using `postcard` with COBS encoding for framing;
//! all payloads are scalars, so the same types serve `std` and `no_std`
//! builds without conditional containers.

use serde::{Deserialize, Serialize};

/// Machine-readable failure codes returned by the device
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, defmt::Format)]
pub enum ErrorCode {
    /// Command could not be decoded
    BadCommand,
    /// No EC value has been published yet
    NoReading,
    /// Device-side channel overflow
    Busy,
}

/// Command sent from host to device
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, defmt::Format)]
pub enum CalCommand {
    /// Report calibration state
    Status,

    /// Record the probe voltage measured in the 1413 µS/cm solution
    CalibrateLow { voltage: f32 },

    /// Record the probe voltage measured in the 12.88 mS/cm solution
    CalibrateHigh { voltage: f32 },

    /// Clear the calibrated indicator (points and slope are kept)
    ResetIndicator,

    /// Report the most recently published EC value
    ReadEc,
}

/// Response sent from device to host
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, defmt::Format)]
pub enum CalResponse {
    /// Command accepted
    Ok,

    /// Command failed
    Error { code: ErrorCode },

    /// Calibration state snapshot
    Status {
        /// Derived slope (µS/cm per volt)
        slope: f32,
        /// Persisted calibrated indicator
        indicator: bool,
        /// Whether the low point was recorded this session
        low_point_set: bool,
        /// Whether the high point was recorded this session
        high_point_set: bool,
        /// Whether calibrated-mode output is active
        calibrated: bool,
    },

    /// Most recently published EC value
    Reading {
        /// EC in mS/cm
        ec_ms: f32,
        /// Probe voltage the value was derived from
        voltage_v: f32,
        /// Temperature used for compensation
        temperature_c: f32,
    },
}

impl CalResponse {
    /// Shorthand for an error response
    pub fn error(code: ErrorCode) -> Self {
        Self::Error { code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_survives_cobs_framing() {
        let cmd = CalCommand::CalibrateLow { voltage: 0.512 };
        let mut encoded = postcard::to_vec_cobs::<_, 64>(&cmd).unwrap();
        // Exactly one frame terminator, at the end
        assert_eq!(encoded.iter().filter(|b| **b == 0x00).count(), 1);
        let decoded: CalCommand = postcard::from_bytes_cobs(&mut encoded).unwrap();
        assert_eq!(decoded, cmd);
    }
}
