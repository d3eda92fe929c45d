//! Control port - abstraction for the out-of-band operator channel
//!
//! Calibration is triggered by an operator, not by the periodic tick. This
//! trait abstracts the transport carrying those commands (USB CDC, UART,
//! mock) so the firmware composition stays independent of it.

use crate::cal_protocol::{CalCommand, CalResponse};

/// Error type for control channel operations
#[derive(Clone, Copy, Debug, defmt::Format)]
pub enum ControlError {
    /// Connection lost
    Disconnected,
    /// Failed to send a response
    SendFailed,
    /// Failed to receive a command
    ReceiveFailed,
    /// Message exceeded the framing buffer
    MessageTooLarge,
    /// Invalid message format
    InvalidFormat,
}

/// Port for the operator control channel
pub trait ControlPort {
    /// Wait for a host to connect
    fn wait_connection(&mut self) -> impl core::future::Future<Output = ()>;

    /// Check if a host is connected
    fn is_connected(&self) -> bool;

    /// Send a response to the host
    fn send_response(
        &mut self,
        response: &CalResponse,
    ) -> impl core::future::Future<Output = Result<(), ControlError>>;

    /// Receive a command from the host
    ///
    /// Returns `None` when the connection produced no complete command.
    fn receive_command(
        &mut self,
    ) -> impl core::future::Future<Output = Result<Option<CalCommand>, ControlError>>;

    /// Send a ready signal to the host
    fn send_ready(&mut self) -> impl core::future::Future<Output = Result<(), ControlError>> {
        async { self.send_response(&CalResponse::Ok).await }
    }
}
