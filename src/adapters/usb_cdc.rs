//! USB CDC control channel adapter
//!
//! Implements the ControlPort trait for USB CDC ACM (serial over USB):
//! COBS-encoded postcard messages, framed by the 0x00 sentinel, sent in
//! 64-byte packets.

use embassy_usb::class::cdc_acm::CdcAcmClass;
use heapless::Vec as HeaplessVec;

use crate::cal_protocol::{CalCommand, CalResponse};
use crate::ports::control::{ControlError, ControlPort};

/// Maximum framed message size; commands and responses are a few bytes
const MAX_MSG_SIZE: usize = 128;

/// USB packet size (CDC ACM max)
const USB_PACKET_SIZE: usize = 64;

/// USB CDC control channel adapter
pub struct UsbCdcControl<'a, D: embassy_usb::driver::Driver<'a>> {
    class: CdcAcmClass<'a, D>,
}

impl<'a, D: embassy_usb::driver::Driver<'a>> UsbCdcControl<'a, D> {
    /// Wrap a CDC ACM class instance
    pub fn new(class: CdcAcmClass<'a, D>) -> Self {
        Self { class }
    }

    /// Send one COBS frame in 64-byte chunks
    async fn send_frame(&mut self, data: &[u8]) -> Result<(), ControlError> {
        for chunk in data.chunks(USB_PACKET_SIZE) {
            self.class
                .write_packet(chunk)
                .await
                .map_err(|_| ControlError::SendFailed)?;
        }
        Ok(())
    }

    /// Read until the COBS sentinel (0x00) is received
    async fn read_frame(&mut self) -> Result<HeaplessVec<u8, MAX_MSG_SIZE>, ControlError> {
        let mut rx_buf = HeaplessVec::<u8, MAX_MSG_SIZE>::new();
        let mut packet_buf = [0u8; USB_PACKET_SIZE];

        loop {
            match self.class.read_packet(&mut packet_buf).await {
                Ok(n) if n > 0 => {
                    for &byte in &packet_buf[..n] {
                        if rx_buf.push(byte).is_err() {
                            return Err(ControlError::MessageTooLarge);
                        }
                        if byte == 0x00 {
                            return Ok(rx_buf);
                        }
                    }
                }
                Ok(_) => {
                    // Zero bytes read, connection might be lost
                    if rx_buf.is_empty() {
                        return Err(ControlError::Disconnected);
                    }
                }
                Err(_) => {
                    return Err(ControlError::ReceiveFailed);
                }
            }
        }
    }
}

impl<'a, D: embassy_usb::driver::Driver<'a>> ControlPort for UsbCdcControl<'a, D> {
    async fn wait_connection(&mut self) {
        self.class.wait_connection().await;
    }

    fn is_connected(&self) -> bool {
        self.class.dtr()
    }

    async fn send_response(&mut self, response: &CalResponse) -> Result<(), ControlError> {
        let encoded = postcard::to_vec_cobs::<_, MAX_MSG_SIZE>(response)
            .map_err(|_| ControlError::InvalidFormat)?;
        self.send_frame(&encoded).await
    }

    async fn receive_command(&mut self) -> Result<Option<CalCommand>, ControlError> {
        let mut rx_buf = self.read_frame().await?;

        if rx_buf.is_empty() {
            return Ok(None);
        }

        let cmd = postcard::from_bytes_cobs::<CalCommand>(&mut rx_buf)
            .map_err(|_| ControlError::InvalidFormat)?;

        Ok(Some(cmd))
    }
}
