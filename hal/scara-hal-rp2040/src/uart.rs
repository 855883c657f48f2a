//! Buffered UART halves
//!
//! The interrupt-driven ring buffers of `embassy_rp::uart::BufferedUart`
//! give the polled view the command reader needs: checking for data never
//! blocks, and a bounded wait is a spin on the buffer with an
//! `embassy_time` deadline.

use embassy_rp::uart::{self, BufferedUartRx, BufferedUartTx};
use embassy_time::{Duration, Instant};
use embedded_io::{Read, ReadReady, Write};
use scara_hal::uart::{DataBits, Parity, StopBits};
use scara_hal::{SerialRx, UartConfig, UartTx};

/// UART errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    /// Receive FIFO overflowed
    Overrun,
    /// Line held low for longer than a frame
    Break,
    /// Parity mismatch
    Parity,
    /// Missing stop bit
    Framing,
    /// Any other driver error
    Other,
}

impl From<uart::Error> for UartError {
    fn from(e: uart::Error) -> Self {
        match e {
            uart::Error::Overrun => UartError::Overrun,
            uart::Error::Break => UartError::Break,
            uart::Error::Parity => UartError::Parity,
            uart::Error::Framing => UartError::Framing,
            _ => UartError::Other,
        }
    }
}

/// Convert the shared UART settings to embassy-rp's
pub fn to_rp_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    rp
}

/// Receive half implementing [`scara_hal::SerialRx`]
///
/// Receive errors are logged and read as "no byte".
pub struct BufferedRx {
    rx: BufferedUartRx,
    errors: u32,
}

impl BufferedRx {
    pub fn new(rx: BufferedUartRx) -> Self {
        Self { rx, errors: 0 }
    }

    /// Receive errors seen so far
    pub fn errors(&self) -> u32 {
        self.errors
    }

    fn record(&mut self, e: uart::Error) {
        self.errors = self.errors.wrapping_add(1);
        let _err = UartError::from(e);
        #[cfg(feature = "defmt")]
        defmt::warn!("UART read error: {:?}", _err);
    }
}

impl SerialRx for BufferedRx {
    fn bytes_available(&mut self) -> bool {
        match self.rx.read_ready() {
            Ok(ready) => ready,
            Err(e) => {
                self.record(e);
                false
            }
        }
    }

    fn try_read(&mut self) -> Option<u8> {
        if !self.bytes_available() {
            return None;
        }
        let mut byte = [0u8; 1];
        match self.rx.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) => {
                self.record(e);
                None
            }
        }
    }

    fn read_timeout(&mut self, timeout_ms: u32) -> Option<u8> {
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));
        loop {
            if let Some(byte) = self.try_read() {
                return Some(byte);
            }
            if Instant::now() >= deadline {
                return None;
            }
        }
    }
}

/// Transmit half implementing [`scara_hal::UartTx`]
pub struct BufferedTx {
    tx: BufferedUartTx,
}

impl BufferedTx {
    pub fn new(tx: BufferedUartTx) -> Self {
        Self { tx }
    }
}

impl UartTx for BufferedTx {
    type Error = UartError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.tx)?;
        Ok(())
    }
}
