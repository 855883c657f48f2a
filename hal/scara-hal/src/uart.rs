//! UART serial communication abstractions
//!
//! The command link is a plain ASCII byte stream. The receive side is
//! polled from the control loop, so it exposes a non-blocking view of the
//! receive buffer plus a bounded wait used while scanning integers.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Polled serial receiver
///
/// Receive errors (framing, overrun) are not surfaced: an implementation
/// reports them through its own logging and behaves as if no byte arrived.
pub trait SerialRx {
    /// Check whether at least one byte is buffered
    ///
    /// Never blocks.
    fn bytes_available(&mut self) -> bool;

    /// Take the next buffered byte, if any
    ///
    /// Never blocks.
    fn try_read(&mut self) -> Option<u8>;

    /// Wait up to `timeout_ms` for the next byte
    ///
    /// Returns `None` when the timeout expires first.
    fn read_timeout(&mut self, timeout_ms: u32) -> Option<u8>;

    /// Discard everything currently buffered
    ///
    /// Returns the number of bytes dropped.
    fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.bytes_available() {
            if self.try_read().is_none() {
                break;
            }
            dropped += 1;
        }
        dropped
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// 8N1 framing at the given baud rate
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
