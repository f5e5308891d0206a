//! Hardware abstraction layer traits.
//!
//! The board driver talks to the bus only through [`I2c`], so it can run on
//! the Linux i2c-dev interface or against a scripted bus in tests.

use crate::error::TransportError;

/// Blocking I2C bus.
///
/// One call is one bus transaction. Implementations must either fill the
/// whole read buffer or return an error; there are no partial exchanges.
pub trait I2c {
    /// Write `write` to the device at `address`, then read exactly
    /// `read.len()` bytes back in the same transaction (repeated start).
    fn write_read(
        &mut self,
        address: u16,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), TransportError>;
}

impl<T: I2c + ?Sized> I2c for &mut T {
    fn write_read(
        &mut self,
        address: u16,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), TransportError> {
        (**self).write_read(address, write, read)
    }
}
