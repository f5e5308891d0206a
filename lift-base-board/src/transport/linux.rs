//! Linux i2c-dev transport.
//!
//! Each exchange is issued as a single `I2C_RDWR` ioctl carrying a write
//! message followed by a read message, so no other master can get between
//! the request and the response.
//!
//! Kernel interface: <https://docs.kernel.org/i2c/dev-interface.html>

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, TransportError};
use crate::hw_trait::I2c;
use crate::tracing::prelude::*;

/// Message is a read (from `linux/i2c.h`)
const I2C_M_RD: u16 = 0x0001;
/// Message uses a 10-bit address
const I2C_M_TEN: u16 = 0x0010;

/// Highest 7-bit address
const MAX_7BIT_ADDR: u16 = 0x7F;
/// Highest 10-bit address
const MAX_10BIT_ADDR: u16 = 0x3FF;

mod ioctl {
    #[repr(C)]
    pub struct I2cMsg {
        pub addr: u16,
        pub flags: u16,
        pub len: u16,
        pub buf: *mut u8,
    }

    #[repr(C)]
    pub struct I2cRdwrIoctlData {
        pub msgs: *mut I2cMsg,
        pub nmsgs: u32,
    }

    // I2C_RDWR = 0x0707
    nix::ioctl_write_ptr_bad!(i2c_rdwr, 0x0707, I2cRdwrIoctlData);
}

use ioctl::{i2c_rdwr, I2cMsg, I2cRdwrIoctlData};

/// An open `/dev/i2c-N` bus.
#[derive(Debug)]
pub struct LinuxI2c {
    file: File,
    path: PathBuf,
}

impl LinuxI2c {
    /// Open a bus by name.
    ///
    /// Accepts a device path (`/dev/i2c-1`), a device name (`i2c-1`) or a
    /// bare bus number (`1`).
    pub fn open(name: &str) -> Result<Self> {
        let path = resolve_bus_path(name)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(TransportError::from)?;
        debug!("Opened I2C bus {}", path.display());
        Ok(Self { file, path })
    }

    /// Device path this bus was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl I2c for LinuxI2c {
    fn write_read(
        &mut self,
        address: u16,
        write: &[u8],
        read: &mut [u8],
    ) -> std::result::Result<(), TransportError> {
        let flags = address_flags(address)?;
        let write_len = message_len(write.len())?;
        let read_len = message_len(read.len())?;

        trace!(
            "{} @0x{:02X} write {:02X?} read {} bytes",
            self.path.display(),
            address,
            write,
            read.len()
        );

        let mut msgs = [
            I2cMsg {
                addr: address,
                flags,
                len: write_len,
                // The kernel only reads from a message without I2C_M_RD
                buf: write.as_ptr() as *mut u8,
            },
            I2cMsg {
                addr: address,
                flags: flags | I2C_M_RD,
                len: read_len,
                buf: read.as_mut_ptr(),
            },
        ];
        let data = I2cRdwrIoctlData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: msgs.len() as u32,
        };

        // SAFETY: `data` points at two messages whose buffers outlive the
        // call and whose lengths match the slices they were built from.
        let done = unsafe { i2c_rdwr(self.file.as_raw_fd(), &data) }
            .map_err(io::Error::from)?;

        if done as usize != msgs.len() {
            return Err(TransportError::Incomplete {
                expected: msgs.len(),
                actual: done as usize,
            });
        }

        trace!("{} @0x{:02X} read {:02X?}", self.path.display(), address, read);
        Ok(())
    }
}

/// Map a user-facing bus name to its character device.
fn resolve_bus_path(name: &str) -> Result<PathBuf> {
    if name.starts_with('/') {
        return Ok(PathBuf::from(name));
    }

    let number = name.strip_prefix("i2c-").unwrap_or(name);
    if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(PathBuf::from(format!("/dev/i2c-{number}")))
    } else {
        Err(Error::Config(format!("invalid I2C bus name: {name:?}")))
    }
}

fn address_flags(address: u16) -> std::result::Result<u16, TransportError> {
    if address <= MAX_7BIT_ADDR {
        Ok(0)
    } else if address <= MAX_10BIT_ADDR {
        Ok(I2C_M_TEN)
    } else {
        Err(TransportError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("I2C address 0x{address:X} out of range"),
        )))
    }
}

fn message_len(len: usize) -> std::result::Result<u16, TransportError> {
    u16::try_from(len).map_err(|_| {
        TransportError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("I2C message too long: {len} bytes"),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/dev/i2c-1", "/dev/i2c-1")]
    #[test_case("/dev/i2c-ch341", "/dev/i2c-ch341")]
    #[test_case("i2c-3", "/dev/i2c-3")]
    #[test_case("0", "/dev/i2c-0")]
    #[test_case("12", "/dev/i2c-12")]
    fn test_resolve_bus_path(name: &str, expected: &str) {
        assert_eq!(resolve_bus_path(name).unwrap(), PathBuf::from(expected));
    }

    #[test_case(""; "empty")]
    #[test_case("i2c-"; "missing number")]
    #[test_case("bus1"; "unknown prefix")]
    #[test_case("i2c-1a"; "trailing garbage")]
    fn test_resolve_bus_path_rejects(name: &str) {
        assert!(matches!(resolve_bus_path(name), Err(Error::Config(_))));
    }

    #[test]
    fn test_address_flags() {
        assert_eq!(address_flags(0x20).unwrap(), 0);
        assert_eq!(address_flags(0x7F).unwrap(), 0);
        assert_eq!(address_flags(0x80).unwrap(), I2C_M_TEN);
        assert_eq!(address_flags(0x3FF).unwrap(), I2C_M_TEN);
        assert!(address_flags(0x400).is_err());
    }

    #[test]
    fn test_message_len() {
        assert_eq!(message_len(5).unwrap(), 5);
        assert!(message_len(usize::from(u16::MAX) + 1).is_err());
    }

    #[test]
    fn test_open_missing_bus_is_transport_error() {
        let err = LinuxI2c::open("/dev/i2c-does-not-exist").unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Io(_))));
    }
}
