//! Physical transports for reaching the base board.
//!
//! The board driver only needs an [`I2c`](crate::hw_trait::I2c)
//! implementation; this module provides the real one for Linux hosts.

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::LinuxI2c;
