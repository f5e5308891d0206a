//! Driver for the lift controller base board.
//!
//! The board is reached over I2C with a small fixed command set; see
//! [`board`] for the wire format and [`BaseBoard`] for the operations.

pub mod board;
pub mod command;
pub mod config;
pub mod error;
pub mod hw_trait;
pub mod tracing;
pub mod transport;

pub use board::BaseBoard;
pub use error::{Error, Result};
