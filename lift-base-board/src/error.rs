//! Common error types for lift-base-board.
//!
//! This module provides a centralized Error enum using thiserror, plus the
//! transport-level error that every [`I2c`](crate::hw_trait::I2c)
//! implementation reports.

use thiserror::Error;

use crate::command::Command;

/// Failure of the underlying bus exchange.
#[derive(Error, Debug)]
pub enum TransportError {
    /// I/O errors from the bus device (absent device, NAK, bus fault)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bus completed fewer messages than the transaction carried
    #[error("Incomplete transfer: {actual} of {expected} messages")]
    Incomplete { expected: usize, actual: usize },
}

/// Main error type for base board operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The bus exchange failed; passed through unchanged
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A set-style command got its own payload echoed back
    #[error("respond not match ({command})")]
    RespondNotMatch { command: Command },

    /// Buffer id outside 1..=4
    #[error("serial not found: {0}")]
    SerialNotFound(u8),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
