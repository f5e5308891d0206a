//! Configuration management for lift-base-board.
//!
//! Settings come from an optional TOML file and can be overridden from the
//! command line:
//!
//! ```toml
//! [board]
//! bus = "/dev/i2c-1"
//! address = 0x20
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Bus used when neither the file nor the command line names one.
pub const DEFAULT_BUS: &str = "/dev/i2c-1";

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Board connection
    pub board: BoardConfig,
}

/// Where to find the board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardConfig {
    /// I2C bus name or device path
    #[serde(default = "default_bus")]
    pub bus: String,

    /// 7- or 10-bit bus address
    pub address: u16,
}

fn default_bus() -> String {
    DEFAULT_BUS.to_string()
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&text).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

impl BoardConfig {
    /// Merge command-line overrides over an optional file.
    ///
    /// An address must come from one of the two.
    pub fn resolve(
        file: Option<Config>,
        bus: Option<String>,
        address: Option<u16>,
    ) -> Result<Self> {
        let file = file.map(|c| c.board);
        let bus = bus
            .or_else(|| file.as_ref().map(|b| b.bus.clone()))
            .unwrap_or_else(default_bus);
        let address = address
            .or_else(|| file.as_ref().map(|b| b.address))
            .ok_or_else(|| Error::Config("no board address configured".to_string()))?;
        Ok(Self { bus, address })
    }
}
