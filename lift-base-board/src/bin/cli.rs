//! Command-line interface for the lift controller base board.
//!
//! Runs one board operation per invocation and prints the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use lift_base_board::config::{BoardConfig, Config};
use lift_base_board::tracing::{self, prelude::*};
use lift_base_board::BaseBoard;

#[derive(Parser, Debug)]
#[command(name = "lift-base-board", version)]
#[command(about = "Query and control the lift controller base board")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// I2C bus (`/dev/i2c-1`, `i2c-1` or `1`)
    #[arg(short, long)]
    bus: Option<String>,

    /// Board address, decimal or 0x-prefixed hex
    #[arg(short, long, value_parser = parse_int::<u16>)]
    address: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the board answers
    Ping,

    /// Show the firmware version
    Version,

    /// Show temperatures
    Temp,

    /// Arm the watchdog
    SetWatchdog {
        /// Timeout in seconds
        secs: u16,
    },

    /// Show the board clock
    Time,

    /// Set the board clock
    SetTime {
        /// Milliseconds since the Unix epoch; defaults to now
        unix_ms: Option<u64>,
    },

    /// Set the LEDs
    SetLed {
        #[arg(value_parser = parse_int::<u8>)]
        value: u8,
    },

    /// Poll the buttons
    Buttons,

    /// Show the battery voltage
    Battery,

    /// Show the supply input voltage
    Vin,

    /// Show the DIP switch bank
    DipSwitches,

    /// Show the raw serial buffer counters
    BufferCount,

    /// Read from a serial buffer
    ReadBuffer {
        /// Buffer id (1-4)
        id: u8,
        /// Number of bytes
        count: u8,
    },

    /// Issue a write transaction on a serial buffer
    WriteBuffer {
        /// Buffer id (1-4)
        id: u8,
        /// Number of bytes
        count: u8,
    },
}

/// Parse a decimal or `0x`-prefixed hex integer.
fn parse_int<T>(s: &str) -> Result<T, String>
where
    T: TryFrom<u64>,
{
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
    .map_err(|e| format!("{s:?}: {e}"))?;
    T::try_from(value).map_err(|_| format!("{s:?}: out of range"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing::init_journald_or_stderr();

    let file = args
        .config
        .as_deref()
        .map(Config::load_from)
        .transpose()?;
    let config = BoardConfig::resolve(file, args.bus, args.address)
        .context("use --address or a config file")?;

    let mut board = BaseBoard::from_config(&config)
        .with_context(|| format!("opening base board on {}", config.bus))?;
    trace!("Running {:?}", args.command);

    match args.command {
        Commands::Ping => {
            board.ping()?;
            println!("ok");
        }
        Commands::Version => println!("{}", board.get_version()?),
        Commands::Temp => {
            let temps = board.get_temp()?;
            println!("ambient:   {:.1} °C", temps.ambient);
            println!("secondary: {:.1} °C", temps.secondary);
        }
        Commands::SetWatchdog { secs } => {
            board.set_watchdog(secs)?;
            println!("ok");
        }
        Commands::Time => println!("{}", board.get_time()?.format(&Rfc3339)?),
        Commands::SetTime { unix_ms } => {
            let t = match unix_ms {
                Some(ms) => {
                    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)?
                }
                None => OffsetDateTime::now_utc(),
            };
            board.set_time(t)?;
            println!("{}", t.format(&Rfc3339)?);
        }
        Commands::SetLed { value } => {
            board.set_led(value)?;
            println!("ok");
        }
        Commands::Buttons => {
            board.get_buttons()?;
            println!("ok");
        }
        Commands::Battery => println!("{:.1} V", board.get_battery_voltage()?),
        Commands::Vin => println!("{:.1} V", board.get_power_supply_voltage()?),
        Commands::DipSwitches => {
            let state = board.get_dip_switch_state()?;
            let bits: String = (0..lift_base_board::board::DipSwitchState::SWITCHES)
                .map(|i| if state.is_on(i) == Some(true) { '1' } else { '0' })
                .collect();
            println!("{:02X?} {}", state.raw(), bits);
        }
        Commands::BufferCount => println!("{:02X?}", board.get_serial_buffer_count()?),
        Commands::ReadBuffer { id, count } => {
            println!("{:02X?}", board.get_serial_buffer_data(id, count)?)
        }
        Commands::WriteBuffer { id, count } => {
            println!("{:02X?}", board.write_serial_buffer_data(id, count)?)
        }
    }

    Ok(())
}
