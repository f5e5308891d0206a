//! Lift controller base board driver.
//!
//! The base board sits on I2C and exposes a watchdog, a real-time clock,
//! LEDs, buttons, supply sensing, DIP switches and four serial relay
//! buffers. Every operation is one transaction on the bus:
//!
//! ```text
//! write: [opcode][payload: N bytes]
//! read:  [echo  ][payload: N bytes]
//! ```
//!
//! The request and response payloads always have the same length. Read-type
//! commands send zeros as a placeholder for the bytes they expect back.
//! Multi-byte fields are big-endian; temperatures and voltages are in
//! tenths, times are milliseconds since the Unix epoch.

use bitvec::prelude::*;
use rand::RngCore;
use time::{Duration, OffsetDateTime};

#[cfg(target_os = "linux")]
use rand::{rngs::StdRng, SeedableRng};

use crate::command::Command;
use crate::error::{Error, Result};
use crate::hw_trait::I2c;
use crate::tracing::prelude::*;

#[cfg(target_os = "linux")]
use crate::{config::BoardConfig, transport::LinuxI2c};

/// Temperature readings in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperatures {
    pub ambient: f32,
    pub secondary: f32,
}

/// Raw DIP switch bank as reported by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DipSwitchState([u8; 3]);

impl DipSwitchState {
    /// Number of switch positions the board reports.
    pub const SWITCHES: usize = 24;

    pub fn raw(&self) -> [u8; 3] {
        self.0
    }

    /// State of switch `index`, counting LSB-first from the first byte.
    /// `None` past the last switch.
    pub fn is_on(&self, index: usize) -> Option<bool> {
        self.0.view_bits::<Lsb0>().get(index).map(|bit| *bit)
    }
}

/// Handle to one base board on one bus.
pub struct BaseBoard<I2C, R> {
    i2c: I2C,
    address: u16,
    rng: R,
}

#[cfg(target_os = "linux")]
impl BaseBoard<LinuxI2c, StdRng> {
    /// Open `bus` and bind to the board at `address`.
    pub fn open(bus: &str, address: u16) -> Result<Self> {
        let i2c = LinuxI2c::open(bus)?;
        info!("Base board at 0x{:02X} on {}", address, i2c.path().display());
        Ok(Self::new(i2c, address, StdRng::from_entropy()))
    }

    pub fn from_config(config: &BoardConfig) -> Result<Self> {
        Self::open(&config.bus, config.address)
    }
}

impl<I2C: I2c, R: RngCore> BaseBoard<I2C, R> {
    /// Create a handle over an already open bus.
    ///
    /// `rng` supplies the nonce for [`ping`](Self::ping).
    pub fn new(i2c: I2C, address: u16, rng: R) -> Self {
        Self { i2c, address, rng }
    }

    /// Bus address of the board.
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Check that the board answers.
    ///
    /// Sends a random 4-byte nonce; the board must not return it unchanged.
    pub fn ping(&mut self) -> Result<()> {
        let nonce = self.rng.next_u32().to_be_bytes();
        self.send_set_command(Command::Ping, &nonce)
    }

    /// Firmware version.
    pub fn get_version(&mut self) -> Result<u16> {
        let res = self.read_fixed(Command::GetVersion)?;
        Ok(u16::from_be_bytes(res))
    }

    pub fn get_temp(&mut self) -> Result<Temperatures> {
        let res: [u8; 4] = self.read_fixed(Command::GetTemp)?;
        Ok(Temperatures {
            ambient: tenths([res[0], res[1]]),
            secondary: tenths([res[2], res[3]]),
        })
    }

    /// Arm the watchdog for `secs` seconds.
    pub fn set_watchdog(&mut self, secs: u16) -> Result<()> {
        self.send_set_command(Command::SetWatchdog, &secs.to_be_bytes())?;
        debug!("Watchdog set to {}s", secs);
        Ok(())
    }

    /// Read the board clock.
    pub fn get_time(&mut self) -> Result<OffsetDateTime> {
        let ms = u32::from_be_bytes(self.read_fixed(Command::GetTime)?);
        Ok(OffsetDateTime::UNIX_EPOCH + Duration::milliseconds(ms.into()))
    }

    /// Set the board clock.
    ///
    /// The board keeps a 32-bit millisecond counter, so `t` is truncated to
    /// milliseconds and wrapped to 32 bits.
    pub fn set_time(&mut self, t: OffsetDateTime) -> Result<()> {
        let ms = (t.unix_timestamp_nanos() / 1_000_000) as u32;
        self.send_set_command(Command::SetTime, &ms.to_be_bytes())?;
        debug!("Board time set to {} ({} ms)", t, ms);
        Ok(())
    }

    pub fn set_led(&mut self, value: u8) -> Result<()> {
        self.send_set_command(Command::SetLed, &[value])?;
        debug!("LED set to 0x{:02X}", value);
        Ok(())
    }

    /// Poll the buttons.
    // TODO: return the button bits once the firmware documents their layout
    pub fn get_buttons(&mut self) -> Result<()> {
        self.send_set_command(Command::ReadButtons, &[0u8; 1])
    }

    /// Battery voltage in volts.
    pub fn get_battery_voltage(&mut self) -> Result<f32> {
        Ok(tenths(self.read_fixed(Command::ReadBatteryLevel)?))
    }

    /// Supply input voltage in volts.
    pub fn get_power_supply_voltage(&mut self) -> Result<f32> {
        Ok(tenths(self.read_fixed(Command::ReadVinLevel)?))
    }

    pub fn get_dip_switch_state(&mut self) -> Result<DipSwitchState> {
        Ok(DipSwitchState(self.read_fixed(Command::ReadDipSwitches)?))
    }

    /// Raw fill counters of the serial buffers.
    pub fn get_serial_buffer_count(&mut self) -> Result<[u8; 4]> {
        self.read_fixed(Command::BufferCount)
    }

    /// Read `count` bytes from serial buffer `id` (1..=4).
    pub fn get_serial_buffer_data(&mut self, id: u8, count: u8) -> Result<Vec<u8>> {
        let command = Command::read_buffer(id).ok_or(Error::SerialNotFound(id))?;
        self.send_command(command, &vec![0u8; count.into()])
    }

    /// Issue a write transaction of `count` bytes on serial buffer `id`
    /// (1..=4) and return the board's reply.
    ///
    /// The request payload is all zeros: there is no way yet to pass the
    /// bytes to be written.
    // TODO: take the outgoing bytes once the write-buffer payload format is known
    pub fn write_serial_buffer_data(&mut self, id: u8, count: u8) -> Result<Vec<u8>> {
        let command = Command::write_buffer(id).ok_or(Error::SerialNotFound(id))?;
        self.send_command(command, &vec![0u8; count.into()])
    }

    /// Send a command whose only result is success or failure.
    ///
    /// The board signals failure by returning the request payload unchanged,
    /// so an exact echo is reported as [`Error::RespondNotMatch`].
    pub fn send_set_command(&mut self, command: Command, data: &[u8]) -> Result<()> {
        let res = self.send_command(command, data)?;
        if res == data {
            warn!("{} response echoed request payload {:02X?}", command, data);
            return Err(Error::RespondNotMatch { command });
        }
        Ok(())
    }

    /// Run one transaction and return the response payload.
    ///
    /// Writes `[opcode] ++ data`, reads back the same number of bytes, and
    /// drops the first (echo) byte. Transport errors are passed through.
    pub fn send_command(&mut self, command: Command, data: &[u8]) -> Result<Vec<u8>> {
        let mut request = Vec::with_capacity(data.len() + 1);
        request.push(command.opcode());
        request.extend_from_slice(data);
        let mut response = vec![0u8; request.len()];

        trace!("{} tx {:02X?}", command, request);
        self.i2c.write_read(self.address, &request, &mut response)?;
        trace!("{} rx {:02X?}", command, response);

        if response[0] != command.opcode() {
            trace!(
                "{} echo byte 0x{:02X} differs from opcode 0x{:02X}",
                command,
                response[0],
                command.opcode()
            );
        }

        Ok(response.split_off(1))
    }

    /// Send `N` placeholder bytes for a fixed-size read and return the reply.
    fn read_fixed<const N: usize>(&mut self, command: Command) -> Result<[u8; N]> {
        debug_assert_eq!(command.payload_len(), Some(N));
        let res = self.send_command(command, &[0u8; N])?;
        let mut out = [0u8; N];
        out.copy_from_slice(&res);
        Ok(out)
    }
}

/// Decode a big-endian count of tenths.
fn tenths(raw: [u8; 2]) -> f32 {
    f32::from(u16::from_be_bytes(raw)) / 10.0
}
