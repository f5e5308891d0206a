//! Base board command set.
//!
//! Every transaction starts with one of these opcodes. The values are fixed
//! by the board firmware; note that they jump from 0x09 to 0x10.

use strum::{Display, EnumIter, FromRepr};

/// Opcode prefixed to every request frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum Command {
    Ping = 0x01,
    GetVersion = 0x02,
    GetTemp = 0x03,
    SetWatchdog = 0x04,
    GetTime = 0x05,
    SetTime = 0x06,
    SetLed = 0x07,
    ReadButtons = 0x08,
    ReadBatteryLevel = 0x09,
    ReadVinLevel = 0x10,
    ReadDipSwitches = 0x11,
    BufferCount = 0x12,
    ReadBuffer1 = 0x13,
    ReadBuffer2 = 0x14,
    ReadBuffer3 = 0x15,
    ReadBuffer4 = 0x16,
    WriteBuffer1 = 0x17,
    WriteBuffer2 = 0x18,
    WriteBuffer3 = 0x19,
    WriteBuffer4 = 0x20,
}

impl Command {
    /// Wire value of this opcode.
    pub fn opcode(self) -> u8 {
        self as u8
    }

    /// Read command for serial buffer `id` (1..=4).
    pub fn read_buffer(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::ReadBuffer1),
            2 => Some(Self::ReadBuffer2),
            3 => Some(Self::ReadBuffer3),
            4 => Some(Self::ReadBuffer4),
            _ => None,
        }
    }

    /// Write command for serial buffer `id` (1..=4).
    pub fn write_buffer(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::WriteBuffer1),
            2 => Some(Self::WriteBuffer2),
            3 => Some(Self::WriteBuffer3),
            4 => Some(Self::WriteBuffer4),
            _ => None,
        }
    }

    /// Payload length carried in both directions, excluding the opcode byte.
    ///
    /// `None` for the serial buffer commands, where the caller picks the
    /// length per call.
    pub fn payload_len(self) -> Option<usize> {
        match self {
            Self::SetLed | Self::ReadButtons => Some(1),
            Self::GetVersion
            | Self::SetWatchdog
            | Self::ReadBatteryLevel
            | Self::ReadVinLevel => Some(2),
            Self::ReadDipSwitches => Some(3),
            Self::Ping
            | Self::GetTemp
            | Self::GetTime
            | Self::SetTime
            | Self::BufferCount => Some(4),
            Self::ReadBuffer1
            | Self::ReadBuffer2
            | Self::ReadBuffer3
            | Self::ReadBuffer4
            | Self::WriteBuffer1
            | Self::WriteBuffer2
            | Self::WriteBuffer3
            | Self::WriteBuffer4 => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    #[test]
    fn test_opcodes_are_unique() {
        let opcodes: HashSet<u8> = Command::iter().map(Command::opcode).collect();
        assert_eq!(opcodes.len(), Command::iter().count());
    }

    #[test_case(Command::Ping, 0x01)]
    #[test_case(Command::ReadBatteryLevel, 0x09)]
    #[test_case(Command::ReadVinLevel, 0x10)]
    #[test_case(Command::ReadDipSwitches, 0x11)]
    #[test_case(Command::WriteBuffer3, 0x19)]
    #[test_case(Command::WriteBuffer4, 0x20)]
    fn test_wire_values(command: Command, opcode: u8) {
        assert_eq!(command.opcode(), opcode);
    }

    #[test]
    fn test_buffer_lookup() {
        assert_eq!(Command::read_buffer(1), Some(Command::ReadBuffer1));
        assert_eq!(Command::read_buffer(4), Some(Command::ReadBuffer4));
        assert_eq!(Command::write_buffer(2), Some(Command::WriteBuffer2));
        assert_eq!(Command::write_buffer(4), Some(Command::WriteBuffer4));

        for id in [0, 5, 42, u8::MAX] {
            assert_eq!(Command::read_buffer(id), None);
            assert_eq!(Command::write_buffer(id), None);
        }
    }

    #[test]
    fn test_only_buffer_commands_have_variable_length() {
        for command in Command::iter() {
            let is_buffer = (1..=4).any(|id| {
                Command::read_buffer(id) == Some(command)
                    || Command::write_buffer(id) == Some(command)
            });
            assert_eq!(command.payload_len().is_none(), is_buffer, "{command}");
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Command::GetVersion.to_string(), "get-version");
        assert_eq!(Command::ReadVinLevel.to_string(), "read-vin-level");
    }
}
