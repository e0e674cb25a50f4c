// Value types exchanged between callers and the driver

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::oi::protocol::{decode_i16_be, split_to_2_byte, Opcode, PacketId, ReplyKind};

/// Legacy value reported for a sensor read that failed or timed out
pub const READ_FAILED: i32 = -1;

/// Operating mode of the robot controller.
///
/// The driver never tracks this; it only documents where each mode command leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Off,
    Passive,
    Safe,
    Full,
}

/// Fire-and-forget mode change commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeCommand {
    Start,
    Safe,
    Full,
    Reset,
    Stop,
}

impl ModeCommand {
    pub fn opcode(self) -> Opcode {
        match self {
            ModeCommand::Start => Opcode::Start,
            ModeCommand::Safe => Opcode::Safe,
            ModeCommand::Full => Opcode::Full,
            ModeCommand::Reset => Opcode::Reset,
            ModeCommand::Stop => Opcode::Stop,
        }
    }

    /// Mode the robot enters after accepting this command
    pub fn resulting_mode(self) -> Mode {
        match self {
            ModeCommand::Start => Mode::Passive,
            ModeCommand::Safe => Mode::Safe,
            ModeCommand::Full => Mode::Full,
            ModeCommand::Reset | ModeCommand::Stop => Mode::Off,
        }
    }
}

/// Rotation direction, used to pick the sign of a turn-in-place radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnSense {
    #[serde(rename = "CW")]
    Clockwise,
    #[serde(rename = "CCW")]
    CounterClockwise,
}

/// Terminal drive command, already clamped and ready for the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionCommand {
    /// Linear speed (mm/s) along an arc of the given radius (mm)
    DriveArc {
        speed: i16,
        radius: i16,
        turn: TurnSense,
    },
    /// Per-wheel speeds (mm/s)
    DriveIndependent { speed_right: i16, speed_left: i16 },
}

impl MotionCommand {
    /// Opcode followed by the two big-endian 16-bit fields
    pub fn to_bytes(&self) -> [u8; 5] {
        let (opcode, first, second) = match *self {
            MotionCommand::DriveArc { speed, radius, .. } => (Opcode::DriveArc, speed, radius),
            MotionCommand::DriveIndependent {
                speed_right,
                speed_left,
            } => (Opcode::DriveIndependent, speed_right, speed_left),
        };
        let (first_hi, first_lo) = split_to_2_byte(first);
        let (second_hi, second_lo) = split_to_2_byte(second);
        [opcode as u8, first_hi, first_lo, second_hi, second_lo]
    }
}

/// Lower four bits of a status byte (bumper/wheel-drop or buttons)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitfield4(u8);

impl Bitfield4 {
    pub fn new(raw: u8) -> Self {
        Self(raw & 0x0F)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether bit `n` (0 = least significant) is set
    pub fn is_set(self, n: u8) -> bool {
        n < 4 && self.0 & (1 << n) != 0
    }
}

// MSB-first, always four characters
impl fmt::Display for Bitfield4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorValue {
    UnsignedByte(u8),
    Bitfield4(Bitfield4),
    SignedInt16(i16),
    /// Short reply, timeout, or channel error
    Failed,
}

/// One decoded sensor reply, tagged with the packet that was queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    pub packet: PacketId,
    pub value: SensorValue,
}

impl SensorReading {
    pub fn failed(packet: PacketId) -> Self {
        Self {
            packet,
            value: SensorValue::Failed,
        }
    }

    /// Interpret a reply for `packet`. Fewer bytes than the packet's reply size is a failed read.
    pub fn decode(packet: PacketId, reply: &[u8]) -> Self {
        if reply.len() < packet.reply_size() {
            return Self::failed(packet);
        }
        let value = match packet.reply_kind() {
            ReplyKind::UnsignedByte => SensorValue::UnsignedByte(reply[0]),
            ReplyKind::Bitfield4 => SensorValue::Bitfield4(Bitfield4::new(reply[0])),
            ReplyKind::SignedInt16 => SensorValue::SignedInt16(decode_i16_be(reply[0], reply[1])),
        };
        Self { packet, value }
    }

    pub fn is_failed(&self) -> bool {
        self.value == SensorValue::Failed
    }

    /// Numeric value, with [`READ_FAILED`] standing in for a failed read
    pub fn value(&self) -> i32 {
        match self.value {
            SensorValue::UnsignedByte(b) => b as i32,
            SensorValue::Bitfield4(bits) => bits.bits() as i32,
            SensorValue::SignedInt16(v) => v as i32,
            SensorValue::Failed => READ_FAILED,
        }
    }

    /// Bitfield rendered as a four character binary string, if this reading is one
    pub fn bit_string(&self) -> Option<String> {
        match self.value {
            SensorValue::Bitfield4(bits) => Some(bits.to_string()),
            _ => None,
        }
    }
}
