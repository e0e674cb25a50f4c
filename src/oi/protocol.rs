// Open Interface command framing and sensor queries
//
// Every command is an opcode byte followed by zero or more argument bytes.
// Multi-byte fields are big-endian, negative values are 16-bit two's complement.
// Sensor query: [142, packet_id] -> fixed-size reply for that packet.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::channel::ByteChannel;
use crate::messages::{SensorReading, READ_FAILED};

/// Opcode vocabulary
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Reset = 7,
    Start = 128,
    Safe = 131,
    Full = 132,
    DriveArc = 137,
    DefineSong = 140,
    PlaySong = 141,
    QuerySensor = 142,
    DriveIndependent = 145,
    Stop = 173,
}

/// Sensor packet IDs used with [`Opcode::QuerySensor`]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketId {
    BumpWheelDrop = 7,    // 1 byte, bitfield
    CliffLeft = 9,        // 1 byte
    CliffFrontLeft = 10,  // 1 byte
    CliffFrontRight = 11, // 1 byte
    CliffRight = 12,      // 1 byte
    VirtualWall = 13,     // 1 byte
    Buttons = 18,         // 1 byte, bitfield
    Distance = 19,        // 2 bytes, signed (mm)
    Angle = 20,           // 2 bytes, signed (degrees)
}

/// How a sensor reply is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    UnsignedByte,
    Bitfield4,
    SignedInt16,
}

impl PacketId {
    pub const ALL: [PacketId; 9] = [
        PacketId::BumpWheelDrop,
        PacketId::CliffLeft,
        PacketId::CliffFrontLeft,
        PacketId::CliffFrontRight,
        PacketId::CliffRight,
        PacketId::VirtualWall,
        PacketId::Buttons,
        PacketId::Distance,
        PacketId::Angle,
    ];

    pub const CLIFFS: [PacketId; 4] = [
        PacketId::CliffLeft,
        PacketId::CliffRight,
        PacketId::CliffFrontLeft,
        PacketId::CliffFrontRight,
    ];

    pub fn reply_kind(self) -> ReplyKind {
        match self {
            PacketId::BumpWheelDrop | PacketId::Buttons => ReplyKind::Bitfield4,
            PacketId::Distance | PacketId::Angle => ReplyKind::SignedInt16,
            _ => ReplyKind::UnsignedByte,
        }
    }

    pub fn reply_size(self) -> usize {
        match self.reply_kind() {
            ReplyKind::SignedInt16 => 2,
            ReplyKind::UnsignedByte | ReplyKind::Bitfield4 => 1,
        }
    }
}

/// Error types for Open Interface communication
#[derive(Debug, thiserror::Error)]
pub enum OiError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Channel is not open")]
    NotOpen,

    #[error("Invalid config {path}: {reason}")]
    Config { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, OiError>;

/// Split a signed 16-bit value into (high, low) bytes, two's complement for negatives
pub fn split_to_2_byte(value: i16) -> (u8, u8) {
    let raw = value as u16; // v < 0 becomes 65536 + v
    ((raw >> 8) as u8, (raw & 0xFF) as u8)
}

/// Reassemble a big-endian signed 16-bit value
pub fn decode_i16_be(hi: u8, lo: u8) -> i16 {
    i16::from_be_bytes([hi, lo])
}

/// Command/response framing over a byte channel.
///
/// One command or query at a time: a reply is always associated with the
/// query written immediately before it.
pub struct OiBus<C: ByteChannel> {
    channel: C,
}

impl<C: ByteChannel> OiBus<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Write a single byte
    pub fn write_command(&mut self, byte: u8) -> Result<()> {
        self.channel.write_byte(byte)
    }

    pub fn send_opcode(&mut self, opcode: Opcode) -> Result<()> {
        debug!("Send {:?} ({})", opcode, opcode as u8);
        self.write_command(opcode as u8)
    }

    /// Opcode followed by its arguments, one byte write each, in order
    pub fn send_command(&mut self, opcode: Opcode, args: &[u8]) -> Result<()> {
        debug!("Send {:?} ({}) args={:?}", opcode, opcode as u8, args);
        self.write_command(opcode as u8)?;
        for &arg in args {
            self.write_command(arg)?;
        }
        Ok(())
    }

    /// Write a pre-built frame (opcode already in the first byte)
    pub fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        debug!("Send frame {:?}", frame);
        for &byte in frame {
            self.write_command(byte)?;
        }
        Ok(())
    }

    /// Read one unsigned byte, [`READ_FAILED`] if nothing arrived
    pub fn read_status(&mut self) -> i32 {
        match self.channel.read_bytes(1) {
            Ok(data) if !data.is_empty() => data[0] as i32,
            Ok(_) => READ_FAILED,
            Err(e) => {
                warn!("Status read failed: {}", e);
                READ_FAILED
            }
        }
    }

    /// Query a single sensor packet. Any failure yields a failed reading, never an error.
    pub fn query_sensor(&mut self, packet: PacketId) -> SensorReading {
        match self.try_query(packet) {
            Ok(reply) => {
                let reading = SensorReading::decode(packet, &reply);
                if reading.is_failed() {
                    warn!(
                        "Short reply for {:?}: expected {} bytes, got {}",
                        packet,
                        packet.reply_size(),
                        reply.len()
                    );
                } else {
                    debug!("{:?} -> {:?}", packet, reading.value);
                }
                reading
            }
            Err(e) => {
                warn!("Query {:?} failed: {}", packet, e);
                SensorReading::failed(packet)
            }
        }
    }

    fn try_query(&mut self, packet: PacketId) -> Result<Vec<u8>> {
        self.send_command(Opcode::QuerySensor, &[packet as u8])?;
        self.channel.read_bytes(packet.reply_size())
    }
}
