// High-level driver for the robot base
//
// Combines motion translation and the Open Interface protocol into a simple
// API: mode changes, drive commands, songs, and sensor polling.

use tracing::{debug, info, warn};

use super::channel::{ByteChannel, SerialChannel};
use super::motion::{arc_command, go, independent_command};
use super::protocol::{OiBus, PacketId, Result};
use super::songs::{Song, START_SONG, WARNING_SONG};
use crate::config::{DriverConfig, PhysicalConstants};
use crate::messages::{ModeCommand, MotionCommand, SensorReading, SensorValue, TurnSense};

/// High-level driver. Owns the channel; the channel is closed when the driver is dropped.
pub struct RobotDriver<C: ByteChannel = SerialChannel> {
    bus: OiBus<C>,
    constants: PhysicalConstants,
}

impl RobotDriver<SerialChannel> {
    /// Create a driver for the serial port described by `config` and open it
    pub fn connect(config: &DriverConfig) -> Result<Self> {
        let mut driver = Self::with_channel(SerialChannel::from_config(config), config.physical);
        driver.open()?;
        Ok(driver)
    }
}

impl<C: ByteChannel> RobotDriver<C> {
    /// Wrap an unopened channel
    pub fn with_channel(channel: C, constants: PhysicalConstants) -> Self {
        Self {
            bus: OiBus::new(channel),
            constants,
        }
    }

    pub fn open(&mut self) -> Result<()> {
        self.bus.channel_mut().open()
    }

    pub fn close(&mut self) {
        self.bus.channel_mut().close();
    }

    pub fn is_open(&self) -> bool {
        self.bus.channel().is_open()
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    pub fn bus_mut(&mut self) -> &mut OiBus<C> {
        &mut self.bus
    }

    // === Modes ===

    pub fn set_mode(&mut self, command: ModeCommand) -> Result<()> {
        info!(
            "{:?} (robot enters {:?} mode)",
            command,
            command.resulting_mode()
        );
        self.bus.send_opcode(command.opcode())
    }

    /// Passive mode
    pub fn start(&mut self) -> Result<()> {
        self.set_mode(ModeCommand::Start)
    }

    pub fn safe(&mut self) -> Result<()> {
        self.set_mode(ModeCommand::Safe)
    }

    pub fn full(&mut self) -> Result<()> {
        self.set_mode(ModeCommand::Full)
    }

    /// Power-cycle the controller; Start is needed afterwards
    pub fn reset(&mut self) -> Result<()> {
        self.set_mode(ModeCommand::Reset)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.set_mode(ModeCommand::Stop)
    }

    // === Motion ===

    pub fn send_motion(&mut self, command: MotionCommand) -> Result<()> {
        debug!("Motion: {:?}", command);
        self.bus.send_frame(&command.to_bytes())
    }

    /// Arc drive: speed (mm/s), radius (mm), direction for zero-radius turns
    pub fn drive_arc(&mut self, speed: i32, radius: i32, turn: TurnSense) -> Result<()> {
        self.send_motion(arc_command(speed, radius, turn))
    }

    /// Drive at `speed` (cm/s) while turning by `angle_deg`
    pub fn go(&mut self, speed: f64, angle_deg: f64) -> Result<()> {
        let request = go(speed, angle_deg, &self.constants);
        debug!("go({}, {}) -> {:?}", speed, angle_deg, request);
        self.send_motion(request.to_command())
    }

    /// Per-wheel drive, speeds in cm/s
    pub fn drive_independent(&mut self, speed_right: i32, speed_left: i32) -> Result<()> {
        self.send_motion(independent_command(speed_right, speed_left))
    }

    /// Zero-speed per-wheel drive
    pub fn halt(&mut self) -> Result<()> {
        self.drive_independent(0, 0)
    }

    // === Songs ===

    pub fn define_song(&mut self, song: &Song) -> Result<()> {
        self.bus.send_frame(&song.define_frame())
    }

    pub fn play_song(&mut self, song: &Song) -> Result<()> {
        self.bus.send_frame(&song.play_frame())
    }

    pub fn set_start_song(&mut self) -> Result<()> {
        self.define_song(&START_SONG)
    }

    pub fn play_start_song(&mut self) -> Result<()> {
        self.play_song(&START_SONG)
    }

    pub fn set_warning_song(&mut self) -> Result<()> {
        self.define_song(&WARNING_SONG)
    }

    pub fn play_warning_song(&mut self) -> Result<()> {
        self.play_song(&WARNING_SONG)
    }

    // === Sensors ===

    pub fn read_sensor(&mut self, packet: PacketId) -> SensorReading {
        self.bus.query_sensor(packet)
    }

    pub fn read_bump_wheel_drop(&mut self) -> SensorReading {
        self.read_sensor(PacketId::BumpWheelDrop)
    }

    pub fn read_buttons(&mut self) -> SensorReading {
        self.read_sensor(PacketId::Buttons)
    }

    pub fn read_cliff_left(&mut self) -> SensorReading {
        self.read_sensor(PacketId::CliffLeft)
    }

    pub fn read_cliff_right(&mut self) -> SensorReading {
        self.read_sensor(PacketId::CliffRight)
    }

    pub fn read_cliff_front_left(&mut self) -> SensorReading {
        self.read_sensor(PacketId::CliffFrontLeft)
    }

    pub fn read_cliff_front_right(&mut self) -> SensorReading {
        self.read_sensor(PacketId::CliffFrontRight)
    }

    pub fn read_virtual_wall(&mut self) -> SensorReading {
        self.read_sensor(PacketId::VirtualWall)
    }

    /// Heading change in degrees
    pub fn read_angle(&mut self) -> SensorReading {
        self.read_sensor(PacketId::Angle)
    }

    /// Distance travelled in mm
    pub fn read_distance(&mut self) -> SensorReading {
        self.read_sensor(PacketId::Distance)
    }

    /// True if the sum of the four cliff sensors is nonzero.
    ///
    /// Failed reads count as zero so a timeout cannot cancel out a real cliff.
    pub fn check_cliffs(&mut self) -> bool {
        let mut sum: u32 = 0;
        for packet in PacketId::CLIFFS {
            match self.read_sensor(packet).value {
                SensorValue::UnsignedByte(b) => sum += b as u32,
                SensorValue::Failed => warn!("{:?} unavailable, counted as clear", packet),
                other => warn!("Unexpected value {:?} for {:?}", other, packet),
            }
        }
        sum > 0
    }

    /// Poll every known sensor once, in packet table order
    pub fn read_all(&mut self) -> Vec<SensorReading> {
        PacketId::ALL
            .iter()
            .map(|&packet| self.read_sensor(packet))
            .collect()
    }
}

impl<C: ByteChannel> Drop for RobotDriver<C> {
    fn drop(&mut self) {
        self.close();
    }
}
