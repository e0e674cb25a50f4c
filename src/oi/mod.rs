// Open Interface driver for a differential-drive robot base
//
// Provides:
// - Byte channel abstraction and serial port implementation
// - Command framing and sensor query decoding
// - Motion translation (arc, speed + angle, per-wheel) with clamping
// - High-level robot driver API

pub mod channel;
mod driver;
pub mod motion;
pub mod protocol;
pub mod songs;

pub use channel::{ByteChannel, SerialChannel};
pub use driver::RobotDriver;
pub use motion::{arc_command, go, independent_command, ArcRequest};
pub use protocol::{OiBus, OiError, Opcode, PacketId, Result};
pub use songs::{Song, START_SONG, WARNING_SONG};
