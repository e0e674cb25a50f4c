// Byte channel the protocol layer talks through, plus the serial port implementation

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{self, SerialPort};
use tracing::{debug, info};

use super::{OiError, Result};
use crate::config::DriverConfig;

/// Byte-oriented link to the robot.
///
/// Must be opened before any command. `read_bytes` may return fewer than `n`
/// bytes (possibly none) when the link times out.
pub trait ByteChannel {
    fn open(&mut self) -> Result<()>;
    fn close(&mut self);
    fn is_open(&self) -> bool;
    fn write_byte(&mut self, byte: u8) -> Result<()>;
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>>;
}

/// Serial port channel. The port is held only between `open` and `close`.
pub struct SerialChannel {
    port_name: String,
    baudrate: u32,
    timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialChannel {
    pub fn new(port_name: &str, baudrate: u32, timeout: Duration) -> Self {
        Self {
            port_name: port_name.to_string(),
            baudrate,
            timeout,
            port: None,
        }
    }

    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(&config.port, config.baudrate, config.timeout())
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(OiError::NotOpen)
    }
}

impl ByteChannel for SerialChannel {
    fn open(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Ok(());
        }
        info!("Opening {} at {} baud", self.port_name, self.baudrate);
        let port = serialport::new(&self.port_name, self.baudrate)
            .timeout(self.timeout)
            .open()?;
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!("Closed {}", self.port_name);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        let port = self.port_mut()?;
        port.write_all(&[byte])?;
        port.flush()?;
        Ok(())
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let port = self.port_mut()?;
        let mut buf = vec![0u8; n];
        let mut filled = 0;

        // Keep reading until the reply is complete or the port times out
        while filled < n {
            match port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(count) => filled += count,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    debug!("Read timed out after {} of {} bytes", filled, n);
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(OiError::Io(e)),
            }
        }

        buf.truncate(filled);
        Ok(buf)
    }
}

impl Drop for SerialChannel {
    fn drop(&mut self) {
        self.close();
    }
}

/// In-memory channel for tests: records writes, replays queued reply bytes
#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;

    use super::ByteChannel;
    use crate::oi::{OiError, Result};

    #[derive(Debug, Default)]
    pub struct ScriptedChannel {
        pub open: bool,
        pub open_count: usize,
        pub close_count: usize,
        pub written: Vec<u8>,
        pub replies: VecDeque<u8>,
        pub fail_writes: bool,
    }

    impl ScriptedChannel {
        pub fn opened() -> Self {
            Self {
                open: true,
                ..Self::default()
            }
        }

        pub fn queue_reply(&mut self, bytes: &[u8]) {
            self.replies.extend(bytes.iter().copied());
        }

        pub fn take_written(&mut self) -> Vec<u8> {
            std::mem::take(&mut self.written)
        }
    }

    impl ByteChannel for ScriptedChannel {
        fn open(&mut self) -> Result<()> {
            self.open = true;
            self.open_count += 1;
            Ok(())
        }

        fn close(&mut self) {
            if self.open {
                self.close_count += 1;
            }
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn write_byte(&mut self, byte: u8) -> Result<()> {
            if !self.open {
                return Err(OiError::NotOpen);
            }
            if self.fail_writes {
                return Err(OiError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "scripted write failure",
                )));
            }
            self.written.push(byte);
            Ok(())
        }

        fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
            if !self.open {
                return Err(OiError::NotOpen);
            }
            let count = n.min(self.replies.len());
            Ok(self.replies.drain(..count).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::ScriptedChannel;
    use super::*;

    #[test]
    fn test_serial_channel_starts_closed() {
        let mut ch = SerialChannel::new("/dev/does-not-exist", 115_200, Duration::from_secs(1));
        assert!(!ch.is_open());
        assert!(matches!(ch.write_byte(128), Err(OiError::NotOpen)));
        assert!(matches!(ch.read_bytes(1), Err(OiError::NotOpen)));
    }

    #[test]
    fn test_serial_channel_open_missing_port_fails() {
        let mut ch = SerialChannel::new("/dev/does-not-exist", 115_200, Duration::from_secs(1));
        assert!(ch.open().is_err());
        assert!(!ch.is_open());
    }

    #[test]
    fn test_scripted_short_read() {
        let mut ch = ScriptedChannel::opened();
        ch.queue_reply(&[0x01]);
        assert_eq!(ch.read_bytes(2).unwrap(), vec![0x01]);
        assert!(ch.read_bytes(1).unwrap().is_empty());
    }
}
