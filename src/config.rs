// Serial operating point, robot geometry, and loadable driver configuration
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::oi::{OiError, Result};

// Serial port the robot is attached to
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

// Open Interface runs at a fixed baud rate
pub const DEFAULT_BAUDRATE: u32 = 115_200;

// Sensor replies that take longer than this are reported as failed reads
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

// Robot geometry (millimeters)
pub const WHEEL_SPAN_MM: f64 = 235.0;
pub const WHEEL_DIAMETER_MM: f64 = 72.0;

/// Physical properties of the robot used by the motion translator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Distance between the two drive wheels (mm)
    pub wheel_span: f64,
    /// Drive wheel diameter (mm)
    pub wheel_diameter: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            wheel_span: WHEEL_SPAN_MM,
            wheel_diameter: WHEEL_DIAMETER_MM,
        }
    }
}

/// Everything needed to open a driver. Missing JSON fields fall back to the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub port: String,
    pub baudrate: u32,
    pub timeout_ms: u64,
    pub physical: PhysicalConstants,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baudrate: DEFAULT_BAUDRATE,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            physical: PhysicalConstants::default(),
        }
    }
}

impl DriverConfig {
    /// Default configuration on a different port
    pub fn with_port(port: &str) -> Self {
        Self {
            port: port.to_string(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text).map_err(|e| match e {
            OiError::Config { reason, .. } => OiError::Config {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| OiError::Config {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_operating_point() {
        let cfg = DriverConfig::default();
        assert_eq!(cfg.port, "/dev/ttyUSB0");
        assert_eq!(cfg.baudrate, 115_200);
        assert_eq!(cfg.timeout(), Duration::from_secs(1));
        assert_eq!(cfg.physical.wheel_span, 235.0);
        assert_eq!(cfg.physical.wheel_diameter, 72.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = DriverConfig::from_json_str(r#"{"port": "/dev/ttyACM0"}"#).unwrap();
        assert_eq!(cfg.port, "/dev/ttyACM0");
        assert_eq!(cfg.baudrate, DEFAULT_BAUDRATE);
        assert_eq!(cfg.physical, PhysicalConstants::default());
    }

    #[test]
    fn test_physical_override() {
        let cfg = DriverConfig::from_json_str(
            r#"{"physical": {"wheel_span": 258.0, "wheel_diameter": 72.0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.physical.wheel_span, 258.0);
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = DriverConfig::from_json_str("{port:").unwrap_err();
        assert!(matches!(err, OiError::Config { .. }));
    }
}
