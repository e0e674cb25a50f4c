// Motion translator for the differential-drive base
// Converts motion intents into clamped wire-ready drive commands.

use crate::config::PhysicalConstants;
use crate::messages::{MotionCommand, TurnSense};

/// Wheel/body speed limit (mm/s)
pub const MAX_SPEED: i32 = 500;

/// Largest radius the robot drives as an arc (mm); anything beyond drives straight
pub const MAX_ARC_RADIUS: i32 = 2000;

/// Radius the robot interprets as "drive straight" (0x8000 on the wire)
pub const DRIVE_STRAIGHT: i16 = i16::MIN;

/// Radius requested by `go` for straight-line travel and the bound on computed radii
pub const STRAIGHT_RADIUS_REQUEST: i32 = 32767;

/// Caller speeds are cm/s, the robot takes mm/s
const CM_TO_MM: f64 = 10.0;

/// An arc drive before clamping and encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcRequest {
    pub speed: i32,  // mm/s
    pub radius: i32, // mm
    pub turn: TurnSense,
}

impl ArcRequest {
    pub fn to_command(self) -> MotionCommand {
        arc_command(self.speed, self.radius, self.turn)
    }
}

/// Clamp an arc drive into a terminal command.
///
/// Speed is clamped to ±[`MAX_SPEED`]. A radius beyond ±[`MAX_ARC_RADIUS`]
/// becomes [`DRIVE_STRAIGHT`]; a zero radius becomes a turn in place
/// (-1 clockwise, +1 counter-clockwise).
pub fn arc_command(speed: i32, radius: i32, turn: TurnSense) -> MotionCommand {
    let speed = speed.clamp(-MAX_SPEED, MAX_SPEED) as i16;

    let radius = if !(-MAX_ARC_RADIUS..=MAX_ARC_RADIUS).contains(&radius) {
        DRIVE_STRAIGHT
    } else if radius == 0 {
        match turn {
            TurnSense::Clockwise => -1,
            TurnSense::CounterClockwise => 1,
        }
    } else {
        radius as i16
    };

    MotionCommand::DriveArc {
        speed,
        radius,
        turn,
    }
}

/// Translate a speed (cm/s) and a heading change (degrees) into an arc drive.
///
/// * zero speed: turn in place, wheel speed = |angle in rad| * wheel_span / 2
/// * zero angle: straight line at 10x speed
/// * otherwise: arc with radius = 10x speed / angle in rad, clamped to ±32767
///
/// An angle that is not finite, or too small to survive the conversion to
/// radians, is driven as a straight line.
pub fn go(speed: f64, angle_deg: f64, constants: &PhysicalConstants) -> ArcRequest {
    let radians = angle_deg.to_radians();

    if speed == 0.0 {
        let turn = if radians >= 0.0 {
            TurnSense::CounterClockwise
        } else {
            TurnSense::Clockwise
        };
        let wheel_speed = radians.abs() * (constants.wheel_span / 2.0);
        return ArcRequest {
            speed: wheel_speed as i32, // truncates
            radius: 0,
            turn,
        };
    }

    let scaled_speed = CM_TO_MM * speed;

    if radians == 0.0 || !radians.is_finite() {
        return ArcRequest {
            speed: scaled_speed as i32,
            radius: STRAIGHT_RADIUS_REQUEST,
            turn: TurnSense::Clockwise,
        };
    }

    let radius = scaled_speed / radians;
    if radius.is_nan() {
        return ArcRequest {
            speed: scaled_speed as i32,
            radius: STRAIGHT_RADIUS_REQUEST,
            turn: TurnSense::Clockwise,
        };
    }

    let turn = if radius >= 0.0 {
        TurnSense::CounterClockwise
    } else {
        TurnSense::Clockwise
    };
    let bound = STRAIGHT_RADIUS_REQUEST as f64;
    ArcRequest {
        speed: scaled_speed as i32,
        radius: radius.clamp(-bound, bound) as i32,
        turn,
    }
}

/// Per-wheel drive from speeds in cm/s, each clamped to ±[`MAX_SPEED`] mm/s
pub fn independent_command(speed_right: i32, speed_left: i32) -> MotionCommand {
    let scale = |cm: i32| cm.saturating_mul(CM_TO_MM as i32).clamp(-MAX_SPEED, MAX_SPEED) as i16;
    MotionCommand::DriveIndependent {
        speed_right: scale(speed_right),
        speed_left: scale(speed_left),
    }
}
