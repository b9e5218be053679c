//! Fundamental geometric and simulation types.
//!
//! The playing surface is a flat Cartesian plane centered on the airport:
//! x = kilometres east, y = kilometres north. Bearings and headings are
//! radians, 0 = north, increasing clockwise.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::{GRAVITY_MS2, MS_PER_KT};

/// Simulation time tracking. Ticks advance by an externally supplied
/// elapsed-time delta, so pause and fast-forward are the caller's concern.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Normalize an angle into [0, 2π).
pub fn normalize_angle(radians: f64) -> f64 {
    radians.rem_euclid(std::f64::consts::TAU)
}

/// Signed smallest rotation from `from` to `to`, in (-π, π].
/// Positive means `to` lies clockwise of `from`.
pub fn angle_offset(to: f64, from: f64) -> f64 {
    let diff = (to - from).rem_euclid(std::f64::consts::TAU);
    if diff > std::f64::consts::PI {
        diff - std::f64::consts::TAU
    } else {
        diff
    }
}

/// Bearing from one position to another, radians clockwise from north.
pub fn bearing_to(from: DVec2, to: DVec2) -> f64 {
    let d = to - from;
    d.x.atan2(d.y).rem_euclid(std::f64::consts::TAU)
}

/// Unit vector pointing along a bearing.
pub fn heading_vector(radians: f64) -> DVec2 {
    DVec2::new(radians.sin(), radians.cos())
}

/// Clamped linear map of `value` from one range onto another.
pub fn map_range_clamp(value: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    let (x0, x1) = from;
    let (y0, y1) = to;
    if (x1 - x0).abs() < f64::EPSILON {
        return y0;
    }
    let t = ((value - x0) / (x1 - x0)).clamp(0.0, 1.0);
    y0 + t * (y1 - y0)
}

/// Lateral/longitudinal/straight-line offsets of a position from a target,
/// measured against a course bearing through the target: `longitudinal` is
/// the distance still to run along the course, `lateral` the signed
/// cross-course miss distance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CourseOffset {
    pub lateral: f64,
    pub longitudinal: f64,
    pub straight: f64,
}

/// Decompose the vector from `position` to `target` against a course bearing.
pub fn course_offset(position: DVec2, target: DVec2, course: f64) -> CourseOffset {
    let to_target = target - position;
    let straight = to_target.length();
    let bearing = to_target.x.atan2(to_target.y);
    CourseOffset {
        lateral: straight * (course - bearing).sin(),
        longitudinal: straight * (course - bearing).cos(),
        straight,
    }
}

/// Turn radius (metres) at a speed (m/s) and bank angle.
pub fn turn_radius_m(speed_ms: f64, bank: f64) -> f64 {
    (speed_ms * speed_ms) / (GRAVITY_MS2 * bank.tan())
}

/// Distance (km) before a fix at which a turn through `course_change`
/// radians should begin, at `speed_kt` and the given bank angle.
pub fn turn_initiation_km(speed_kt: f64, bank: f64, course_change: f64) -> f64 {
    let speed_ms = speed_kt * MS_PER_KT;
    let radius = turn_radius_m(speed_ms, bank);
    (radius * (course_change / 2.0).tan() + speed_ms) / 1000.0
}

/// Format a heading as the three-digit string controllers read ("360" for
/// north, leading zeros kept).
pub fn heading_to_string(radians: f64) -> String {
    let degrees = normalize_angle(radians).to_degrees().round() as i64 % 360;
    if degrees == 0 {
        "360".to_string()
    } else {
        format!("{degrees:03}")
    }
}
