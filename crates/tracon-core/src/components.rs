//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Simulation logic lives in systems, not components.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Who this aircraft is on frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Flight number callsign, e.g. "AAL123".
    pub callsign: String,
    /// Spoken callsign, e.g. "American one two three heavy".
    pub radio_callsign: String,
    /// Airframe ICAO designator, e.g. "B738".
    pub aircraft_type: String,
}

/// Book climb/descent/acceleration rates for an airframe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateProfile {
    /// Sea-level climb rate (ft/min).
    pub climb: f64,
    /// Descent rate (ft/min).
    pub descent: f64,
    /// Acceleration (kt/s, halved in use).
    pub accelerate: f64,
    /// Deceleration (kt/s, halved in use).
    pub decelerate: f64,
}

/// Speed envelope for an airframe (knots indicated).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Minimum flying speed; below it airborne aircraft stall.
    pub min: f64,
    /// Landing reference speed.
    pub landing: f64,
    /// Normal cruise speed.
    pub cruise: f64,
    /// Never-exceed speed.
    pub max: f64,
}

/// Airframe performance data, fixed for the life of the aircraft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Performance {
    /// Service ceiling (ft).
    pub ceiling: f64,
    pub rate: RateProfile,
    pub speed: SpeedProfile,
    pub engine_class: EngineClass,
    pub weight_class: WeightClass,
}

/// Operational flight state: mode, runways, clearances, ground timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightState {
    pub category: FlightCategory,
    pub mode: FlightMode,
    /// Set once on terrain collision; the aircraft then falls ballistically.
    pub hit: bool,
    /// Whether the aircraft is currently inside controlled airspace.
    pub inside_airspace: bool,
    /// Assigned departure runway end name.
    pub departure_runway: Option<String>,
    /// Assigned arrival runway end name.
    pub arrival_runway: Option<String>,
    /// Sim time (secs) at which taxi began.
    pub taxi_start: f64,
    /// Taxi duration (secs) before reaching the hold-short point.
    pub taxi_time: f64,
    /// Sim time (secs) of the takeoff clearance, or spawn for arrivals.
    pub takeoff_time: f64,
    /// How this departure's airspace exit is judged. `None` for arrivals.
    pub departure_clearance: Option<DepartureClearance>,
    /// Filed cruise altitude (ft) resumed after leaving the airspace.
    pub filed_altitude: f64,
}

/// Continuous motion state, integrated every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kinematics {
    /// Kilometres east/north of the field.
    pub position: DVec2,
    /// Radians clockwise from north.
    pub heading: f64,
    /// Feet MSL.
    pub altitude: f64,
    /// Knots indicated.
    pub speed: f64,
    /// Knots over the ground, from the last integration.
    pub ground_speed: f64,
    /// Actual track made good (radians).
    pub ground_track: f64,
    /// Kilometres moved last tick.
    pub ds: f64,
    /// -1 descending, 0 level, +1 climbing.
    pub trend: i8,
    /// Bearing of the aircraft from the field (radians).
    pub radial: f64,
    /// Distance from the field (km).
    pub distance: f64,
}

/// Target state the autopilot steers toward; recomputed every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightTarget {
    /// Desired heading; `None` holds the present heading.
    pub heading: Option<f64>,
    /// Forced turn direction; `None` turns the shorter way.
    pub turn: Option<TurnDirection>,
    /// Desired altitude (ft).
    pub altitude: f64,
    /// Climb/descend at 1.5x rate.
    pub expedite: bool,
    /// Desired speed (kt).
    pub speed: f64,
}

impl Default for FlightTarget {
    fn default() -> Self {
        Self {
            heading: None,
            turn: None,
            altitude: 0.0,
            expedite: false,
            speed: 0.0,
        }
    }
}

/// One radar trail sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub position: DVec2,
    /// Sim time (secs) at which the sample was taken.
    pub at_secs: f64,
}

/// Recent positions for the radar trail, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionHistory {
    pub samples: Vec<TrailPoint>,
}

/// Cached proximity state for one restricted area.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AreaCheck {
    /// Kilometres of flight remaining before the next containment check;
    /// `None` when the area is filtered out by altitude.
    pub range: Option<f64>,
    /// Whether the aircraft was inside at the last check.
    pub inside: bool,
}

/// Cached restricted-area and terrain proximity state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConflictState {
    /// One entry per restricted area, in airport order.
    pub restricted: Vec<AreaCheck>,
    /// Terrain band (ft) the caches below were computed for.
    pub terrain_level: f64,
    /// Kilometres of flight remaining before rechecking each polygon of
    /// the current band, in airport order. Infinity forces a recheck.
    pub terrain_ranges: Vec<f64>,
}
