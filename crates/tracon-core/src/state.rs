//! Radar snapshot: the complete visible state emitted after each tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{ScoreEvent, StripUpdate, Transmission};
use crate::types::SimTime;

/// Everything a scope or test can observe about one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadarSnapshot {
    pub time: SimTime,
    /// All live aircraft, sorted by callsign.
    pub aircraft: Vec<AircraftView>,
    /// Departure queue contents per runway end, sorted by runway name.
    pub queues: Vec<RunwayQueueView>,
    pub score: ScoreView,
    /// Radio traffic emitted during this tick.
    pub transmissions: Vec<Transmission>,
    /// Score events emitted during this tick.
    pub score_events: Vec<ScoreEvent>,
    /// Strip refresh triggers emitted during this tick.
    pub strip_updates: Vec<StripUpdate>,
}

/// One aircraft as seen on the scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftView {
    pub callsign: String,
    pub aircraft_type: String,
    pub category: FlightCategory,
    pub mode: FlightMode,
    /// Kilometres east/north of the field.
    pub position: DVec2,
    /// Feet MSL.
    pub altitude: f64,
    /// Knots indicated.
    pub speed: f64,
    /// Radians clockwise from north.
    pub heading: f64,
    pub ground_speed: f64,
    pub ground_track: f64,
    /// -1 descending, 0 level, +1 climbing.
    pub trend: i8,
    pub inside_airspace: bool,
    /// Inside at least one restricted area.
    pub warning: bool,
    /// Collided with terrain.
    pub hit: bool,
    /// Trail positions, oldest first.
    pub trail: Vec<DVec2>,
}

/// Departure queue for one runway end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunwayQueueView {
    pub runway: String,
    /// Callsigns in order; the head holds takeoff priority.
    pub queue: Vec<String>,
}

/// Score counters plus the weighted total.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub state: crate::events::ScoreState,
    pub total: f64,
}
