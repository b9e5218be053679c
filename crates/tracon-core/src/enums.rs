//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Aircraft flight mode, from pushback to touchdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightMode {
    /// Parked at the gate, not yet moving.
    Apron,
    /// Taxiing to the departure runway.
    Taxi,
    /// Holding short of the runway, in the departure queue.
    Waiting,
    /// Takeoff roll and initial climb.
    Takeoff,
    /// Normal flight.
    #[default]
    Cruise,
    /// Established on an instrument approach.
    Landing,
}

/// Whether an aircraft is inbound or outbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightCategory {
    Arrival,
    Departure,
}

/// Commanded turn direction. `None` on a target means the shorter way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// The opposite direction.
    pub fn opposite(self) -> Self {
        match self {
            TurnDirection::Left => TurnDirection::Right,
            TurnDirection::Right => TurnDirection::Left,
        }
    }
}

/// Flight plan leg classification: which kind of route element produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegKind {
    /// Standard instrument departure.
    Sid,
    /// Standard terminal arrival.
    Star,
    /// Direct to a fix.
    Fix,
    /// Instrument approach procedure.
    Approach,
    /// Controller-issued vector or hold, outside any published route.
    Manual,
}

/// Powerplant class; drives the residual climb rate at the ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineClass {
    #[default]
    Jet,
    Prop,
}

/// Wake turbulence weight class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightClass {
    Light,
    #[default]
    Medium,
    Heavy,
    Super,
}

impl WeightClass {
    /// Suffix appended to the radio callsign, if any.
    pub fn radio_suffix(self) -> Option<&'static str> {
        match self {
            WeightClass::Heavy => Some("heavy"),
            WeightClass::Super => Some("super"),
            WeightClass::Light | WeightClass::Medium => None,
        }
    }
}

/// How a departure's exit from controlled airspace is judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DepartureClearance {
    /// Cleared via a SID; the exit fix of the named transition must
    /// remain in the plan when the aircraft leaves the airspace.
    Procedure { sid: String, exit: String },
    /// Cleared on a radial (radians); the exit radial must match within
    /// tolerance.
    Radial { radial: f64 },
}
