//! Controller instructions sent to aircraft.
//!
//! Instructions arrive as token batches (`CommandRequest`), are validated
//! and parsed into typed `Instruction` values, and are applied per aircraft
//! at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::TurnDirection;

/// One instruction as transmitted: a command name plus argument tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInstruction {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// A batch of instructions for one aircraft, applied in order within a
/// single control cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub callsign: String,
    pub instructions: Vec<RawInstruction>,
}

/// Hold leg length: timed legs reverse the inbound course when the clock
/// runs out; distance legs are accepted but never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum LegLength {
    Min(u32),
    Nm(f64),
}

/// All instructions an aircraft understands, fully typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Instruction {
    // --- Ground operations ---
    /// Taxi to a departure runway (airport default when omitted).
    Taxi { runway: Option<String> },
    /// Takeoff clearance. Deferred to the end of its batch so a runway
    /// change earlier in the same transmission is visible.
    Takeoff,

    // --- Lateral ---
    /// Fly a heading, absolute degrees or an incremental turn.
    Heading {
        direction: Option<TurnDirection>,
        degrees: f64,
        incremental: bool,
    },
    /// Proceed direct to a fix already in the flight plan.
    Direct { fix: String },
    /// Replace the route with direct legs over the listed fixes.
    Fixes { fixes: Vec<String> },
    /// Hold at a fix, or over the present position when no fix is given.
    Hold {
        direction: Option<TurnDirection>,
        leg_length: Option<LegLength>,
        fix: Option<String>,
    },
    /// Maintain the current heading, abandoning fix navigation.
    FlyPresentHeading,

    // --- Vertical / speed ---
    /// Climb or descend; `feet` is absolute MSL. Expedite may be given
    /// alone to expedite the previous clearance.
    Altitude { feet: Option<f64>, expedite: bool },
    /// Assigned indicated airspeed in knots.
    Speed { knots: f64 },

    // --- Procedures & routing ---
    /// Fly a standard instrument departure.
    Sid { code: String },
    /// Fly a standard terminal arrival ("ENTRY.NAME").
    Star { code: String },
    /// Replace the remainder of the route.
    Route { route: String },
    /// Replace the entire route.
    Reroute { route: String },
    /// Clear the departure as filed.
    ClearedAsFiled,
    /// Climb via the SID's published altitude restrictions.
    ClimbViaSid,
    /// Descend via the STAR's published altitude restrictions.
    DescendViaStar,

    // --- Approach ---
    /// Cleared for an instrument approach to a runway.
    Land {
        runway: String,
        variant: Option<String>,
    },
    /// Abort the current operation (taxi, approach, or fix navigation).
    Abort,

    // --- Queries & control ---
    /// Read back the current route.
    SayRoute,
    /// Remove the aircraft from the simulation.
    Delete,
    /// No-op inspection hook.
    Debug,
}

impl Instruction {
    /// Whether this instruction runs after all others in its batch.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Instruction::Takeoff)
    }
}
