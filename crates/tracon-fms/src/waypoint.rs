//! Waypoints: the atoms of a flight plan.
//!
//! A waypoint pairs a navigation target (fix, heading, hold, or runway)
//! with the altitude and speed constraints assigned at it. Constraints
//! are optional; unset fields defer to the plan's clearance overlay.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use tracon_core::commands::LegLength;
use tracon_core::enums::TurnDirection;

/// Hold leg clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum HoldTimer {
    /// Not yet past the hold fix.
    Idle,
    /// Leg just reversed; the clock restarts at the next guidance pass.
    Restart,
    /// The current leg began at this sim time (secs).
    Running { since: f64 },
}

/// Hold pattern state carried by a hold waypoint.
///
/// The pattern is flown as straight legs through the fix: the leg course
/// reverses by 180 degrees at each hold turn, honoring the commanded
/// turn direction. Distance-based legs are accepted as configuration
/// but never reverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldParams {
    /// Hold fix name; `None` for a present-position hold.
    pub fix: Option<String>,
    /// Hold fix position (km east/north).
    pub position: DVec2,
    /// Direction of hold turns.
    pub turn: TurnDirection,
    pub leg: LegLength,
    /// Bearing from the fix to the aircraft at issuance, for readbacks.
    pub inbound: f64,
    /// Course of the current hold leg (radians); reversed at each turn.
    pub leg_heading: f64,
    pub timer: HoldTimer,
}

/// What the active waypoint steers toward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum NavTarget {
    /// Proceed direct to a named fix.
    Fix { name: String, position: DVec2 },
    /// Fly an assigned heading; `None` means no directional instruction
    /// has been given and the present heading is kept.
    Heading {
        heading: Option<f64>,
        turn: Option<TurnDirection>,
    },
    /// Hold at a fix or over a position.
    Hold(HoldParams),
    /// Intercept the localizer and land.
    Runway {
        runway: String,
        /// Vector flown until intercepting the localizer.
        heading: Option<f64>,
        turn: Option<TurnDirection>,
    },
}

/// One flight plan waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub target: NavTarget,
    /// Crossing altitude (ft MSL).
    pub altitude: Option<f64>,
    /// Speed (kt).
    pub speed: Option<f64>,
    /// Expedite the climb or descent to the constraint.
    pub expedite: bool,
}

impl Waypoint {
    /// Direct to a fix.
    pub fn fix(name: impl Into<String>, position: DVec2) -> Self {
        Self {
            target: NavTarget::Fix {
                name: name.into().to_uppercase(),
                position,
            },
            altitude: None,
            speed: None,
            expedite: false,
        }
    }

    /// Fly a heading.
    pub fn heading(heading: f64) -> Self {
        Self {
            target: NavTarget::Heading {
                heading: Some(heading),
                turn: None,
            },
            altitude: None,
            speed: None,
            expedite: false,
        }
    }

    /// No directional instruction: wings level on the present heading.
    pub fn unrestricted() -> Self {
        Self {
            target: NavTarget::Heading {
                heading: None,
                turn: None,
            },
            altitude: None,
            speed: None,
            expedite: false,
        }
    }

    /// Enter a hold.
    pub fn hold(params: HoldParams) -> Self {
        Self {
            target: NavTarget::Hold(params),
            altitude: None,
            speed: None,
            expedite: false,
        }
    }

    /// The fix name when this waypoint navigates to one.
    pub fn fix_name(&self) -> Option<&str> {
        match &self.target {
            NavTarget::Fix { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The runway name when this waypoint is an approach target.
    pub fn runway_name(&self) -> Option<&str> {
        match &self.target {
            NavTarget::Runway { runway, .. } => Some(runway),
            _ => None,
        }
    }

    /// The assigned heading, when flying one.
    pub fn assigned_heading(&self) -> Option<f64> {
        match &self.target {
            NavTarget::Heading { heading, .. } => *heading,
            NavTarget::Runway { heading, .. } => *heading,
            _ => None,
        }
    }
}
