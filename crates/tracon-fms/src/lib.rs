//! Flight management system: waypoints, legs, and the flight plan.
//!
//! A flight plan is a sequence of legs, each expanded from a route
//! element (SID, STAR, direct fix, approach, or a controller vector)
//! into concrete waypoints. A cursor marks the active waypoint; the
//! guidance systems read the plan every tick and advance the cursor as
//! waypoints are sequenced.

pub mod plan;
pub mod route;
pub mod waypoint;

pub use plan::{ClearanceOverlay, FlightPlan, Leg, WaypointAssignment};
pub use route::RouteError;
pub use waypoint::{HoldParams, HoldTimer, NavTarget, Waypoint};

#[cfg(test)]
mod tests;
