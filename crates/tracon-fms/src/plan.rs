//! The flight plan: legs, the active-waypoint cursor, and clearance
//! state.
//!
//! Plan edits follow two shapes. Procedure and route changes replace
//! the tail of the plan from the cursor onward, never the flown part.
//! Controller vectors splice single-waypoint legs at or after the
//! cursor. Either way the plan always holds at least one leg and the
//! cursor always points at a waypoint.

use serde::{Deserialize, Serialize};

use tracon_airspace::procedures::ProcFix;
use tracon_airspace::Airport;
use tracon_core::enums::{DepartureClearance, LegKind};

use crate::route::{self, RouteSegment};
use crate::waypoint::{NavTarget, Waypoint};

/// Route code carried by controller-vector legs.
pub const VECTORS_ROUTE: &str = "[radar vectors]";
/// Route code carried by hold legs built off-procedure.
pub const HOLD_ROUTE: &str = "[GPS/RNAV]";

/// One leg: a route element expanded into waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub kind: LegKind,
    /// Route code this leg was built from, e.g. "KSFO.OFFSH9.SXC" or a
    /// bare fix name.
    pub route: String,
    pub waypoints: Vec<Waypoint>,
}

impl Leg {
    /// A single-waypoint vector leg.
    pub fn vectors(waypoint: Waypoint) -> Self {
        Self {
            kind: LegKind::Manual,
            route: VECTORS_ROUTE.to_string(),
            waypoints: vec![waypoint],
        }
    }

    /// A single-fix direct leg.
    pub fn direct(waypoint: Waypoint) -> Self {
        let route = waypoint.fix_name().unwrap_or(VECTORS_ROUTE).to_string();
        Self {
            kind: LegKind::Fix,
            route,
            waypoints: vec![waypoint],
        }
    }
}

/// A partial clearance; only the `Some` fields apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointAssignment {
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub expedite: Option<bool>,
}

/// Plan-wide clearance state: the latest assigned altitude and speed,
/// applied wherever a waypoint carries no constraint of its own.
/// Waypoint constraints win, so re-applying a procedure's published
/// restrictions shadows the overlay again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearanceOverlay {
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub expedite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    pub legs: Vec<Leg>,
    /// (leg index, waypoint index) of the active waypoint.
    current: (usize, usize),
    pub overlay: ClearanceOverlay,
}

impl Default for FlightPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl FlightPlan {
    /// A plan holding a single unrestricted vector leg.
    pub fn new() -> Self {
        Self {
            legs: vec![Leg::vectors(Waypoint::unrestricted())],
            current: (0, 0),
            overlay: ClearanceOverlay::default(),
        }
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.current
    }

    pub fn current_leg(&self) -> &Leg {
        &self.legs[self.current.0]
    }

    fn current_leg_mut(&mut self) -> &mut Leg {
        &mut self.legs[self.current.0]
    }

    pub fn current_waypoint(&self) -> &Waypoint {
        &self.legs[self.current.0].waypoints[self.current.1]
    }

    pub fn current_waypoint_mut(&mut self) -> &mut Waypoint {
        &mut self.legs[self.current.0].waypoints[self.current.1]
    }

    /// Applies a clearance to the active waypoint only.
    pub fn set_current(&mut self, assignment: WaypointAssignment) {
        let waypoint = self.current_waypoint_mut();
        if let Some(altitude) = assignment.altitude {
            waypoint.altitude = Some(altitude);
        }
        if let Some(speed) = assignment.speed {
            waypoint.speed = Some(speed);
        }
        if let Some(expedite) = assignment.expedite {
            waypoint.expedite = expedite;
        }
    }

    /// Applies a clearance plan-wide: records it in the overlay and
    /// clears the matching per-waypoint constraints from the cursor
    /// forward so the new assignment is not shadowed by stale ones.
    pub fn set_all(&mut self, assignment: WaypointAssignment) {
        if let Some(altitude) = assignment.altitude {
            self.overlay.altitude = Some(altitude);
        }
        if let Some(speed) = assignment.speed {
            self.overlay.speed = Some(speed);
        }
        if let Some(expedite) = assignment.expedite {
            self.overlay.expedite = expedite;
        }
        let (cur_leg, cur_wp) = self.current;
        for (li, leg) in self.legs.iter_mut().enumerate().skip(cur_leg) {
            let start = if li == cur_leg { cur_wp } else { 0 };
            for waypoint in leg.waypoints.iter_mut().skip(start) {
                if assignment.altitude.is_some() {
                    waypoint.altitude = None;
                }
                if assignment.speed.is_some() {
                    waypoint.speed = None;
                }
                if assignment.expedite.is_some() {
                    waypoint.expedite = false;
                }
            }
        }
    }

    /// Constraint at the active waypoint, falling back to the overlay.
    pub fn resolved_altitude(&self) -> Option<f64> {
        self.current_waypoint().altitude.or(self.overlay.altitude)
    }

    /// Resolved altitude, `0.0` when nothing has been assigned. Zero
    /// reads as "no altitude assigned" at clearance checks.
    pub fn altitude_for_current_waypoint(&self) -> f64 {
        self.resolved_altitude().unwrap_or(0.0)
    }

    pub fn resolved_speed(&self) -> Option<f64> {
        self.current_waypoint().speed.or(self.overlay.speed)
    }

    pub fn resolved_expedite(&self) -> bool {
        self.current_waypoint().expedite || self.overlay.expedite
    }

    pub fn append_leg(&mut self, leg: Leg) {
        debug_assert!(!leg.waypoints.is_empty());
        self.legs.push(leg);
    }

    /// Splices a leg at an index. Intended for insertion after the
    /// cursor; the cursor is not adjusted.
    pub fn insert_leg(&mut self, index: usize, leg: Leg) {
        debug_assert!(!leg.waypoints.is_empty());
        let index = index.min(self.legs.len());
        self.legs.insert(index, leg);
    }

    /// Splices a leg at the cursor and makes its first waypoint active.
    /// The displaced leg follows it and restarts from its first
    /// waypoint when reached.
    pub fn insert_leg_here(&mut self, leg: Leg) {
        debug_assert!(!leg.waypoints.is_empty());
        self.legs.insert(self.current.0, leg);
        self.current = (self.current.0, 0);
    }

    /// Splices a waypoint into the current leg at the cursor and makes
    /// it active, keeping the rest of the leg ahead.
    pub fn insert_waypoint_here(&mut self, waypoint: Waypoint) {
        let at = self.current.1;
        self.current_leg_mut().waypoints.insert(at, waypoint);
    }

    /// Appends a waypoint to the end of the current leg.
    pub fn append_waypoint(&mut self, waypoint: Waypoint) {
        self.current_leg_mut().waypoints.push(waypoint);
    }

    /// Advances the cursor, rolling into the next leg when the current
    /// one is exhausted. At the very end of the plan it stays put.
    pub fn next_waypoint(&mut self) {
        let (li, wi) = self.current;
        if wi + 1 < self.legs[li].waypoints.len() {
            self.current = (li, wi + 1);
        } else if li + 1 < self.legs.len() {
            self.current = (li + 1, 0);
        }
    }

    /// Jumps to the first waypoint of the next leg, when there is one.
    pub fn next_leg(&mut self) {
        let li = self.current.0;
        if li + 1 < self.legs.len() {
            self.current = (li + 1, 0);
        }
    }

    pub fn at_last_waypoint(&self) -> bool {
        let (li, wi) = self.current;
        li + 1 == self.legs.len() && wi + 1 == self.legs[li].waypoints.len()
    }

    /// Whether a fix appears at or ahead of the cursor.
    pub fn has_waypoint(&self, fix: &str) -> bool {
        self.position_of_fix(fix).is_some()
    }

    /// Moves the cursor to a fix ahead in the plan. `false` leaves the
    /// plan untouched.
    pub fn skip_to_fix(&mut self, fix: &str) -> bool {
        match self.position_of_fix(fix) {
            Some(position) => {
                self.current = position;
                true
            }
            None => false,
        }
    }

    fn position_of_fix(&self, fix: &str) -> Option<(usize, usize)> {
        let (cur_leg, cur_wp) = self.current;
        for (li, leg) in self.legs.iter().enumerate().skip(cur_leg) {
            let start = if li == cur_leg { cur_wp } else { 0 };
            for (wi, waypoint) in leg.waypoints.iter().enumerate().skip(start) {
                if waypoint
                    .fix_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(fix))
                {
                    return Some((li, wi));
                }
            }
        }
        None
    }

    /// SID identifier at or ahead of the cursor, when the plan still
    /// follows one.
    pub fn following_sid(&self) -> Option<String> {
        self.following_procedure(LegKind::Sid, 1)
    }

    /// STAR identifier at or ahead of the cursor.
    pub fn following_star(&self) -> Option<String> {
        self.following_procedure(LegKind::Star, 1)
    }

    /// Exit transition of the SID leg at or ahead of the cursor.
    pub fn following_sid_exit(&self) -> Option<String> {
        self.following_procedure(LegKind::Sid, 2)
    }

    fn following_procedure(&self, kind: LegKind, part: usize) -> Option<String> {
        self.legs
            .iter()
            .skip(self.current.0)
            .find(|leg| leg.kind == kind)
            .and_then(|leg| leg.route.split('.').nth(part))
            .map(str::to_string)
    }

    /// The whole plan as a parseable route string.
    pub fn route_string(&self) -> String {
        let codes: Vec<&str> = self.legs.iter().map(|leg| leg.route.as_str()).collect();
        codes.join("..")
    }

    fn replace_tail(&mut self, legs: Vec<Leg>) {
        debug_assert!(!legs.is_empty());
        self.legs.truncate(self.current.0);
        self.current = (self.legs.len(), 0);
        self.legs.extend(legs);
    }

    /// Replaces the plan tail with a SID expansion. `false` when the
    /// exit transition does not resolve.
    pub fn follow_sid(&mut self, airport: &Airport, sid: &str, runway: &str, exit: &str) -> bool {
        match route::expand_sid_leg(airport, sid, runway, exit) {
            Ok(leg) => {
                self.replace_tail(vec![leg]);
                true
            }
            Err(_) => false,
        }
    }

    /// Replaces the plan tail with a STAR expansion from an entry
    /// transition.
    pub fn follow_star(
        &mut self,
        airport: &Airport,
        entry: &str,
        star: &str,
        runway: Option<&str>,
    ) -> bool {
        match route::expand_star_leg(airport, entry, star, runway) {
            Ok(leg) => {
                self.replace_tail(vec![leg]);
                true
            }
            Err(_) => false,
        }
    }

    /// Replaces the plan tail with an approach to a runway. The active
    /// heading assignment rides along as the vector to fly until the
    /// localizer is intercepted, and the resolved altitude and speed
    /// are frozen onto the approach waypoint.
    pub fn follow_approach(&mut self, approach: &str, runway: &str) {
        let current = self.current_waypoint();
        let (heading, turn) = match &current.target {
            NavTarget::Heading { heading, turn } => (*heading, *turn),
            NavTarget::Runway { heading, turn, .. } => (*heading, *turn),
            _ => (None, None),
        };
        let waypoint = Waypoint {
            target: NavTarget::Runway {
                runway: runway.to_uppercase(),
                heading,
                turn,
            },
            altitude: self.resolved_altitude(),
            speed: self.resolved_speed(),
            expedite: false,
        };
        let leg = Leg {
            kind: LegKind::Approach,
            route: format!("{}.{}", approach.to_uppercase(), runway.to_uppercase()),
            waypoints: vec![waypoint],
        };
        self.replace_tail(vec![leg]);
    }

    /// Applies a SID's published altitude and speed restrictions to the
    /// current leg. The current leg must be that SID.
    pub fn climb_via_sid(&mut self, airport: &Airport, runway: &str) -> bool {
        if self.current_leg().kind != LegKind::Sid {
            return false;
        }
        let parts: Vec<String> = self
            .current_leg()
            .route
            .split('.')
            .map(str::to_string)
            .collect();
        if parts.len() != 3 {
            return false;
        }
        let Some(procedure) = airport.sid(&parts[1]) else {
            return false;
        };
        let Some(fixes) = procedure.expand_sid(runway, &parts[2]) else {
            return false;
        };
        let leg = self.current_leg_mut();
        apply_published_restrictions(leg, &fixes);
        true
    }

    /// Applies a STAR's published restrictions to the first STAR leg at
    /// or ahead of the cursor.
    pub fn descend_via_star(&mut self, airport: &Airport, runway: Option<&str>) -> bool {
        let cursor_leg = self.current.0;
        let Some(index) = self
            .legs
            .iter()
            .enumerate()
            .skip(cursor_leg)
            .find(|(_, leg)| leg.kind == LegKind::Star)
            .map(|(i, _)| i)
        else {
            return false;
        };
        let parts: Vec<String> = self.legs[index].route.split('.').map(str::to_string).collect();
        if parts.len() != 3 {
            return false;
        }
        let Some(procedure) = airport.star(&parts[1]) else {
            return false;
        };
        let Some(fixes) = procedure.expand_star(&parts[0], runway) else {
            return false;
        };
        apply_published_restrictions(&mut self.legs[index], &fixes);
        true
    }

    /// Rebuilds the plan tail from the filed departure clearance.
    /// `false` for radial clearances, which carry no route.
    pub fn cleared_as_filed(
        &mut self,
        airport: &Airport,
        clearance: &DepartureClearance,
        runway: &str,
    ) -> bool {
        match clearance {
            DepartureClearance::Procedure { sid, exit } => {
                self.follow_sid(airport, sid, runway, exit)
            }
            DepartureClearance::Radial { .. } => false,
        }
    }

    /// Applies a parsed route. All names resolve before anything
    /// changes; a bad route leaves the plan untouched. `reset` replaces
    /// the whole plan, otherwise the tail from the cursor is replaced.
    pub fn apply_route(
        &mut self,
        airport: &Airport,
        segments: &[RouteSegment],
        reset: bool,
        departure_runway: Option<&str>,
        arrival_runway: Option<&str>,
    ) -> bool {
        let legs = match route::build_legs(airport, segments, departure_runway, arrival_runway) {
            Ok(legs) => legs,
            Err(_) => return false,
        };
        if reset {
            self.legs = legs;
            self.current = (0, 0);
        } else {
            self.replace_tail(legs);
        }
        true
    }
}

/// Copies published constraints onto a leg's waypoints by fix name.
/// Every matched waypoint takes exactly the published profile, clearing
/// stale assignments on procedure fixes.
fn apply_published_restrictions(leg: &mut Leg, fixes: &[ProcFix]) {
    for waypoint in &mut leg.waypoints {
        let Some(name) = waypoint.fix_name().map(str::to_string) else {
            continue;
        };
        if let Some(proc_fix) = fixes.iter().find(|pf| pf.fix.eq_ignore_ascii_case(&name)) {
            waypoint.altitude = proc_fix.altitude;
            waypoint.speed = proc_fix.speed;
        }
    }
}
