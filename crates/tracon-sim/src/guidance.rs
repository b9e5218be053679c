//! Approach and plan-surgery helpers shared by the command interpreter
//! and the navigation system.
//!
//! Cancelling a landing or abandoning fix navigation both rewrite the
//! flight plan in place; the localizer predicates decide when an
//! aircraft flying an intercept vector should turn onto the course.

use tracon_core::components::{FlightState, Kinematics};
use tracon_core::constants::*;
use tracon_core::enums::{FlightCategory, FlightMode};
use tracon_core::events::ScoreEvent;
use tracon_core::types::angle_offset;
use tracon_airspace::Airport;
use tracon_fms::{FlightPlan, Leg, NavTarget, Waypoint};

use crate::sink::EventSink;

/// Cancels an approach clearance or an in-progress landing. The runway
/// waypoint becomes a heading waypoint: an established aircraft climbs
/// out on the runway course at a rounded go-around altitude, one still
/// on its intercept vector just keeps the vector. `false` when no
/// approach is active.
pub fn cancel_landing(
    plan: &mut FlightPlan,
    state: &mut FlightState,
    kin: &Kinematics,
    airport: &Airport,
) -> bool {
    let (runway, carried_heading, carried_turn) = match &plan.current_waypoint().target {
        NavTarget::Runway {
            runway,
            heading,
            turn,
        } => (runway.clone(), *heading, *turn),
        _ => return false,
    };

    let waypoint = plan.current_waypoint_mut();
    if state.mode == FlightMode::Landing {
        let go_around = ((kin.altitude / 1000.0).round() * 1000.0).max(2000.0);
        waypoint.altitude = Some(go_around);
        let course = airport.runway(&runway).map(|r| r.angle);
        waypoint.target = NavTarget::Heading {
            heading: course.or(carried_heading),
            turn: carried_turn,
        };
    } else {
        waypoint.target = NavTarget::Heading {
            heading: carried_heading,
            turn: carried_turn,
        };
    }
    state.mode = FlightMode::Cruise;
    true
}

/// Abandons fix navigation: a vector leg holding the present heading is
/// spliced in right after the cursor and made active. The rest of the
/// route stays behind it, so a later "direct" can rejoin. `false` when
/// the active waypoint is not a fix.
pub fn cancel_fix(plan: &mut FlightPlan, kin: &Kinematics) -> bool {
    let current = plan.current_waypoint();
    if !matches!(current.target, NavTarget::Fix { .. }) {
        return false;
    }
    let waypoint = Waypoint {
        target: NavTarget::Heading {
            heading: Some(kin.heading),
            turn: None,
        },
        altitude: current.altitude,
        speed: current.speed,
        expedite: current.expedite,
    };
    let after_cursor = plan.cursor().0 + 1;
    plan.insert_leg(after_cursor, Leg::vectors(waypoint));
    plan.next_leg();
    true
}

/// Heading that converges on a course: the correction is proportional
/// to the angular offset from the course, clamped to the legal maximum.
pub fn course_correction(course: f64, offset_angle: f64, gain: f64) -> f64 {
    let correction = (offset_angle * -gain).clamp(-MAX_COURSE_CORRECTION, MAX_COURSE_CORRECTION);
    course + correction
}

/// Whether an aircraft on an intercept vector should begin its turn
/// onto the localizer. Fires when the remaining run to the course fits
/// inside the standard-rate turn (plus a lead margin), or when the
/// bearing already sits inside the drift-on window.
pub fn intercept_reached(
    lateral_km: f64,
    offset_angle: f64,
    heading: f64,
    course: f64,
    speed_kt: f64,
) -> bool {
    if offset_angle.abs() < INTERCEPT_WINDOW {
        return true;
    }
    let angle_diff = angle_offset(course, heading);
    if angle_diff.abs() < 1e-9 {
        return false;
    }
    let turning_time_secs = angle_diff.abs().to_degrees() / 3.0;
    let turning_radius_km = speed_kt * KM_PER_NM / 3600.0 * turning_time_secs;
    let run_to_course_km = lateral_km / angle_diff.sin();
    run_to_course_km > 0.0 && run_to_course_km <= turning_radius_km + TURN_EARLY_KM
}

/// Weight on wheels: at or below field elevation plus a small margin.
pub fn on_ground(kin: &Kinematics, airport: &Airport) -> bool {
    kin.altitude <= airport.elevation + WOW_THRESHOLD_FT
}

/// Scores the wind components against a runway course at takeoff or
/// touchdown, warning the controller for each offending component.
pub fn score_wind(
    airport: &Airport,
    runway_angle: f64,
    category: FlightCategory,
    callsign: &str,
    action: &str,
    sink: &mut EventSink,
) {
    let wind = airport.wind_components(runway_angle);
    let mut points = 0;
    if wind.cross >= CROSSWIND_MAJOR_KT {
        points += 2;
        let text = format!("{callsign} {action} with major crosswind");
        sink.transmit_warning(callsign, text.clone(), text);
    } else if wind.cross >= CROSSWIND_MINOR_KT {
        points += 1;
        let text = format!("{callsign} {action} with crosswind");
        sink.transmit_warning(callsign, text.clone(), text);
    }
    if wind.head <= -TAILWIND_MAJOR_KT {
        points += 2;
        let text = format!("{callsign} {action} with major tailwind");
        sink.transmit_warning(callsign, text.clone(), text);
    } else if wind.head <= -TAILWIND_MINOR_KT {
        points += 1;
        let text = format!("{callsign} {action} with tailwind");
        sink.transmit_warning(callsign, text.clone(), text);
    }
    if points > 0 {
        let event = match category {
            FlightCategory::Departure => ScoreEvent::WindyTakeoff { points },
            FlightCategory::Arrival => ScoreEvent::WindyLanding { points },
        };
        sink.score(event);
    }
}
