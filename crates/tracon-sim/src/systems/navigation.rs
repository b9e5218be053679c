//! Navigation system: the per-aircraft autopilot.
//!
//! Reads each flight plan and writes the `FlightTarget` the physics
//! pass flies toward. Advances waypoints with turn anticipation, times
//! holds, flies the localizer intercept and the glideslope, and runs
//! the departure roll through rotation.

use glam::DVec2;
use hecs::World;

use tracon_airspace::Airport;
use tracon_core::commands::LegLength;
use tracon_core::components::{FlightState, FlightTarget, Identity, Kinematics, Performance};
use tracon_core::constants::*;
use tracon_core::enums::{FlightMode, TurnDirection};
use tracon_core::events::ScoreEvent;
use tracon_core::types::{
    angle_offset, bearing_to, course_offset, map_range_clamp, normalize_angle, turn_initiation_km,
};
use tracon_fms::{FlightPlan, HoldParams, HoldTimer, NavTarget, Waypoint};

use crate::guidance;
use crate::phraseology::radio_runway;
use crate::queues::RunwayQueues;
use crate::sink::EventSink;

pub fn run(
    world: &mut World,
    airport: &Airport,
    queues: &RunwayQueues,
    sink: &mut EventSink,
    now: f64,
) {
    for (_entity, (identity, performance, state, kin, target, plan)) in world.query_mut::<(
        &Identity,
        &Performance,
        &mut FlightState,
        &Kinematics,
        &mut FlightTarget,
        &mut FlightPlan,
    )>() {
        if state.hit {
            continue;
        }
        match state.mode {
            FlightMode::Apron => continue,
            FlightMode::Taxi => {
                if now - state.taxi_start >= state.taxi_time {
                    state.mode = FlightMode::Waiting;
                    sink.strip(&identity.callsign);
                    if let Some(runway) = state.departure_runway.as_deref() {
                        if queues.is_next(runway, &identity.callsign) {
                            sink.transmit(
                                &identity.callsign,
                                format!("{}, holding short of runway {runway}", identity.callsign),
                                format!(
                                    "{}, holding short of runway {}",
                                    identity.radio_callsign,
                                    radio_runway(runway)
                                ),
                            );
                        }
                    }
                }
                target.heading = None;
                target.altitude = airport.elevation;
                target.speed = 0.0;
                continue;
            }
            FlightMode::Waiting => {
                target.heading = None;
                target.altitude = airport.elevation;
                target.speed = 0.0;
                continue;
            }
            _ => {}
        }

        // A landing clearance lives in the plan; if an edit removed the
        // runway waypoint the mode follows.
        if state.mode == FlightMode::Landing
            && !matches!(plan.current_waypoint().target, NavTarget::Runway { .. })
        {
            state.mode = FlightMode::Cruise;
        }

        steer(identity, performance, state, kin, target, plan, airport, sink, now);

        if state.mode != FlightMode::Landing {
            if let Some(assigned) = plan.resolved_altitude().filter(|assigned| *assigned > 0.0) {
                target.altitude = assigned.max(MIN_AIRBORNE_ALTITUDE_FT);
            }
            target.expedite = plan.resolved_expedite();
            let speed = plan.resolved_speed().unwrap_or(performance.speed.cruise);
            target.speed = speed.clamp(performance.speed.min, performance.speed.max);
            if kin.altitude <= SPEED_CAP_FLOOR_FT {
                target.speed = target
                    .speed
                    .min(LOW_ALTITUDE_SPEED_CAP)
                    .max(performance.speed.min);
            }
            // Below minimum flying speed the nose goes down.
            if kin.speed < performance.speed.min && !guidance::on_ground(kin, airport) {
                target.altitude = 0.0;
            }
        }

        if state.mode == FlightMode::Takeoff {
            let runway_angle = state
                .departure_runway
                .as_deref()
                .and_then(|name| airport.runway(name))
                .map(|runway| runway.angle)
                .unwrap_or(kin.heading);
            if kin.speed < performance.speed.min {
                // Ground roll: accelerate, stay down.
                target.altitude = airport.elevation;
            }
            if kin.altitude < airport.elevation + TAKEOFF_TURN_ALTITUDE_FT {
                target.heading = Some(runway_angle);
                target.turn = None;
            } else {
                // Established in the climb; unvectored departures keep
                // the runway heading until told otherwise.
                if plan.following_sid().is_none() {
                    if let NavTarget::Heading {
                        heading: heading @ None,
                        ..
                    } = &mut plan.current_waypoint_mut().target
                    {
                        *heading = Some(runway_angle);
                    }
                }
                state.mode = FlightMode::Cruise;
                sink.strip(&identity.callsign);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn steer(
    identity: &Identity,
    performance: &Performance,
    state: &mut FlightState,
    kin: &Kinematics,
    target: &mut FlightTarget,
    plan: &mut FlightPlan,
    airport: &Airport,
    sink: &mut EventSink,
    now: f64,
) {
    match plan.current_waypoint().target.clone() {
        NavTarget::Fix { position, .. } => {
            steer_fix(identity, kin, target, plan, sink, position)
        }
        NavTarget::Heading { heading, turn } => {
            target.heading = heading;
            target.turn = turn;
        }
        NavTarget::Hold(params) => steer_hold(kin, target, plan, params, now),
        NavTarget::Runway {
            runway,
            heading,
            turn,
        } => steer_approach(
            identity,
            performance,
            state,
            kin,
            target,
            plan,
            airport,
            sink,
            &runway,
            // Unvectored approaches hold present heading to the capture.
            heading.unwrap_or(kin.heading),
            turn,
        ),
    }
}

/// Track toward the fix; sequence past it with turn anticipation.
fn steer_fix(
    identity: &Identity,
    kin: &Kinematics,
    target: &mut FlightTarget,
    plan: &mut FlightPlan,
    sink: &mut EventSink,
    position: DVec2,
) {
    let course = bearing_to(kin.position, position);
    let distance = kin.position.distance(position);
    let course_change = next_fix_position(plan)
        .map(|next| angle_offset(bearing_to(position, next), course).abs())
        .unwrap_or(0.0);
    let initiation = turn_initiation_km(kin.speed, TURN_INITIATION_BANK, course_change);
    let reached = distance < FIX_PROXIMITY_KM
        || (distance < TURN_ANTICIPATION_WINDOW_KM && distance < initiation);
    if reached {
        if plan.at_last_waypoint() {
            // Off the end of the plan: roll out on the outbound course.
            guidance::cancel_fix(plan, kin);
        } else {
            plan.next_waypoint();
        }
        sink.strip(&identity.callsign);
    } else {
        target.heading = Some(course);
        target.turn = None;
    }
}

/// The next fix position after the cursor, if the plan continues to one.
fn next_fix_position(plan: &FlightPlan) -> Option<DVec2> {
    let (leg_idx, wp_idx) = plan.cursor();
    if let Some(leg) = plan.legs.get(leg_idx) {
        if let Some(waypoint) = leg.waypoints.get(wp_idx + 1) {
            return fix_position(waypoint);
        }
    }
    plan.legs
        .get(leg_idx + 1)
        .and_then(|leg| leg.waypoints.first())
        .and_then(fix_position)
}

fn fix_position(waypoint: &Waypoint) -> Option<DVec2> {
    match &waypoint.target {
        NavTarget::Fix { position, .. } => Some(*position),
        _ => None,
    }
}

/// Fly the racetrack: straight legs are timed only while aligned with
/// the leg course, and each fix passage or expired leg reverses course.
fn steer_hold(
    kin: &Kinematics,
    target: &mut FlightTarget,
    plan: &mut FlightPlan,
    mut params: HoldParams,
    now: f64,
) {
    let aligned = angle_offset(params.leg_heading, kin.heading).abs() < HOLD_ALIGN_TOLERANCE;
    if aligned {
        match params.timer {
            HoldTimer::Idle => {
                let offset = course_offset(kin.position, params.position, params.leg_heading);
                if offset.longitudinal < 0.0 && offset.straight < HOLD_FIX_PASSAGE_KM {
                    params.leg_heading = normalize_angle(params.leg_heading + std::f64::consts::PI);
                    params.timer = HoldTimer::Restart;
                }
            }
            HoldTimer::Restart => {
                params.timer = HoldTimer::Running { since: now };
            }
            HoldTimer::Running { since } => {
                let leg_secs = match params.leg {
                    LegLength::Min(minutes) => f64::from(minutes) * 60.0,
                    LegLength::Nm(miles) => miles / kin.ground_speed.max(60.0) * 3600.0,
                };
                if now - since >= leg_secs {
                    params.leg_heading = normalize_angle(params.leg_heading + std::f64::consts::PI);
                    params.timer = HoldTimer::Restart;
                }
            }
        }
    } else if matches!(params.timer, HoldTimer::Running { .. }) {
        // The leg clock only runs on the straightaway.
        params.timer = HoldTimer::Restart;
    }

    target.heading = Some(params.leg_heading);
    target.turn = Some(params.turn);
    if let NavTarget::Hold(stored) = &mut plan.current_waypoint_mut().target {
        *stored = params;
    }
}

/// Vector toward the localizer, capture it, then track it down the
/// glideslope. Blown captures go around on their own.
#[allow(clippy::too_many_arguments)]
fn steer_approach(
    identity: &Identity,
    performance: &Performance,
    state: &mut FlightState,
    kin: &Kinematics,
    target: &mut FlightTarget,
    plan: &mut FlightPlan,
    airport: &Airport,
    sink: &mut EventSink,
    runway_name: &str,
    vector_heading: f64,
    vector_turn: Option<TurnDirection>,
) {
    let Some(runway) = airport.runway(runway_name) else {
        target.heading = Some(vector_heading);
        target.turn = vector_turn;
        return;
    };
    let course = runway.angle;
    let threshold = runway.position;
    let localizer_range = runway.ils.localizer_range_km;
    let offset = course_offset(kin.position, threshold, course);
    let offset_angle = offset.lateral.atan2(offset.longitudinal);

    if state.mode == FlightMode::Landing {
        if guidance::on_ground(kin, airport) {
            // Rollout.
            target.heading = Some(course);
            target.turn = None;
            target.altitude = airport.elevation;
            target.speed = 0.0;
            return;
        }
        if offset.lateral.abs() > APPROACH_ABORT_LATERAL_KM {
            guidance::cancel_landing(plan, state, kin, airport);
            sink.transmit_warning(
                &identity.callsign,
                format!("{}, going around, we lost the localizer", identity.callsign),
                format!("{}, going around, we lost the localizer", identity.radio_callsign),
            );
            sink.score(ScoreEvent::AbortedLanding);
            sink.strip(&identity.callsign);
            return;
        }
        target.heading = Some(guidance::course_correction(
            course,
            offset_angle,
            TRACK_COURSE_GAIN,
        ));
        target.turn = None;
        let glideslope = runway.glideslope_altitude(offset.longitudinal);
        let assigned = plan.altitude_for_current_waypoint();
        target.altitude = if assigned > 0.0 {
            assigned.min(glideslope)
        } else {
            glideslope
        };
        target.expedite = false;
        let start_speed = plan
            .current_waypoint()
            .speed
            .unwrap_or(performance.speed.cruise);
        target.speed = map_range_clamp(
            offset.longitudinal,
            (FINAL_SPEED_NEAR_KM, FINAL_SPEED_FAR_KM),
            (performance.speed.landing, start_speed),
        );
        return;
    }

    // Not yet established. Capture when close and closely aligned.
    let capturable = runway.ils.enabled
        && offset.longitudinal > 0.0
        && offset.straight <= localizer_range
        && offset.lateral.abs() < CAPTURE_LATERAL_KM
        && angle_offset(kin.heading, course).abs() < CAPTURE_HEADING_TOLERANCE;
    if capturable {
        state.mode = FlightMode::Landing;
        sink.strip(&identity.callsign);
        if angle_offset(vector_heading, course).abs() > MAX_INTERCEPT_ANGLE {
            sink.transmit_warning(
                &identity.callsign,
                format!(
                    "{} joined the localizer at too steep an angle",
                    identity.callsign
                ),
                format!(
                    "{} joined the localizer at too steep an angle",
                    identity.radio_callsign
                ),
            );
            sink.score(ScoreEvent::Violation);
        }
        let glideslope = runway.glideslope_altitude(offset.longitudinal);
        if kin.altitude > glideslope + MAX_ABOVE_GLIDESLOPE_FT {
            sink.transmit_warning(
                &identity.callsign,
                format!("{} joined the localizer above the glideslope", identity.callsign),
                format!(
                    "{} joined the localizer above the glideslope",
                    identity.radio_callsign
                ),
            );
            sink.score(ScoreEvent::Violation);
        }
        target.heading = Some(course);
        target.turn = None;
        return;
    }

    if guidance::intercept_reached(offset.lateral, offset_angle, kin.heading, course, kin.speed) {
        // Turn onto the final approach course and drift in.
        target.heading = Some(guidance::course_correction(
            course,
            offset_angle,
            JOIN_COURSE_GAIN,
        ));
        target.turn = None;
    } else {
        target.heading = Some(vector_heading);
        target.turn = vector_turn;
    }
}
