//! Physics system: integrates motion toward the flight targets.
//!
//! Indicated speed, altitude, and heading each converge on their
//! targets at airframe rates; position then advances at true airspeed
//! plus wind. Crossing the airspace boundary is detected here, because
//! this is the only place position changes.

use hecs::World;

use tracon_airspace::Airport;
use tracon_core::components::{
    FlightState, FlightTarget, Identity, Kinematics, Performance, PositionHistory, TrailPoint,
};
use tracon_core::constants::*;
use tracon_core::enums::{DepartureClearance, EngineClass, FlightCategory, FlightMode, TurnDirection};
use tracon_core::events::ScoreEvent;
use tracon_core::types::{angle_offset, bearing_to, heading_vector, normalize_angle};
use tracon_fms::{FlightPlan, NavTarget, WaypointAssignment};

use crate::guidance;
use crate::phraseology::radio_altitude;
use crate::sink::EventSink;

pub fn run(world: &mut World, airport: &Airport, sink: &mut EventSink, now: f64, dt: f64) {
    for (_entity, (identity, performance, state, kin, target, plan, history)) in world
        .query_mut::<(
            &Identity,
            &Performance,
            &mut FlightState,
            &mut Kinematics,
            &FlightTarget,
            &mut FlightPlan,
            &mut PositionHistory,
        )>()
    {
        if state.hit {
            // Ballistic: down and slowing, nothing else.
            kin.altitude = (kin.altitude - CRASH_SINK_RATE * dt).max(0.0);
            kin.speed = (kin.speed * CRASH_SPEED_DECAY).max(0.0);
            continue;
        }
        if matches!(
            state.mode,
            FlightMode::Apron | FlightMode::Taxi | FlightMode::Waiting
        ) {
            continue;
        }

        integrate_heading(kin, target, dt);
        integrate_altitude(performance, state, kin, target, airport, dt);
        integrate_speed(performance, kin, target, airport, dt);
        integrate_position(state, kin, plan, airport, dt);

        sample_trail(kin, history, now);

        kin.radial = normalize_angle(bearing_to(glam::DVec2::ZERO, kin.position));
        kin.distance = kin.position.length();

        let inside = airport.distance_to_boundary(kin.position) < 0.0;
        if inside != state.inside_airspace {
            state.inside_airspace = inside;
            cross_boundary(identity, performance, state, kin, plan, airport, sink);
        }
    }
}

fn integrate_heading(kin: &mut Kinematics, target: &FlightTarget, dt: f64) {
    let Some(desired) = target.heading else {
        return;
    };
    let mut diff = angle_offset(desired, kin.heading);
    match target.turn {
        Some(TurnDirection::Left) if diff > 0.0 => diff -= std::f64::consts::TAU,
        Some(TurnDirection::Right) if diff < 0.0 => diff += std::f64::consts::TAU,
        _ => {}
    }
    // Standard-rate-ish turn, slower when fast.
    let rate = (BANK_TURN_FACTOR / kin.speed.max(1.0)).min(MAX_TURN_RATE);
    let step = rate * dt;
    if diff.abs() <= step {
        kin.heading = normalize_angle(desired);
    } else {
        kin.heading = normalize_angle(kin.heading + step * diff.signum());
    }
}

fn integrate_altitude(
    performance: &Performance,
    state: &FlightState,
    kin: &mut Kinematics,
    target: &FlightTarget,
    airport: &Airport,
    dt: f64,
) {
    let diff = target.altitude - kin.altitude;
    if diff.abs() <= ALTITUDE_EPS_FT {
        kin.altitude = target.altitude;
        kin.trend = 0;
    } else if diff < 0.0 {
        let mut rate = performance.rate.descent / 60.0;
        if state.mode == FlightMode::Landing {
            rate *= LANDING_DESCENT_FACTOR;
        }
        if target.expedite {
            rate *= EXPEDITE_FACTOR;
        }
        kin.altitude = (kin.altitude - rate * dt).max(target.altitude);
        kin.trend = -1;
    } else {
        let mut rate = climb_rate(performance, kin.altitude) / 60.0;
        if state.mode == FlightMode::Landing {
            rate *= LANDING_CLIMB_FACTOR;
        }
        if target.expedite {
            rate *= EXPEDITE_FACTOR;
        }
        kin.altitude = (kin.altitude + rate * dt).min(target.altitude);
        kin.trend = 1;
    }
    if guidance::on_ground(kin, airport) {
        kin.trend = 0;
    }
}

/// Available climb rate (fpm), derated with altitude: the book rate
/// decays along the standard atmosphere and blends into the
/// service-ceiling residual.
fn climb_rate(performance: &Performance, altitude: f64) -> f64 {
    let ceiling_rate = match performance.engine_class {
        EngineClass::Jet => JET_CEILING_CLIMB_RATE,
        EngineClass::Prop => PROP_CEILING_CLIMB_RATE,
    };
    if altitude >= TROPOPAUSE_FT {
        return ceiling_rate;
    }
    let temp_ratio = (518.6 - 0.00356 * altitude) / 518.6;
    let uncorrected =
        performance.rate.climb * 420.7 * (1.232 * temp_ratio.powf(5.256) / (518.6 - 0.00356 * altitude));
    let blend = (altitude / performance.ceiling).clamp(0.0, 1.0);
    uncorrected - blend * (uncorrected - ceiling_rate)
}

fn integrate_speed(
    performance: &Performance,
    kin: &mut Kinematics,
    target: &FlightTarget,
    airport: &Airport,
    dt: f64,
) {
    let diff = target.speed - kin.speed;
    if diff.abs() <= SPEED_EPS_KT {
        kin.speed = target.speed;
    } else if diff < 0.0 {
        let mut rate = performance.rate.decelerate / 2.0;
        if guidance::on_ground(kin, airport) {
            rate *= GROUND_BRAKING_FACTOR;
        }
        kin.speed = (kin.speed - rate * dt).max(target.speed);
    } else {
        // Acceleration tapers off as the aircraft cleans up.
        let factor = tracon_core::types::map_range_clamp(
            kin.speed,
            (0.0, performance.speed.min),
            (2.0, 1.0),
        );
        let rate = performance.rate.accelerate / 2.0 * factor;
        kin.speed = (kin.speed + rate * dt).min(target.speed);
    }
}

fn integrate_position(
    state: &FlightState,
    kin: &mut Kinematics,
    plan: &FlightPlan,
    airport: &Airport,
    dt: f64,
) {
    // Indicated-to-true scaling with altitude.
    let scale = kin.speed * KM_PER_KT_SEC * dt * (1.0 + kin.altitude * TAS_PER_FT);
    let movement = if guidance::on_ground(kin, airport) {
        heading_vector(kin.heading) * scale
    } else {
        let wind = airport.wind;
        let wind_speed = wind.speed * (1.0 + kin.altitude * WIND_PER_FT);
        let downwind = normalize_angle(wind.angle + std::f64::consts::PI);
        // Crab into the wind only when tracking a course; on plain
        // vectors the aircraft drifts.
        let tracking = state.mode == FlightMode::Landing
            || matches!(plan.current_waypoint().target, NavTarget::Fix { .. });
        let crab = if tracking && kin.speed > 0.0 {
            let ratio = wind_speed * angle_offset(downwind, kin.heading).sin() / kin.speed;
            ratio.clamp(-1.0, 1.0).asin()
        } else {
            0.0
        };
        let drift = heading_vector(downwind) * wind_speed * KM_PER_KT_SEC * dt;
        drift + heading_vector(kin.heading + crab) * scale
    };
    kin.position += movement;
    kin.ds = movement.length();
    kin.ground_speed = if dt > 0.0 {
        kin.ds / (dt * KM_PER_KT_SEC)
    } else {
        kin.ground_speed
    };
    if kin.ds > 1e-9 {
        kin.ground_track = normalize_angle(movement.x.atan2(movement.y));
    }
}

fn sample_trail(kin: &Kinematics, history: &mut PositionHistory, now: f64) {
    let due = history
        .samples
        .last()
        .map(|sample| now - sample.at_secs >= TRAIL_SPACING_SECS)
        .unwrap_or(true);
    if due {
        history.samples.push(TrailPoint {
            position: kin.position,
            at_secs: now,
        });
        if history.samples.len() > TRAIL_LENGTH {
            let excess = history.samples.len() - TRAIL_LENGTH;
            history.samples.drain(..excess);
        }
    }
}

/// Handle an airspace boundary crossing, in either direction.
fn cross_boundary(
    identity: &Identity,
    performance: &Performance,
    state: &FlightState,
    kin: &Kinematics,
    plan: &mut FlightPlan,
    airport: &Airport,
    sink: &mut EventSink,
) {
    sink.strip(&identity.callsign);
    if state.inside_airspace {
        if state.category == FlightCategory::Arrival {
            let altitude = (kin.altitude / 100.0).round() * 100.0;
            let assigned = plan.altitude_for_current_waypoint();
            let verb = if assigned > 0.0 && kin.altitude - assigned > 200.0 {
                "descending through"
            } else if assigned > 0.0 && assigned - kin.altitude > 200.0 {
                "climbing through"
            } else {
                "with you at"
            };
            sink.transmit(
                &identity.callsign,
                format!("{}, {verb} {altitude:.0}", identity.callsign),
                format!(
                    "{} {}, {verb} {}",
                    airport.radio.approach,
                    identity.radio_callsign,
                    radio_altitude(altitude)
                ),
            );
        }
        return;
    }

    // Leaving coverage.
    match state.category {
        FlightCategory::Arrival => {
            sink.transmit_warning(
                &identity.callsign,
                format!("{} left radar coverage as an arrival", identity.callsign),
                format!("{} left radar coverage as an arrival", identity.radio_callsign),
            );
            sink.score(ScoreEvent::FailedArrival);
        }
        FlightCategory::Departure => {
            judge_departure_exit(identity, state, kin, plan, airport, sink);
            // Back on its own navigation: resume the filed altitude and
            // normal cruise.
            plan.set_all(WaypointAssignment {
                altitude: Some(state.filed_altitude),
                speed: Some(performance.speed.cruise),
                ..Default::default()
            });
        }
    }
}

fn judge_departure_exit(
    identity: &Identity,
    state: &FlightState,
    kin: &Kinematics,
    plan: &FlightPlan,
    airport: &Airport,
    sink: &mut EventSink,
) {
    let verdict: Result<(), String> = match &state.departure_clearance {
        Some(DepartureClearance::Radial { radial }) => {
            if angle_offset(kin.radial, *radial).abs() < DEPARTURE_RADIAL_TOLERANCE {
                Ok(())
            } else {
                Err("left the airspace outside its departure window".to_string())
            }
        }
        Some(DepartureClearance::Procedure { sid, exit }) => {
            match airport.sid(sid).and_then(|procedure| procedure.exit_fix(exit)) {
                Some(fix) => {
                    if plan.has_waypoint(fix) {
                        Ok(())
                    } else {
                        Err(format!("left the airspace without being cleared to {fix}"))
                    }
                }
                None => Err("left the airspace outside its departure window".to_string()),
            }
        }
        None => Err("left the airspace outside its departure window".to_string()),
    };
    match verdict {
        Ok(()) => {
            sink.transmit(
                &identity.callsign,
                format!("{}, switching to center, good day", identity.callsign),
                format!("{}, switching to center, good day", identity.radio_callsign),
            );
            sink.score(ScoreEvent::DepartureExitOk);
        }
        Err(reason) => {
            sink.transmit_warning(
                &identity.callsign,
                format!("{} {reason}", identity.callsign),
                format!("{} {reason}", identity.radio_callsign),
            );
            sink.score(ScoreEvent::DepartureExitBad);
        }
    }
}
