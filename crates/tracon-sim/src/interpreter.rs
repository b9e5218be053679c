//! The command interpreter: token batches become typed instructions,
//! applied to one aircraft with a combined radio readback.
//!
//! A batch is processed in order within a single control cycle, except
//! takeoff clearances, which run once at the end of their batch so a
//! runway change earlier in the same transmission is visible. Aircraft
//! outside the airspace are not on frequency and never answer.

use std::collections::HashMap;

use glam::DVec2;
use hecs::World;

use tracon_airspace::Airport;
use tracon_core::commands::{CommandRequest, Instruction, LegLength, RawInstruction};
use tracon_core::components::{FlightState, Identity, Kinematics, Performance};
use tracon_core::constants::DEFAULT_HOLD_LEG_MIN;
use tracon_core::enums::{DepartureClearance, FlightCategory, FlightMode, LegKind, TurnDirection};
use tracon_core::events::ScoreEvent;
use tracon_core::types::{bearing_to, heading_to_string, normalize_angle};
use tracon_fms::plan::HOLD_ROUTE;
use tracon_fms::{
    route, FlightPlan, HoldParams, HoldTimer, Leg, NavTarget, Waypoint, WaypointAssignment,
};

use crate::guidance;
use crate::phraseology::{
    altitude_trend, cardinal, format_leg_length, radio_altitude, radio_runway, radio_speed,
    say_digits, speed_trend,
};
use crate::queues::RunwayQueues;
use crate::sink::EventSink;

/// One instruction's readback, in both renderings.
struct Reply {
    ok: bool,
    log: String,
    say: String,
}

impl Reply {
    fn ok(log: impl Into<String>, say: impl Into<String>) -> Self {
        Self {
            ok: true,
            log: log.into(),
            say: say.into(),
        }
    }

    fn fail(log: impl Into<String>, say: impl Into<String>) -> Self {
        Self {
            ok: false,
            log: log.into(),
            say: say.into(),
        }
    }
}

/// Mutable view of one aircraft for the duration of a batch.
struct Aircraft<'a> {
    identity: &'a Identity,
    performance: &'a Performance,
    state: &'a mut FlightState,
    kin: &'a Kinematics,
    plan: &'a mut FlightPlan,
}

/// Apply one command batch to its addressee.
pub fn run_batch(
    world: &mut World,
    airport: &Airport,
    queues: &mut RunwayQueues,
    sink: &mut EventSink,
    despawn: &mut Vec<hecs::Entity>,
    request: &CommandRequest,
    now: f64,
) {
    let mut target_entity = None;
    let mut radio_names: HashMap<String, String> = HashMap::new();
    for (entity, identity) in world.query::<&Identity>().iter() {
        if identity.callsign.eq_ignore_ascii_case(&request.callsign) {
            target_entity = Some(entity);
        }
        radio_names.insert(identity.callsign.clone(), identity.radio_callsign.clone());
    }
    let Some(entity) = target_entity else {
        tracing::debug!(callsign = %request.callsign, "command addressed to unknown aircraft");
        return;
    };

    let Ok((identity, performance, state, kin, plan)) = world.query_one_mut::<(
        &Identity,
        &Performance,
        &mut FlightState,
        &Kinematics,
        &mut FlightPlan,
    )>(entity) else {
        return;
    };

    if !state.inside_airspace {
        tracing::debug!(callsign = %identity.callsign, "aircraft outside airspace, not responding");
        return;
    }

    let mut aircraft = Aircraft {
        identity,
        performance,
        state,
        kin,
        plan,
    };

    let mut replies = Vec::new();
    let mut takeoff_requested = false;
    let mut silent = false;
    for raw in &request.instructions {
        let Some(instruction) = parse_instruction(raw) else {
            replies.push(Reply::fail("not understood", "say again"));
            continue;
        };
        if instruction.is_deferred() {
            takeoff_requested = true;
            continue;
        }
        match instruction {
            Instruction::Delete => {
                despawn.push(entity);
                tracing::info!(callsign = %aircraft.identity.callsign, "aircraft deleted");
                return;
            }
            Instruction::Debug => {
                tracing::debug!(
                    callsign = %aircraft.identity.callsign,
                    state = ?aircraft.state,
                    kinematics = ?aircraft.kin,
                    plan = ?aircraft.plan,
                    "aircraft state dump"
                );
                silent = true;
            }
            instruction => replies.push(apply(&mut aircraft, airport, queues, sink, now, &instruction)),
        }
    }
    if takeoff_requested {
        replies.push(run_takeoff(&mut aircraft, airport, queues, sink, &radio_names, now));
    }
    if replies.is_empty() {
        if silent {
            return;
        }
        replies.push(Reply::fail("not understood", "say again"));
    }

    let warning = replies.iter().any(|reply| !reply.ok);
    let logs: Vec<&str> = replies.iter().map(|reply| reply.log.as_str()).collect();
    let says: Vec<&str> = replies.iter().map(|reply| reply.say.as_str()).collect();
    let log = format!("{}, {}", aircraft.identity.callsign, logs.join(", "));
    let say = format!("{}, {}", aircraft.identity.radio_callsign, says.join(", "));
    let callsign = aircraft.identity.callsign.clone();
    if warning {
        sink.transmit_warning(&callsign, log, say);
    } else {
        sink.transmit(&callsign, log, say);
    }
}

fn apply(
    aircraft: &mut Aircraft<'_>,
    airport: &Airport,
    queues: &mut RunwayQueues,
    sink: &mut EventSink,
    now: f64,
    instruction: &Instruction,
) -> Reply {
    match instruction {
        Instruction::Taxi { runway } => run_taxi(aircraft, airport, queues, now, runway.as_deref()),
        Instruction::Heading {
            direction,
            degrees,
            incremental,
        } => run_heading(aircraft, airport, *direction, *degrees, *incremental),
        Instruction::Direct { fix } => run_direct(aircraft, airport, fix),
        Instruction::Fixes { fixes } => run_fixes(aircraft, airport, fixes),
        Instruction::Hold {
            direction,
            leg_length,
            fix,
        } => run_hold(aircraft, airport, *direction, *leg_length, fix.as_deref()),
        Instruction::FlyPresentHeading => run_fly_present_heading(aircraft, airport),
        Instruction::Altitude { feet, expedite } => {
            run_altitude(aircraft, airport, *feet, *expedite)
        }
        Instruction::Speed { knots } => run_speed(aircraft, *knots),
        Instruction::Sid { code } => run_sid(aircraft, airport, code),
        Instruction::Star { code } => run_star(aircraft, airport, code),
        Instruction::Route { route } => run_route(aircraft, airport, route, false),
        Instruction::Reroute { route } => run_route(aircraft, airport, route, true),
        Instruction::ClearedAsFiled => run_cleared_as_filed(aircraft, airport),
        Instruction::ClimbViaSid => run_climb_via_sid(aircraft, airport),
        Instruction::DescendViaStar => run_descend_via_star(aircraft, airport),
        Instruction::Land { runway, variant } => {
            run_land(aircraft, airport, runway, variant.as_deref())
        }
        Instruction::Abort => run_abort(aircraft, airport, queues, sink),
        Instruction::SayRoute => run_say_route(aircraft),
        // Handled before dispatch.
        Instruction::Takeoff | Instruction::Delete | Instruction::Debug => {
            Reply::fail("not understood", "say again")
        }
    }
}

// ---- Ground operations ----

fn run_taxi(
    aircraft: &mut Aircraft<'_>,
    airport: &Airport,
    queues: &mut RunwayQueues,
    now: f64,
    runway: Option<&str>,
) -> Reply {
    if aircraft.state.category == FlightCategory::Arrival {
        return Reply::fail("unable, we are an arrival", "unable, we are an arrival");
    }
    match aircraft.state.mode {
        FlightMode::Taxi => return Reply::fail("already taxiing", "we're already taxiing"),
        FlightMode::Waiting => {
            return Reply::fail("already taxied, holding short", "we're already holding short")
        }
        FlightMode::Apron => {}
        _ => return Reply::fail("unable to taxi", "unable to taxi"),
    }
    let requested = runway.unwrap_or(&airport.default_runway);
    let Some(runway) = airport.runway(requested) else {
        return Reply::fail(
            format!("no runway {}", requested.to_uppercase()),
            format!("no runway {}", radio_runway(requested)),
        );
    };
    let name = runway.name.clone();
    set_departure_runway(aircraft, airport, &name);
    aircraft.state.taxi_start = now;
    aircraft.state.mode = FlightMode::Taxi;
    queues.enqueue(&name, &aircraft.identity.callsign);
    Reply::ok(
        format!("taxi to runway {name}"),
        format!("taxi to runway {}", radio_runway(&name)),
    )
}

/// Assigns the departure runway and re-expands an active SID leg for it.
/// A climb-via profile already baked into the leg stays in force across
/// the re-expansion.
fn set_departure_runway(aircraft: &mut Aircraft<'_>, airport: &Airport, runway: &str) {
    aircraft.state.departure_runway = Some(runway.to_string());
    if aircraft.plan.current_leg().kind != LegKind::Sid {
        return;
    }
    let (Some(sid), Some(exit)) = (
        aircraft.plan.following_sid(),
        aircraft.plan.following_sid_exit(),
    ) else {
        return;
    };
    let climb_via = aircraft
        .plan
        .current_leg()
        .waypoints
        .iter()
        .any(|waypoint| waypoint.altitude.is_some());
    aircraft.plan.follow_sid(airport, &sid, runway, &exit);
    if climb_via {
        aircraft.plan.climb_via_sid(airport, runway);
    }
}

fn run_takeoff(
    aircraft: &mut Aircraft<'_>,
    airport: &Airport,
    queues: &mut RunwayQueues,
    sink: &mut EventSink,
    radio_names: &HashMap<String, String>,
    now: f64,
) -> Reply {
    if aircraft.state.category == FlightCategory::Arrival {
        return Reply::fail("unable, we are an arrival", "unable, we are an arrival");
    }
    if !guidance::on_ground(aircraft.kin, airport) {
        return Reply::fail("unable, we're already airborne", "unable, we're already airborne");
    }
    match aircraft.state.mode {
        FlightMode::Apron => {
            return Reply::fail(
                "unable, we're still in the parking area",
                "unable, we're still in the parking area",
            )
        }
        FlightMode::Takeoff => {
            return Reply::fail("already taking off", "we're already taking off")
        }
        FlightMode::Taxi => {
            let runway = aircraft.state.departure_runway.clone().unwrap_or_default();
            return Reply::fail(
                format!("taxi to runway {runway} not yet complete"),
                format!("taxi to runway {} not yet complete", radio_runway(&runway)),
            );
        }
        FlightMode::Waiting => {}
        FlightMode::Cruise | FlightMode::Landing => {
            return Reply::fail("unable to take off", "unable to take off")
        }
    }
    let Some(runway_name) = aircraft.state.departure_runway.clone() else {
        return Reply::fail("unable, no runway assigned", "unable, no runway assigned");
    };
    if aircraft.plan.altitude_for_current_waypoint() <= 0.0 {
        return Reply::fail("unable, no altitude assigned", "unable, no altitude assigned");
    }
    match queues.position_of(&runway_name, &aircraft.identity.callsign) {
        Some(0) => {}
        Some(position) => {
            let ahead = queues
                .ahead_of(&runway_name, &aircraft.identity.callsign)
                .unwrap_or_default()
                .to_string();
            let ahead_radio = radio_names
                .get(&ahead)
                .cloned()
                .unwrap_or_else(|| ahead.clone());
            return Reply::fail(
                format!("unable, number {position} behind {ahead}"),
                format!("unable, number {position} behind {ahead_radio}"),
            );
        }
        None => {
            return Reply::fail(
                "unable, we're not in the departure queue",
                "unable, we're not in the departure queue",
            )
        }
    }
    let Some(runway) = airport.runway(&runway_name) else {
        return Reply::fail(
            format!("no runway {runway_name}"),
            format!("no runway {}", radio_runway(&runway_name)),
        );
    };
    let runway_angle = runway.angle;

    queues.remove(&runway_name, &aircraft.identity.callsign);
    aircraft.state.mode = FlightMode::Takeoff;
    aircraft.state.takeoff_time = now;
    guidance::score_wind(
        airport,
        runway_angle,
        FlightCategory::Departure,
        &aircraft.identity.callsign,
        "taking off",
        sink,
    );
    if aircraft.plan.resolved_speed().is_none() {
        aircraft.plan.set_all(WaypointAssignment {
            speed: Some(aircraft.performance.speed.cruise),
            ..Default::default()
        });
    }
    let wind_dir = heading_to_string(airport.wind.angle);
    let wind_speed = format!("{:.0}", airport.wind.speed);
    Reply::ok(
        format!("wind {wind_dir} at {wind_speed}, runway {runway_name}, cleared for takeoff"),
        format!(
            "wind {} at {}, runway {}, cleared for takeoff",
            say_digits(&wind_dir),
            say_digits(&wind_speed),
            radio_runway(&runway_name)
        ),
    )
}

// ---- Lateral ----

fn run_heading(
    aircraft: &mut Aircraft<'_>,
    airport: &Airport,
    direction: Option<TurnDirection>,
    degrees: f64,
    incremental: bool,
) -> Reply {
    if !degrees.is_finite() {
        return Reply::fail("not understood", "say again");
    }
    let heading = if incremental {
        let amount = degrees.to_radians();
        match direction {
            Some(TurnDirection::Left) => normalize_angle(aircraft.kin.heading - amount),
            Some(TurnDirection::Right) => normalize_angle(aircraft.kin.heading + amount),
            None => return Reply::fail("not understood", "say again"),
        }
    } else {
        normalize_angle(degrees.to_radians())
    };

    // A heading breaks off any approach clearance.
    if matches!(aircraft.plan.current_waypoint().target, NavTarget::Runway { .. }) {
        guidance::cancel_landing(aircraft.plan, aircraft.state, aircraft.kin, airport);
    }

    let (in_place, in_hold, hold_altitude, hold_speed) = {
        let current = aircraft.plan.current_waypoint();
        (
            matches!(current.target, NavTarget::Heading { .. }),
            matches!(current.target, NavTarget::Hold(_)),
            current.altitude,
            current.speed,
        )
    };
    let vector = |altitude: Option<f64>, speed: Option<f64>| Waypoint {
        target: NavTarget::Heading {
            heading: Some(heading),
            turn: direction,
        },
        altitude,
        speed,
        expedite: false,
    };

    if in_place {
        aircraft.plan.current_waypoint_mut().target = NavTarget::Heading {
            heading: Some(heading),
            turn: direction,
        };
    } else if in_hold {
        // Leave the hold toward the vector; the rest of the plan stays.
        let after = aircraft.plan.cursor().0 + 1;
        aircraft
            .plan
            .insert_leg(after, Leg::vectors(vector(hold_altitude, hold_speed)));
        aircraft.plan.next_waypoint();
    } else if matches!(aircraft.plan.current_leg().kind, LegKind::Sid | LegKind::Star) {
        // Vector off a procedure; its fixes stay reachable for "direct".
        aircraft.plan.insert_waypoint_here(vector(None, None));
    } else if aircraft.plan.at_last_waypoint() {
        aircraft.plan.append_leg(Leg::vectors(vector(None, None)));
        aircraft.plan.next_leg();
    } else {
        aircraft.plan.insert_leg_here(Leg::vectors(vector(None, None)));
    }

    let dir_word = match direction {
        Some(TurnDirection::Left) => "left",
        _ => "right",
    };
    if incremental {
        let amount = format!("{degrees:.0}");
        Reply::ok(
            format!("turn {amount} degrees {dir_word}"),
            format!("turn {} degrees {dir_word}", say_digits(&amount)),
        )
    } else if direction.is_some() {
        let hhh = heading_to_string(heading);
        Reply::ok(
            format!("turn {dir_word} heading {hhh}"),
            format!("turn {dir_word} heading {}", say_digits(&hhh)),
        )
    } else {
        let hhh = heading_to_string(heading);
        Reply::ok(
            format!("fly heading {hhh}"),
            format!("fly heading {}", say_digits(&hhh)),
        )
    }
}

fn run_direct(aircraft: &mut Aircraft<'_>, airport: &Airport, fix: &str) -> Reply {
    let name = fix.to_uppercase();
    if airport.fix(&name).is_none() {
        return Reply::fail(
            format!("unable to find fix called {name}"),
            format!("unable to find fix called {name}"),
        );
    }
    if aircraft.state.mode == FlightMode::Takeoff {
        // Best effort during the climb-out.
        let _ = aircraft.plan.skip_to_fix(&name);
    } else if !aircraft.plan.skip_to_fix(&name) {
        return Reply::fail(
            format!("{name} is not in our flightplan"),
            format!("{name} is not in our flightplan"),
        );
    }
    Reply::ok(format!("proceed direct {name}"), format!("proceed direct {name}"))
}

fn run_fixes(aircraft: &mut Aircraft<'_>, airport: &Airport, fixes: &[String]) -> Reply {
    let mut resolved: Vec<(String, DVec2)> = Vec::new();
    for fix in fixes {
        let name = fix.to_uppercase();
        let Some(position) = airport.fix(&name) else {
            return Reply::fail(
                format!("unable to find fix called {name}"),
                format!("unable to find fix called {name}"),
            );
        };
        if resolved.last().map(|(last, _)| last.as_str()) != Some(name.as_str()) {
            resolved.push((name, position));
        }
    }
    if resolved.is_empty() {
        return Reply::fail("not understood", "say again");
    }
    guidance::cancel_landing(aircraft.plan, aircraft.state, aircraft.kin, airport);
    for (name, position) in resolved.iter().rev() {
        aircraft
            .plan
            .insert_leg_here(Leg::direct(Waypoint::fix(name, *position)));
    }
    let names: Vec<&str> = resolved.iter().map(|(name, _)| name.as_str()).collect();
    let list = names.join(", ");
    Reply::ok(format!("proceed direct {list}"), format!("proceed direct {list}"))
}

fn run_hold(
    aircraft: &mut Aircraft<'_>,
    airport: &Airport,
    direction: Option<TurnDirection>,
    leg_length: Option<LegLength>,
    fix: Option<&str>,
) -> Reply {
    let turn = direction.unwrap_or(TurnDirection::Right);
    let leg = leg_length.unwrap_or(LegLength::Min(DEFAULT_HOLD_LEG_MIN));
    let dir_word = match turn {
        TurnDirection::Left => "left",
        TurnDirection::Right => "right",
    };
    let leg_text = format_leg_length(leg);
    let (altitude, speed) = {
        let current = aircraft.plan.current_waypoint();
        (current.altitude, current.speed)
    };

    match fix {
        Some(fix) => {
            let name = fix.to_uppercase();
            let Some(position) = airport.fix(&name) else {
                return Reply::fail(
                    format!("unable to find fix called {name}"),
                    format!("unable to find fix called {name}"),
                );
            };
            let mut hold = Waypoint::hold(HoldParams {
                fix: Some(name.clone()),
                position,
                turn,
                leg,
                inbound: bearing_to(position, aircraft.kin.position),
                leg_heading: bearing_to(aircraft.kin.position, position),
                timer: HoldTimer::Idle,
            });
            hold.altitude = altitude;
            hold.speed = speed;
            let at_fix = aircraft
                .plan
                .current_waypoint()
                .fix_name()
                .is_some_and(|current| current.eq_ignore_ascii_case(&name));
            if at_fix {
                aircraft.plan.append_waypoint(hold);
            } else {
                let mut direct = Waypoint::fix(&name, position);
                direct.altitude = altitude;
                direct.speed = speed;
                aircraft.plan.insert_leg_here(Leg {
                    kind: LegKind::Manual,
                    route: HOLD_ROUTE.to_string(),
                    waypoints: vec![direct, hold],
                });
            }
            Reply::ok(
                format!("proceed direct {name} and hold inbound, {dir_word} turns, {leg_text} legs"),
                format!("proceed direct {name} and hold inbound, {dir_word} turns, {leg_text} legs"),
            )
        }
        None => {
            if guidance::on_ground(aircraft.kin, airport) {
                return Reply::fail(
                    "unable, where do you want us to hold?",
                    "unable, where do you want us to hold?",
                );
            }
            let inbound = aircraft.kin.heading;
            let mut hold = Waypoint::hold(HoldParams {
                fix: None,
                position: aircraft.kin.position,
                turn,
                leg,
                inbound,
                leg_heading: aircraft.kin.heading,
                timer: HoldTimer::Idle,
            });
            hold.altitude = altitude;
            hold.speed = speed;
            aircraft.plan.insert_leg_here(Leg {
                kind: LegKind::Manual,
                route: HOLD_ROUTE.to_string(),
                waypoints: vec![hold],
            });
            let compass = cardinal(inbound + std::f64::consts::PI);
            Reply::ok(
                format!("hold {compass} of present position, {dir_word} turns, {leg_text} legs"),
                format!("hold {compass} of present position, {dir_word} turns, {leg_text} legs"),
            )
        }
    }
}

fn run_fly_present_heading(aircraft: &mut Aircraft<'_>, airport: &Airport) -> Reply {
    guidance::cancel_landing(aircraft.plan, aircraft.state, aircraft.kin, airport);
    guidance::cancel_fix(aircraft.plan, aircraft.kin);
    let heading = aircraft.kin.heading;
    if let NavTarget::Heading {
        heading: assigned, ..
    } = &mut aircraft.plan.current_waypoint_mut().target
    {
        *assigned = Some(heading);
    }
    Reply::ok("fly present heading", "fly present heading")
}

// ---- Vertical / speed ----

fn run_altitude(
    aircraft: &mut Aircraft<'_>,
    airport: &Airport,
    feet: Option<f64>,
    expedite: bool,
) -> Reply {
    let Some(feet) = feet else {
        if expedite {
            aircraft.plan.set_current(WaypointAssignment {
                expedite: Some(true),
                ..Default::default()
            });
            return Reply::ok("expediting", "expediting");
        }
        return Reply::fail("not understood", "say again");
    };
    if !feet.is_finite() {
        return Reply::fail("not understood", "say again");
    }
    guidance::cancel_landing(aircraft.plan, aircraft.state, aircraft.kin, airport);
    let floor = (airport.elevation / 100.0).round() * 100.0 + 1000.0;
    let altitude = feet.max(floor).min(airport.ctr_ceiling);
    aircraft.plan.set_all(WaypointAssignment {
        altitude: Some(altitude),
        expedite: Some(expedite),
        ..Default::default()
    });
    let trend = altitude_trend(aircraft.kin.altitude, altitude);
    let mut log = format!("{trend} {altitude:.0}");
    let mut say = format!("{trend} {}", radio_altitude(altitude));
    if expedite {
        log.push_str(" and expedite");
        say.push_str(" and expedite");
    }
    Reply::ok(log, say)
}

fn run_speed(aircraft: &mut Aircraft<'_>, knots: f64) -> Reply {
    if !knots.is_finite() {
        return Reply::fail("not understood", "say again");
    }
    let envelope = aircraft.performance.speed;
    let speed = knots.max(envelope.min).min(envelope.max);
    aircraft.plan.set_all(WaypointAssignment {
        speed: Some(speed),
        ..Default::default()
    });
    let trend = speed_trend(aircraft.kin.speed, speed);
    Reply::ok(
        format!("{trend} {speed:.0}"),
        format!("{trend} {}", radio_speed(speed)),
    )
}

// ---- Procedures & routing ----

fn run_sid(aircraft: &mut Aircraft<'_>, airport: &Airport, code: &str) -> Reply {
    if aircraft.state.category == FlightCategory::Arrival {
        return Reply::fail("unable, we are an arrival", "unable, we are an arrival");
    }
    let Some(procedure) = airport.sid(code) else {
        return Reply::fail(
            format!("unable, no {} departure", code.to_uppercase()),
            "unable, no such departure",
        );
    };
    let sid_id = procedure.icao.clone();
    let sid_name = procedure.name.clone();
    let runway = match aircraft.state.departure_runway.clone() {
        Some(runway) => runway,
        None => {
            let runway = airport.default_runway.clone();
            aircraft.state.departure_runway = Some(runway.clone());
            runway
        }
    };
    if !procedure.serves_runway(&runway) {
        return Reply::fail(
            format!("unable, the {sid_id} departure is not valid from Runway {runway}"),
            format!(
                "unable, the {sid_name} departure is not valid from Runway {}",
                radio_runway(&runway)
            ),
        );
    }
    let exit = match &aircraft.state.departure_clearance {
        Some(DepartureClearance::Procedure { sid, exit }) if sid.eq_ignore_ascii_case(&sid_id) => {
            exit.clone()
        }
        _ => match procedure.exits.keys().min() {
            Some(exit) => exit.clone(),
            None => {
                return Reply::fail(
                    format!("unable, the {sid_id} departure has no exit"),
                    format!("unable, the {sid_name} departure has no exit"),
                )
            }
        },
    };
    if !aircraft.plan.follow_sid(airport, &sid_id, &runway, &exit) {
        return Reply::fail(
            format!("unable, the {sid_id} departure"),
            format!("unable, the {sid_name} departure"),
        );
    }
    aircraft.state.departure_clearance = Some(DepartureClearance::Procedure {
        sid: sid_id.clone(),
        exit,
    });
    Reply::ok(
        format!("cleared to destination via the {sid_id} departure, then as filed"),
        format!("cleared to destination via the {sid_name} departure, then as filed"),
    )
}

fn run_star(aircraft: &mut Aircraft<'_>, airport: &Airport, code: &str) -> Reply {
    if aircraft.state.category == FlightCategory::Departure {
        return Reply::fail("unable, we are a departure", "unable, we are a departure");
    }
    let parts: Vec<&str> = code.split('.').collect();
    if parts.len() != 2 || parts.iter().any(|part| part.is_empty()) {
        return Reply::fail("not understood", "say again");
    }
    let (entry, star) = (parts[0].to_uppercase(), parts[1].to_uppercase());
    let Some(procedure) = airport.star(&star) else {
        return Reply::fail(format!("unable, no {star} arrival"), "unable, no such arrival");
    };
    let star_id = procedure.icao.clone();
    let star_name = procedure.name.clone();
    let runway = aircraft.state.arrival_runway.clone();
    if !aircraft
        .plan
        .follow_star(airport, &entry, &star_id, runway.as_deref())
    {
        return Reply::fail(
            format!("unable, the {star_id} arrival from {entry}"),
            format!("unable, the {star_name} arrival"),
        );
    }
    Reply::ok(
        format!("cleared to {} via the {star_id} arrival", airport.icao),
        format!("cleared to {} via the {star_name} arrival", airport.name),
    )
}

fn run_route(aircraft: &mut Aircraft<'_>, airport: &Airport, raw: &str, reset: bool) -> Reply {
    let invalid = || {
        Reply::fail(
            format!("your route \"{raw}\" is invalid!"),
            "that route is invalid!",
        )
    };
    let Some(route_string) = route::format_route(raw) else {
        return invalid();
    };
    let segments = match route::parse_route(&route_string) {
        Ok(segments) => segments,
        Err(_) => return invalid(),
    };
    let departure_runway = aircraft.state.departure_runway.clone();
    let arrival_runway = aircraft.state.arrival_runway.clone();
    if !aircraft.plan.apply_route(
        airport,
        &segments,
        reset,
        departure_runway.as_deref(),
        arrival_runway.as_deref(),
    ) {
        return invalid();
    }
    Reply::ok(
        format!("rerouting to: {}", aircraft.plan.route_string()),
        "rerouting as requested",
    )
}

fn run_cleared_as_filed(aircraft: &mut Aircraft<'_>, airport: &Airport) -> Reply {
    if aircraft.state.category == FlightCategory::Arrival {
        return Reply::fail("unable, we are an arrival", "unable, we are an arrival");
    }
    let Some(clearance) = aircraft.state.departure_clearance.clone() else {
        return Reply::fail("unable to clear as filed", "unable to clear as filed");
    };
    let runway = aircraft
        .state
        .departure_runway
        .clone()
        .unwrap_or_else(|| airport.default_runway.clone());
    if !aircraft.plan.cleared_as_filed(airport, &clearance, &runway) {
        return Reply::fail("unable to clear as filed", "unable to clear as filed");
    }
    aircraft.plan.set_all(WaypointAssignment {
        altitude: Some(airport.initial_climb),
        ..Default::default()
    });
    let sid_id = match &clearance {
        DepartureClearance::Procedure { sid, .. } => sid.to_uppercase(),
        DepartureClearance::Radial { .. } => String::new(),
    };
    let sid_name = airport
        .sid(&sid_id)
        .map(|procedure| procedure.name.clone())
        .unwrap_or_else(|| sid_id.clone());
    let filed = aircraft.state.filed_altitude;
    Reply::ok(
        format!(
            "cleared to destination via the {sid_id} departure, then as filed. Climb and maintain {:.0}, expect {filed:.0} 10 minutes after departure",
            airport.initial_climb
        ),
        format!(
            "cleared to destination via the {sid_name} departure, then as filed. climb and maintain {}, expect {} one zero minutes after departure",
            radio_altitude(airport.initial_climb),
            radio_altitude(filed)
        ),
    )
}

fn run_climb_via_sid(aircraft: &mut Aircraft<'_>, airport: &Airport) -> Reply {
    let runway = aircraft
        .state
        .departure_runway
        .clone()
        .unwrap_or_else(|| airport.default_runway.clone());
    if !aircraft.plan.climb_via_sid(airport, &runway) {
        return Reply::fail("unable to climb via SID", "unable to climb via SID");
    }
    let sid_id = aircraft.plan.following_sid().unwrap_or_default();
    let sid_name = airport
        .sid(&sid_id)
        .map(|procedure| procedure.name.clone())
        .unwrap_or_else(|| sid_id.clone());
    Reply::ok(
        format!("climb via the {sid_id} departure"),
        format!("climb via the {sid_name} departure"),
    )
}

fn run_descend_via_star(aircraft: &mut Aircraft<'_>, airport: &Airport) -> Reply {
    let runway = aircraft.state.arrival_runway.clone();
    if !aircraft.plan.descend_via_star(airport, runway.as_deref()) {
        return Reply::fail("unable to descend via STAR", "unable to descend via STAR");
    }
    let star_id = aircraft.plan.following_star().unwrap_or_default();
    let star_name = airport
        .star(&star_id)
        .map(|procedure| procedure.name.clone())
        .unwrap_or_else(|| star_id.clone());
    Reply::ok(
        format!("descend via the {star_id} arrival"),
        format!("descend via the {star_name} arrival"),
    )
}

// ---- Approach ----

fn run_land(
    aircraft: &mut Aircraft<'_>,
    airport: &Airport,
    runway: &str,
    variant: Option<&str>,
) -> Reply {
    if guidance::on_ground(aircraft.kin, airport) {
        return Reply::fail("unable, we're on the ground", "unable, we're on the ground");
    }
    let Some(runway) = airport.runway(runway) else {
        return Reply::fail(
            format!("there is no runway {}", runway.to_uppercase()),
            format!("there is no runway {}", radio_runway(runway)),
        );
    };
    let name = runway.name.clone();
    let approach = variant.unwrap_or("ils").to_uppercase();
    aircraft.state.arrival_runway = Some(name.clone());
    aircraft.plan.follow_approach(&approach, &name);
    Reply::ok(
        format!("cleared {approach} runway {name} approach"),
        format!("cleared {approach} runway {} approach", radio_runway(&name)),
    )
}

fn run_abort(
    aircraft: &mut Aircraft<'_>,
    airport: &Airport,
    queues: &mut RunwayQueues,
    sink: &mut EventSink,
) -> Reply {
    match aircraft.state.mode {
        FlightMode::Taxi => {
            aircraft.state.mode = FlightMode::Apron;
            queues.remove_everywhere(&aircraft.identity.callsign);
            sink.score(ScoreEvent::AbortedTaxi);
            Reply::ok("taxiing back to the terminal", "taxiing back to the terminal")
        }
        FlightMode::Landing => {
            guidance::cancel_landing(aircraft.plan, aircraft.state, aircraft.kin, airport);
            sink.score(ScoreEvent::AbortedLanding);
            let altitude = aircraft.plan.altitude_for_current_waypoint();
            Reply::ok(
                format!("go around, fly present heading, maintain {altitude:.0}"),
                format!(
                    "go around, fly present heading, maintain {}",
                    radio_altitude(altitude)
                ),
            )
        }
        FlightMode::Cruise => {
            if matches!(aircraft.plan.current_waypoint().target, NavTarget::Runway { .. }) {
                guidance::cancel_landing(aircraft.plan, aircraft.state, aircraft.kin, airport);
                return Reply::ok(
                    "cancel approach clearance, fly present heading",
                    "cancel approach clearance, fly present heading",
                );
            }
            if guidance::cancel_fix(aircraft.plan, aircraft.kin) {
                return match aircraft.state.category {
                    FlightCategory::Arrival => Reply::ok(
                        "fly present heading, vector to final approach course",
                        "fly present heading, vector to final approach course",
                    ),
                    FlightCategory::Departure => Reply::ok(
                        "fly present heading, vector for entrail spacing",
                        "fly present heading, vector for entrail spacing",
                    ),
                };
            }
            Reply::fail("unable to abort", "unable to abort")
        }
        _ => Reply::fail("unable to abort", "unable to abort"),
    }
}

// ---- Queries ----

fn run_say_route(aircraft: &Aircraft<'_>) -> Reply {
    Reply::ok(
        format!("route: {}", aircraft.plan.route_string()),
        "here's our route",
    )
}

// ---- Parsing ----

/// Typed parse of one raw instruction. `None` reads back "say again".
pub fn parse_instruction(raw: &RawInstruction) -> Option<Instruction> {
    let name = raw.name.to_lowercase();
    let args = &raw.args;
    let instruction = match name.as_str() {
        "taxi" | "wait" | "w" => Instruction::Taxi {
            runway: args.first().map(|arg| arg.to_uppercase()),
        },
        "takeoff" | "to" | "cto" => Instruction::Takeoff,
        "heading" | "h" | "turn" | "t" | "fh" => parse_heading(args)?,
        "direct" | "dct" | "pd" => Instruction::Direct {
            fix: args.first()?.to_uppercase(),
        },
        "fix" | "f" | "track" => {
            if args.is_empty() {
                return None;
            }
            Instruction::Fixes {
                fixes: args.iter().map(|arg| arg.to_uppercase()).collect(),
            }
        }
        "hold" => parse_hold(args)?,
        "fph" => Instruction::FlyPresentHeading,
        "altitude" | "a" | "climb" | "c" | "descend" | "d" => parse_altitude(args)?,
        "speed" | "sp" | "slow" => Instruction::Speed {
            knots: parse_number(args.first()?)?,
        },
        "sid" => Instruction::Sid {
            code: args.first()?.to_uppercase(),
        },
        "star" => Instruction::Star {
            code: args.first()?.to_uppercase(),
        },
        "route" => Instruction::Route {
            route: args.first()?.clone(),
        },
        "reroute" | "rr" => Instruction::Reroute {
            route: args.first()?.clone(),
        },
        "caf" | "clearedasfiled" => Instruction::ClearedAsFiled,
        "cvs" | "climbviasid" => Instruction::ClimbViaSid,
        "dvs" | "descendviastar" => Instruction::DescendViaStar,
        "land" => {
            let (variant, runway) = match args.as_slice() {
                [runway] => (None, runway.to_uppercase()),
                [variant, runway] => (Some(variant.to_lowercase()), runway.to_uppercase()),
                _ => return None,
            };
            Instruction::Land { runway, variant }
        }
        "ils" | "i" => Instruction::Land {
            runway: args.first()?.to_uppercase(),
            variant: Some("ils".to_string()),
        },
        "abort" => Instruction::Abort,
        "sayroute" | "sr" => Instruction::SayRoute,
        "delete" | "del" | "kill" => Instruction::Delete,
        "debug" => Instruction::Debug,
        _ => return None,
    };
    Some(instruction)
}

fn parse_heading(args: &[String]) -> Option<Instruction> {
    let (direction, token) = match args {
        [token] => (None, token.as_str()),
        [direction, token] => (Some(parse_direction(direction)?), token.as_str()),
        _ => return None,
    };
    let degrees = parse_number(token)?;
    // Two-digit headings read as incremental turns ("t l 30").
    let incremental = token.len() == 2;
    Some(Instruction::Heading {
        direction,
        degrees,
        incremental,
    })
}

fn parse_hold(args: &[String]) -> Option<Instruction> {
    let mut direction = None;
    let mut leg_length = None;
    let mut fix = None;
    for arg in args {
        let lower = arg.to_lowercase();
        if let Some(parsed) = parse_direction(&lower) {
            direction = Some(parsed);
        } else if let Some(minutes) = lower.strip_suffix("min") {
            leg_length = Some(LegLength::Min(minutes.parse().ok()?));
        } else if let Some(miles) = lower.strip_suffix("nm") {
            leg_length = Some(LegLength::Nm(parse_number(miles)?));
        } else {
            fix = Some(arg.to_uppercase());
        }
    }
    Some(Instruction::Hold {
        direction,
        leg_length,
        fix,
    })
}

fn parse_altitude(args: &[String]) -> Option<Instruction> {
    match args {
        [] => None,
        [only] if is_expedite(only) => Some(Instruction::Altitude {
            feet: None,
            expedite: true,
        }),
        [value] => Some(Instruction::Altitude {
            feet: Some(parse_number(value)? * 100.0),
            expedite: false,
        }),
        [value, expedite] if is_expedite(expedite) => Some(Instruction::Altitude {
            feet: Some(parse_number(value)? * 100.0),
            expedite: true,
        }),
        _ => None,
    }
}

fn parse_direction(token: &str) -> Option<TurnDirection> {
    match token.to_lowercase().as_str() {
        "l" | "left" => Some(TurnDirection::Left),
        "r" | "right" => Some(TurnDirection::Right),
        _ => None,
    }
}

fn is_expedite(token: &str) -> bool {
    matches!(token.to_lowercase().as_str(), "x" | "ex" | "expedite")
}

fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Whether a token starts a new instruction in a transmission line.
fn is_instruction_name(token: &str) -> bool {
    matches!(
        token.to_lowercase().as_str(),
        "taxi"
            | "wait"
            | "w"
            | "takeoff"
            | "to"
            | "cto"
            | "heading"
            | "h"
            | "turn"
            | "t"
            | "fh"
            | "direct"
            | "dct"
            | "pd"
            | "fix"
            | "f"
            | "track"
            | "hold"
            | "fph"
            | "altitude"
            | "a"
            | "climb"
            | "c"
            | "descend"
            | "d"
            | "speed"
            | "sp"
            | "slow"
            | "sid"
            | "star"
            | "route"
            | "reroute"
            | "rr"
            | "caf"
            | "clearedasfiled"
            | "cvs"
            | "climbviasid"
            | "dvs"
            | "descendviastar"
            | "land"
            | "ils"
            | "i"
            | "abort"
            | "sayroute"
            | "sr"
            | "delete"
            | "del"
            | "kill"
            | "debug"
    )
}

/// Split a transmission line into a command batch: the callsign first,
/// then instructions with their arguments.
pub fn parse_command_line(line: &str) -> Option<CommandRequest> {
    let mut tokens = line.split_whitespace();
    let callsign = tokens.next()?.to_uppercase();
    let mut instructions: Vec<RawInstruction> = Vec::new();
    for token in tokens {
        if is_instruction_name(token) || instructions.is_empty() {
            instructions.push(RawInstruction {
                name: token.to_lowercase(),
                args: Vec::new(),
            });
        } else if let Some(last) = instructions.last_mut() {
            last.args.push(token.to_string());
        }
    }
    Some(CommandRequest {
        callsign,
        instructions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, args: &[&str]) -> RawInstruction {
        RawInstruction {
            name: name.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    #[test]
    fn three_digit_headings_are_absolute() {
        let parsed = parse_instruction(&raw("t", &["l", "250"]));
        assert_eq!(
            parsed,
            Some(Instruction::Heading {
                direction: Some(TurnDirection::Left),
                degrees: 250.0,
                incremental: false,
            })
        );
    }

    #[test]
    fn two_digit_headings_turn_incrementally() {
        let parsed = parse_instruction(&raw("turn", &["r", "30"]));
        assert_eq!(
            parsed,
            Some(Instruction::Heading {
                direction: Some(TurnDirection::Right),
                degrees: 30.0,
                incremental: true,
            })
        );
    }

    #[test]
    fn altitude_arguments_are_hundreds_of_feet() {
        assert_eq!(
            parse_instruction(&raw("c", &["50"])),
            Some(Instruction::Altitude {
                feet: Some(5000.0),
                expedite: false,
            })
        );
        assert_eq!(
            parse_instruction(&raw("d", &["100", "x"])),
            Some(Instruction::Altitude {
                feet: Some(10_000.0),
                expedite: true,
            })
        );
        assert_eq!(
            parse_instruction(&raw("a", &["x"])),
            Some(Instruction::Altitude {
                feet: None,
                expedite: true,
            })
        );
    }

    #[test]
    fn hold_arguments_come_in_any_order() {
        let expected = Some(Instruction::Hold {
            direction: Some(TurnDirection::Left),
            leg_length: Some(LegLength::Min(2)),
            fix: Some("SEPDY".to_string()),
        });
        assert_eq!(parse_instruction(&raw("hold", &["l", "2min", "sepdy"])), expected);
        assert_eq!(parse_instruction(&raw("hold", &["sepdy", "2min", "left"])), expected);
    }

    #[test]
    fn unknown_instructions_do_not_parse() {
        assert_eq!(parse_instruction(&raw("warp", &["9"])), None);
        assert_eq!(parse_instruction(&raw("speed", &["fast"])), None);
    }

    #[test]
    fn command_lines_split_on_instruction_names() {
        let request = parse_command_line("aal123 caf cvs to").unwrap();
        assert_eq!(request.callsign, "AAL123");
        let names: Vec<&str> = request
            .instructions
            .iter()
            .map(|raw| raw.name.as_str())
            .collect();
        assert_eq!(names, vec!["caf", "cvs", "to"]);

        let request = parse_command_line("UAL4 t l 250 d 50 i 28R").unwrap();
        assert_eq!(request.instructions.len(), 3);
        assert_eq!(request.instructions[0].args, vec!["l", "250"]);
        assert_eq!(request.instructions[1].args, vec!["50"]);
        assert_eq!(request.instructions[2].args, vec!["28R"]);
    }
}
