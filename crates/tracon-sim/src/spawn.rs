//! Aircraft spawn factories.
//!
//! Builds component bundles for arrivals and departures from a
//! [`SpawnSpec`], filling unset fields with airport-derived defaults.

use glam::DVec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use tracon_airspace::airport::Airport;
use tracon_core::components::*;
use tracon_core::constants::*;
use tracon_core::enums::*;
use tracon_core::types::{bearing_to, heading_vector, normalize_angle};
use tracon_fms::{route, FlightPlan, NavTarget, WaypointAssignment};

use crate::phraseology::say_digits;
use crate::scenario::SpawnSpec;

/// Airline fleets: ICAO code, radio telephony name, airframes flown.
const AIRLINES: &[(&str, &str, &[&str])] = &[
    ("AAL", "American", &["B738", "A320", "B77W"]),
    ("UAL", "United", &["B738", "B744", "A320"]),
    ("DAL", "Delta", &["A320", "A319", "B738"]),
    ("SWA", "Southwest", &["B738"]),
    ("BAW", "Speedbird", &["B744", "B77W"]),
    ("DLH", "Lufthansa", &["A320", "A388"]),
    ("ACA", "Air Canada", &["A320", "DH8D"]),
    ("SKW", "SkyWest", &["E175", "CRJ9"]),
];

fn jet(
    ceiling: f64,
    climb: f64,
    descent: f64,
    min: f64,
    landing: f64,
    cruise: f64,
    max: f64,
    weight_class: WeightClass,
) -> Performance {
    Performance {
        ceiling,
        rate: RateProfile {
            climb,
            descent,
            accelerate: 5.0,
            decelerate: 3.0,
        },
        speed: SpeedProfile {
            min,
            landing,
            cruise,
            max,
        },
        engine_class: EngineClass::Jet,
        weight_class,
    }
}

fn prop(
    ceiling: f64,
    climb: f64,
    descent: f64,
    min: f64,
    landing: f64,
    cruise: f64,
    max: f64,
) -> Performance {
    Performance {
        ceiling,
        rate: RateProfile {
            climb,
            descent,
            accelerate: 3.0,
            decelerate: 2.0,
        },
        speed: SpeedProfile {
            min,
            landing,
            cruise,
            max,
        },
        engine_class: EngineClass::Prop,
        weight_class: WeightClass::Medium,
    }
}

/// Book performance for an airframe designator. Speeds are knots
/// indicated, rates ft/min. Unknown designators fly like a 737-800.
pub fn airframe_performance(designator: &str) -> Performance {
    use WeightClass::*;
    match designator {
        "A319" => jet(41_000.0, 2500.0, 2800.0, 110.0, 125.0, 285.0, 350.0, Medium),
        "A320" => jet(39_800.0, 2500.0, 2900.0, 115.0, 130.0, 290.0, 350.0, Medium),
        "A388" => jet(43_000.0, 2000.0, 2600.0, 130.0, 140.0, 300.0, 340.0, Super),
        "B744" => jet(45_100.0, 2200.0, 2800.0, 130.0, 145.0, 310.0, 365.0, Heavy),
        "B77W" => jet(43_100.0, 2500.0, 2900.0, 125.0, 140.0, 310.0, 350.0, Heavy),
        "CRJ9" => jet(41_000.0, 2900.0, 3100.0, 105.0, 125.0, 280.0, 330.0, Medium),
        "E175" => jet(41_000.0, 3000.0, 3000.0, 105.0, 120.0, 280.0, 320.0, Medium),
        "DH8D" => prop(27_000.0, 1800.0, 2300.0, 85.0, 100.0, 240.0, 285.0),
        _ => jet(41_000.0, 3000.0, 3000.0, 115.0, 127.0, 290.0, 340.0, Medium),
    }
}

/// Pick an airline, airframe, and unused flight number.
fn build_identity(
    world: &World,
    rng: &mut ChaCha8Rng,
    spec: &SpawnSpec,
) -> (Identity, Performance) {
    let (code, spoken, fleet) = spec
        .airline
        .as_deref()
        .and_then(|code| {
            AIRLINES
                .iter()
                .find(|(airline, _, _)| airline.eq_ignore_ascii_case(code))
        })
        .copied()
        .unwrap_or_else(|| AIRLINES[rng.gen_range(0..AIRLINES.len())]);

    let aircraft_type = match spec.aircraft.as_deref() {
        Some(designator) => designator.to_uppercase(),
        None => fleet[rng.gen_range(0..fleet.len())].to_string(),
    };
    let performance = airframe_performance(&aircraft_type);

    let mut live = std::collections::HashSet::new();
    for (_, identity) in world.query::<&Identity>().iter() {
        live.insert(identity.callsign.clone());
    }
    let mut number = rng.gen_range(1..10_000u32);
    for _ in 0..16 {
        if !live.contains(&format!("{code}{number}")) {
            break;
        }
        number = rng.gen_range(1..10_000u32);
    }

    let mut radio_callsign = format!("{spoken} {}", say_digits(&number.to_string()));
    if let Some(suffix) = performance.weight_class.radio_suffix() {
        radio_callsign.push(' ');
        radio_callsign.push_str(suffix);
    }

    (
        Identity {
            callsign: format!("{code}{number}"),
            radio_callsign,
            aircraft_type,
        },
        performance,
    )
}

fn conflict_state(airport: &Airport) -> ConflictState {
    ConflictState {
        restricted: vec![AreaCheck::default(); airport.restricted.len()],
        terrain_level: 0.0,
        terrain_ranges: Vec::new(),
    }
}

/// Spawn an aircraft described by a scenario spec.
pub fn spawn_from_spec(
    world: &mut World,
    airport: &Airport,
    rng: &mut ChaCha8Rng,
    spec: &SpawnSpec,
    now: f64,
) -> Option<hecs::Entity> {
    match spec.category {
        FlightCategory::Arrival => spawn_arrival(world, airport, rng, spec, now),
        FlightCategory::Departure => spawn_departure(world, airport, rng, spec),
    }
}

/// Spawn an arrival on its filed route, outside the boundary, pointed
/// at its first fix. Returns `None` when the route is unusable.
pub fn spawn_arrival(
    world: &mut World,
    airport: &Airport,
    rng: &mut ChaCha8Rng,
    spec: &SpawnSpec,
    now: f64,
) -> Option<hecs::Entity> {
    let segments = match route::parse_route(&spec.route) {
        Ok(segments) => segments,
        Err(err) => {
            tracing::warn!(route = %spec.route, %err, "arrival spawn rejected");
            return None;
        }
    };
    let mut plan = FlightPlan::default();
    if !plan.apply_route(airport, &segments, true, None, None) {
        tracing::warn!(route = %spec.route, "arrival route does not fit this airport");
        return None;
    }

    let (identity, performance) = build_identity(world, rng, spec);

    let altitude = spec.altitude_ft.unwrap_or(airport.ctr_ceiling);
    let mut speed = spec.speed_kt.unwrap_or(performance.speed.cruise);
    if altitude <= SPEED_CAP_FLOOR_FT {
        speed = speed.min(LOW_ALTITUDE_SPEED_CAP);
    }

    // The crew keeps the spawn altitude and speed until told otherwise,
    // unless the arrival carries a profiled descent.
    plan.set_all(WaypointAssignment {
        altitude: Some(altitude),
        speed: Some(speed),
        expedite: None,
    });
    if let Some(star) = plan.following_star() {
        if let Some(procedure) = airport.star(&star) {
            if procedure.has_altitude_restrictions_other_than(altitude) {
                plan.descend_via_star(airport, None);
            }
        }
    }

    let first_fix = match &plan.current_waypoint().target {
        NavTarget::Fix { position, .. } => Some(*position),
        _ => None,
    };
    let bearing = match spec.bearing_deg {
        Some(deg) => deg.to_radians(),
        None => match first_fix {
            Some(fix) => bearing_to(DVec2::ZERO, fix),
            None => rng.gen_range(0.0..std::f64::consts::TAU),
        },
    };
    let distance = spec.distance_km.unwrap_or(airport.ctr_radius + 15.0);
    let position = heading_vector(bearing) * distance;
    let heading = match first_fix {
        Some(fix) => bearing_to(position, fix),
        None => normalize_angle(bearing + std::f64::consts::PI),
    };

    let kinematics = Kinematics {
        position,
        heading,
        altitude,
        speed,
        ground_speed: speed,
        ground_track: heading,
        ds: 0.0,
        trend: 0,
        radial: normalize_angle(bearing),
        distance,
    };
    let target = FlightTarget {
        altitude,
        speed,
        ..Default::default()
    };
    let state = FlightState {
        category: FlightCategory::Arrival,
        mode: FlightMode::Cruise,
        hit: false,
        inside_airspace: false,
        departure_runway: None,
        arrival_runway: None,
        taxi_start: 0.0,
        taxi_time: 0.0,
        takeoff_time: now,
        departure_clearance: None,
        filed_altitude: altitude,
    };

    Some(world.spawn((
        identity,
        performance,
        state,
        kinematics,
        target,
        plan,
        PositionHistory::default(),
        conflict_state(airport),
    )))
}

/// Spawn a departure at the terminal with a filed route or a radial
/// clearance. Returns `None` when the route is unusable.
pub fn spawn_departure(
    world: &mut World,
    airport: &Airport,
    rng: &mut ChaCha8Rng,
    spec: &SpawnSpec,
) -> Option<hecs::Entity> {
    let mut plan = FlightPlan::default();
    if !spec.route.is_empty() {
        let segments = match route::parse_route(&spec.route) {
            Ok(segments) => segments,
            Err(err) => {
                tracing::warn!(route = %spec.route, %err, "departure spawn rejected");
                return None;
            }
        };
        if !plan.apply_route(airport, &segments, true, None, None) {
            tracing::warn!(route = %spec.route, "departure route does not fit this airport");
            return None;
        }
    }

    let (identity, performance) = build_identity(world, rng, spec);

    let runway_heading = airport
        .runway(&airport.default_runway)
        .map(|runway| runway.angle)
        .unwrap_or(0.0);
    let clearance = plan_sid_clearance(&plan)
        .or_else(|| {
            spec.radial_deg.map(|deg| DepartureClearance::Radial {
                radial: deg.to_radians(),
            })
        })
        // Routeless departures are judged on the runway-heading radial.
        .unwrap_or(DepartureClearance::Radial {
            radial: runway_heading,
        });

    let filed_altitude = spec.filed_ft.unwrap_or(28_000.0).min(performance.ceiling);

    let kinematics = Kinematics {
        position: DVec2::ZERO,
        heading: runway_heading,
        altitude: airport.elevation,
        speed: 0.0,
        ground_speed: 0.0,
        ground_track: runway_heading,
        ds: 0.0,
        trend: 0,
        radial: 0.0,
        distance: 0.0,
    };
    let state = FlightState {
        category: FlightCategory::Departure,
        mode: FlightMode::Apron,
        hit: false,
        inside_airspace: true,
        departure_runway: None,
        arrival_runway: None,
        taxi_start: 0.0,
        taxi_time: DEFAULT_TAXI_TIME_SECS,
        takeoff_time: 0.0,
        departure_clearance: Some(clearance),
        filed_altitude,
    };

    Some(world.spawn((
        identity,
        performance,
        state,
        kinematics,
        FlightTarget::default(),
        plan,
        PositionHistory::default(),
        conflict_state(airport),
    )))
}

/// Exit judgement from the filed SID leg, when there is one.
fn plan_sid_clearance(plan: &FlightPlan) -> Option<DepartureClearance> {
    let leg = plan.legs.iter().find(|leg| leg.kind == LegKind::Sid)?;
    let mut parts = leg.route.split('.');
    let _entry = parts.next()?;
    let sid = parts.next()?.to_string();
    let exit = parts.next()?.to_string();
    Some(DepartureClearance::Procedure { sid, exit })
}
