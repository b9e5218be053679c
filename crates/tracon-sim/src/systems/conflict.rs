//! Conflict system: restricted-area incursions and terrain.
//!
//! Polygon containment is the expensive test, so each aircraft carries
//! a range budget per polygon: the distance it can fly before the next
//! check could possibly matter. The budget burns down with actual
//! distance flown and is refilled from the polygon distance after every
//! check.

use hecs::World;

use tracon_airspace::geometry::{distance_to_polygon, point_in_polygon};
use tracon_airspace::Airport;
use tracon_core::components::{ConflictState, FlightState, Identity, Kinematics};
use tracon_core::constants::*;
use tracon_core::enums::FlightMode;
use tracon_core::events::ScoreEvent;

use crate::guidance;
use crate::sink::EventSink;

pub fn run(world: &mut World, airport: &Airport, sink: &mut EventSink) {
    for (_entity, (identity, state, kin, conflict)) in world.query_mut::<(
        &Identity,
        &mut FlightState,
        &Kinematics,
        &mut ConflictState,
    )>() {
        if matches!(
            state.mode,
            FlightMode::Apron | FlightMode::Taxi | FlightMode::Waiting
        ) || guidance::on_ground(kin, airport)
        {
            continue;
        }
        check_restricted(identity, kin, conflict, airport, sink);
        if !state.hit {
            check_terrain(identity, state, kin, conflict, airport, sink);
        }
    }
}

fn check_restricted(
    identity: &Identity,
    kin: &Kinematics,
    conflict: &mut ConflictState,
    airport: &Airport,
    sink: &mut EventSink,
) {
    let speed_kms = kin.speed * KM_PER_NM / 3600.0;
    for (area, check) in airport.restricted.iter().zip(conflict.restricted.iter_mut()) {
        if kin.altitude > area.ceiling {
            check.range = None;
            check.inside = false;
            continue;
        }
        if let Some(range) = &mut check.range {
            *range -= kin.ds;
        }
        if check.range.is_some_and(|range| range > 0.0) {
            continue;
        }
        let inside = point_in_polygon(kin.position, &area.polygon);
        if inside && !check.inside {
            sink.transmit_warning(
                &identity.callsign,
                format!("{} entered restricted area {}", identity.callsign, area.name),
                format!("{} entered restricted area {}", identity.radio_callsign, area.name),
            );
            sink.score(ScoreEvent::RestrictedAreaEntry);
            sink.strip(&identity.callsign);
        }
        check.inside = inside;
        check.range = if inside {
            Some(speed_kms * AREA_RECHECK_INSIDE_SECS)
        } else {
            Some(
                (speed_kms * AREA_RECHECK_MIN_SECS)
                    .max(distance_to_polygon(kin.position, &area.polygon)),
            )
        };
    }
}

fn check_terrain(
    identity: &Identity,
    state: &mut FlightState,
    kin: &Kinematics,
    conflict: &mut ConflictState,
    airport: &Airport,
    sink: &mut EventSink,
) {
    let band = Airport::terrain_band(kin.altitude);
    let polygons = airport.terrain_polygons(band);
    if conflict.terrain_level != band as f64 || conflict.terrain_ranges.len() != polygons.len() {
        conflict.terrain_level = band as f64;
        conflict.terrain_ranges = vec![f64::INFINITY; polygons.len()];
    }
    for (range, polygon) in conflict.terrain_ranges.iter_mut().zip(polygons) {
        *range -= kin.ds;
        if *range >= 0.0 && range.is_finite() {
            continue;
        }
        if point_in_polygon(kin.position, polygon) {
            state.hit = true;
            sink.transmit_warning(
                &identity.callsign,
                format!(
                    "{} collided with terrain in controlled flight",
                    identity.callsign
                ),
                format!("{}, mayday, we're going down", identity.radio_callsign),
            );
            sink.score(ScoreEvent::Collision);
            sink.strip(&identity.callsign);
            return;
        }
        *range = distance_to_polygon(kin.position, polygon).max(TERRAIN_RANGE_FLOOR_KM);
    }
}
