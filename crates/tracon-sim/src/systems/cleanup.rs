//! Cleanup system: retires aircraft whose flight is over.
//!
//! Arrivals score on a full-stop landing; anything that has drifted
//! well clear of the airspace or come to rest after a terrain hit is
//! dropped. Despawns requested elsewhere in the tick drain here too.

use hecs::{Entity, World};

use tracon_airspace::Airport;
use tracon_core::components::{FlightState, Identity, Kinematics};
use tracon_core::constants::{DEPARTURE_CULL_MARGIN_KM, STOPPED_SPEED_KT};
use tracon_core::enums::{FlightCategory, FlightMode};
use tracon_core::events::ScoreEvent;

use crate::guidance;
use crate::queues::RunwayQueues;
use crate::sink::EventSink;

pub fn run(
    world: &mut World,
    airport: &Airport,
    queues: &mut RunwayQueues,
    sink: &mut EventSink,
    despawn: &mut Vec<Entity>,
) {
    for (entity, (identity, state, kin)) in world
        .query::<(&Identity, &FlightState, &Kinematics)>()
        .iter()
    {
        if state.hit {
            if kin.speed < STOPPED_SPEED_KT {
                despawn.push(entity);
            }
            continue;
        }
        if state.category == FlightCategory::Arrival
            && state.mode == FlightMode::Landing
            && kin.speed < STOPPED_SPEED_KT
            && guidance::on_ground(kin, airport)
        {
            sink.score(ScoreEvent::Arrival);
            if let Some(runway) = state
                .arrival_runway
                .as_deref()
                .and_then(|name| airport.runway(name))
            {
                guidance::score_wind(
                    airport,
                    runway.angle,
                    FlightCategory::Arrival,
                    &identity.callsign,
                    "landed",
                    sink,
                );
            }
            sink.transmit(
                &identity.callsign,
                format!("{}, down and clear", identity.callsign),
                format!("{}, down and clear", identity.radio_callsign),
            );
            despawn.push(entity);
            continue;
        }
        if !state.inside_airspace
            && airport.distance_to_boundary(kin.position) > DEPARTURE_CULL_MARGIN_KM
        {
            despawn.push(entity);
        }
    }

    for entity in despawn.drain(..) {
        let callsign = world
            .get::<&Identity>(entity)
            .map(|identity| identity.callsign.clone())
            .ok();
        if let Some(callsign) = callsign {
            queues.remove_everywhere(&callsign);
            sink.strip(&callsign);
            tracing::info!(%callsign, "despawned");
        }
        let _ = world.despawn(entity);
    }
}
