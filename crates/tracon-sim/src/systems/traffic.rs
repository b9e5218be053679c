//! Traffic system: feeds the world from the scenario schedule.

use hecs::World;
use rand_chacha::ChaCha8Rng;

use tracon_airspace::Airport;
use tracon_core::components::Identity;
use tracon_core::enums::FlightCategory;

use crate::scenario::TrafficSchedule;
use crate::sink::EventSink;
use crate::spawn;

/// Spawn every aircraft whose schedule entry has come due. New
/// departures call up ready to taxi; arrivals stay quiet until they
/// cross the boundary.
pub fn run(
    world: &mut World,
    airport: &Airport,
    rng: &mut ChaCha8Rng,
    schedule: &mut TrafficSchedule,
    sink: &mut EventSink,
    now: f64,
) {
    for spec in schedule.due(now) {
        let Some(entity) = spawn::spawn_from_spec(world, airport, rng, &spec, now) else {
            continue;
        };
        let Ok(identity) = world.get::<&Identity>(entity) else {
            continue;
        };
        let callsign = identity.callsign.clone();
        let radio = identity.radio_callsign.clone();
        drop(identity);
        sink.strip(&callsign);
        if spec.category == FlightCategory::Departure {
            sink.transmit(
                &callsign,
                format!("{callsign}, ready to taxi"),
                format!("{radio}, ready to taxi"),
            );
        }
        tracing::info!(%callsign, category = ?spec.category, "spawned");
    }
}
