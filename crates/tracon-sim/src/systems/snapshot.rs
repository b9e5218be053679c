//! Snapshot system: projects the world into a `RadarSnapshot`.
//!
//! The snapshot is the complete observable state for one tick; two
//! engines run from the same seed and inputs must produce identical
//! snapshots, so aircraft are emitted in callsign order.

use hecs::World;

use tracon_core::components::{ConflictState, FlightState, Identity, Kinematics, PositionHistory};
use tracon_core::events::{ScoreEvent, ScoreState, StripUpdate, Transmission};
use tracon_core::state::{AircraftView, RadarSnapshot, ScoreView};
use tracon_core::types::SimTime;

use crate::queues::RunwayQueues;

#[allow(clippy::too_many_arguments)]
pub fn build(
    world: &World,
    queues: &RunwayQueues,
    score: &ScoreState,
    time: SimTime,
    transmissions: Vec<Transmission>,
    score_events: Vec<ScoreEvent>,
    strip_updates: Vec<StripUpdate>,
) -> RadarSnapshot {
    let mut aircraft: Vec<AircraftView> = world
        .query::<(
            &Identity,
            &FlightState,
            &Kinematics,
            &ConflictState,
            &PositionHistory,
        )>()
        .iter()
        .map(|(_entity, (identity, state, kin, conflict, history))| AircraftView {
            callsign: identity.callsign.clone(),
            aircraft_type: identity.aircraft_type.clone(),
            category: state.category,
            mode: state.mode,
            position: kin.position,
            altitude: kin.altitude,
            speed: kin.speed,
            heading: kin.heading,
            ground_speed: kin.ground_speed,
            ground_track: kin.ground_track,
            trend: kin.trend,
            inside_airspace: state.inside_airspace,
            warning: conflict.restricted.iter().any(|check| check.inside),
            hit: state.hit,
            trail: history.samples.iter().map(|sample| sample.position).collect(),
        })
        .collect();
    aircraft.sort_by(|a, b| a.callsign.cmp(&b.callsign));

    RadarSnapshot {
        time,
        aircraft,
        queues: queues.views(),
        score: ScoreView {
            state: *score,
            total: score.total(),
        },
        transmissions,
        score_events,
        strip_updates,
    }
}
