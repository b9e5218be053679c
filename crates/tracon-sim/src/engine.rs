//! The simulation engine: owns the ECS world and drives the tick loop.
//!
//! Determinism contract: two engines built with the same airport,
//! scenario, and seed, fed the same commands at the same ticks, emit
//! byte-identical snapshots. Everything stochastic draws from the
//! seeded RNG and every iteration order is fixed.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tracon_airspace::Airport;
use tracon_core::commands::CommandRequest;
use tracon_core::events::ScoreState;
use tracon_core::state::RadarSnapshot;
use tracon_core::types::SimTime;

use crate::interpreter;
use crate::queues::RunwayQueues;
use crate::scenario::{Scenario, TrafficSchedule};
use crate::sink::EventSink;
use crate::systems;

pub struct SimulationEngine {
    airport: Airport,
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    command_queue: VecDeque<CommandRequest>,
    queues: RunwayQueues,
    schedule: TrafficSchedule,
    score: ScoreState,
    sink: EventSink,
    despawn_buffer: Vec<Entity>,
}

impl SimulationEngine {
    /// Build an engine for an airport and scenario.
    pub fn new(airport: Airport, scenario: &Scenario, seed: u64) -> Self {
        let mut queues = RunwayQueues::default();
        for runway in &airport.runways {
            queues.register_runway(&runway.name);
        }
        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            command_queue: VecDeque::new(),
            queues,
            schedule: TrafficSchedule::new(scenario),
            score: ScoreState::default(),
            sink: EventSink::default(),
            despawn_buffer: Vec::new(),
            airport,
        }
    }

    /// Queue a controller command batch; it runs at the start of the
    /// next tick.
    pub fn queue_command(&mut self, request: CommandRequest) {
        self.command_queue.push_back(request);
    }

    pub fn queue_commands(&mut self, requests: impl IntoIterator<Item = CommandRequest>) {
        for request in requests {
            self.queue_command(request);
        }
    }

    pub fn airport(&self) -> &Airport {
        &self.airport
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Advance the simulation by `dt` seconds and report what happened.
    pub fn tick(&mut self, dt: f64) -> RadarSnapshot {
        self.sink.tick = self.time.tick;
        let now = self.time.elapsed_secs;

        self.process_commands(now);

        // 1. Traffic: spawn scheduled aircraft.
        systems::traffic::run(
            &mut self.world,
            &self.airport,
            &mut self.rng,
            &mut self.schedule,
            &mut self.sink,
            now,
        );
        // 2. Navigation: plans become flight targets.
        systems::navigation::run(
            &mut self.world,
            &self.airport,
            &self.queues,
            &mut self.sink,
            now,
        );
        // 3. Physics: targets become motion.
        systems::physics::run(&mut self.world, &self.airport, &mut self.sink, now, dt);
        // 4. Conflict: restricted areas and terrain.
        systems::conflict::run(&mut self.world, &self.airport, &mut self.sink);
        // 5. Cleanup: retire finished flights.
        systems::cleanup::run(
            &mut self.world,
            &self.airport,
            &mut self.queues,
            &mut self.sink,
            &mut self.despawn_buffer,
        );

        self.time.advance(dt);

        let (transmissions, score_events, strip_updates) = self.sink.drain();
        for event in &score_events {
            self.score.apply(*event);
        }
        systems::snapshot::build(
            &self.world,
            &self.queues,
            &self.score,
            self.time,
            transmissions,
            score_events,
            strip_updates,
        )
    }

    fn process_commands(&mut self, now: f64) {
        while let Some(request) = self.command_queue.pop_front() {
            interpreter::run_batch(
                &mut self.world,
                &self.airport,
                &mut self.queues,
                &mut self.sink,
                &mut self.despawn_buffer,
                &request,
                now,
            );
        }
    }

    /// Read-only world access.
    #[cfg(test)]
    pub fn world(&self) -> &World {
        &self.world
    }
}
