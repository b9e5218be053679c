//! Simulation engine for the TRACON radar game.
//!
//! Owns the hecs ECS world, runs the tick systems in a fixed order,
//! and produces a `RadarSnapshot` after every tick. Runs are fully
//! deterministic for a given airport, scenario, seed, and command
//! sequence.

pub mod engine;
pub mod guidance;
pub mod interpreter;
pub mod phraseology;
pub mod queues;
pub mod scenario;
pub mod sink;
pub mod spawn;
pub mod systems;

pub use engine::SimulationEngine;
pub use scenario::Scenario;
pub use tracon_core as core;
