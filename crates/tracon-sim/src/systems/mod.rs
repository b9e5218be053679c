//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` plus whatever shared
//! context they need. They own no state; everything lives in components
//! or on the engine.

pub mod cleanup;
pub mod conflict;
pub mod navigation;
pub mod physics;
pub mod snapshot;
pub mod traffic;
