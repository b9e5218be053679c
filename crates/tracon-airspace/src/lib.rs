//! Static airspace data: airports, runways, procedures, restricted
//! areas, and terrain.
//!
//! Everything here is read-only to the simulation. Airports load from
//! JSON documents once at startup and are shared by reference.

pub mod airport;
pub mod errors;
pub mod geometry;
pub mod procedures;

pub use airport::Airport;
pub use errors::{AirspaceError, AirspaceResult};
