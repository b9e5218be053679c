//! Traffic scenarios: scheduled spawns and recurring streams.
//!
//! A scenario document drives the traffic system. One-shot entries fire
//! at an absolute sim time; streams fire periodically from a start
//! time. Everything beyond the category and route is optional and falls
//! back to airport-derived defaults at spawn time.

use serde::{Deserialize, Serialize};

use tracon_core::enums::FlightCategory;

/// What to spawn; shared by entries and streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSpec {
    pub category: FlightCategory,
    /// Route string, e.g. "AMAKR.BDEGA2.KSFO". Empty for departures
    /// cleared on a radial.
    #[serde(default)]
    pub route: String,
    /// Radial clearance (degrees) for routeless departures.
    #[serde(default)]
    pub radial_deg: Option<f64>,
    /// Spawn bearing from the field (degrees); arrivals only.
    #[serde(default)]
    pub bearing_deg: Option<f64>,
    /// Spawn distance from the field (km); arrivals only.
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub altitude_ft: Option<f64>,
    #[serde(default)]
    pub speed_kt: Option<f64>,
    /// Filed cruise altitude (ft); departures only.
    #[serde(default)]
    pub filed_ft: Option<f64>,
    /// Airline code override, e.g. "AAL".
    #[serde(default)]
    pub airline: Option<String>,
    /// Airframe designator override, e.g. "B738".
    #[serde(default)]
    pub aircraft: Option<String>,
}

/// A one-shot spawn at an absolute sim time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSpawn {
    pub at_secs: f64,
    pub spawn: SpawnSpec,
}

/// A recurring spawn every `every_secs`, first firing at `start_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficStream {
    #[serde(default)]
    pub start_secs: f64,
    pub every_secs: f64,
    pub spawn: SpawnSpec,
}

/// A complete scenario document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entries: Vec<ScheduledSpawn>,
    #[serde(default)]
    pub streams: Vec<TrafficStream>,
}

impl Scenario {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone)]
struct EntryState {
    entry: ScheduledSpawn,
    spawned: bool,
}

#[derive(Debug, Clone)]
struct StreamState {
    spawn: SpawnSpec,
    every_secs: f64,
    next_at: f64,
}

/// Live schedule state consumed by the traffic system.
#[derive(Debug, Clone, Default)]
pub struct TrafficSchedule {
    entries: Vec<EntryState>,
    streams: Vec<StreamState>,
}

impl TrafficSchedule {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            entries: scenario
                .entries
                .iter()
                .map(|entry| EntryState {
                    entry: entry.clone(),
                    spawned: false,
                })
                .collect(),
            streams: scenario
                .streams
                .iter()
                .filter(|stream| stream.every_secs > 0.0)
                .map(|stream| StreamState {
                    spawn: stream.spawn.clone(),
                    every_secs: stream.every_secs,
                    next_at: stream.start_secs,
                })
                .collect(),
        }
    }

    /// Collects every spawn due by `now`, in schedule order. Streams
    /// ratchet forward so a long stall releases the backlog.
    pub fn due(&mut self, now: f64) -> Vec<SpawnSpec> {
        let mut specs = Vec::new();
        for state in &mut self.entries {
            if !state.spawned && now >= state.entry.at_secs {
                state.spawned = true;
                specs.push(state.entry.spawn.clone());
            }
        }
        for stream in &mut self.streams {
            while now >= stream.next_at {
                specs.push(stream.spawn.clone());
                stream.next_at += stream.every_secs;
            }
        }
        specs
    }
}
