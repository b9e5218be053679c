//! Events emitted by the simulation for presentation collaborators.

use serde::{Deserialize, Serialize};

/// One radio transmission, carrying both renderings of the same content:
/// the literal log form and the speech-normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transmission {
    /// Callsign of the transmitting aircraft.
    pub callsign: String,
    /// Literal text for the message log.
    pub log: String,
    /// Speech-normalized text (spelled-out digits, flight levels).
    pub say: String,
    /// Whether the log line should be highlighted as a warning.
    pub warning: bool,
    /// Tick at which the transmission was made.
    pub tick: u64,
}

/// A flight-strip refresh trigger for the strip bay collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripUpdate {
    pub callsign: String,
    pub tick: u64,
}

/// Score-affecting domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScoreEvent {
    /// Arrival landed and taxied clear.
    Arrival,
    /// Departure left the airspace in compliance with its clearance.
    DepartureExitOk,
    /// Departure left the airspace outside its clearance.
    DepartureExitBad,
    /// Arrival left the airspace instead of landing.
    FailedArrival,
    /// Landed with a crosswind/tailwind component; points scale severity.
    WindyLanding { points: i32 },
    /// Departed with a crosswind/tailwind component; points scale severity.
    WindyTakeoff { points: i32 },
    /// Generic controller warning (separation collaborators feed these).
    Warning,
    /// Controlled flight into terrain.
    Collision,
    /// Landing aborted, go-around flown.
    AbortedLanding,
    /// Taxi aborted, returned to the apron.
    AbortedTaxi,
    /// Illegal approach (intercept angle or glideslope violation).
    Violation,
    /// Entered a restricted area below its ceiling.
    RestrictedAreaEntry,
}

/// Running score counters, mutated only through `apply`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub arrivals: i32,
    /// Departures that left the airspace in compliance with their
    /// clearance.
    pub departures: i32,
    pub failed_arrivals: i32,
    pub failed_departures: i32,
    pub windy_landing: i32,
    pub windy_takeoff: i32,
    pub warnings: i32,
    pub hits: i32,
    pub aborted_landings: i32,
    pub aborted_taxis: i32,
    pub violations: i32,
    pub restrictions: i32,
}

impl ScoreState {
    /// Fold one event into the counters.
    pub fn apply(&mut self, event: ScoreEvent) {
        match event {
            ScoreEvent::Arrival => self.arrivals += 1,
            ScoreEvent::DepartureExitOk => self.departures += 1,
            ScoreEvent::DepartureExitBad => self.failed_departures += 1,
            ScoreEvent::FailedArrival => self.failed_arrivals += 1,
            ScoreEvent::WindyLanding { points } => self.windy_landing += points,
            ScoreEvent::WindyTakeoff { points } => self.windy_takeoff += points,
            ScoreEvent::Warning => self.warnings += 1,
            ScoreEvent::Collision => self.hits += 1,
            ScoreEvent::AbortedLanding => self.aborted_landings += 1,
            ScoreEvent::AbortedTaxi => self.aborted_taxis += 1,
            ScoreEvent::Violation => self.violations += 1,
            ScoreEvent::RestrictedAreaEntry => self.restrictions += 1,
        }
    }

    /// Weighted total.
    pub fn total(&self) -> f64 {
        let mut score = 0.0;
        score += f64::from(self.arrivals) * 10.0;
        score += f64::from(self.departures) * 10.0;
        score -= f64::from(self.windy_landing) * 0.5;
        score -= f64::from(self.windy_takeoff) * 0.5;
        score -= f64::from(self.failed_arrivals) * 20.0;
        score -= f64::from(self.failed_departures) * 2.0;
        score -= f64::from(self.warnings) * 5.0;
        score -= f64::from(self.hits) * 50.0;
        score -= f64::from(self.aborted_landings) * 5.0;
        score -= f64::from(self.aborted_taxis) * 2.0;
        score -= f64::from(self.violations);
        score -= f64::from(self.restrictions) * 10.0;
        score
    }
}
