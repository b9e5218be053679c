//! Per-tick event buffers, filled by systems and drained into snapshots.

use tracon_core::events::{ScoreEvent, StripUpdate, Transmission};

/// Collects one tick's radio traffic, score events, and strip updates.
#[derive(Debug, Default)]
pub struct EventSink {
    /// Tick stamped onto queued events.
    pub tick: u64,
    pub transmissions: Vec<Transmission>,
    pub score_events: Vec<ScoreEvent>,
    pub strip_updates: Vec<StripUpdate>,
}

impl EventSink {
    pub fn transmit(&mut self, callsign: &str, log: impl Into<String>, say: impl Into<String>) {
        self.push_transmission(callsign, log.into(), say.into(), false);
    }

    /// Queue a transmission highlighted as a warning in the log.
    pub fn transmit_warning(
        &mut self,
        callsign: &str,
        log: impl Into<String>,
        say: impl Into<String>,
    ) {
        self.push_transmission(callsign, log.into(), say.into(), true);
    }

    fn push_transmission(&mut self, callsign: &str, log: String, say: String, warning: bool) {
        self.transmissions.push(Transmission {
            callsign: callsign.to_string(),
            log,
            say,
            warning,
            tick: self.tick,
        });
    }

    pub fn score(&mut self, event: ScoreEvent) {
        self.score_events.push(event);
    }

    /// Queue a strip refresh for an aircraft.
    pub fn strip(&mut self, callsign: &str) {
        self.strip_updates.push(StripUpdate {
            callsign: callsign.to_string(),
            tick: self.tick,
        });
    }

    /// Take the buffered events, leaving the sink empty for the next tick.
    pub fn drain(&mut self) -> (Vec<Transmission>, Vec<ScoreEvent>, Vec<StripUpdate>) {
        (
            std::mem::take(&mut self.transmissions),
            std::mem::take(&mut self.score_events),
            std::mem::take(&mut self.strip_updates),
        )
    }
}
