//! Departure queues, one per runway end.
//!
//! Taxi clearances append; the head of a queue holds takeoff priority.
//! Aircraft deeper in line stay put until everyone ahead has departed.

use std::collections::BTreeMap;

use tracon_core::state::RunwayQueueView;

/// Departure queue state for every runway end, keyed by canonical
/// runway name.
#[derive(Debug, Clone, Default)]
pub struct RunwayQueues {
    queues: BTreeMap<String, Vec<String>>,
}

impl RunwayQueues {
    /// Registers a runway end so it appears in snapshots even while
    /// empty.
    pub fn register_runway(&mut self, runway: &str) {
        self.queues.entry(runway.to_string()).or_default();
    }

    pub fn enqueue(&mut self, runway: &str, callsign: &str) {
        let queue = self.queues.entry(runway.to_string()).or_default();
        if !queue.iter().any(|c| c == callsign) {
            queue.push(callsign.to_string());
        }
    }

    /// Removes a callsign from one runway's queue. `true` when it was
    /// present.
    pub fn remove(&mut self, runway: &str, callsign: &str) -> bool {
        match self.queues.get_mut(runway) {
            Some(queue) => {
                let before = queue.len();
                queue.retain(|c| c != callsign);
                queue.len() != before
            }
            None => false,
        }
    }

    /// Removes a callsign from every queue.
    pub fn remove_everywhere(&mut self, callsign: &str) {
        for queue in self.queues.values_mut() {
            queue.retain(|c| c != callsign);
        }
    }

    /// Zero-based place in line, `None` when not queued.
    pub fn position_of(&self, runway: &str, callsign: &str) -> Option<usize> {
        self.queues
            .get(runway)?
            .iter()
            .position(|c| c == callsign)
    }

    pub fn is_next(&self, runway: &str, callsign: &str) -> bool {
        self.position_of(runway, callsign) == Some(0)
    }

    /// Callsign immediately ahead in line.
    pub fn ahead_of(&self, runway: &str, callsign: &str) -> Option<&str> {
        let position = self.position_of(runway, callsign)?;
        if position == 0 {
            return None;
        }
        self.queues
            .get(runway)
            .and_then(|queue| queue.get(position - 1))
            .map(String::as_str)
    }

    /// Snapshot views, sorted by runway name.
    pub fn views(&self) -> Vec<RunwayQueueView> {
        self.queues
            .iter()
            .map(|(runway, queue)| RunwayQueueView {
                runway: runway.clone(),
                queue: queue.clone(),
            })
            .collect()
    }
}
