//! Published procedures: standard instrument departures and arrivals.
//!
//! A procedure is three segment groups: per-runway transitions, a common
//! body, and named entry/exit transitions. A SID is flown
//! runway-segment + body + exit; a STAR entry-segment + body + runway.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One waypoint of a procedure segment, with published constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcFix {
    /// Fix name, resolved against the airport fix table.
    pub fix: String,
    /// Published crossing altitude (ft), applied by climb-via/descend-via.
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Published speed restriction (kt).
    #[serde(default)]
    pub speed: Option<f64>,
}

impl ProcFix {
    /// An unconstrained fix.
    pub fn plain(fix: impl Into<String>) -> Self {
        Self {
            fix: fix.into(),
            altitude: None,
            speed: None,
        }
    }
}

/// A published SID or STAR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    /// Procedure identifier as filed, e.g. "OFFSH9".
    pub icao: String,
    /// Spoken name, e.g. "Offshore Nine".
    pub name: String,
    /// Per-runway-end transition segments.
    #[serde(default)]
    pub runways: HashMap<String, Vec<ProcFix>>,
    /// Common body flown by every variant.
    #[serde(default)]
    pub body: Vec<ProcFix>,
    /// Named exit transitions (SIDs).
    #[serde(default)]
    pub exits: HashMap<String, Vec<ProcFix>>,
    /// Named entry transitions (STARs).
    #[serde(default)]
    pub entries: HashMap<String, Vec<ProcFix>>,
}

impl Procedure {
    /// Uppercases the identifier and every transition key, so lookups
    /// can use canonical names whatever case the document was authored
    /// in.
    pub fn normalized(mut self) -> Self {
        self.icao = self.icao.to_uppercase();
        self.runways = uppercase_keys(self.runways);
        self.exits = uppercase_keys(self.exits);
        self.entries = uppercase_keys(self.entries);
        self
    }

    /// Whether the procedure serves a runway end.
    pub fn serves_runway(&self, runway: &str) -> bool {
        self.runways.contains_key(runway)
    }

    /// Expand a SID for a departure runway and exit transition.
    /// `None` when the exit is unknown.
    pub fn expand_sid(&self, runway: &str, exit: &str) -> Option<Vec<ProcFix>> {
        let tail = self.exits.get(exit)?;
        let mut fixes: Vec<ProcFix> = Vec::new();
        if let Some(head) = self.runways.get(runway) {
            fixes.extend(head.iter().cloned());
        }
        fixes.extend(self.body.iter().cloned());
        fixes.extend(tail.iter().cloned());
        Some(fixes)
    }

    /// Expand a STAR from an entry transition toward a runway (the runway
    /// segment is skipped when unassigned or unpublished).
    /// `None` when the entry is unknown.
    pub fn expand_star(&self, entry: &str, runway: Option<&str>) -> Option<Vec<ProcFix>> {
        let head = self.entries.get(entry)?;
        let mut fixes: Vec<ProcFix> = head.clone();
        fixes.extend(self.body.iter().cloned());
        if let Some(rwy) = runway {
            if let Some(tail) = self.runways.get(rwy) {
                fixes.extend(tail.iter().cloned());
            }
        }
        Some(fixes)
    }

    /// The last fix of the exit transition, used to judge departures
    /// leaving the airspace.
    pub fn exit_fix(&self, exit: &str) -> Option<&str> {
        self.exits
            .get(exit)
            .and_then(|seg| seg.last())
            .map(|pf| pf.fix.as_str())
    }

    /// Whether any waypoint of the expanded procedure carries an altitude
    /// restriction differing from `reference`.
    pub fn has_altitude_restrictions_other_than(&self, reference: f64) -> bool {
        self.runways
            .values()
            .flatten()
            .chain(self.body.iter())
            .chain(self.exits.values().flatten())
            .chain(self.entries.values().flatten())
            .any(|pf| pf.altitude.is_some_and(|alt| (alt - reference).abs() > f64::EPSILON))
    }
}

fn uppercase_keys(map: HashMap<String, Vec<ProcFix>>) -> HashMap<String, Vec<ProcFix>> {
    map.into_iter()
        .map(|(key, fixes)| (key.to_uppercase(), fixes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sid() -> Procedure {
        Procedure {
            icao: "OFFSH9".to_string(),
            name: "Offshore Nine".to_string(),
            runways: HashMap::from([(
                "28R".to_string(),
                vec![ProcFix::plain("SEPDY"), ProcFix {
                    fix: "ZUPAX".to_string(),
                    altitude: Some(10_000.0),
                    speed: None,
                }],
            )]),
            body: vec![ProcFix::plain("EUGEN")],
            exits: HashMap::from([
                ("SXC".to_string(), vec![ProcFix::plain("SXC")]),
                ("PPORT".to_string(), vec![ProcFix::plain("EDDYY"), ProcFix::plain("PPORT")]),
            ]),
            entries: HashMap::new(),
        }
    }

    #[test]
    fn test_sid_expansion_order() {
        let sid = sample_sid();
        let fixes = sid.expand_sid("28R", "SXC").unwrap();
        let names: Vec<&str> = fixes.iter().map(|pf| pf.fix.as_str()).collect();
        assert_eq!(names, vec!["SEPDY", "ZUPAX", "EUGEN", "SXC"]);
    }

    #[test]
    fn test_sid_expansion_without_runway_segment() {
        let sid = sample_sid();
        let fixes = sid.expand_sid("01L", "SXC").unwrap();
        let names: Vec<&str> = fixes.iter().map(|pf| pf.fix.as_str()).collect();
        assert_eq!(names, vec!["EUGEN", "SXC"], "unknown runway flies body + exit only");
    }

    #[test]
    fn test_sid_unknown_exit_fails() {
        let sid = sample_sid();
        assert!(sid.expand_sid("28R", "NOPE").is_none());
    }

    #[test]
    fn test_exit_fix_is_last_of_transition() {
        let sid = sample_sid();
        assert_eq!(sid.exit_fix("PPORT"), Some("PPORT"));
        assert_eq!(sid.exit_fix("SXC"), Some("SXC"));
        assert_eq!(sid.exit_fix("NOPE"), None);
    }

    #[test]
    fn test_altitude_restriction_probe() {
        let sid = sample_sid();
        assert!(sid.has_altitude_restrictions_other_than(5000.0));
        assert!(!sid.has_altitude_restrictions_other_than(10_000.0));
    }

    #[test]
    fn test_normalization_uppercases_transition_keys() {
        let procedure = Procedure {
            icao: "offsh9".to_string(),
            name: "Offshore Nine".to_string(),
            runways: HashMap::from([("28r".to_string(), vec![ProcFix::plain("SEPDY")])]),
            body: Vec::new(),
            exits: HashMap::from([("sxc".to_string(), vec![ProcFix::plain("SXC")])]),
            entries: HashMap::new(),
        }
        .normalized();
        assert_eq!(procedure.icao, "OFFSH9");
        assert!(procedure.serves_runway("28R"));
        assert!(procedure.expand_sid("28R", "SXC").is_some());
    }

    #[test]
    fn test_star_expansion() {
        let star = Procedure {
            icao: "BSR2".to_string(),
            name: "Big Sur Two".to_string(),
            runways: HashMap::from([("28L".to_string(), vec![ProcFix::plain("FAITH")])]),
            body: vec![ProcFix {
                fix: "CARME".to_string(),
                altitude: Some(11_000.0),
                speed: Some(280.0),
            }],
            exits: HashMap::new(),
            entries: HashMap::from([("MCKEY".to_string(), vec![ProcFix::plain("MCKEY")])]),
        };

        let with_rwy = star.expand_star("MCKEY", Some("28L")).unwrap();
        let names: Vec<&str> = with_rwy.iter().map(|pf| pf.fix.as_str()).collect();
        assert_eq!(names, vec!["MCKEY", "CARME", "FAITH"]);

        let without = star.expand_star("MCKEY", None).unwrap();
        assert_eq!(without.len(), 2);
    }
}
