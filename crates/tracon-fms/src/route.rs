//! Route strings and their expansion into legs.
//!
//! A full route is segments joined by `..`, each segment either a bare
//! fix name or a three-part procedure code `ENTRY.PROCEDURE.EXIT`.
//! `KSFO.OFFSH9.SXC` names the OFFSH9 departure from KSFO with the SXC
//! exit transition; `SEPDY.BDEGA2.KSFO` names the BDEGA2 arrival
//! entered at SEPDY. Expansion resolves every name against the airport
//! before any leg is built, so a bad route never half-applies.

use thiserror::Error;

use tracon_airspace::Airport;
use tracon_core::enums::LegKind;

use crate::plan::Leg;
use crate::waypoint::Waypoint;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("empty route")]
    Empty,
    #[error("route segment {0:?} is malformed")]
    BadSegment(String),
    #[error("unknown fix {0}")]
    UnknownFix(String),
    #[error("no procedure {procedure} joins {entry} to {exit}")]
    UnknownProcedure {
        entry: String,
        procedure: String,
        exit: String,
    },
}

/// One piece of a route string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSegment {
    /// `ENTRY.PROCEDURE.EXIT`.
    Procedural {
        entry: String,
        procedure: String,
        exit: String,
    },
    /// A bare fix name.
    Direct { fix: String },
}

/// Uppercases a raw route string. Rejects embedded whitespace rather
/// than guessing where the route was meant to end.
pub fn format_route(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }
    Some(trimmed.to_uppercase())
}

/// Splits a formatted route into segments without touching the airport.
pub fn parse_route(route: &str) -> Result<Vec<RouteSegment>, RouteError> {
    if route.is_empty() {
        return Err(RouteError::Empty);
    }
    let mut segments = Vec::new();
    for piece in route.split("..") {
        if piece.is_empty() {
            return Err(RouteError::BadSegment(piece.to_string()));
        }
        if piece.contains('.') {
            let parts: Vec<&str> = piece.split('.').collect();
            if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
                return Err(RouteError::BadSegment(piece.to_string()));
            }
            segments.push(RouteSegment::Procedural {
                entry: parts[0].to_string(),
                procedure: parts[1].to_string(),
                exit: parts[2].to_string(),
            });
        } else {
            segments.push(RouteSegment::Direct {
                fix: piece.to_string(),
            });
        }
    }
    Ok(segments)
}

/// Expands segments into legs, resolving every name against the
/// airport. Procedure segments become SID legs when the entry is the
/// airport and the procedure is a published departure, STAR legs when
/// the exit is the airport and the procedure is a published arrival.
/// Anything else fails.
pub fn build_legs(
    airport: &Airport,
    segments: &[RouteSegment],
    departure_runway: Option<&str>,
    arrival_runway: Option<&str>,
) -> Result<Vec<Leg>, RouteError> {
    let mut legs = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            RouteSegment::Direct { fix } => {
                let position = airport
                    .fix(fix)
                    .ok_or_else(|| RouteError::UnknownFix(fix.clone()))?;
                legs.push(Leg {
                    kind: LegKind::Fix,
                    route: fix.to_uppercase(),
                    waypoints: vec![Waypoint::fix(fix, position)],
                });
            }
            RouteSegment::Procedural {
                entry,
                procedure,
                exit,
            } => {
                if entry.eq_ignore_ascii_case(&airport.icao) && airport.sid(procedure).is_some() {
                    let runway = departure_runway.unwrap_or(&airport.default_runway);
                    legs.push(expand_sid_leg(airport, procedure, runway, exit)?);
                } else if exit.eq_ignore_ascii_case(&airport.icao)
                    && airport.star(procedure).is_some()
                {
                    legs.push(expand_star_leg(airport, entry, procedure, arrival_runway)?);
                } else {
                    return Err(RouteError::UnknownProcedure {
                        entry: entry.clone(),
                        procedure: procedure.clone(),
                        exit: exit.clone(),
                    });
                }
            }
        }
    }
    if legs.is_empty() {
        return Err(RouteError::Empty);
    }
    Ok(legs)
}

/// Expands a SID into a leg. Published altitude and speed restrictions
/// are left off the waypoints; `climb_via_sid` applies them.
pub fn expand_sid_leg(
    airport: &Airport,
    sid: &str,
    runway: &str,
    exit: &str,
) -> Result<Leg, RouteError> {
    let exit = exit.to_uppercase();
    let procedure = airport
        .sid(sid)
        .ok_or_else(|| RouteError::UnknownProcedure {
            entry: airport.icao.clone(),
            procedure: sid.to_string(),
            exit: exit.to_string(),
        })?;
    let fixes = procedure
        .expand_sid(runway, &exit)
        .ok_or_else(|| RouteError::UnknownProcedure {
            entry: airport.icao.clone(),
            procedure: sid.to_string(),
            exit: exit.to_string(),
        })?;
    let mut waypoints = Vec::with_capacity(fixes.len());
    for proc_fix in &fixes {
        let position = airport
            .fix(&proc_fix.fix)
            .ok_or_else(|| RouteError::UnknownFix(proc_fix.fix.clone()))?;
        waypoints.push(Waypoint::fix(&proc_fix.fix, position));
    }
    Ok(Leg {
        kind: LegKind::Sid,
        route: format!(
            "{}.{}.{}",
            airport.icao.to_uppercase(),
            procedure.icao.to_uppercase(),
            exit.to_uppercase()
        ),
        waypoints,
    })
}

/// Expands a STAR into a leg, from the entry transition down to the
/// runway transition when an arrival runway is known.
pub fn expand_star_leg(
    airport: &Airport,
    entry: &str,
    star: &str,
    arrival_runway: Option<&str>,
) -> Result<Leg, RouteError> {
    let entry = entry.to_uppercase();
    let procedure = airport
        .star(star)
        .ok_or_else(|| RouteError::UnknownProcedure {
            entry: entry.to_string(),
            procedure: star.to_string(),
            exit: airport.icao.clone(),
        })?;
    let fixes = procedure
        .expand_star(&entry, arrival_runway)
        .ok_or_else(|| RouteError::UnknownProcedure {
            entry: entry.to_string(),
            procedure: star.to_string(),
            exit: airport.icao.clone(),
        })?;
    let mut waypoints = Vec::with_capacity(fixes.len());
    for proc_fix in &fixes {
        let position = airport
            .fix(&proc_fix.fix)
            .ok_or_else(|| RouteError::UnknownFix(proc_fix.fix.clone()))?;
        waypoints.push(Waypoint::fix(&proc_fix.fix, position));
    }
    Ok(Leg {
        kind: LegKind::Star,
        route: format!(
            "{}.{}.{}",
            entry.to_uppercase(),
            procedure.icao.to_uppercase(),
            airport.icao.to_uppercase()
        ),
        waypoints,
    })
}
