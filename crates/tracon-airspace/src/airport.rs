//! Airport static data: runway geometry, navigation fixes, procedures,
//! restricted areas, terrain, and wind. Read-only to the simulation.
//!
//! Airports load from JSON documents that carry angles in degrees and ILS
//! ranges in nautical miles; the parsed `Airport` holds radians and
//! kilometres throughout.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use tracon_core::constants::{FT_PER_KM, KM_PER_NM, TERRAIN_BAND_FT};
use tracon_core::types::{angle_offset, normalize_angle};

use crate::errors::{AirspaceError, AirspaceResult};
use crate::geometry::{point_in_polygon, Polygon};
use crate::procedures::Procedure;

/// Instrument landing system geometry for one runway end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ils {
    pub enabled: bool,
    /// Usable localizer range (km).
    pub localizer_range_km: f64,
    /// Glideslope gradient (radians).
    pub glideslope_gradient: f64,
}

impl Default for Ils {
    fn default() -> Self {
        Self {
            enabled: true,
            localizer_range_km: 25.0 * KM_PER_NM,
            glideslope_gradient: 3.0_f64.to_radians(),
        }
    }
}

/// One runway end.
#[derive(Debug, Clone, PartialEq)]
pub struct Runway {
    /// End name, e.g. "28R".
    pub name: String,
    /// Threshold position (km east/north of the field).
    pub position: DVec2,
    /// Course flown when landing or departing this end (radians).
    pub angle: f64,
    /// Threshold elevation (ft).
    pub elevation: f64,
    pub ils: Ils,
}

impl Runway {
    /// Altitude (ft) of the glideslope at a distance before the threshold.
    pub fn glideslope_altitude(&self, longitudinal_km: f64) -> f64 {
        self.elevation
            + self.glideslope_gradient_abs().tan() * longitudinal_km.max(0.0) * FT_PER_KM
    }

    fn glideslope_gradient_abs(&self) -> f64 {
        self.ils.glideslope_gradient.abs()
    }

    /// The published course implied by the runway number (radians):
    /// "28R" is 280 degrees regardless of the surveyed bearing.
    pub fn nominal_heading(&self) -> f64 {
        let digits: String = self.name.chars().take_while(|c| c.is_ascii_digit()).collect();
        let number: f64 = digits.parse().unwrap_or(0.0);
        (number * 10.0).to_radians()
    }
}

/// Surface wind. `angle` is the direction the wind blows from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wind {
    pub angle: f64,
    pub speed: f64,
}

/// Crosswind/headwind components against a runway course. A negative
/// head component is a tailwind.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindComponents {
    pub cross: f64,
    pub head: f64,
}

/// An altitude-capped no-fly polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictedArea {
    pub name: String,
    /// Ceiling (ft); aircraft above it are unaffected.
    pub ceiling: f64,
    pub polygon: Polygon,
}

/// Facility names used on frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioNames {
    pub approach: String,
    pub departure: String,
    pub tower: String,
}

impl Default for RadioNames {
    fn default() -> Self {
        Self {
            approach: "Approach".to_string(),
            departure: "Departure".to_string(),
            tower: "Tower".to_string(),
        }
    }
}

/// Complete static data for one airport. The coordinate origin is the
/// field reference point.
#[derive(Debug, Clone)]
pub struct Airport {
    pub icao: String,
    pub name: String,
    /// Field elevation (ft).
    pub elevation: f64,
    /// Controlled airspace radius (km), used when no perimeter is given.
    pub ctr_radius: f64,
    /// Controlled airspace ceiling (ft).
    pub ctr_ceiling: f64,
    /// Initial climb altitude (ft) assigned to departures as filed.
    pub initial_climb: f64,
    /// Runway assigned when a taxi clearance names none.
    pub default_runway: String,
    pub wind: Wind,
    pub radio: RadioNames,
    pub fixes: HashMap<String, DVec2>,
    pub runways: Vec<Runway>,
    pub sids: HashMap<String, Procedure>,
    pub stars: HashMap<String, Procedure>,
    pub restricted: Vec<RestrictedArea>,
    /// Terrain polygons bucketed by band ceiling (ft).
    pub terrain: BTreeMap<i64, Vec<Polygon>>,
    /// Airspace boundary polygon; the radius/ceiling cylinder applies
    /// when absent.
    pub perimeter: Option<Polygon>,
}

impl Airport {
    /// Load an airport document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> AirspaceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse an airport document from JSON.
    pub fn from_json(text: &str) -> AirspaceResult<Self> {
        let doc: AirportDoc = serde_json::from_str(text)?;
        doc.build()
    }

    /// Look up a runway end by name (case-insensitive).
    pub fn runway(&self, name: &str) -> Option<&Runway> {
        self.runways.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Look up a fix position (case-insensitive).
    pub fn fix(&self, name: &str) -> Option<DVec2> {
        self.fixes.get(&name.to_uppercase()).copied()
    }

    pub fn sid(&self, icao: &str) -> Option<&Procedure> {
        self.sids.get(&icao.to_uppercase())
    }

    pub fn star(&self, icao: &str) -> Option<&Procedure> {
        self.stars.get(&icao.to_uppercase())
    }

    /// Whether a position/altitude is inside controlled airspace.
    /// A perimeter polygon ignores altitude; the cylinder does not.
    pub fn inside_airspace(&self, position: DVec2, altitude: f64) -> bool {
        match &self.perimeter {
            Some(perimeter) => point_in_polygon(position, perimeter),
            None => position.length() <= self.ctr_radius && altitude <= self.ctr_ceiling,
        }
    }

    /// Distance from the airspace boundary (km); negative when inside.
    pub fn distance_to_boundary(&self, position: DVec2) -> f64 {
        match &self.perimeter {
            Some(perimeter) => {
                let d = crate::geometry::distance_to_polygon(position, perimeter);
                if point_in_polygon(position, perimeter) {
                    -d
                } else {
                    d
                }
            }
            None => position.length() - self.ctr_radius,
        }
    }

    /// Wind components against a runway course.
    pub fn wind_components(&self, runway_angle: f64) -> WindComponents {
        let angle = angle_offset(runway_angle, self.wind.angle).abs();
        WindComponents {
            cross: angle.sin() * self.wind.speed,
            head: angle.cos() * self.wind.speed,
        }
    }

    /// Terrain band ceiling (ft) for an altitude: the next multiple of
    /// the band size at or above it.
    pub fn terrain_band(altitude: f64) -> i64 {
        ((altitude / TERRAIN_BAND_FT).ceil() * TERRAIN_BAND_FT) as i64
    }

    /// Terrain polygons for one band, empty when the band is clear.
    pub fn terrain_polygons(&self, band: i64) -> &[Polygon] {
        self.terrain.get(&band).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ---- JSON document layer ----

#[derive(Debug, Deserialize, Serialize)]
struct IlsDoc {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_ils_range_nm")]
    range_nm: f64,
    #[serde(default = "default_glideslope_deg")]
    glideslope_deg: f64,
}

fn default_true() -> bool {
    true
}

fn default_ils_range_nm() -> f64 {
    25.0
}

fn default_glideslope_deg() -> f64 {
    3.0
}

impl Default for IlsDoc {
    fn default() -> Self {
        Self {
            enabled: true,
            range_nm: default_ils_range_nm(),
            glideslope_deg: default_glideslope_deg(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct RunwayDoc {
    name: String,
    position: [f64; 2],
    bearing_deg: f64,
    #[serde(default)]
    elevation_ft: f64,
    #[serde(default)]
    ils: IlsDoc,
}

#[derive(Debug, Deserialize, Serialize)]
struct WindDoc {
    direction_deg: f64,
    speed_kt: f64,
}

#[derive(Debug, Deserialize, Serialize)]
struct RestrictedDoc {
    name: String,
    ceiling_ft: f64,
    polygon: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize, Serialize)]
struct AirportDoc {
    icao: String,
    name: String,
    #[serde(default)]
    elevation_ft: f64,
    ctr_radius_km: f64,
    ctr_ceiling_ft: f64,
    initial_climb_ft: f64,
    default_runway: String,
    wind: WindDoc,
    #[serde(default)]
    radio: Option<RadioNames>,
    #[serde(default)]
    fixes: HashMap<String, [f64; 2]>,
    runways: Vec<RunwayDoc>,
    #[serde(default)]
    sids: HashMap<String, Procedure>,
    #[serde(default)]
    stars: HashMap<String, Procedure>,
    #[serde(default)]
    restricted: Vec<RestrictedDoc>,
    #[serde(default)]
    terrain: BTreeMap<i64, Vec<Vec<[f64; 2]>>>,
    #[serde(default)]
    perimeter: Option<Vec<[f64; 2]>>,
}

fn to_vec2(xy: [f64; 2]) -> DVec2 {
    DVec2::new(xy[0], xy[1])
}

fn to_polygon(name: &str, points: &[[f64; 2]]) -> AirspaceResult<Polygon> {
    if points.len() < 3 {
        return Err(AirspaceError::DegeneratePolygon(name.to_string()));
    }
    Ok(points.iter().copied().map(to_vec2).collect())
}

impl AirportDoc {
    fn build(self) -> AirspaceResult<Airport> {
        let mut runways = Vec::with_capacity(self.runways.len());
        for doc in &self.runways {
            let name = doc.name.to_uppercase();
            if runways.iter().any(|r: &Runway| r.name == name) {
                return Err(AirspaceError::DuplicateRunway(name));
            }
            runways.push(Runway {
                name,
                position: to_vec2(doc.position),
                angle: normalize_angle(doc.bearing_deg.to_radians()),
                elevation: if doc.elevation_ft != 0.0 {
                    doc.elevation_ft
                } else {
                    self.elevation_ft
                },
                ils: Ils {
                    enabled: doc.ils.enabled,
                    localizer_range_km: doc.ils.range_nm * KM_PER_NM,
                    glideslope_gradient: doc.ils.glideslope_deg.to_radians(),
                },
            });
        }

        let default_runway = self.default_runway.to_uppercase();
        if !runways.iter().any(|r| r.name == default_runway) {
            return Err(AirspaceError::UnknownDefaultRunway(default_runway));
        }

        let fixes: HashMap<String, DVec2> = self
            .fixes
            .iter()
            .map(|(name, xy)| (name.to_uppercase(), to_vec2(*xy)))
            .collect();

        let mut sids = HashMap::new();
        for (code, procedure) in self.sids {
            let procedure = procedure.normalized();
            validate_procedure_fixes(&procedure, &fixes)?;
            sids.insert(code.to_uppercase(), procedure);
        }
        let mut stars = HashMap::new();
        for (code, procedure) in self.stars {
            let procedure = procedure.normalized();
            validate_procedure_fixes(&procedure, &fixes)?;
            stars.insert(code.to_uppercase(), procedure);
        }

        let mut restricted = Vec::with_capacity(self.restricted.len());
        for doc in &self.restricted {
            restricted.push(RestrictedArea {
                name: doc.name.clone(),
                ceiling: doc.ceiling_ft,
                polygon: to_polygon(&doc.name, &doc.polygon)?,
            });
        }

        let mut terrain = BTreeMap::new();
        for (band, polygons) in &self.terrain {
            let label = format!("terrain band {band}");
            let rings: Vec<Polygon> = polygons
                .iter()
                .map(|poly| to_polygon(&label, poly))
                .collect::<AirspaceResult<_>>()?;
            terrain.insert(*band, rings);
        }

        let perimeter = match &self.perimeter {
            Some(points) => Some(to_polygon("perimeter", points)?),
            None => None,
        };

        Ok(Airport {
            icao: self.icao.to_uppercase(),
            name: self.name,
            elevation: self.elevation_ft,
            ctr_radius: self.ctr_radius_km,
            ctr_ceiling: self.ctr_ceiling_ft,
            initial_climb: self.initial_climb_ft,
            default_runway,
            wind: Wind {
                angle: normalize_angle(self.wind.direction_deg.to_radians()),
                speed: self.wind.speed_kt,
            },
            radio: self.radio.unwrap_or_default(),
            fixes,
            runways,
            sids,
            stars,
            restricted,
            terrain,
            perimeter,
        })
    }
}

fn validate_procedure_fixes(
    procedure: &Procedure,
    fixes: &HashMap<String, DVec2>,
) -> AirspaceResult<()> {
    let all = procedure
        .runways
        .values()
        .flatten()
        .chain(procedure.body.iter())
        .chain(procedure.exits.values().flatten())
        .chain(procedure.entries.values().flatten());
    for pf in all {
        if !fixes.contains_key(&pf.fix.to_uppercase()) {
            return Err(AirspaceError::UnknownProcedureFix {
                procedure: procedure.icao.clone(),
                fix: pf.fix.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> String {
        r#"{
            "icao": "ksfo",
            "name": "San Francisco",
            "elevation_ft": 13.0,
            "ctr_radius_km": 80.0,
            "ctr_ceiling_ft": 10000.0,
            "initial_climb_ft": 5000.0,
            "default_runway": "28r",
            "wind": { "direction_deg": 280.0, "speed_kt": 12.0 },
            "fixes": { "SEPDY": [2.0, -14.0], "SXC": [95.0, -120.0] },
            "runways": [
                { "name": "28R", "position": [1.2, 0.4], "bearing_deg": 284.0 },
                { "name": "10L", "position": [-2.3, -0.5], "bearing_deg": 104.0,
                  "ils": { "enabled": false, "range_nm": 15.0 } }
            ],
            "restricted": [
                { "name": "P-56", "ceiling_ft": 5000.0,
                  "polygon": [[0.0, 10.0], [5.0, 10.0], [5.0, 15.0]] }
            ],
            "terrain": { "2000": [[[30.0, 0.0], [40.0, 0.0], [40.0, 10.0]]] }
        }"#
        .to_string()
    }

    #[test]
    fn parses_document_into_local_units() {
        let airport = Airport::from_json(&sample_doc()).unwrap();
        assert_eq!(airport.icao, "KSFO");
        assert_eq!(airport.default_runway, "28R");

        let rwy = airport.runway("28r").unwrap();
        assert!((rwy.angle - 284.0_f64.to_radians()).abs() < 1e-9);
        assert_eq!(rwy.elevation, 13.0);
        assert!(rwy.ils.enabled);
        assert!((rwy.ils.localizer_range_km - 25.0 * KM_PER_NM).abs() < 1e-9);

        let other = airport.runway("10L").unwrap();
        assert!(!other.ils.enabled);
        assert!((other.ils.localizer_range_km - 15.0 * KM_PER_NM).abs() < 1e-9);

        assert!(airport.fix("sepdy").is_some());
        assert_eq!(airport.restricted.len(), 1);
        assert_eq!(airport.terrain_polygons(2000).len(), 1);
        assert!(airport.terrain_polygons(3000).is_empty());
    }

    #[test]
    fn rejects_duplicate_runways() {
        let doc = sample_doc().replace("\"name\": \"10L\"", "\"name\": \"28r\"");
        assert!(matches!(
            Airport::from_json(&doc),
            Err(AirspaceError::DuplicateRunway(_))
        ));
    }

    #[test]
    fn rejects_unknown_default_runway() {
        let doc = sample_doc().replace("\"default_runway\": \"28r\"", "\"default_runway\": \"19L\"");
        assert!(matches!(
            Airport::from_json(&doc),
            Err(AirspaceError::UnknownDefaultRunway(_))
        ));
    }

    #[test]
    fn rejects_degenerate_polygons() {
        let doc = sample_doc().replace(
            "[[0.0, 10.0], [5.0, 10.0], [5.0, 15.0]]",
            "[[0.0, 10.0], [5.0, 10.0]]",
        );
        assert!(matches!(
            Airport::from_json(&doc),
            Err(AirspaceError::DegeneratePolygon(_))
        ));
    }

    #[test]
    fn cylinder_airspace_checks_radius_and_ceiling() {
        let airport = Airport::from_json(&sample_doc()).unwrap();
        assert!(airport.inside_airspace(DVec2::new(40.0, 0.0), 8000.0));
        assert!(!airport.inside_airspace(DVec2::new(90.0, 0.0), 8000.0));
        assert!(!airport.inside_airspace(DVec2::new(40.0, 0.0), 12_000.0));
        assert!(airport.distance_to_boundary(DVec2::new(40.0, 0.0)) < 0.0);
        assert!(airport.distance_to_boundary(DVec2::new(90.0, 0.0)) > 0.0);
    }

    #[test]
    fn wind_components_decompose_against_runway_course() {
        let airport = Airport::from_json(&sample_doc()).unwrap();
        // Wind 280 at 12 against runway course 284: nearly all headwind.
        let w = airport.wind_components(284.0_f64.to_radians());
        assert!(w.head > 11.9);
        assert!(w.cross < 1.0);
        // Opposite-direction runway sees a tailwind.
        let w = airport.wind_components(104.0_f64.to_radians());
        assert!(w.head < -11.9);
    }

    #[test]
    fn glideslope_altitude_rises_with_distance() {
        let airport = Airport::from_json(&sample_doc()).unwrap();
        let rwy = airport.runway("28R").unwrap();
        assert_eq!(rwy.glideslope_altitude(-1.0), rwy.elevation);
        let one_km = rwy.glideslope_altitude(1.0);
        assert!(one_km > rwy.elevation + 150.0 && one_km < rwy.elevation + 200.0);
        assert!(rwy.glideslope_altitude(2.0) > one_km);
    }

    #[test]
    fn nominal_heading_comes_from_the_runway_number() {
        let airport = Airport::from_json(&sample_doc()).unwrap();
        let rwy = airport.runway("28R").unwrap();
        assert!((rwy.nominal_heading() - 280.0_f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn terrain_band_rounds_up_to_the_next_thousand() {
        assert_eq!(Airport::terrain_band(1.0), 1000);
        assert_eq!(Airport::terrain_band(1000.0), 1000);
        assert_eq!(Airport::terrain_band(1001.0), 2000);
        assert_eq!(Airport::terrain_band(4500.0), 5000);
    }
}
