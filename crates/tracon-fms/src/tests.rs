#[cfg(test)]
mod tests {
    use tracon_airspace::Airport;
    use tracon_core::enums::{DepartureClearance, LegKind, TurnDirection};

    use crate::plan::{FlightPlan, WaypointAssignment};
    use crate::route::{self, RouteError, RouteSegment};
    use crate::waypoint::{NavTarget, Waypoint};

    fn sample_airport() -> Airport {
        let doc = r#"{
            "icao": "KSFO",
            "name": "San Francisco",
            "elevation_ft": 13.0,
            "ctr_radius_km": 80.0,
            "ctr_ceiling_ft": 10000.0,
            "initial_climb_ft": 5000.0,
            "default_runway": "28R",
            "wind": { "direction_deg": 280.0, "speed_kt": 8.0 },
            "fixes": {
                "SEPDY": [2.0, -14.0],
                "ZUPAX": [20.0, -30.0],
                "EUGEN": [45.0, -45.0],
                "SXC": [95.0, -120.0],
                "PORTE": [60.0, -80.0],
                "AMAKR": [-60.0, 55.0],
                "BRINY": [-40.0, 35.0],
                "WESLA": [-20.0, 18.0],
                "HADLY": [-8.0, 6.0]
            },
            "runways": [
                { "name": "28R", "position": [1.2, 0.4], "bearing_deg": 284.0 },
                { "name": "10L", "position": [-2.3, -0.5], "bearing_deg": 104.0 }
            ],
            "sids": {
                "OFFSH9": {
                    "icao": "OFFSH9",
                    "name": "Offshore Nine",
                    "runways": { "28R": [{ "fix": "SEPDY" }, { "fix": "ZUPAX", "altitude": 10000.0 }] },
                    "body": [{ "fix": "EUGEN" }],
                    "exits": { "SXC": [{ "fix": "SXC" }], "PORTE": [{ "fix": "PORTE" }] }
                }
            },
            "stars": {
                "BDEGA2": {
                    "icao": "BDEGA2",
                    "name": "Bodega Two",
                    "entries": { "AMAKR": [{ "fix": "AMAKR" }] },
                    "body": [{ "fix": "BRINY", "altitude": 8000.0, "speed": 250.0 }, { "fix": "WESLA" }],
                    "runways": { "28R": [{ "fix": "HADLY" }] }
                }
            }
        }"#;
        Airport::from_json(doc).unwrap()
    }

    fn fix_names(plan: &FlightPlan, leg: usize) -> Vec<String> {
        plan.legs[leg]
            .waypoints
            .iter()
            .map(|wp| wp.fix_name().unwrap_or("?").to_string())
            .collect()
    }

    #[test]
    fn plan_starts_with_an_unrestricted_vector_leg() {
        let plan = FlightPlan::new();
        assert_eq!(plan.cursor(), (0, 0));
        assert!(plan.at_last_waypoint());
        assert!(matches!(
            plan.current_waypoint().target,
            NavTarget::Heading {
                heading: None,
                turn: None
            }
        ));
        assert_eq!(plan.altitude_for_current_waypoint(), 0.0);
    }

    #[test]
    fn route_formatting_uppercases_and_rejects_whitespace() {
        assert_eq!(
            route::format_route(" ksfo.offsh9.sxc "),
            Some("KSFO.OFFSH9.SXC".to_string())
        );
        assert_eq!(route::format_route("two words"), None);
        assert_eq!(route::format_route("   "), None);
    }

    #[test]
    fn parse_route_splits_procedural_and_direct_segments() {
        let segments = route::parse_route("KSFO.OFFSH9.SXC..SEPDY").unwrap();
        assert_eq!(
            segments,
            vec![
                RouteSegment::Procedural {
                    entry: "KSFO".to_string(),
                    procedure: "OFFSH9".to_string(),
                    exit: "SXC".to_string(),
                },
                RouteSegment::Direct {
                    fix: "SEPDY".to_string()
                },
            ]
        );
        assert!(matches!(
            route::parse_route("KSFO.OFFSH9"),
            Err(RouteError::BadSegment(_))
        ));
        assert!(matches!(
            route::parse_route("SEPDY.."),
            Err(RouteError::BadSegment(_))
        ));
    }

    #[test]
    fn sid_expansion_runs_runway_body_and_exit() {
        let airport = sample_airport();
        let mut plan = FlightPlan::new();
        assert!(plan.follow_sid(&airport, "OFFSH9", "28R", "SXC"));
        assert_eq!(plan.legs.len(), 1);
        assert_eq!(plan.legs[0].kind, LegKind::Sid);
        assert_eq!(plan.legs[0].route, "KSFO.OFFSH9.SXC");
        assert_eq!(fix_names(&plan, 0), vec!["SEPDY", "ZUPAX", "EUGEN", "SXC"]);
        // Published restrictions stay off until climb-via.
        assert!(plan.legs[0].waypoints.iter().all(|wp| wp.altitude.is_none()));
        assert_eq!(plan.following_sid().as_deref(), Some("OFFSH9"));
        assert!(!plan.follow_sid(&airport, "OFFSH9", "28R", "NOPE"));
    }

    #[test]
    fn climb_via_sid_applies_published_restrictions() {
        let airport = sample_airport();
        let mut plan = FlightPlan::new();
        plan.follow_sid(&airport, "OFFSH9", "28R", "SXC");
        assert!(plan.climb_via_sid(&airport, "28R"));
        let zupax = &plan.legs[0].waypoints[1];
        assert_eq!(zupax.altitude, Some(10_000.0));
        let sepdy = &plan.legs[0].waypoints[0];
        assert_eq!(sepdy.altitude, None);
    }

    #[test]
    fn climb_via_sid_requires_a_sid_leg() {
        let airport = sample_airport();
        let mut plan = FlightPlan::new();
        assert!(!plan.climb_via_sid(&airport, "28R"));
    }

    #[test]
    fn star_expansion_runs_entry_body_and_runway() {
        let airport = sample_airport();
        let segments = route::parse_route("AMAKR.BDEGA2.KSFO").unwrap();

        let mut plan = FlightPlan::new();
        assert!(plan.apply_route(&airport, &segments, true, None, Some("28R")));
        assert_eq!(fix_names(&plan, 0), vec!["AMAKR", "BRINY", "WESLA", "HADLY"]);
        assert_eq!(plan.following_star().as_deref(), Some("BDEGA2"));

        // Without an arrival runway the runway transition is skipped.
        let mut plan = FlightPlan::new();
        assert!(plan.apply_route(&airport, &segments, true, None, None));
        assert_eq!(fix_names(&plan, 0), vec!["AMAKR", "BRINY", "WESLA"]);
    }

    #[test]
    fn descend_via_star_applies_published_profile() {
        let airport = sample_airport();
        let segments = route::parse_route("AMAKR.BDEGA2.KSFO").unwrap();
        let mut plan = FlightPlan::new();
        plan.apply_route(&airport, &segments, true, None, Some("28R"));
        assert!(plan.descend_via_star(&airport, Some("28R")));
        let briny = &plan.legs[0].waypoints[1];
        assert_eq!(briny.altitude, Some(8000.0));
        assert_eq!(briny.speed, Some(250.0));
        assert!(plan.legs[0].waypoints[0].altitude.is_none());
    }

    #[test]
    fn overlay_yields_to_waypoint_constraints() {
        let mut plan = FlightPlan::new();
        plan.set_all(WaypointAssignment {
            altitude: Some(5000.0),
            ..Default::default()
        });
        assert_eq!(plan.altitude_for_current_waypoint(), 5000.0);

        plan.set_current(WaypointAssignment {
            altitude: Some(7000.0),
            ..Default::default()
        });
        assert_eq!(plan.altitude_for_current_waypoint(), 7000.0);

        // A fresh plan-wide clearance clears the stale constraint.
        plan.set_all(WaypointAssignment {
            altitude: Some(9000.0),
            ..Default::default()
        });
        assert_eq!(plan.altitude_for_current_waypoint(), 9000.0);
    }

    #[test]
    fn set_all_expedite_overrides_and_clears() {
        let mut plan = FlightPlan::new();
        plan.set_current(WaypointAssignment {
            expedite: Some(true),
            ..Default::default()
        });
        assert!(plan.resolved_expedite());
        plan.set_all(WaypointAssignment {
            altitude: Some(4000.0),
            expedite: Some(false),
            ..Default::default()
        });
        assert!(!plan.resolved_expedite());
    }

    #[test]
    fn skip_to_fix_moves_the_cursor_or_leaves_the_plan_alone() {
        let airport = sample_airport();
        let segments = route::parse_route("KSFO.OFFSH9.SXC").unwrap();
        let mut plan = FlightPlan::new();
        plan.apply_route(&airport, &segments, true, Some("28R"), None);

        assert!(plan.skip_to_fix("eugen"));
        assert_eq!(plan.cursor(), (0, 2));

        let before = plan.clone();
        assert!(!plan.skip_to_fix("NOPE"));
        assert_eq!(plan, before);
    }

    #[test]
    fn has_waypoint_scans_ahead_of_the_cursor_only() {
        let airport = sample_airport();
        let segments = route::parse_route("SEPDY..EUGEN").unwrap();
        let mut plan = FlightPlan::new();
        plan.apply_route(&airport, &segments, true, None, None);

        assert!(plan.has_waypoint("SEPDY"));
        plan.next_waypoint();
        assert!(!plan.has_waypoint("SEPDY"));
        assert!(plan.has_waypoint("EUGEN"));
    }

    #[test]
    fn next_waypoint_rolls_across_legs_and_stops_at_the_end() {
        let airport = sample_airport();
        let segments = route::parse_route("SEPDY..EUGEN").unwrap();
        let mut plan = FlightPlan::new();
        plan.apply_route(&airport, &segments, true, None, None);

        assert_eq!(plan.cursor(), (0, 0));
        plan.next_waypoint();
        assert_eq!(plan.cursor(), (1, 0));
        assert!(plan.at_last_waypoint());
        plan.next_waypoint();
        assert_eq!(plan.cursor(), (1, 0));
    }

    #[test]
    fn route_changes_replace_the_tail_but_keep_flown_legs() {
        let airport = sample_airport();
        let segments = route::parse_route("SEPDY..EUGEN").unwrap();
        let mut plan = FlightPlan::new();
        plan.apply_route(&airport, &segments, true, None, None);
        plan.next_waypoint();

        assert!(plan.follow_sid(&airport, "OFFSH9", "28R", "PORTE"));
        assert_eq!(plan.legs.len(), 2);
        assert_eq!(plan.legs[0].route, "SEPDY");
        assert_eq!(plan.route_string(), "SEPDY..KSFO.OFFSH9.PORTE");
        assert_eq!(plan.cursor(), (1, 0));
    }

    #[test]
    fn bad_route_leaves_the_plan_untouched() {
        let airport = sample_airport();
        let good = route::parse_route("SEPDY").unwrap();
        let mut plan = FlightPlan::new();
        plan.apply_route(&airport, &good, true, None, None);

        let before = plan.clone();
        let bad = route::parse_route("EUGEN..NOPE").unwrap();
        assert!(!plan.apply_route(&airport, &bad, false, None, None));
        assert_eq!(plan, before);
    }

    #[test]
    fn follow_approach_freezes_clearance_and_carries_the_vector() {
        let mut plan = FlightPlan::new();
        plan.current_waypoint_mut().target = NavTarget::Heading {
            heading: Some(1.0),
            turn: Some(TurnDirection::Left),
        };
        plan.set_all(WaypointAssignment {
            altitude: Some(4000.0),
            speed: Some(210.0),
            ..Default::default()
        });

        plan.follow_approach("ILS", "28r");
        let waypoint = plan.current_waypoint();
        assert_eq!(waypoint.altitude, Some(4000.0));
        assert_eq!(waypoint.speed, Some(210.0));
        match &waypoint.target {
            NavTarget::Runway {
                runway,
                heading,
                turn,
            } => {
                assert_eq!(runway, "28R");
                assert_eq!(*heading, Some(1.0));
                assert_eq!(*turn, Some(TurnDirection::Left));
            }
            other => panic!("unexpected target {other:?}"),
        }
        assert_eq!(plan.current_leg().route, "ILS.28R");
    }

    #[test]
    fn cleared_as_filed_rebuilds_from_the_clearance() {
        let airport = sample_airport();
        let mut plan = FlightPlan::new();
        let filed = DepartureClearance::Procedure {
            sid: "OFFSH9".to_string(),
            exit: "SXC".to_string(),
        };
        assert!(plan.cleared_as_filed(&airport, &filed, "28R"));
        assert_eq!(plan.legs[0].route, "KSFO.OFFSH9.SXC");

        let radial = DepartureClearance::Radial { radial: 1.5 };
        assert!(!plan.cleared_as_filed(&airport, &radial, "28R"));
    }

    #[test]
    fn flight_plan_round_trips_through_serde() {
        let airport = sample_airport();
        let segments = route::parse_route("KSFO.OFFSH9.SXC").unwrap();
        let mut plan = FlightPlan::new();
        plan.apply_route(&airport, &segments, true, Some("28R"), None);
        plan.set_all(WaypointAssignment {
            altitude: Some(5000.0),
            speed: Some(230.0),
            ..Default::default()
        });
        plan.insert_waypoint_here(Waypoint::heading(0.5));

        let json = serde_json::to_string(&plan).unwrap();
        let back: FlightPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, back);
    }
}
