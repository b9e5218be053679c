#[cfg(test)]
mod tests {
    use glam::DVec2;

    use crate::commands::{Instruction, LegLength, RawInstruction};
    use crate::enums::*;
    use crate::events::{ScoreEvent, ScoreState, Transmission};
    use crate::state::RadarSnapshot;
    use crate::types::*;

    /// Verify all enums round-trip through serde_json.
    #[test]
    fn test_flight_mode_serde() {
        let variants = vec![
            FlightMode::Apron,
            FlightMode::Taxi,
            FlightMode::Waiting,
            FlightMode::Takeoff,
            FlightMode::Cruise,
            FlightMode::Landing,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: FlightMode = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_turn_direction_serde() {
        let json = serde_json::to_string(&TurnDirection::Left).unwrap();
        assert_eq!(json, "\"left\"");
        let back: TurnDirection = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(back, TurnDirection::Right);
        assert_eq!(TurnDirection::Left.opposite(), TurnDirection::Right);
    }

    #[test]
    fn test_departure_clearance_serde() {
        let variants = vec![
            DepartureClearance::Procedure {
                sid: "OFFSH9".to_string(),
                exit: "SXC".to_string(),
            },
            DepartureClearance::Radial { radial: 1.25 },
        ];
        for v in &variants {
            let json = serde_json::to_string(v).unwrap();
            let back: DepartureClearance = serde_json::from_str(&json).unwrap();
            assert_eq!(*v, back);
        }
    }

    /// Verify Instruction round-trips through serde (tagged union).
    #[test]
    fn test_instruction_serde() {
        let instructions = vec![
            Instruction::Taxi {
                runway: Some("28R".to_string()),
            },
            Instruction::Takeoff,
            Instruction::Heading {
                direction: Some(TurnDirection::Left),
                degrees: 250.0,
                incremental: false,
            },
            Instruction::Altitude {
                feet: Some(5000.0),
                expedite: true,
            },
            Instruction::Hold {
                direction: None,
                leg_length: Some(LegLength::Min(2)),
                fix: Some("SXC".to_string()),
            },
            Instruction::Land {
                runway: "28R".to_string(),
                variant: None,
            },
            Instruction::Reroute {
                route: "KSFO.OFFSH9.SXC".to_string(),
            },
            Instruction::ClearedAsFiled,
            Instruction::Abort,
            Instruction::Delete,
        ];
        for inst in &instructions {
            let json = serde_json::to_string(inst).unwrap();
            let back: Instruction = serde_json::from_str(&json).unwrap();
            assert_eq!(*inst, back);
        }
    }

    #[test]
    fn test_raw_instruction_args_default() {
        let raw: RawInstruction = serde_json::from_str(r#"{"name": "takeoff"}"#).unwrap();
        assert_eq!(raw.name, "takeoff");
        assert!(raw.args.is_empty());
    }

    #[test]
    fn test_takeoff_is_the_only_deferred_instruction() {
        assert!(Instruction::Takeoff.is_deferred());
        assert!(!Instruction::Abort.is_deferred());
        assert!(!Instruction::Taxi { runway: None }.is_deferred());
    }

    /// Verify Transmission round-trips through serde.
    #[test]
    fn test_transmission_serde() {
        let tx = Transmission {
            callsign: "AAL123".to_string(),
            log: "AAL123, fly heading 250".to_string(),
            say: "American one two three, fly heading two five zero".to_string(),
            warning: false,
            tick: 42,
        };
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transmission = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }

    /// Verify score arithmetic matches the published weights.
    #[test]
    fn test_score_weights() {
        let mut score = ScoreState::default();
        score.apply(ScoreEvent::Arrival);
        score.apply(ScoreEvent::DepartureExitOk);
        assert!((score.total() - 20.0).abs() < 1e-10);

        score.apply(ScoreEvent::DepartureExitBad);
        assert_eq!(score.departures, 1);
        assert_eq!(score.failed_departures, 1);
        assert!((score.total() - 18.0).abs() < 1e-10, "busted exit costs 2");

        score.apply(ScoreEvent::Collision);
        assert!((score.total() + 32.0).abs() < 1e-10);

        score.apply(ScoreEvent::WindyTakeoff { points: 2 });
        assert!((score.total() + 33.0).abs() < 1e-10);

        score.apply(ScoreEvent::RestrictedAreaEntry);
        score.apply(ScoreEvent::Violation);
        assert!((score.total() + 44.0).abs() < 1e-10);
    }

    #[test]
    fn test_failed_arrival_weight() {
        let mut score = ScoreState::default();
        score.apply(ScoreEvent::FailedArrival);
        assert!((score.total() + 20.0).abs() < 1e-10);
        assert_eq!(score.failed_arrivals, 1);
    }

    /// Verify RadarSnapshot can be serialized to JSON.
    #[test]
    fn test_snapshot_serde() {
        let snapshot = RadarSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: RadarSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.time.tick, back.time.tick);
        // Verify the default snapshot is reasonably small
        assert!(
            json.len() < 1024,
            "Empty snapshot should be <1KB, was {} bytes",
            json.len()
        );
    }

    /// Verify bearing convention: 0 = north, clockwise positive.
    #[test]
    fn test_bearing_convention() {
        let origin = DVec2::ZERO;
        let north = DVec2::new(0.0, 100.0);
        assert!((bearing_to(origin, north) - 0.0).abs() < 1e-10);

        let east = DVec2::new(100.0, 0.0);
        let expected_east = std::f64::consts::FRAC_PI_2;
        assert!(
            (bearing_to(origin, east) - expected_east).abs() < 1e-10,
            "East bearing should be PI/2, got {}",
            bearing_to(origin, east)
        );

        let south = DVec2::new(0.0, -100.0);
        assert!((bearing_to(origin, south) - std::f64::consts::PI).abs() < 1e-10);
    }

    #[test]
    fn test_angle_offset_takes_the_short_way() {
        // 350° to 10°: +20°, not -340°.
        let from = 350.0_f64.to_radians();
        let to = 10.0_f64.to_radians();
        let offset = angle_offset(to, from);
        assert!((offset - 20.0_f64.to_radians()).abs() < 1e-10);

        // 10° to 350°: -20°.
        let offset = angle_offset(from, to);
        assert!((offset + 20.0_f64.to_radians()).abs() < 1e-10);
    }

    #[test]
    fn test_course_offset_decomposition() {
        // Aircraft 10 km south of a threshold, course due north: the target
        // is 10 km ahead and dead on course.
        let position = DVec2::new(0.0, -10.0);
        let threshold = DVec2::ZERO;
        let offset = course_offset(position, threshold, 0.0);
        assert!(offset.lateral.abs() < 1e-10);
        assert!((offset.longitudinal - 10.0).abs() < 1e-10);
        assert!((offset.straight - 10.0).abs() < 1e-10);

        // 1 km east of the extended centerline.
        let offside = DVec2::new(1.0, -10.0);
        let offset = course_offset(offside, threshold, 0.0);
        assert!(
            offset.lateral.abs() > 0.9 && offset.lateral.abs() < 1.1,
            "lateral miss should be ~1 km, got {:.3}",
            offset.lateral
        );
    }

    #[test]
    fn test_map_range_clamp() {
        // Approach speed ramp shape: near km -> landing speed, far km -> assigned.
        let near = map_range_clamp(3.5, (3.5, 9.5), (140.0, 230.0));
        assert!((near - 140.0).abs() < 1e-10);
        let far = map_range_clamp(9.5, (3.5, 9.5), (140.0, 230.0));
        assert!((far - 230.0).abs() < 1e-10);
        let mid = map_range_clamp(6.5, (3.5, 9.5), (140.0, 230.0));
        assert!((mid - 185.0).abs() < 1e-10);
        // Clamped outside the input range.
        assert!((map_range_clamp(1.0, (3.5, 9.5), (140.0, 230.0)) - 140.0).abs() < 1e-10);
        assert!((map_range_clamp(20.0, (3.5, 9.5), (140.0, 230.0)) - 230.0).abs() < 1e-10);
    }

    #[test]
    fn test_heading_to_string() {
        assert_eq!(heading_to_string(0.0), "360");
        assert_eq!(heading_to_string(std::f64::consts::FRAC_PI_2), "090");
        assert_eq!(heading_to_string(250.0_f64.to_radians()), "250");
        assert_eq!(heading_to_string(365.0_f64.to_radians()), "005");
    }

    #[test]
    fn test_turn_initiation_scales_with_speed() {
        let slow = turn_initiation_km(180.0, 25.0_f64.to_radians(), 1.0);
        let fast = turn_initiation_km(360.0, 25.0_f64.to_radians(), 1.0);
        assert!(
            fast > slow,
            "faster aircraft must begin turning earlier: {fast:.2} vs {slow:.2} km"
        );

        let shallow = turn_initiation_km(250.0, 25.0_f64.to_radians(), 0.2);
        let sharp = turn_initiation_km(250.0, 25.0_f64.to_radians(), 2.0);
        assert!(sharp > shallow);
    }

    /// Verify SimTime advancement with variable deltas.
    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        assert_eq!(time.tick, 0);
        assert_eq!(time.elapsed_secs, 0.0);

        for _ in 0..30 {
            time.advance(0.5);
        }
        assert_eq!(time.tick, 30);
        assert!((time.elapsed_secs - 15.0).abs() < 1e-10);

        time.advance(2.0);
        assert_eq!(time.tick, 31);
        assert!((time.elapsed_secs - 17.0).abs() < 1e-10);
    }
}
