//! Simulation constants and tuning parameters.
//!
//! Positions are kilometres east/north of the field, altitudes are feet MSL,
//! speeds are knots indicated, headings are radians clockwise from north.

// --- Unit conversions ---

/// Kilometres per nautical mile.
pub const KM_PER_NM: f64 = 1.852;

/// Kilometres travelled in one second at one knot.
pub const KM_PER_KT_SEC: f64 = 0.000514444;

/// Feet per kilometre, as used by the glideslope altitude model.
pub const FT_PER_KM: f64 = 3280.0;

/// Metres per second per knot.
pub const MS_PER_KT: f64 = 0.51444444;

// --- Turning ---

/// Maximum turn rate (radians/sec): the standard 3 deg/s rate turn.
pub const MAX_TURN_RATE: f64 = 0.0523598776;

/// Speed divisor for the 25-degree-bank turn rate: rate = factor / speed_kt.
pub const BANK_TURN_FACTOR: f64 = 8.883031;

/// Bank angle assumed when computing turn-initiation distance (radians).
pub const TURN_INITIATION_BANK: f64 = 25.0 * std::f64::consts::PI / 180.0;

/// Gravitational acceleration (m/s^2) for the turn radius formula.
pub const GRAVITY_MS2: f64 = 9.81;

// --- Vertical rates ---

/// Rate multiplier when a climb or descent is expedited.
pub const EXPEDITE_FACTOR: f64 = 1.5;

/// Descent rate multiplier on final approach.
pub const LANDING_DESCENT_FACTOR: f64 = 3.0;

/// Climb rate multiplier on final approach (go-around energy).
pub const LANDING_CLIMB_FACTOR: f64 = 1.5;

/// Tropopause altitude (ft). The climb model is only derated below it.
pub const TROPOPAUSE_FT: f64 = 36_152.0;

/// Residual climb rate at the service ceiling for jets (fpm).
pub const JET_CEILING_CLIMB_RATE: f64 = 500.0;

/// Residual climb rate at the service ceiling for props (fpm).
pub const PROP_CEILING_CLIMB_RATE: f64 = 100.0;

/// Altitude deadband (ft) below which no vertical correction is made.
pub const ALTITUDE_EPS_FT: f64 = 0.02;

/// Speed deadband (kt) below which no acceleration is applied.
pub const SPEED_EPS_KT: f64 = 0.01;

// --- Speed control ---

/// Braking multiplier while decelerating on the ground.
pub const GROUND_BRAKING_FACTOR: f64 = 3.5;

/// Indicated airspeed cap below `SPEED_CAP_FLOOR_FT` (kt).
pub const LOW_ALTITUDE_SPEED_CAP: f64 = 250.0;

/// Altitude (ft) below which the indicated airspeed cap applies.
pub const SPEED_CAP_FLOOR_FT: f64 = 10_000.0;

/// True airspeed gain over indicated, per foot of altitude (+1.6%/1000 ft).
pub const TAS_PER_FT: f64 = 0.000016;

/// Wind speed gain per foot of altitude (+2%/1000 ft).
pub const WIND_PER_FT: f64 = 0.00002;

// --- Approach / ILS ---

/// Lateral offset (km) within which the localizer is considered captured.
pub const CAPTURE_LATERAL_KM: f64 = 0.050;

/// Heading error (radians) within which the localizer is considered captured.
pub const CAPTURE_HEADING_TOLERANCE: f64 = 5.0 * std::f64::consts::PI / 180.0;

/// Proportional gain steering onto the course while joining.
pub const JOIN_COURSE_GAIN: f64 = 50.0;

/// Proportional gain tracking the course once established.
pub const TRACK_COURSE_GAIN: f64 = 25.0;

/// Maximum commanded offset from the approach course (radians).
pub const MAX_COURSE_CORRECTION: f64 = 30.0 * std::f64::consts::PI / 180.0;

/// Extra lead distance (km) before the computed localizer intercept turn.
pub const TURN_EARLY_KM: f64 = 1.0;

/// Bearing-to-course window (radians) that always allows drifting onto it.
pub const INTERCEPT_WINDOW: f64 = 1.5 * std::f64::consts::PI / 180.0;

/// Maximum legal intercept angle (radians).
pub const MAX_INTERCEPT_ANGLE: f64 = 30.0 * std::f64::consts::PI / 180.0;

/// Maximum legal height above the glideslope at localizer capture (ft).
pub const MAX_ABOVE_GLIDESLOPE_FT: f64 = 250.0;

/// Distance from threshold (km) where speed reaches landing reference.
pub const FINAL_SPEED_NEAR_KM: f64 = 3.5;

/// Distance from threshold (km) where the approach speed ramp begins.
pub const FINAL_SPEED_FAR_KM: f64 = 9.5;

/// Lateral offset (km) beyond which an airborne approach is aborted.
pub const APPROACH_ABORT_LATERAL_KM: f64 = 0.100;

// --- Fix following ---

/// Unconditional waypoint-passage radius (km).
pub const FIX_PROXIMITY_KM: f64 = 1.0;

/// Turn anticipation is only honored within this distance of the fix (km).
pub const TURN_ANTICIPATION_WINDOW_KM: f64 = 10.0;

// --- Holding ---

/// Heading alignment (radians, ~2 deg) required before hold logic arms.
pub const HOLD_ALIGN_TOLERANCE: f64 = 0.035;

/// Straight-line distance (km) within which fix passage is recognized.
pub const HOLD_FIX_PASSAGE_KM: f64 = 2.0;

/// Hold leg duration when none is specified (minutes).
pub const DEFAULT_HOLD_LEG_MIN: u32 = 1;

// --- Ground operations ---

/// Taxi duration (seconds) from pushback to holding short.
pub const DEFAULT_TAXI_TIME_SECS: f64 = 3.0;

/// Height above field elevation (ft) below which weight is on wheels.
pub const WOW_THRESHOLD_FT: f64 = 5.0;

/// Ground speed (kt) below which a landed aircraft counts as stopped.
pub const STOPPED_SPEED_KT: f64 = 5.0;

/// Height above the field (ft) at which a departure leaves runway heading.
pub const TAKEOFF_TURN_ALTITUDE_FT: f64 = 400.0;

// --- Airspace ---

/// Lowest assignable/usable airborne altitude target (ft).
pub const MIN_AIRBORNE_ALTITUDE_FT: f64 = 1000.0;

/// Departure-window half-width for radial clearances (radians, ~5 deg).
pub const DEPARTURE_RADIAL_TOLERANCE: f64 = 0.08726;

/// Distance past the airspace boundary (km) at which departures are removed.
pub const DEPARTURE_CULL_MARGIN_KM: f64 = 10.0;

// --- Conflict monitoring ---

/// Restricted-area recheck horizon after entering an area (seconds of flight).
pub const AREA_RECHECK_INSIDE_SECS: f64 = 50.0;

/// Minimum restricted-area recheck horizon while outside (seconds of flight).
pub const AREA_RECHECK_MIN_SECS: f64 = 10.0;

/// Floor on the cached terrain proximity distance (km).
pub const TERRAIN_RANGE_FLOOR_KM: f64 = 0.2;

/// Terrain altitude band size (ft).
pub const TERRAIN_BAND_FT: f64 = 1000.0;

// --- Collision decay ---

/// Altitude decay after a terrain collision (ft/sec).
pub const CRASH_SINK_RATE: f64 = 90.0;

/// Per-tick speed retention after a terrain collision.
pub const CRASH_SPEED_DECAY: f64 = 0.99;

// --- Trails ---

/// Minimum spacing between radar trail samples (seconds).
pub const TRAIL_SPACING_SECS: f64 = 4.0;

/// Number of trail samples retained per aircraft.
pub const TRAIL_LENGTH: usize = 10;

// --- Wind scoring ---

/// Crosswind component (kt) scored as a minor penalty.
pub const CROSSWIND_MINOR_KT: f64 = 10.0;

/// Crosswind component (kt) scored as a major penalty.
pub const CROSSWIND_MAJOR_KT: f64 = 20.0;

/// Tailwind component (kt) scored as a minor penalty.
pub const TAILWIND_MINOR_KT: f64 = 1.0;

/// Tailwind component (kt) scored as a major penalty.
pub const TAILWIND_MAJOR_KT: f64 = 10.0;
