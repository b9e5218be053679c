//! Speech renderings for radio readbacks.
//!
//! Every transmission carries two forms: a literal log line and a
//! speech-normalized line. The helpers here build the spoken parts:
//! digit-by-digit numbers, altitudes as thousands or flight levels,
//! runway names with spelled side letters, and compass cardinals.

use tracon_core::commands::LegLength;
use tracon_core::types::{heading_to_string, normalize_angle};

const DIGIT_WORDS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

const CARDINALS: [&str; 8] = [
    "north",
    "northeast",
    "east",
    "southeast",
    "south",
    "southwest",
    "west",
    "northwest",
];

/// Speak a number digit by digit: "250" becomes "two five zero".
/// Non-digit characters are dropped.
pub fn say_digits(digits: &str) -> String {
    let words: Vec<&str> = digits
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| DIGIT_WORDS[d as usize]))
        .collect();
    words.join(" ")
}

/// Spoken altitude: "four thousand seven hundred" below the flight
/// levels, "flight level three five zero" at or above 18,000 ft.
pub fn radio_altitude(feet: f64) -> String {
    let feet = feet.max(0.0);
    if feet >= 18_000.0 {
        let level = (feet / 100.0).round() as i64;
        return format!("flight level {}", say_digits(&level.to_string()));
    }
    let mut thousands = (feet / 1000.0).floor() as i64;
    let mut hundreds = ((feet - thousands as f64 * 1000.0) / 100.0).round() as i64;
    if hundreds == 10 {
        thousands += 1;
        hundreds = 0;
    }
    let mut parts = Vec::new();
    if thousands > 0 {
        parts.push(format!("{} thousand", say_digits(&thousands.to_string())));
    }
    if hundreds > 0 {
        parts.push(format!("{} hundred", DIGIT_WORDS[hundreds as usize]));
    }
    if parts.is_empty() {
        return "zero".to_string();
    }
    parts.join(" ")
}

/// Spoken heading from the three-digit controller form.
pub fn radio_heading(heading: f64) -> String {
    say_digits(&heading_to_string(heading))
}

/// Spoken speed, digit by digit.
pub fn radio_speed(knots: f64) -> String {
    say_digits(&format!("{:.0}", knots.max(0.0)))
}

/// Spoken runway name: "28R" becomes "two eight right".
pub fn radio_runway(name: &str) -> String {
    let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
    let mut spoken = say_digits(&digits);
    let side = match name.chars().last() {
        Some('L') | Some('l') => Some("left"),
        Some('R') | Some('r') => Some("right"),
        Some('C') | Some('c') => Some("center"),
        _ => None,
    };
    if let Some(side) = side {
        spoken.push(' ');
        spoken.push_str(side);
    }
    spoken
}

/// Clearance verb for an altitude change relative to the present
/// altitude.
pub fn altitude_trend(current_ft: f64, target_ft: f64) -> &'static str {
    if target_ft > current_ft + 100.0 {
        "climb and maintain"
    } else if target_ft < current_ft - 100.0 {
        "descend and maintain"
    } else {
        "maintain"
    }
}

/// Clearance verb for a speed change relative to the present speed.
pub fn speed_trend(current_kt: f64, target_kt: f64) -> &'static str {
    if target_kt > current_kt + 1.0 {
        "increase speed to"
    } else if target_kt < current_kt - 1.0 {
        "reduce speed to"
    } else {
        "maintain"
    }
}

/// Eight-point compass cardinal for a bearing.
pub fn cardinal(bearing: f64) -> &'static str {
    let degrees = normalize_angle(bearing).to_degrees();
    let sector = ((degrees + 22.5) / 45.0).floor() as usize % 8;
    CARDINALS[sector]
}

/// Compact hold leg rendering: "1min" or "5nm".
pub fn format_leg_length(leg: LegLength) -> String {
    match leg {
        LegLength::Min(minutes) => format!("{minutes}min"),
        LegLength::Nm(miles) => {
            if miles.fract() == 0.0 {
                format!("{}nm", miles as i64)
            } else {
                format!("{miles}nm")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_speak_one_at_a_time() {
        assert_eq!(say_digits("250"), "two five zero");
        assert_eq!(say_digits("068"), "zero six eight");
    }

    #[test]
    fn altitudes_group_thousands_and_hundreds() {
        assert_eq!(radio_altitude(4700.0), "four thousand seven hundred");
        assert_eq!(radio_altitude(5000.0), "five thousand");
        assert_eq!(radio_altitude(17_000.0), "one seven thousand");
        assert_eq!(radio_altitude(500.0), "five hundred");
        assert_eq!(radio_altitude(0.0), "zero");
    }

    #[test]
    fn high_altitudes_become_flight_levels() {
        assert_eq!(radio_altitude(35_000.0), "flight level three five zero");
        assert_eq!(radio_altitude(18_000.0), "flight level one eight zero");
    }

    #[test]
    fn runways_spell_digits_and_side() {
        assert_eq!(radio_runway("28R"), "two eight right");
        assert_eq!(radio_runway("10l"), "one zero left");
        assert_eq!(radio_runway("9C"), "nine center");
        assert_eq!(radio_runway("5"), "five");
    }

    #[test]
    fn headings_speak_the_controller_form() {
        assert_eq!(radio_heading(0.0), "three six zero");
        assert_eq!(radio_heading(250.0_f64.to_radians()), "two five zero");
    }

    #[test]
    fn trend_verbs_follow_the_current_state() {
        assert_eq!(altitude_trend(3000.0, 8000.0), "climb and maintain");
        assert_eq!(altitude_trend(8000.0, 3000.0), "descend and maintain");
        assert_eq!(altitude_trend(5000.0, 5000.0), "maintain");
        assert_eq!(speed_trend(250.0, 180.0), "reduce speed to");
        assert_eq!(speed_trend(180.0, 250.0), "increase speed to");
    }

    #[test]
    fn cardinals_cover_the_compass() {
        assert_eq!(cardinal(0.0), "north");
        assert_eq!(cardinal(std::f64::consts::PI), "south");
        assert_eq!(cardinal(44.0_f64.to_radians()), "northeast");
        assert_eq!(cardinal(316.0_f64.to_radians()), "northwest");
    }

    #[test]
    fn leg_lengths_render_compactly() {
        assert_eq!(format_leg_length(LegLength::Min(1)), "1min");
        assert_eq!(format_leg_length(LegLength::Nm(5.0)), "5nm");
        assert_eq!(format_leg_length(LegLength::Nm(2.5)), "2.5nm");
    }
}
