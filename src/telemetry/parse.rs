use std::sync::OnceLock;
use regex::Regex;

use crate::telemetry::types::{HeaterState, Telemetry};

// T: 85.0 C | H: 20.0 % | Peso: 150 | Aquecedor: ON
const TELEMETRY_PATTERN: &str =
    r"T:\s*([\d.]+)\s*C\s*\|\s*H:\s*([\d.]+)\s*%\s*\|\s*Peso:\s*([-\d.]+)\s*\|\s*Aquecedor:\s*(ON|OFF)";

fn telemetry_regex() -> &'static Regex {
    static TELEMETRY_RE: OnceLock<Regex> = OnceLock::new();
    TELEMETRY_RE.get_or_init(|| {
        Regex::new(TELEMETRY_PATTERN).expect("valid telemetry regex")
    })
}

/// Searches `line` for a telemetry record. Text around the record is ignored.
pub fn parse_line(line: &str) -> Option<Telemetry> {
    let captures = telemetry_regex().captures(line)?;

    Some(Telemetry {
        temperature: captures[1].to_string(),
        humidity: captures[2].to_string(),
        weight: captures[3].to_string(),
        heater: HeaterState::from_token(&captures[4]),
    })
}
