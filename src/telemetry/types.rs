#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterState {
    On,
    Off,
}

impl HeaterState {
    /// Only the exact `ON` token means the heater is running.
    pub fn from_token(token: &str) -> HeaterState {
        match token {
            "ON" => HeaterState::On,
            _ => HeaterState::Off,
        }
    }
}

impl std::fmt::Display for HeaterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            HeaterState::On => "ON",
            HeaterState::Off => "OFF",
        };

        write!(f, "{}", result)
    }
}

/**
 * One reading reported by the dryer.
 * The numeric fields hold the text exactly as the device printed it, so that the dashboard shows
 * the same digits (no rounding or unit conversion).
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telemetry {
    pub temperature: String,
    pub humidity: String,
    pub weight: String,
    pub heater: HeaterState,
}

impl Telemetry {
    /// Degrees Celsius
    pub fn temperature_value(&self) -> Option<f32> {
        self.temperature.parse().ok()
    }

    /// Relative humidity in percent
    pub fn humidity_value(&self) -> Option<f32> {
        self.humidity.parse().ok()
    }

    /// Grams, negative when the scale drifted below its tare
    pub fn weight_value(&self) -> Option<f32> {
        self.weight.parse().ok()
    }
}
