use iced::{Background, Border, Color, Shadow, Theme};
use iced::widget::container::{StyleSheet, Appearance};

use crate::telemetry::types::HeaterState;

pub const TEMPERATURE_COLOR: Color = Color::from_rgb(0xFF as f32 / 255.0, 0x57 as f32 / 255.0, 0x22 as f32 / 255.0);
pub const HUMIDITY_COLOR: Color = Color::from_rgb(0x21 as f32 / 255.0, 0x96 as f32 / 255.0, 0xF3 as f32 / 255.0);
pub const WEIGHT_COLOR: Color = Color::from_rgb(0x4C as f32 / 255.0, 0xAF as f32 / 255.0, 0x50 as f32 / 255.0);
pub const HEATER_ON_COLOR: Color = Color::from_rgb(0xF4 as f32 / 255.0, 0x43 as f32 / 255.0, 0x36 as f32 / 255.0);
pub const HEATER_OFF_COLOR: Color = Color::from_rgb(0x9E as f32 / 255.0, 0x9E as f32 / 255.0, 0x9E as f32 / 255.0);

const LOG_BACKGROUND_COLOR: Color = Color::from_rgb(0x1E as f32 / 255.0, 0x1E as f32 / 255.0, 0x1E as f32 / 255.0);
const LOG_TEXT_COLOR: Color = Color::from_rgb(0x00 as f32 / 255.0, 0xFF as f32 / 255.0, 0x00 as f32 / 255.0);

pub fn heater_color(heater: HeaterState) -> Color {
    match heater {
        HeaterState::On => HEATER_ON_COLOR,
        HeaterState::Off => HEATER_OFF_COLOR,
    }
}

pub struct CardStyleSheet {
    pub background: Color,
}

impl StyleSheet for CardStyleSheet {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> Appearance {
        Appearance {
            text_color: Some(Color::WHITE),
            background: Some(Background::Color(self.background)),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 10.0.into(),
            },
            shadow: Shadow::default(),
        }
    }
}

pub struct LogStyleSheet;

impl StyleSheet for LogStyleSheet {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> Appearance {
        Appearance {
            text_color: Some(LOG_TEXT_COLOR),
            background: Some(Background::Color(LOG_BACKGROUND_COLOR)),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 0.0.into(),
            },
            shadow: Shadow::default(),
        }
    }
}
