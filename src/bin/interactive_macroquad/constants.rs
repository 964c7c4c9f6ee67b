use macroquad::prelude::Color;

pub const PANEL_X: f32 = 18.0;
pub const PANEL_Y: f32 = 18.0;
pub const PANEL_W: f32 = 340.0;
pub const PANEL_H: f32 = 470.0;

pub const ANGLE_RANGE_DEG: std::ops::Range<f32> = 1.0..90.0;
pub const SPEED_RANGE_MPS: std::ops::Range<f32> = 1.0..120.0;
pub const MASS_RANGE_KG: std::ops::Range<f32> = 0.1..50.0;

pub const CUSTOM_GRAVITY_LABEL: &str = "Custom";

pub const CHART_MARGIN: f32 = 18.0;
pub const CHART_FRAME: Color = Color::new(1.0, 1.0, 1.0, 0.25);
pub const CHART_BACKDROP: Color = Color::new(0.04, 0.06, 0.12, 0.85);
pub const CHART_LABEL: Color = Color::new(1.0, 1.0, 1.0, 0.6);
