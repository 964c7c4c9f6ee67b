use std::f32::consts::FRAC_PI_2;

use macroquad::prelude::*;

use projectile_lab::core::canvas::{Canvas, Rgba};
use projectile_lab::core::chart::PixelBuffer;

use crate::constants::{CHART_BACKDROP, CHART_FRAME, CHART_LABEL, CHART_MARGIN};

fn to_color(c: Rgba) -> Color {
    Color::from_rgba(c.r, c.g, c.b, c.a)
}

pub(crate) fn draw_ui_text(text: &str, x: f32, y: f32, font_size: u16, color: Color, rotation: f32) {
    draw_text_ex(
        text,
        x,
        y,
        TextParams {
            font_size,
            color,
            rotation,
            ..Default::default()
        },
    );
}

/// Draws lab scenes straight to the macroquad screen. The lab thinks in
/// device pixels; macroquad's default camera works in logical ones.
pub(crate) struct MacroquadCanvas {
    dpr: f32,
}

impl MacroquadCanvas {
    pub(crate) fn new(device_pixel_ratio: f64) -> Self {
        Self {
            dpr: (device_pixel_ratio as f32).max(1.0),
        }
    }

    fn p(&self, point: (f64, f64)) -> (f32, f32) {
        (point.0 as f32 / self.dpr, point.1 as f32 / self.dpr)
    }

    fn len(&self, value: f64) -> f32 {
        value as f32 / self.dpr
    }
}

impl Canvas for MacroquadCanvas {
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let (x, y) = self.p((x, y));
        draw_rectangle(x, y, self.len(w), self.len(h), to_color(color));
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64, color: Rgba) {
        let (x1, y1) = self.p(from);
        let (x2, y2) = self.p(to);
        draw_line(x1, y1, x2, y2, self.len(thickness).max(1.0), to_color(color));
    }

    fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Rgba) {
        let (x, y) = self.p(center);
        draw_circle(x, y, self.len(radius), to_color(color));
    }

    fn stroke_circle(&mut self, center: (f64, f64), radius: f64, thickness: f64, color: Rgba) {
        let (x, y) = self.p(center);
        draw_circle_lines(x, y, self.len(radius), self.len(thickness).max(1.0), to_color(color));
    }

    fn text(&mut self, text: &str, baseline: (f64, f64), size_px: f64, rotated: bool, color: Rgba) {
        let (x, y) = self.p(baseline);
        let rotation = if rotated { -FRAC_PI_2 } else { 0.0 };
        draw_ui_text(text, x, y, self.len(size_px).round() as u16, to_color(color), rotation);
    }
}

/// GPU copy of the strip chart, refreshed from the pixel buffer each frame.
pub(crate) struct ChartView {
    texture: Texture2D,
}

impl ChartView {
    pub(crate) fn new(buffer: &PixelBuffer) -> Self {
        let texture = Texture2D::from_rgba8(buffer.width() as u16, buffer.height() as u16, buffer.as_bytes());
        texture.set_filter(FilterMode::Nearest);
        Self { texture }
    }

    pub(crate) fn upload(&self, buffer: &PixelBuffer) {
        self.texture
            .update_from_bytes(buffer.width() as u32, buffer.height() as u32, buffer.as_bytes());
    }

    /// Bottom-right corner of the screen, with a backdrop and caption.
    pub(crate) fn draw(&self, screen_w: f32, screen_h: f32) {
        let w = self.texture.width();
        let h = self.texture.height();
        let x = screen_w - w - CHART_MARGIN;
        let y = screen_h - h - CHART_MARGIN;

        draw_rectangle(x, y, w, h, CHART_BACKDROP);
        draw_texture(&self.texture, x, y, WHITE);
        draw_rectangle_lines(x, y, w, h, 1.0, CHART_FRAME);
        draw_ui_text("Kinetic energy", x, y - 6.0, 16, CHART_LABEL, 0.0);
    }
}
