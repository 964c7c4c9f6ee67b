use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use crate::core::canvas::{Canvas, Rgba};
use crate::core::render::{Scene, draw_scene};
use crate::error::SnapshotError;

pub const THUMBNAIL_WIDTH: u32 = 320;
pub const THUMBNAIL_HEIGHT: u32 = 160;

const FONT_FAMILY: &str = "sans-serif";

/// Packed RGB8 raster, row-major, no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterSnapshot {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterSnapshot {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }
}

fn to_plotters(color: Rgba) -> RGBAColor {
    RGBAColor(color.r, color.g, color.b, color.a as f64 / 255.0)
}

fn to_px(point: (f64, f64)) -> (i32, i32) {
    (point.0.round() as i32, point.1.round() as i32)
}

/// `Canvas` over any plotters drawing area. The first drawing error is kept
/// and surfaced by `finish`; text failures (usually a missing system font)
/// only drop the label.
pub struct PlottersCanvas<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    error: Option<String>,
}

impl<'a, DB: DrawingBackend> PlottersCanvas<'a, DB> {
    pub fn new(area: &'a DrawingArea<DB, Shift>) -> Self {
        Self { area, error: None }
    }

    fn record<E: std::fmt::Display>(&mut self, result: Result<(), E>) {
        if let Err(err) = result {
            self.error.get_or_insert_with(|| err.to_string());
        }
    }

    pub fn finish(self) -> Result<(), SnapshotError> {
        match self.error {
            Some(msg) => Err(SnapshotError::Draw(msg)),
            None => Ok(()),
        }
    }
}

impl<DB: DrawingBackend> Canvas for PlottersCanvas<'_, DB> {
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let corners = [to_px((x, y)), to_px((x + w, y + h))];
        let result = self
            .area
            .draw(&Rectangle::new(corners, to_plotters(color).filled()));
        self.record(result);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64, color: Rgba) {
        let style = to_plotters(color).stroke_width(thickness.round().max(1.0) as u32);
        let result = self
            .area
            .draw(&PathElement::new(vec![to_px(from), to_px(to)], style));
        self.record(result);
    }

    fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Rgba) {
        let result = self.area.draw(&Circle::new(
            to_px(center),
            radius.round().max(1.0) as i32,
            to_plotters(color).filled(),
        ));
        self.record(result);
    }

    fn stroke_circle(&mut self, center: (f64, f64), radius: f64, thickness: f64, color: Rgba) {
        let style = to_plotters(color).stroke_width(thickness.round().max(1.0) as u32);
        let result = self
            .area
            .draw(&Circle::new(to_px(center), radius.round().max(1.0) as i32, style));
        self.record(result);
    }

    fn text(&mut self, text: &str, baseline: (f64, f64), size_px: f64, rotated: bool, color: Rgba) {
        let mut font = (FONT_FAMILY, size_px).into_font();
        if rotated {
            font = font.transform(FontTransform::Rotate270);
        }
        let style = font
            .color(&to_plotters(color))
            .pos(Pos::new(HPos::Left, VPos::Bottom));
        if let Err(err) = self
            .area
            .draw(&Text::new(text.to_string(), to_px(baseline), style))
        {
            debug!("skipping label {text:?}: {err}");
        }
    }
}

fn draw_into<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene<'_>,
    draw_text: bool,
) -> Result<(), SnapshotError> {
    let mut canvas = PlottersCanvas::new(root);
    draw_scene(&mut canvas, scene, draw_text);
    canvas.finish()?;
    root.present()
        .map_err(|err| SnapshotError::Draw(err.to_string()))
}

/// Rasterizes a scene into memory without text. The scene's viewport should
/// already be fitted to `width × height`.
pub fn render_rgb(scene: &Scene<'_>, width: u32, height: u32) -> Result<RasterSnapshot, SnapshotError> {
    if width == 0 || height == 0 {
        return Err(SnapshotError::EmptySize { width, height });
    }
    let mut rgb = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        draw_into(&root, scene, false)?;
    }
    Ok(RasterSnapshot { width, height, rgb })
}

/// Writes the scene, labels included, to an image file (format from the
/// extension).
pub fn export_image(path: &Path, scene: &Scene<'_>, width: u32, height: u32) -> Result<(), SnapshotError> {
    if width == 0 || height == 0 {
        return Err(SnapshotError::EmptySize { width, height });
    }
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    draw_into(&root, scene, true)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use super::*;
    use crate::core::ballistics::{PREDICTION_SAMPLES, predict_path};
    use crate::core::window::{CanvasSize, Margins, ViewportTransform};

    #[test]
    fn thumbnail_has_requested_size_and_shows_the_trail() {
        let predicted = predict_path(20.0, FRAC_PI_4, 9.81, PREDICTION_SAMPLES);
        let traveled = predicted[..120].to_vec();
        let viewport = ViewportTransform::fit(
            &predicted,
            CanvasSize::exact(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT),
            Margins::default().scaled(0.4),
        );
        let scene = Scene {
            viewport,
            predicted: &predicted,
            traveled: &traveled,
            readouts: &[],
        };

        let snapshot = render_rgb(&scene, THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT).unwrap();
        assert_eq!(snapshot.rgb.len(), (THUMBNAIL_WIDTH * THUMBNAIL_HEIGHT * 3) as usize);

        let (mx, my) = viewport.world_to_canvas(*traveled.last().unwrap());
        let marker = snapshot.pixel(mx.round() as u32, my.round() as u32).unwrap();
        let corner = snapshot.pixel(1, 1).unwrap();
        assert_ne!(marker, corner);
        assert!(marker[2] > 150, "marker pixel {marker:?} should be light blue");
    }

    #[test]
    fn empty_size_is_rejected() {
        let viewport = ViewportTransform::fit(&[], CanvasSize::exact(10, 10), Margins::default());
        let scene = Scene {
            viewport,
            predicted: &[],
            traveled: &[],
            readouts: &[],
        };
        assert!(matches!(
            render_rgb(&scene, 0, 10),
            Err(SnapshotError::EmptySize { width: 0, height: 10 })
        ));
    }
}
