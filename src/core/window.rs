use serde::{Deserialize, Serialize};

use crate::core::ballistics::WorldPoint;

pub const MIN_LOGICAL_WIDTH: f64 = 320.0;
pub const MIN_LOGICAL_HEIGHT: f64 = 240.0;

/// Floor for pixels-per-meter; keeps huge launches drawable without ever
/// collapsing the transform to zero.
pub const MIN_SCALE: f64 = 1e-3;

const X_PADDING_RATIO: f64 = 0.05;
const Y_PADDING_RATIO: f64 = 0.30;
const MIN_PADDING_M: f64 = 5.0;
const MIN_USABLE_PX: f64 = 10.0;
const MIN_EXTENT_M: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            left: self.left * factor,
            right: self.right * factor,
            top: self.top * factor,
            bottom: self.bottom * factor,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 60.0,
            right: 40.0,
            top: 40.0,
            bottom: 70.0,
        }
    }
}

/// Drawing surface size. Logical size comes from the host window; the
/// device-pixel size is what every transform works in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub logical_width: f64,
    pub logical_height: f64,
    pub device_pixel_ratio: f64,
}

impl CanvasSize {
    pub fn new(logical_width: f64, logical_height: f64, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() {
            device_pixel_ratio.max(1.0)
        } else {
            1.0
        };
        Self {
            logical_width: finite_or(logical_width, MIN_LOGICAL_WIDTH).max(MIN_LOGICAL_WIDTH).floor(),
            logical_height: finite_or(logical_height, MIN_LOGICAL_HEIGHT).max(MIN_LOGICAL_HEIGHT).floor(),
            device_pixel_ratio: dpr,
        }
    }

    /// Offscreen surface of exactly `width × height` device pixels, skipping
    /// the on-screen minimum.
    pub fn exact(width: u32, height: u32) -> Self {
        Self {
            logical_width: width.max(1) as f64,
            logical_height: height.max(1) as f64,
            device_pixel_ratio: 1.0,
        }
    }

    pub fn width(&self) -> f64 {
        (self.logical_width * self.device_pixel_ratio).floor()
    }

    pub fn height(&self) -> f64 {
        (self.logical_height * self.device_pixel_ratio).floor()
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Bounding extent of a sampled path: (max x, max y), never negative.
pub fn path_extent(path: &[WorldPoint]) -> (f64, f64) {
    path.iter()
        .fold((0.0f64, 0.0f64), |(max_x, max_y), &(x, y)| {
            (max_x.max(x), max_y.max(y))
        })
}

/// Pixels per meter that fit the whole path plus a proportional world margin
/// inside the canvas on both axes.
pub fn compute_scale(path: &[WorldPoint], canvas: CanvasSize, margins: Margins) -> f64 {
    let (range_m, height_m) = path_extent(path);
    let usable_w = (canvas.width() - margins.left - margins.right).max(MIN_USABLE_PX);
    let usable_h = (canvas.height() - margins.top - margins.bottom).max(MIN_USABLE_PX);

    let pad_x = (range_m * X_PADDING_RATIO).max(MIN_PADDING_M);
    let pad_y = (height_m * Y_PADDING_RATIO).max(MIN_PADDING_M);

    let scale_x = usable_w / (range_m + pad_x).max(MIN_EXTENT_M);
    let scale_y = usable_h / (height_m + pad_y).max(MIN_EXTENT_M);
    let scale = scale_x.min(scale_y);
    if scale.is_finite() {
        scale.max(MIN_SCALE)
    } else {
        MIN_SCALE
    }
}

pub fn world_to_canvas(x: f64, y: f64, scale: f64, margins: Margins, canvas_height: f64) -> (f64, f64) {
    let px = margins.left + x * scale;
    let py = canvas_height - margins.bottom - y * scale;
    (px, py)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub margins: Margins,
    pub canvas: CanvasSize,
}

impl ViewportTransform {
    pub fn fit(path: &[WorldPoint], canvas: CanvasSize, margins: Margins) -> Self {
        Self {
            scale: compute_scale(path, canvas, margins),
            margins,
            canvas,
        }
    }

    pub fn world_to_canvas(&self, point: WorldPoint) -> (f64, f64) {
        world_to_canvas(point.0, point.1, self.scale, self.margins, self.canvas.height())
    }

    /// Canvas y of the ground line (world y = 0).
    pub fn ground_y(&self) -> f64 {
        self.canvas.height() - self.margins.bottom
    }

    pub fn plot_right(&self) -> f64 {
        self.canvas.width() - self.margins.right
    }

    pub fn plot_top(&self) -> f64 {
        self.margins.top
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use super::*;
    use crate::core::ballistics::{PREDICTION_SAMPLES, predict_path};

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "actual={actual}, expected={expected}, tolerance={tolerance}"
        );
    }

    #[test]
    fn origin_maps_to_bottom_left_margin_for_any_scale() {
        let margins = Margins::default();
        for scale in [MIN_SCALE, 0.5, 3.0, 250.0] {
            let (px, py) = world_to_canvas(0.0, 0.0, scale, margins, 720.0);
            assert_close(px, margins.left, 1e-12);
            assert_close(py, 720.0 - margins.bottom, 1e-12);
        }
    }

    #[test]
    fn world_up_is_screen_up() {
        let (_, low) = world_to_canvas(0.0, 1.0, 4.0, Margins::default(), 600.0);
        let (_, high) = world_to_canvas(0.0, 2.0, 4.0, Margins::default(), 600.0);
        assert!(high < low);
    }

    #[test]
    fn canvas_size_clamps_and_applies_pixel_ratio() {
        let canvas = CanvasSize::new(100.0, 900.5, 2.0);
        assert_close(canvas.width(), 640.0, 1e-12);
        assert_close(canvas.height(), 1800.0, 1e-12);

        let odd = CanvasSize::new(f64::NAN, 400.0, f64::INFINITY);
        assert_close(odd.width(), MIN_LOGICAL_WIDTH, 1e-12);
        assert_close(odd.device_pixel_ratio, 1.0, 1e-12);
    }

    #[test]
    fn scale_is_positive_for_degenerate_paths() {
        let canvas = CanvasSize::new(800.0, 600.0, 1.0);
        assert!(compute_scale(&[], canvas, Margins::default()) > 0.0);
        assert!(compute_scale(&[(0.0, 0.0)], canvas, Margins::default()) > 0.0);
    }

    #[test]
    fn scale_uses_the_tighter_axis() {
        let canvas = CanvasSize::new(1000.0, 400.0, 1.0);
        let margins = Margins::default();
        let path = predict_path(20.0, FRAC_PI_4, 9.81, PREDICTION_SAMPLES);
        let (range_m, height_m) = path_extent(&path);
        let scale = compute_scale(&path, canvas, margins);

        let sx = (1000.0 - 100.0) / (range_m + (range_m * 0.05).max(5.0));
        let sy = (400.0 - 110.0) / (height_m + (height_m * 0.3).max(5.0));
        assert_close(scale, sx.min(sy), 1e-9);
    }

    #[test]
    fn predicted_path_never_leaves_the_canvas() {
        let launches = [
            (20.0, 45.0, 9.81),
            (80.0, 89.9, 9.81),
            (80.0, 0.2, 9.81),
            (300.0, 30.0, 0.62),
            (5.0, 60.0, 24.79),
            (1.0, 10.0, 1.62),
        ];
        let sizes = [(320.0, 240.0, 1.0), (1920.0, 1080.0, 2.0), (400.0, 1200.0, 1.5)];

        for (speed, deg, gravity) in launches {
            let path = predict_path(speed, f64::to_radians(deg), gravity, PREDICTION_SAMPLES);
            for (w, h, dpr) in sizes {
                let canvas = CanvasSize::new(w, h, dpr);
                let viewport = ViewportTransform::fit(&path, canvas, Margins::default());
                for &point in &path {
                    let (px, py) = viewport.world_to_canvas(point);
                    assert!(
                        (0.0..=canvas.width()).contains(&px) && (0.0..=canvas.height()).contains(&py),
                        "{point:?} -> ({px}, {py}) outside {w}x{h}@{dpr} for v={speed} deg={deg} g={gravity}"
                    );
                    assert!(px <= viewport.plot_right() + 1e-9);
                    assert!(py >= viewport.plot_top() - 1e-9);
                }
            }
        }
    }
}
