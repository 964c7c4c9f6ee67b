use crate::core::ballistics::WorldPoint;
use crate::core::canvas::{Canvas, Rgba};
use crate::core::window::ViewportTransform;

const SKY_TOP: Rgba = Rgba::opaque(13, 22, 50);
const SKY_BOTTOM: Rgba = Rgba::opaque(11, 16, 32);
const SKY_BANDS: usize = 24;
const GROUND_FILL: Rgba = Rgba::opaque(26, 42, 62);
const GROUND_LINE: Rgba = Rgba::new(255, 255, 255, 31);
const GRID_LINE: Rgba = Rgba::new(255, 255, 255, 15);
const PREDICTED_LINE: Rgba = Rgba::new(255, 255, 255, 89);
const TRAVELED_TOP: Rgba = Rgba::opaque(106, 166, 255);
const TRAVELED_BOTTOM: Rgba = Rgba::opaque(74, 139, 243);
const MARKER_GLOW: Rgba = Rgba::new(106, 166, 255, 64);
const MARKER_FILL: Rgba = Rgba::opaque(173, 203, 255);
const MARKER_EDGE: Rgba = Rgba::new(0, 0, 0, 64);
const LABEL_COLOR: Rgba = Rgba::new(255, 255, 255, 153);
const READOUT_COLOR: Rgba = Rgba::new(230, 233, 240, 200);

const PREDICTED_DASH_PX: f64 = 8.0;
const PREDICTED_GAP_PX: f64 = 6.0;
const PREDICTED_WIDTH_PX: f64 = 2.0;
const TRAVELED_WIDTH_PX: f64 = 3.0;
const MARKER_RADIUS_PX: f64 = 8.0;

/// Everything one frame needs. Nothing is retained between draws.
pub struct Scene<'a> {
    pub viewport: ViewportTransform,
    pub predicted: &'a [WorldPoint],
    pub traveled: &'a [WorldPoint],
    pub readouts: &'a [String],
}

/// Full redraw: background, grid, predicted path, traveled path, marker,
/// then text. Thumbnails pass `draw_text = false`.
pub fn draw_scene(canvas: &mut impl Canvas, scene: &Scene<'_>, draw_text: bool) {
    let viewport = &scene.viewport;
    draw_background(canvas, viewport);
    draw_grid(canvas, viewport);
    draw_predicted_path(canvas, viewport, scene.predicted);
    draw_traveled_path(canvas, viewport, scene.traveled);
    if let Some(&last) = scene.traveled.last() {
        draw_marker(canvas, viewport, last);
    }
    if draw_text {
        draw_hud(canvas, viewport, scene.readouts);
    }
}

pub fn draw_background(canvas: &mut impl Canvas, viewport: &ViewportTransform) {
    let width = viewport.canvas.width();
    let height = viewport.canvas.height();

    let band_h = height / SKY_BANDS as f64;
    for i in 0..SKY_BANDS {
        let t = i as f64 / (SKY_BANDS - 1) as f64;
        canvas.fill_rect(0.0, i as f64 * band_h, width, band_h, SKY_TOP.lerp(SKY_BOTTOM, t));
    }

    let ground_y = viewport.ground_y();
    canvas.fill_rect(0.0, ground_y, width, height - ground_y, GROUND_FILL);
    canvas.line((0.0, ground_y + 0.5), (width, ground_y + 0.5), 2.0, GROUND_LINE);
}

/// Major grid spacing in meters (horizontal, vertical). Coarser as the scale
/// shrinks so on-screen density stays roughly constant.
pub fn grid_spacing(scale: f64) -> (f64, f64) {
    let x = (100.0 / scale).round().max(5.0);
    let y = (60.0 / scale).round().max(2.0);
    (x, y)
}

pub fn draw_grid(canvas: &mut impl Canvas, viewport: &ViewportTransform) {
    let (step_x, step_y) = grid_spacing(viewport.scale);
    let left = viewport.margins.left;
    let right = viewport.plot_right();
    let top = viewport.plot_top();
    let ground_y = viewport.ground_y();

    let mut k = 0u32;
    loop {
        let (px, _) = viewport.world_to_canvas((k as f64 * step_x, 0.0));
        if px > right {
            break;
        }
        let x = px.floor() + 0.5;
        canvas.line((x, top), (x, ground_y), 1.0, GRID_LINE);
        k += 1;
    }

    let mut k = 0u32;
    loop {
        let (_, py) = viewport.world_to_canvas((0.0, k as f64 * step_y));
        if py < top {
            break;
        }
        let y = py.floor() + 0.5;
        canvas.line((left, y), (right, y), 1.0, GRID_LINE);
        k += 1;
    }
}

pub fn draw_predicted_path(canvas: &mut impl Canvas, viewport: &ViewportTransform, path: &[WorldPoint]) {
    if path.len() < 2 {
        return;
    }
    let points: Vec<(f64, f64)> = path.iter().map(|&p| viewport.world_to_canvas(p)).collect();
    for (from, to) in dash_segments(&points, PREDICTED_DASH_PX, PREDICTED_GAP_PX) {
        canvas.line(from, to, PREDICTED_WIDTH_PX, PREDICTED_LINE);
    }
}

pub fn draw_traveled_path(canvas: &mut impl Canvas, viewport: &ViewportTransform, path: &[WorldPoint]) {
    if path.len() < 2 {
        return;
    }
    let height = viewport.canvas.height().max(1.0);
    let mut prev = viewport.world_to_canvas(path[0]);
    for &point in &path[1..] {
        let cur = viewport.world_to_canvas(point);
        // vertical gradient keyed on the segment midpoint
        let t = ((prev.1 + cur.1) * 0.5) / height;
        canvas.line(prev, cur, TRAVELED_WIDTH_PX, TRAVELED_TOP.lerp(TRAVELED_BOTTOM, t));
        prev = cur;
    }
}

pub fn draw_marker(canvas: &mut impl Canvas, viewport: &ViewportTransform, position: WorldPoint) {
    let center = viewport.world_to_canvas(position);
    canvas.fill_circle(center, MARKER_RADIUS_PX * 1.8, MARKER_GLOW);
    canvas.fill_circle(center, MARKER_RADIUS_PX, MARKER_FILL);
    canvas.stroke_circle(center, MARKER_RADIUS_PX, 1.0, MARKER_EDGE);
}

pub fn draw_hud(canvas: &mut impl Canvas, viewport: &ViewportTransform, readouts: &[String]) {
    let dpr = viewport.canvas.device_pixel_ratio;
    let ground_y = viewport.ground_y();
    let label_px = 14.0 * dpr;

    canvas.text(
        "Distance (m)",
        (viewport.margins.left, ground_y + 24.0 * dpr),
        label_px,
        false,
        LABEL_COLOR,
    );
    canvas.text("Height (m)", (18.0 * dpr, ground_y - 10.0 * dpr), label_px, true, LABEL_COLOR);

    let line_px = 13.0 * dpr;
    let x = viewport.margins.left + 8.0 * dpr;
    for (i, line) in readouts.iter().enumerate() {
        let y = viewport.plot_top() + (i as f64 + 1.0) * (line_px + 4.0 * dpr);
        canvas.text(line, (x, y), line_px, false, READOUT_COLOR);
    }
}

/// Splits a canvas-space polyline into dash pieces of `dash` px separated by
/// `gap` px. The dash phase carries across vertices.
pub fn dash_segments(points: &[(f64, f64)], dash: f64, gap: f64) -> Vec<((f64, f64), (f64, f64))> {
    let mut out = Vec::new();
    if points.len() < 2 || !(dash > 0.0) {
        return out;
    }
    let period = dash + gap.max(0.0);
    let mut phase = 0.0;

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        if !(len > 0.0) || !len.is_finite() {
            continue;
        }
        let at = |d: f64| (a.0 + (b.0 - a.0) * d / len, a.1 + (b.1 - a.1) * d / len);

        let mut walked = 0.0;
        while walked < len {
            let in_dash = phase < dash;
            let boundary = if in_dash { dash } else { period };
            let step = (boundary - phase).min(len - walked);
            if in_dash {
                out.push((at(walked), at(walked + step)));
            }
            walked += step;
            phase += step;
            if phase >= period {
                phase = 0.0;
            }
        }
    }
    out
}
