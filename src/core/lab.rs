use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::core::ballistics::{
    Analytics, GravitySetting, LaunchParams, PREDICTION_SAMPLES, WorldPoint, compute_analytics, kinetic_energy,
    predict_path,
};
use crate::core::canvas::Canvas;
use crate::core::chart::StripChart;
use crate::core::driver::{AnimationDriver, FrameEvent, FrameScheduler, MAX_FRAME_DT_S, RunPhase};
use crate::core::render::{Scene, draw_scene};
use crate::core::snapshot::{RasterSnapshot, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH, render_rgb};
use crate::core::store::SaveRequest;
use crate::core::window::{CanvasSize, Margins, ViewportTransform};
use crate::error::LaunchError;

pub const SAVE_TOPIC: &str = "Projectile Motion";
const MISSING: &str = "—";

/// Raw control values as the UI layer holds them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UiInputs {
    pub angle_deg: f64,
    pub speed_mps: f64,
    pub mass_kg: f64,
    pub gravity: GravitySetting,
}

impl UiInputs {
    pub fn to_params(&self) -> LaunchParams {
        LaunchParams::from_degrees(self.angle_deg, self.speed_mps, self.mass_kg, self.gravity.resolve())
    }
}

impl Default for UiInputs {
    fn default() -> Self {
        Self {
            angle_deg: 45.0,
            speed_mps: 20.0,
            mass_kg: 1.0,
            gravity: GravitySetting::default(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LabSettings {
    pub margins: Margins,
    pub sample_count: usize,
    pub max_frame_dt_s: f64,
    pub chart_width: usize,
    pub chart_height: usize,
    pub chart_step_px: usize,
}

impl LabSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            margins: cfg.canvas.margins,
            sample_count: cfg.simulation.sample_count,
            max_frame_dt_s: cfg.simulation.max_frame_dt_s,
            chart_width: cfg.chart.width,
            chart_height: cfg.chart.height,
            chart_step_px: cfg.chart.step_px,
        }
    }
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            sample_count: PREDICTION_SAMPLES,
            max_frame_dt_s: MAX_FRAME_DT_S,
            chart_width: 360,
            chart_height: 120,
            chart_step_px: 2,
        }
    }
}

/// Formatted readout strings handed back to the UI layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Readouts {
    pub time_of_flight: String,
    pub max_height: String,
    pub range: String,
    pub gravity: String,
    pub kinetic_energy: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlState {
    pub launch_enabled: bool,
    pub pause_enabled: bool,
    pub reset_enabled: bool,
    pub pause_label: &'static str,
}

fn format_num(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        MISSING.to_string()
    }
}

/// Everything behind one simulation view: parameters, preview, viewport,
/// the animation driver and the energy chart.
pub struct Lab {
    settings: LabSettings,
    inputs: UiInputs,
    params: LaunchParams,
    canvas: CanvasSize,
    predicted: Vec<WorldPoint>,
    viewport: ViewportTransform,
    driver: AnimationDriver,
    chart: StripChart,
    kinetic_energy_j: Option<f64>,
}

impl Lab {
    pub fn new(settings: LabSettings, inputs: UiInputs, canvas: CanvasSize) -> Self {
        let params = inputs.to_params();
        let mut lab = Self {
            settings,
            inputs,
            params,
            canvas,
            predicted: Vec::new(),
            viewport: ViewportTransform::fit(&[], canvas, settings.margins),
            driver: AnimationDriver::new(settings.max_frame_dt_s),
            chart: StripChart::new(settings.chart_width, settings.chart_height, settings.chart_step_px),
            kinetic_energy_j: None,
        };
        lab.refresh_preview();
        lab
    }

    pub fn params(&self) -> LaunchParams {
        self.params
    }

    pub fn phase(&self) -> RunPhase {
        self.driver.phase()
    }

    pub fn viewport(&self) -> ViewportTransform {
        self.viewport
    }

    pub fn predicted(&self) -> &[WorldPoint] {
        &self.predicted
    }

    pub fn traveled(&self) -> &[WorldPoint] {
        self.driver.traveled()
    }

    pub fn chart(&self) -> &StripChart {
        &self.chart
    }

    /// New control values. The live position always follows them; the preview
    /// and scale stay frozen until the active run ends.
    pub fn set_params(&mut self, inputs: UiInputs) {
        if inputs == self.inputs {
            return;
        }
        self.inputs = inputs;
        self.params = inputs.to_params();
        if !self.driver.state().is_active() {
            self.refresh_preview();
        }
    }

    pub fn resize(&mut self, canvas: CanvasSize) {
        if canvas == self.canvas {
            return;
        }
        debug!(width = canvas.width(), height = canvas.height(), "canvas resized");
        self.canvas = canvas;
        self.refit();
    }

    fn refresh_preview(&mut self) {
        self.predicted = if self.params.is_valid() {
            predict_path(
                self.params.speed_mps,
                self.params.angle_rad,
                self.params.gravity_mps2,
                self.settings.sample_count,
            )
        } else {
            Vec::new()
        };
        self.refit();
    }

    fn refit(&mut self) {
        self.viewport = ViewportTransform::fit(&self.predicted, self.canvas, self.settings.margins);
        debug!(scale = self.viewport.scale, points = self.predicted.len(), "viewport fitted");
    }

    pub fn launch(&mut self, scheduler: &mut impl FrameScheduler) -> Result<(), LaunchError> {
        if let Err(err) = self.driver.launch(&self.params, scheduler) {
            debug!("{err}");
            return Err(err);
        }
        self.refresh_preview();
        let energy = kinetic_energy(self.params.mass_kg, self.params.velocity_components());
        self.chart.clear();
        self.chart.set_full_scale(energy);
        self.kinetic_energy_j = Some(energy);
        Ok(())
    }

    pub fn frame(&mut self, timestamp_s: f64, scheduler: &mut impl FrameScheduler) -> FrameEvent {
        let event = self.driver.frame(timestamp_s, &self.params, scheduler);
        if let FrameEvent::Advanced(sample) = event {
            let energy = kinetic_energy(self.params.mass_kg, sample.velocity);
            self.kinetic_energy_j = Some(energy);
            self.chart.push(energy);
        }
        event
    }

    pub fn toggle_pause(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        self.driver.toggle_pause(scheduler)
    }

    pub fn reset(&mut self, scheduler: &mut impl FrameScheduler) {
        self.driver.reset(scheduler);
        self.chart.clear();
        self.kinetic_energy_j = None;
        self.refresh_preview();
    }

    /// Closed-form results for the current parameters; `None` when they
    /// cannot be computed.
    pub fn analytics(&self) -> Option<Analytics> {
        if !self.params.is_valid() {
            return None;
        }
        let analytics = compute_analytics(self.params.speed_mps, self.params.angle_rad, self.params.gravity_mps2);
        analytics.is_valid().then_some(analytics)
    }

    pub fn readouts(&self) -> Readouts {
        let (time_of_flight, max_height, range) = match self.analytics() {
            Some(a) => (
                format_num(a.time_of_flight_s, 2),
                format_num(a.max_height_m, 2),
                format_num(a.range_m, 2),
            ),
            None => (MISSING.to_string(), MISSING.to_string(), MISSING.to_string()),
        };
        let g = self.params.gravity_mps2;
        let gravity = if g.is_finite() && g > 0.0 {
            format_num(g, 2)
        } else {
            MISSING.to_string()
        };
        Readouts {
            time_of_flight,
            max_height,
            range,
            gravity,
            kinetic_energy: self.kinetic_energy_j.map_or_else(|| MISSING.to_string(), |e| format_num(e, 1)),
        }
    }

    /// HUD lines drawn in the top-left of the plot.
    pub fn readout_lines(&self) -> Vec<String> {
        let r = self.readouts();
        vec![
            format!("Time of flight: {} s", r.time_of_flight),
            format!("Max height: {} m", r.max_height),
            format!("Range: {} m", r.range),
            format!("Gravity: {} m/s² ({})", r.gravity, self.inputs.gravity.label()),
            format!("Kinetic energy: {} J", r.kinetic_energy),
        ]
    }

    pub fn controls(&self) -> ControlState {
        let phase = self.driver.phase();
        ControlState {
            launch_enabled: matches!(phase, RunPhase::Idle | RunPhase::Landed),
            pause_enabled: matches!(phase, RunPhase::Running | RunPhase::Paused),
            reset_enabled: !(phase == RunPhase::Idle && self.driver.traveled().is_empty()),
            pause_label: if phase == RunPhase::Paused { "Resume" } else { "Pause" },
        }
    }

    /// Full redraw of the trajectory view, HUD included.
    pub fn render(&self, canvas: &mut impl Canvas) {
        let readouts = self.readout_lines();
        let scene = Scene {
            viewport: self.viewport,
            predicted: &self.predicted,
            traveled: self.driver.traveled(),
            readouts: &readouts,
        };
        draw_scene(canvas, &scene, true);
    }

    /// Current view refitted to a small offscreen raster, margins shrunk in
    /// proportion.
    pub fn thumbnail(&self, width: u32, height: u32) -> Result<RasterSnapshot, crate::error::SnapshotError> {
        let size = CanvasSize::exact(width, height);
        let factor = (size.width() / self.canvas.width()).min(1.0);
        let viewport = ViewportTransform::fit(&self.predicted, size, self.settings.margins.scaled(factor));
        let scene = Scene {
            viewport,
            predicted: &self.predicted,
            traveled: self.driver.traveled(),
            readouts: &[],
        };
        render_rgb(&scene, width, height)
    }

    /// Query-string style reference that reopens this configuration.
    pub fn resume_ref(&self) -> String {
        let mut out = format!(
            "projectile?angle={:.1}&speed={:.2}&mass={:.2}&gravity={:.2}",
            self.inputs.angle_deg,
            self.inputs.speed_mps,
            self.inputs.mass_kg,
            self.params.gravity_mps2
        );
        if let GravitySetting::Preset(planet) = self.inputs.gravity {
            out.push_str("&planet=");
            out.push_str(&planet.name().to_ascii_lowercase());
        }
        out
    }

    /// Payload for a session store. A failed thumbnail drops the image, not
    /// the save.
    pub fn save_request(&self, title: &str) -> SaveRequest {
        let snapshot = match self.thumbnail(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!("thumbnail skipped: {err}");
                None
            }
        };
        let results = compute_analytics(self.params.speed_mps, self.params.angle_rad, self.params.gravity_mps2);
        SaveRequest {
            title: title.to_string(),
            topic: SAVE_TOPIC.to_string(),
            params: self.params,
            gravity_label: self.inputs.gravity.label(),
            results,
            snapshot,
            resume_ref: self.resume_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ballistics::Planet;
    use crate::core::canvas::recording::RecordingCanvas;
    use crate::core::driver::manual::ManualScheduler;

    fn lab() -> Lab {
        Lab::new(LabSettings::default(), UiInputs::default(), CanvasSize::new(1280.0, 720.0, 1.0))
    }

    fn run_to_landing(lab: &mut Lab, sched: &mut ManualScheduler) {
        let mut ts = 0.0;
        while sched.take() {
            lab.frame(ts, sched);
            ts += 1.0 / 60.0;
        }
    }

    #[test]
    fn earth_launch_readouts() {
        let r = lab().readouts();
        assert_eq!(r.time_of_flight, "2.88");
        assert_eq!(r.max_height, "10.19");
        assert_eq!(r.range, "40.77");
        assert_eq!(r.gravity, "9.81");
        assert_eq!(r.kinetic_energy, "—");
    }

    #[test]
    fn bad_custom_gravity_blanks_readouts_and_blocks_launch() {
        let mut lab = lab();
        let mut sched = ManualScheduler::default();
        for g in [0.0, -3.0, f64::NAN] {
            lab.set_params(UiInputs {
                gravity: GravitySetting::Custom(g),
                ..UiInputs::default()
            });
            let r = lab.readouts();
            assert_eq!((r.time_of_flight.as_str(), r.range.as_str(), r.gravity.as_str()), ("—", "—", "—"));
            assert!(lab.predicted().is_empty());
            assert!(lab.launch(&mut sched).is_err());
            assert_eq!(lab.phase(), RunPhase::Idle);
        }
        assert_eq!(sched.requests, 0);
    }

    #[test]
    fn scale_is_frozen_while_running_and_refit_after_reset() {
        let mut lab = lab();
        let mut sched = ManualScheduler::default();
        lab.launch(&mut sched).unwrap();
        let frozen = lab.viewport().scale;
        let preview = lab.predicted().to_vec();

        lab.set_params(UiInputs {
            speed_mps: 60.0,
            ..UiInputs::default()
        });
        lab.frame(0.0, &mut sched);
        assert_eq!(lab.viewport().scale, frozen);
        assert_eq!(lab.predicted(), preview.as_slice());

        lab.reset(&mut sched);
        assert!(lab.viewport().scale < frozen, "faster launch needs a smaller scale");
        assert_ne!(lab.predicted(), preview.as_slice());
    }

    #[test]
    fn idle_parameter_changes_refit_the_preview() {
        let mut lab = lab();
        let before = lab.viewport().scale;
        let preview = lab.predicted().to_vec();

        lab.set_params(UiInputs {
            speed_mps: 60.0,
            ..UiInputs::default()
        });
        assert_eq!(lab.phase(), RunPhase::Idle);
        assert!(lab.viewport().scale < before, "longer flight needs a smaller scale");
        assert_ne!(lab.predicted(), preview.as_slice());

        lab.set_params(UiInputs::default());
        assert_eq!(lab.viewport().scale, before);
    }

    #[test]
    fn resize_refits_even_mid_run() {
        let mut lab = lab();
        let mut sched = ManualScheduler::default();
        lab.launch(&mut sched).unwrap();
        let before = lab.viewport().scale;
        lab.resize(CanvasSize::new(640.0, 360.0, 1.0));
        assert!(lab.viewport().scale < before);
    }

    #[test]
    fn controls_follow_the_run_phase() {
        let mut lab = lab();
        let mut sched = ManualScheduler::default();
        let idle = lab.controls();
        assert!(idle.launch_enabled && !idle.pause_enabled && !idle.reset_enabled);

        lab.launch(&mut sched).unwrap();
        let running = lab.controls();
        assert!(!running.launch_enabled && running.pause_enabled && running.reset_enabled);
        assert_eq!(running.pause_label, "Pause");

        lab.toggle_pause(&mut sched);
        assert_eq!(lab.controls().pause_label, "Resume");
        lab.toggle_pause(&mut sched);

        run_to_landing(&mut lab, &mut sched);
        let landed = lab.controls();
        assert_eq!(lab.phase(), RunPhase::Landed);
        assert!(landed.launch_enabled && !landed.pause_enabled && landed.reset_enabled);

        lab.reset(&mut sched);
        assert_eq!(lab.controls(), idle);
    }

    #[test]
    fn frames_feed_energy_readout_and_chart() {
        let mut lab = lab();
        let mut sched = ManualScheduler::default();
        lab.launch(&mut sched).unwrap();
        assert_eq!(lab.readouts().kinetic_energy, "200.0");

        for i in 0..30 {
            lab.frame(i as f64 / 60.0, &mut sched);
        }
        let energy: f64 = lab.readouts().kinetic_energy.parse().unwrap();
        assert!(energy < 200.0 && energy > 100.0, "energy {energy}");

        let buffer = lab.chart().buffer();
        let last_col = buffer.width() - 1;
        assert!((0..buffer.height()).any(|y| buffer.pixel(last_col, y) == Some(StripChart::TRACE_COLOR)));

        lab.reset(&mut sched);
        assert_eq!(lab.readouts().kinetic_energy, "—");
        assert!(lab.chart().buffer().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn render_draws_hud_readouts() {
        let lab = lab();
        let mut canvas = RecordingCanvas::default();
        lab.render(&mut canvas);
        let texts = canvas.texts();
        assert!(texts.contains(&"Range: 40.77 m"));
        assert!(texts.contains(&"Distance (m)"));
    }

    #[test]
    fn save_request_carries_thumbnail_and_resume_ref() {
        let mut lab = lab();
        lab.set_params(UiInputs {
            gravity: GravitySetting::Preset(Planet::Moon),
            ..UiInputs::default()
        });
        let req = lab.save_request("");
        assert_eq!(req.topic, SAVE_TOPIC);
        assert_eq!(req.display_title(), SAVE_TOPIC);
        assert_eq!(req.gravity_label, "Moon");
        assert_eq!(req.resume_ref, "projectile?angle=45.0&speed=20.00&mass=1.00&gravity=1.62&planet=moon");

        let thumb = req.snapshot.unwrap();
        assert_eq!((thumb.width, thumb.height), (THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT));

        lab.set_params(UiInputs {
            gravity: GravitySetting::Custom(5.0),
            ..UiInputs::default()
        });
        assert!(lab.save_request("x").resume_ref.ends_with("&gravity=5.00"));
    }
}
