use macroquad::prelude::*;
use tracing::{info, warn};

use projectile_lab::config::{AppConfig, DEFAULT_CONFIG_PATH};
use projectile_lab::core::driver::{FrameEvent, RunPhase};
use projectile_lab::core::store::SessionStore;
use projectile_lab::core::window::CanvasSize;

use crate::controls::{FrameActions, draw_control_panel, hotkey_actions, text_focus_after};
use crate::render::{ChartView, MacroquadCanvas};
use crate::state::AppRuntime;

pub(crate) fn window_conf() -> Conf {
    let (cfg, _) = AppConfig::load_or_default(DEFAULT_CONFIG_PATH);
    Conf {
        window_title: cfg.window.title.clone(),
        window_width: cfg.window.width,
        window_height: cfg.window.height,
        high_dpi: true,
        sample_count: cfg.window.msaa_samples,
        ..Default::default()
    }
}

fn current_canvas() -> CanvasSize {
    CanvasSize::new(screen_width() as f64, screen_height() as f64, screen_dpi_scale() as f64)
}

fn apply_actions(state: &mut AppRuntime, actions: FrameActions) {
    if actions.launch {
        match state.lab.launch(&mut state.scheduler) {
            Ok(()) => state.status_line = "Launched".to_string(),
            Err(err) => state.status_line = err.to_string(),
        }
    }
    if actions.toggle_pause && state.lab.toggle_pause(&mut state.scheduler) {
        state.status_line = match state.lab.phase() {
            RunPhase::Paused => "Paused",
            _ => "Running",
        }
        .to_string();
    }
    if actions.reset {
        state.lab.reset(&mut state.scheduler);
        state.status_line = "Ready".to_string();
    }
    if actions.save {
        let request = state.lab.save_request(&state.controls.save_title);
        match state.store.save(&request) {
            Ok(id) => state.status_line = format!("Saved {id}"),
            Err(err) => {
                warn!("save failed: {err}");
                state.status_line = "Save failed".to_string();
            }
        }
    }
}

pub(crate) async fn run() {
    let (cfg, cfg_err) = AppConfig::load_or_default(DEFAULT_CONFIG_PATH);
    tracing_subscriber::fmt().with_max_level(cfg.tracing_level()).init();
    if let Some(err) = &cfg_err {
        AppConfig::report_fallback(DEFAULT_CONFIG_PATH, err);
    }
    info!(store = ?cfg.store.directory, "starting interactive lab");

    let mut state = AppRuntime::new(&cfg, current_canvas());
    let chart = ChartView::new(state.lab.chart().buffer());

    loop {
        state.lab.resize(current_canvas());

        let (panel, edited) = draw_control_panel(&mut state);
        state.typing = text_focus_after(state.typing, edited, is_mouse_button_pressed(MouseButton::Left));
        let actions = hotkey_actions(state.lab.phase(), state.typing).merge(panel);
        state.lab.set_params(state.controls.to_inputs());
        apply_actions(&mut state, actions);

        if state.scheduler.take() {
            if let FrameEvent::Landed(sample) = state.lab.frame(get_time(), &mut state.scheduler) {
                state.status_line = format!("Landed at {:.2} m after {:.2} s", sample.position.0, sample.elapsed_s);
            }
        }

        let viewport = state.lab.viewport();
        let mut canvas = MacroquadCanvas::new(viewport.canvas.device_pixel_ratio);
        state.lab.render(&mut canvas);

        chart.upload(state.lab.chart().buffer());
        chart.draw(screen_width(), screen_height());

        next_frame().await;
    }
}
