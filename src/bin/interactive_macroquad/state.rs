use projectile_lab::config::AppConfig;
use projectile_lab::core::ballistics::{GravitySetting, Planet};
use projectile_lab::core::driver::FrameScheduler;
use projectile_lab::core::lab::{Lab, LabSettings, UiInputs};
use projectile_lab::core::store::TomlFileStore;
use projectile_lab::core::window::CanvasSize;

/// Remembers whether the lab asked for another frame.
#[derive(Default)]
pub(crate) struct HostScheduler {
    pending: bool,
}

impl HostScheduler {
    pub(crate) fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for HostScheduler {
    fn request_next_frame(&mut self) {
        self.pending = true;
    }
}

/// Widget-side copies of the lab inputs. macroquad's ui works on `f32`,
/// `usize` indices and strings.
pub(crate) struct ControlValues {
    pub(crate) angle_deg: f32,
    pub(crate) speed_mps: f32,
    pub(crate) mass_kg: f32,
    /// Index into `Planet::ALL`; one past the end selects custom gravity.
    pub(crate) gravity_idx: usize,
    pub(crate) custom_gravity: String,
    pub(crate) save_title: String,
}

impl ControlValues {
    fn from_config(cfg: &AppConfig) -> Self {
        let gravity_idx = Planet::ALL
            .iter()
            .position(|&p| p == cfg.defaults.planet)
            .unwrap_or_default();
        Self {
            angle_deg: cfg.defaults.angle_deg as f32,
            speed_mps: cfg.defaults.speed_mps as f32,
            mass_kg: cfg.defaults.mass_kg as f32,
            gravity_idx,
            custom_gravity: format!("{:.2}", cfg.defaults.planet.gravity_mps2()),
            save_title: String::new(),
        }
    }

    /// Unparseable custom gravity becomes NaN, which the lab refuses.
    pub(crate) fn to_inputs(&self) -> UiInputs {
        let gravity = match Planet::ALL.get(self.gravity_idx) {
            Some(&planet) => GravitySetting::Preset(planet),
            None => GravitySetting::Custom(self.custom_gravity.trim().parse().unwrap_or(f64::NAN)),
        };
        UiInputs {
            angle_deg: self.angle_deg as f64,
            speed_mps: self.speed_mps as f64,
            mass_kg: self.mass_kg as f64,
            gravity,
        }
    }
}

pub(crate) struct AppRuntime {
    pub(crate) lab: Lab,
    pub(crate) controls: ControlValues,
    pub(crate) scheduler: HostScheduler,
    pub(crate) store: TomlFileStore,
    pub(crate) status_line: String,
    /// A text field has keyboard focus; hotkeys are suspended.
    pub(crate) typing: bool,
}

impl AppRuntime {
    pub(crate) fn new(cfg: &AppConfig, canvas: CanvasSize) -> Self {
        let controls = ControlValues::from_config(cfg);
        let mut scheduler = HostScheduler::default();
        // first paint
        scheduler.request_next_frame();
        Self {
            lab: Lab::new(LabSettings::from_config(cfg), controls.to_inputs(), canvas),
            controls,
            scheduler,
            store: TomlFileStore::new(&cfg.store.directory),
            status_line: "Ready".to_string(),
            typing: false,
        }
    }
}
