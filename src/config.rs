use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::ballistics::{PREDICTION_SAMPLES, Planet};
use crate::core::driver::MAX_FRAME_DT_S;
use crate::core::window::Margins;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "projectile_lab.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_title")]
    pub title: String,
    #[serde(default = "WindowConfig::default_width")]
    pub width: i32,
    #[serde(default = "WindowConfig::default_height")]
    pub height: i32,
    #[serde(default = "WindowConfig::default_msaa_samples")]
    pub msaa_samples: i32,
}

impl WindowConfig {
    fn default_title() -> String {
        "Projectile Lab".to_string()
    }
    fn default_width() -> i32 {
        1600
    }
    fn default_height() -> i32 {
        900
    }
    fn default_msaa_samples() -> i32 {
        4
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            width: Self::default_width(),
            height: Self::default_height(),
            msaa_samples: Self::default_msaa_samples(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CanvasConfig {
    #[serde(default)]
    pub margins: Margins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "SimulationConfig::default_sample_count")]
    pub sample_count: usize,
    #[serde(default = "SimulationConfig::default_max_frame_dt_s")]
    pub max_frame_dt_s: f64,
}

impl SimulationConfig {
    fn default_sample_count() -> usize {
        PREDICTION_SAMPLES
    }
    fn default_max_frame_dt_s() -> f64 {
        MAX_FRAME_DT_S
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_count: Self::default_sample_count(),
            max_frame_dt_s: Self::default_max_frame_dt_s(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "ChartConfig::default_width")]
    pub width: usize,
    #[serde(default = "ChartConfig::default_height")]
    pub height: usize,
    #[serde(default = "ChartConfig::default_step_px")]
    pub step_px: usize,
}

impl ChartConfig {
    fn default_width() -> usize {
        360
    }
    fn default_height() -> usize {
        120
    }
    fn default_step_px() -> usize {
        2
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            step_px: Self::default_step_px(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchDefaults {
    #[serde(default = "LaunchDefaults::default_angle_deg")]
    pub angle_deg: f64,
    #[serde(default = "LaunchDefaults::default_speed_mps")]
    pub speed_mps: f64,
    #[serde(default = "LaunchDefaults::default_mass_kg")]
    pub mass_kg: f64,
    #[serde(default)]
    pub planet: Planet,
}

impl LaunchDefaults {
    fn default_angle_deg() -> f64 {
        45.0
    }
    fn default_speed_mps() -> f64 {
        20.0
    }
    fn default_mass_kg() -> f64 {
        1.0
    }
}

impl Default for LaunchDefaults {
    fn default() -> Self {
        Self {
            angle_deg: Self::default_angle_deg(),
            speed_mps: Self::default_speed_mps(),
            mass_kg: Self::default_mass_kg(),
            planet: Planet::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_directory")]
    pub directory: String,
}

impl StoreConfig {
    fn default_directory() -> String {
        "saved_runs".to_string()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub defaults: LaunchDefaults,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default = "AppConfig::default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            canvas: CanvasConfig::default(),
            simulation: SimulationConfig::default(),
            chart: ChartConfig::default(),
            defaults: LaunchDefaults::default(),
            store: StoreConfig::default(),
            log_level: Self::default_log_level(),
        }
    }
}

impl AppConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Missing file means defaults. An unreadable or malformed one also
    /// yields defaults, with the error handed back so the caller can report it
    /// once logging is installed.
    pub fn load_or_default(path: &str) -> (Self, Option<ConfigError>) {
        let path_obj = Path::new(path);
        if !path_obj.exists() {
            return (Self::default(), None);
        }
        match Self::load(path_obj) {
            Ok(cfg) => (cfg, None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn report_fallback(path: &str, err: &ConfigError) {
        warn!("Failed to load config {path}: {err}. Using defaults.");
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.simulation.sample_count, PREDICTION_SAMPLES);
        assert_eq!(cfg.chart.step_px, 2);
        assert_eq!(cfg.defaults.planet, Planet::Earth);
        assert_eq!(cfg.canvas.margins, Margins::default());
        assert_eq!(cfg.tracing_level(), tracing::Level::INFO);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
            log_level = "debug"

            [defaults]
            planet = "mars"
            speed_mps = 35.0

            [canvas.margins]
            left = 80.0
            right = 20.0
            top = 30.0
            bottom = 90.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.defaults.planet, Planet::Mars);
        assert_eq!(cfg.defaults.speed_mps, 35.0);
        assert_eq!(cfg.defaults.angle_deg, 45.0);
        assert_eq!(cfg.canvas.margins.left, 80.0);
        assert_eq!(cfg.window.title, "Projectile Lab");
        assert_eq!(cfg.tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn malformed_file_is_an_error_and_missing_file_is_default() {
        assert!(AppConfig::from_toml_str("[defaults]\nplanet = \"vulcan\"").is_err());
        let (cfg, err) = AppConfig::load_or_default("definitely/not/here/projectile_lab.toml");
        assert_eq!(cfg.window.width, 1600);
        assert!(err.is_none());
    }

    #[test]
    fn malformed_file_falls_back_and_hands_back_the_error() {
        let path = std::env::temp_dir().join(format!("projectile_lab_bad_config_{}.toml", std::process::id()));
        fs::write(&path, "[defaults]\nplanet = \"vulcan\"\n").unwrap();

        let (cfg, err) = AppConfig::load_or_default(path.to_str().unwrap());
        let _ = fs::remove_file(&path);

        assert_eq!(cfg.defaults.planet, Planet::Earth);
        assert!(matches!(err, Some(ConfigError::Parse(_))), "{err:?}");
    }
}
