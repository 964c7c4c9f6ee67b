use std::io;
use std::path::PathBuf;

use crate::core::ballistics::LaunchParams;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LaunchError {
    #[error("launch refused: parameters out of range ({0:?})")]
    InvalidParameters(LaunchParams),
    #[error("launch refused: a run is already in progress")]
    RunActive,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot size {width}x{height} is empty")]
    EmptySize { width: u32, height: u32 },
    #[error("drawing failed: {0}")]
    Draw(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
