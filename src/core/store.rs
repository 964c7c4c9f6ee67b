use std::fmt;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::core::ballistics::{Analytics, LaunchParams};
use crate::core::snapshot::RasterSnapshot;
use crate::error::StoreError;

const LAST_SIM_FILE: &str = "last_sim.toml";
const FALLBACK_TITLE: &str = "Simulation";

/// Everything a saved run carries.
#[derive(Clone, Debug)]
pub struct SaveRequest {
    pub title: String,
    pub topic: String,
    pub params: LaunchParams,
    pub gravity_label: String,
    pub results: Analytics,
    pub snapshot: Option<RasterSnapshot>,
    pub resume_ref: String,
}

impl SaveRequest {
    /// Title, else topic, else a generic name.
    pub fn display_title(&self) -> &str {
        [self.title.trim(), self.topic.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(FALLBACK_TITLE)
    }
}

/// Opaque handle returned by a store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait SessionStore {
    fn save(&mut self, request: &SaveRequest) -> Result<SessionId, StoreError>;
}

#[derive(Serialize)]
struct SnapshotRef {
    file: String,
    format: &'static str,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct SavedRun<'a> {
    id: &'a str,
    title: &'a str,
    topic: &'a str,
    created_at: DateTime<Utc>,
    angle_deg: f64,
    gravity: &'a str,
    resume_ref: &'a str,
    params: &'a LaunchParams,
    results: &'a Analytics,
    snapshot: Option<SnapshotRef>,
}

#[derive(Serialize)]
struct LastSim<'a> {
    id: &'a str,
    title: &'a str,
    resume_ref: &'a str,
}

/// One TOML record per save, thumbnail bytes next to it, and a pointer to
/// the most recent save.
pub struct TomlFileStore {
    directory: PathBuf,
}

impl TomlFileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn unique_id(&self, created_at: DateTime<Utc>) -> String {
        let base = format!("sim-{}", created_at.format("%Y%m%d-%H%M%S%3f"));
        let mut id = base.clone();
        let mut n = 1;
        while self.directory.join(format!("{id}.toml")).exists() {
            id = format!("{base}-{n}");
            n += 1;
        }
        id
    }

    fn write(&self, file: &str, contents: &[u8]) -> Result<(), StoreError> {
        let path = self.directory.join(file);
        fs::write(&path, contents).map_err(|source| StoreError::Io { path, source })
    }
}

impl SessionStore for TomlFileStore {
    fn save(&mut self, request: &SaveRequest) -> Result<SessionId, StoreError> {
        fs::create_dir_all(&self.directory).map_err(|source| StoreError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let created_at = Utc::now();
        let id = self.unique_id(created_at);
        let title = request.display_title();

        let snapshot = match &request.snapshot {
            Some(raster) => {
                let file = format!("{id}.rgb");
                self.write(&file, &raster.rgb)?;
                Some(SnapshotRef {
                    file,
                    format: "rgb8",
                    width: raster.width,
                    height: raster.height,
                })
            }
            None => None,
        };

        let record = SavedRun {
            id: &id,
            title,
            topic: &request.topic,
            created_at,
            angle_deg: request.params.angle_deg(),
            gravity: &request.gravity_label,
            resume_ref: &request.resume_ref,
            params: &request.params,
            results: &request.results,
            snapshot,
        };
        self.write(&format!("{id}.toml"), toml::to_string(&record)?.as_bytes())?;

        let last = LastSim {
            id: &id,
            title,
            resume_ref: &request.resume_ref,
        };
        self.write(LAST_SIM_FILE, toml::to_string(&last)?.as_bytes())?;

        info!(%id, dir = ?self.directory, "saved run");
        Ok(SessionId(id))
    }
}

/// Keeps saves in memory; handy for tests and for running without a disk.
#[derive(Default)]
pub struct MemoryStore {
    records: Vec<(SessionId, SaveRequest)>,
}

impl MemoryStore {
    pub fn records(&self) -> &[(SessionId, SaveRequest)] {
        &self.records
    }
}

impl SessionStore for MemoryStore {
    fn save(&mut self, request: &SaveRequest) -> Result<SessionId, StoreError> {
        let id = SessionId(format!("mem-{}", self.records.len() + 1));
        self.records.push((id.clone(), request.clone()));
        Ok(id)
    }
}
