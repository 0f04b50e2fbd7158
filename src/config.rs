use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::places::{PlaceSource, DEFAULT_DATASET};
use crate::store::StoreBackend;

/// What happens after the first guess batch of an untimed round
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UntimedRounds {
    /// keep accepting guesses until reset
    #[default]
    Open,
    /// reset right after the first batch without a duplicate
    SingleBatch,
}

/// Visibility of session store write failures
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PersistFailures {
    #[default]
    LogOnly,
    Surface,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub start_letter: String,
    pub time_limit_secs: u32,
    pub dataset: String,
    pub places_file: Option<PathBuf>,
    pub store: StoreBackend,
    pub state_file: Option<PathBuf>,
    pub sample_size: usize,
    pub message_timeout_secs: u64,
    pub untimed_rounds: UntimedRounds,
    pub persist_failures: PersistFailures,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_letter: String::new(),
            time_limit_secs: 0,
            dataset: DEFAULT_DATASET.to_string(),
            places_file: None,
            store: StoreBackend::Json,
            state_file: None,
            sample_size: 10,
            message_timeout_secs: 100,
            untimed_rounds: UntimedRounds::Open,
            persist_failures: PersistFailures::LogOnly,
        }
    }
}

impl Config {
    pub fn place_source(&self) -> PlaceSource {
        match &self.places_file {
            Some(path) => PlaceSource::File(path.clone()),
            None => PlaceSource::Embedded(self.dataset.clone()),
        }
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }

    /// Explicit state file, else the per-backend default location
    pub fn state_path(&self) -> Option<PathBuf> {
        self.state_file
            .clone()
            .or_else(|| AppDirs::session_path(self.store))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("placeguess_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(error) => {
                    tracing::warn!(path = %self.path.display(), %error, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
