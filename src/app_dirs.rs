use directories::ProjectDirs;
use std::path::PathBuf;

use crate::store::StoreBackend;

const APP_NAME: &str = "placeguess";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn session_path(backend: StoreBackend) -> Option<PathBuf> {
        let file = match backend {
            StoreBackend::Json => "session.json",
            StoreBackend::Sqlite => "session.db",
            StoreBackend::Memory => return None,
        };
        Self::state_dir().map(|dir| dir.join(file))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join(format!("{APP_NAME}.log")))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.config_dir().join("config.json"))
    }
}
