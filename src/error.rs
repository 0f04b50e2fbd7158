use std::io;

use thiserror::Error;

/// Failures while loading reference data
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("failed to read place list: {0}")]
    Io(#[from] io::Error),
    #[error("malformed place list json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed place list csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown place dataset `{0}`")]
    UnknownDataset(String),
    #[error("unsupported place list format `{0}` (expected .json or .csv)")]
    UnsupportedFormat(String),
    #[error("place list is empty")]
    Empty,
}

/// Failures talking to the session store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),
    #[error("store serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("`{0}` is not a single letter")]
    InvalidStartLetter(String),
    #[error("no places start with `{0}`")]
    NoPlacesForLetter(char),
    #[error(transparent)]
    Places(#[from] PlacesError),
}
