use std::path::PathBuf;
use thiserror::Error;

/// Failures while producing or persisting an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("point cloud text cannot be encoded as ASCII")]
    Encoding,
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialise capture summary: {0}")]
    Summary(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid frame header: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{frame}: {plane} plane exceeds the {payload_len} byte payload")]
    PlaneOutOfRange {
        frame: PathBuf,
        plane: &'static str,
        payload_len: usize,
    },
    #[error("no recorded frames found in {0}")]
    NoFrames(PathBuf),
}
