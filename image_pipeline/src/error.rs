use std::{io, path::PathBuf};
use thiserror::Error;
use yolo_detector::DetectorError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Prediction artifact missing: {}", .0.display())]
    PredictionArtifactMissing(PathBuf),
    #[error("Detection backend failed: {0}")]
    Detection(#[from] DetectorError),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn from_image(path: impl Into<PathBuf>, err: image::ImageError) -> Self {
        let path = path.into();
        match err {
            image::ImageError::IoError(source) => PipelineError::Io { path, source },
            other => PipelineError::InvalidImage(format!("{}: {}", path.display(), other)),
        }
    }
}

/// A file or directory that could not be removed. Logged, never surfaced to
/// the user.
#[derive(Error, Debug)]
#[error("Failed to delete {}: {source}", path.display())]
pub struct CleanupFailure {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}
