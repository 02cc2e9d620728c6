use crate::{
    error::{CleanupFailure, PipelineError},
    letterbox::load_image,
    naming::{base_name, predicted_path, ArtifactPath, ArtifactRole},
};
use serde::Serialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use yolo_detector::{Detection, DetectionBackend};

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub predicted: ArtifactPath,
    pub detections: Vec<Detection>,
}

/// Runs a backend on a normalized image and moves its annotated output into
/// the predictions directory.
pub struct PredictionRunner<B: DetectionBackend> {
    backend: B,
}

impl<B: DetectionBackend> PredictionRunner<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend's scratch root is removed whether or not prediction
    /// succeeded.
    pub fn run(
        &self,
        normalized_image_path: &Path,
        output_dir: &Path,
    ) -> Result<PredictionResult, PipelineError> {
        let result = self.predict_and_relocate(normalized_image_path, output_dir);
        self.remove_scratch_root();
        result
    }

    fn predict_and_relocate(
        &self,
        normalized_image_path: &Path,
        output_dir: &Path,
    ) -> Result<PredictionResult, PipelineError> {
        let image = load_image(normalized_image_path)?;

        let inference = self.backend.infer(&image)?;

        let destination = predicted_path(
            &base_name(&normalized_image_path.to_string_lossy()),
            output_dir,
        );
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }

        relocate(&inference.annotated_path, &destination)?;

        tracing::info!(
            "Prediction saved to {} with {} detections",
            destination.display(),
            inference.detections.len()
        );

        Ok(PredictionResult {
            predicted: ArtifactPath::new(ArtifactRole::Predicted, destination),
            detections: inference.detections,
        })
    }

    fn remove_scratch_root(&self) {
        let scratch_root = self.backend.scratch_root();
        match fs::remove_dir_all(scratch_root) {
            Ok(()) => tracing::debug!("Removed scratch directory {}", scratch_root.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No scratch directory at {}", scratch_root.display())
            }
            Err(source) => {
                let failure = CleanupFailure {
                    path: scratch_root.to_path_buf(),
                    source,
                };
                tracing::warn!("Scratch cleanup: {}", failure);
            }
        }
    }
}

/// Renames `source` to `destination`, copying then deleting when the rename
/// cannot be done in place (e.g. across filesystems).
fn relocate(source: &Path, destination: &Path) -> Result<(), PipelineError> {
    if !source.is_file() {
        return Err(PipelineError::PredictionArtifactMissing(source.to_path_buf()));
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(PipelineError::PredictionArtifactMissing(source.to_path_buf()))
        }
        Err(e) => {
            tracing::debug!("Rename failed ({}), copying {} instead", e, source.display());
            fs::copy(source, destination).map_err(|e| PipelineError::io(destination, e))?;
            if let Err(source_err) = fs::remove_file(source) {
                let failure = CleanupFailure {
                    path: PathBuf::from(source),
                    source: source_err,
                };
                tracing::warn!("Scratch cleanup: {}", failure);
            }
            Ok(())
        }
    }
}
