use crate::{detection::Detection, error::DetectorError};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Fixed location, relative to the scratch root, where a backend leaves its
/// annotated visualization.
pub const ANNOTATED_ARTIFACT: &str = "detect/predict/image0.jpg";

pub fn annotated_artifact_path(scratch_root: &Path) -> PathBuf {
    scratch_root.join(ANNOTATED_ARTIFACT)
}

#[derive(Debug, Clone)]
pub struct Inference {
    /// Where the backend claims to have written its annotated image. The file
    /// may be missing when the backend produced no output.
    pub annotated_path: PathBuf,
    pub detections: Vec<Detection>,
}

/// A detector that writes its annotated output under a scratch root it owns.
///
/// Callers are responsible for moving the artifact out and removing the
/// scratch root once they are done with it.
pub trait DetectionBackend {
    fn infer(&self, image: &DynamicImage) -> Result<Inference, DetectorError>;

    fn scratch_root(&self) -> &Path;
}
