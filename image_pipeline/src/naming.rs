use serde::Serialize;
use std::path::{Path, PathBuf};

pub const RESIZED_PREFIX: &str = "resize_";
pub const PREDICTED_PREFIX: &str = "pred_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactRole {
    Original,
    Resized,
    Predicted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPath {
    pub role: ArtifactRole,
    pub path: PathBuf,
}

impl ArtifactPath {
    pub fn new(role: ArtifactRole, path: impl Into<PathBuf>) -> Self {
        Self {
            role,
            path: path.into(),
        }
    }

    pub fn file_name(&self) -> String {
        base_name(&self.path.to_string_lossy())
    }
}

/// Final path component of `filename`, or an empty string when there is none.
pub fn base_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn resized_path(original_filename: &str, resized_dir: &Path) -> PathBuf {
    resized_dir.join(format!("{}{}", RESIZED_PREFIX, base_name(original_filename)))
}

/// Every occurrence of `resize_` is replaced, not only the leading one.
pub fn predicted_path(resized_filename: &str, predicted_dir: &Path) -> PathBuf {
    predicted_dir.join(base_name(resized_filename).replace(RESIZED_PREFIX, PREDICTED_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resized_path() {
        let dir = Path::new("static/temps");

        assert_eq!(
            resized_path("cat.jpg", dir),
            PathBuf::from("static/temps/resize_cat.jpg")
        );
        assert_eq!(
            resized_path("static/uploads/cat.jpg", dir),
            PathBuf::from("static/temps/resize_cat.jpg")
        );
    }

    #[test]
    fn test_predicted_path() {
        let dir = Path::new("static/predictions");

        assert_eq!(
            predicted_path("resize_cat.jpg", dir),
            PathBuf::from("static/predictions/pred_cat.jpg")
        );
        assert_eq!(
            predicted_path("static/temps/resize_cat.jpg", dir),
            PathBuf::from("static/predictions/pred_cat.jpg")
        );
    }

    #[test]
    fn test_predicted_path_replaces_every_occurrence() {
        let dir = Path::new("out");
        let resized = resized_path("resize_me.png", dir);

        assert_eq!(resized, PathBuf::from("out/resize_resize_me.png"));
        assert_eq!(
            predicted_path(&resized.to_string_lossy(), dir),
            PathBuf::from("out/pred_pred_me.png")
        );
    }

    #[test]
    fn test_naming_is_deterministic() {
        let first = predicted_path(
            &resized_path("photo.png", Path::new("r")).to_string_lossy(),
            Path::new("p"),
        );
        let second = predicted_path(
            &resized_path("photo.png", Path::new("r")).to_string_lossy(),
            Path::new("p"),
        );

        assert_eq!(first, second);
        assert_eq!(first, PathBuf::from("p/pred_photo.png"));
    }

    #[test]
    fn test_artifact_file_name() {
        let artifact = ArtifactPath::new(ArtifactRole::Resized, "static/temps/resize_cat.jpg");

        assert_eq!(artifact.file_name(), "resize_cat.jpg");
    }
}
