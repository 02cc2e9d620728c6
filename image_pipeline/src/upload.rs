use crate::{
    error::PipelineError,
    naming::{base_name, ArtifactPath, ArtifactRole},
    workspace::Workspace,
};
use std::{fs, path::Path};

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Extension check only; the content is not sniffed.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| ALLOWED_EXTENSIONS.contains(&extension.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A user-submitted image as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let bytes = fs::read(path).map_err(|e| PipelineError::io(path, e))?;
        Ok(Self::new(base_name(&path.to_string_lossy()), bytes))
    }

    /// Returns the base name the upload will be stored under.
    pub fn validate(&self) -> Result<String, PipelineError> {
        if self.filename.is_empty() {
            return Err(PipelineError::InvalidInput(
                "No selected file. Please choose an image to upload.".to_string(),
            ));
        }

        let name = base_name(&self.filename);
        if !allowed_file(&name) {
            return Err(PipelineError::InvalidInput(format!(
                "Invalid file {:?}. Please upload a valid image file ({}).",
                self.filename,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        Ok(name)
    }
}

pub fn store_upload(
    upload: &UploadedImage,
    workspace: &Workspace,
) -> Result<ArtifactPath, PipelineError> {
    let name = upload.validate()?;
    let destination = workspace.dir_for(ArtifactRole::Original).join(name);
    fs::write(&destination, &upload.bytes).map_err(|e| PipelineError::io(&destination, e))?;

    tracing::debug!(
        "Stored upload {} ({} bytes)",
        destination.display(),
        upload.bytes.len()
    );

    Ok(ArtifactPath::new(ArtifactRole::Original, destination))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("cat.jpg"));
        assert!(allowed_file("cat.JPEG"));
        assert!(allowed_file("archive.tar.png"));
        assert!(allowed_file("anim.gif"));
        assert!(!allowed_file("photo.exe"));
        assert!(!allowed_file("png"));
        assert!(!allowed_file("cat."));
        assert!(!allowed_file("cat.png.exe"));
    }

    #[test]
    fn test_empty_filename_is_rejected() {
        let upload = UploadedImage::new("", vec![1, 2, 3]);

        assert!(matches!(upload.validate(), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_strips_directories() {
        let upload = UploadedImage::new("../../etc/cat.png", vec![]);

        assert_eq!(upload.validate().unwrap(), "cat.png");
    }

    #[test]
    fn test_store_upload() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::under(root.path());
        workspace.ensure_dirs().unwrap();
        let upload = UploadedImage::new("cat.png", vec![7, 7, 7]);

        let artifact = store_upload(&upload, &workspace).unwrap();

        assert_eq!(artifact.role, ArtifactRole::Original);
        assert_eq!(artifact.path, workspace.upload_dir.join("cat.png"));
        assert_eq!(fs::read(&artifact.path).unwrap(), vec![7, 7, 7]);
    }

    #[test]
    fn test_from_path_keeps_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dog.gif");
        fs::write(&path, b"gif").unwrap();

        let upload = UploadedImage::from_path(&path).unwrap();

        assert_eq!(upload.filename, "dog.gif");
        assert_eq!(upload.bytes, b"gif".to_vec());
    }
}
