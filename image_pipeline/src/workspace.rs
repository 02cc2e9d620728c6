use crate::{
    error::{CleanupFailure, PipelineError},
    naming::ArtifactRole,
};
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// The three artifact directories a request writes into.
///
/// Directories are shared by every request that uses the same `Workspace`:
/// a second, overlapping request would purge the first one's artifacts. Use
/// [`Workspace::scoped`] to key the directories by request when that matters.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub upload_dir: PathBuf,
    pub resized_dir: PathBuf,
    pub predictions_dir: PathBuf,
}

impl Workspace {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        resized_dir: impl Into<PathBuf>,
        predictions_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            resized_dir: resized_dir.into(),
            predictions_dir: predictions_dir.into(),
        }
    }

    /// `uploads/`, `resized/` and `predictions/` under `root`.
    pub fn under(root: &Path) -> Self {
        Self::new(
            root.join("uploads"),
            root.join("resized"),
            root.join("predictions"),
        )
    }

    /// Same layout with every directory nested under `request_id`.
    pub fn scoped(&self, request_id: &str) -> Self {
        Self::new(
            self.upload_dir.join(request_id),
            self.resized_dir.join(request_id),
            self.predictions_dir.join(request_id),
        )
    }

    pub fn dir_for(&self, role: ArtifactRole) -> &Path {
        match role {
            ArtifactRole::Original => &self.upload_dir,
            ArtifactRole::Resized => &self.resized_dir,
            ArtifactRole::Predicted => &self.predictions_dir,
        }
    }

    pub fn dirs(&self) -> [&Path; 3] {
        [
            self.upload_dir.as_path(),
            self.resized_dir.as_path(),
            self.predictions_dir.as_path(),
        ]
    }

    pub fn ensure_dirs(&self) -> Result<(), PipelineError> {
        for dir in self.dirs() {
            fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
        }
        Ok(())
    }

    /// Creates any missing directory, then deletes the regular files directly
    /// inside each one. Subdirectories are left alone.
    ///
    /// Deletion is best effort: failures are logged and returned, and never
    /// stop the remaining files from being removed. Only a directory that
    /// cannot be created is an error.
    pub fn reset(&self) -> Result<Vec<CleanupFailure>, PipelineError> {
        self.reset_with(|path| fs::remove_file(path))
    }

    fn reset_with<F>(&self, remove: F) -> Result<Vec<CleanupFailure>, PipelineError>
    where
        F: Fn(&Path) -> io::Result<()>,
    {
        self.ensure_dirs()?;

        let mut failures = Vec::new();
        for dir in self.dirs() {
            purge_files(dir, &remove, &mut failures);
        }

        for failure in &failures {
            tracing::warn!("Workspace cleanup: {}", failure);
        }

        Ok(failures)
    }
}

fn purge_files<F>(dir: &Path, remove: &F, failures: &mut Vec<CleanupFailure>)
where
    F: Fn(&Path) -> io::Result<()>,
{
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            failures.push(CleanupFailure {
                path: dir.to_path_buf(),
                source,
            });
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(source) => {
                failures.push(CleanupFailure {
                    path: dir.to_path_buf(),
                    source,
                });
                continue;
            }
        };

        if !path.is_file() {
            continue;
        }

        match remove(&path) {
            Ok(()) => tracing::debug!("Deleted stale artifact {}", path.display()),
            Err(source) => failures.push(CleanupFailure { path, source }),
        }
    }
}
