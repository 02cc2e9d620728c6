use crate::{
    config::LetterboxConfig,
    error::PipelineError,
    letterbox::resize_with_padding,
    naming::{ArtifactPath, ArtifactRole},
    runner::{PredictionResult, PredictionRunner},
    upload::{store_upload, UploadedImage},
    workspace::Workspace,
};
use serde::Serialize;
use tracing::instrument;
use yolo_detector::DetectionBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Idle,
    WorkspacePurged,
    Uploaded,
    Normalized,
    Predicted,
    Served,
}

impl RequestStage {
    /// Forward path of a request. Any stage may fall back to `Idle` on failure.
    pub fn allowed_transitions(self) -> &'static [RequestStage] {
        use RequestStage::*;
        match self {
            Idle => &[WorkspacePurged, Idle],
            WorkspacePurged => &[Uploaded, Idle],
            Uploaded => &[Normalized, Idle],
            Normalized => &[Predicted, Idle],
            Predicted => &[Served, Idle],
            Served => &[Idle],
        }
    }

    pub fn can_transition_to(self, next: RequestStage) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

/// Everything the presentation layer needs to show a result.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub original: ArtifactPath,
    pub resized: ArtifactPath,
    pub prediction: PredictionResult,
}

/// Processes one upload at a time against a fixed workspace. Each request
/// purges the previous request's artifacts.
pub struct Pipeline<B: DetectionBackend> {
    workspace: Workspace,
    letterbox: LetterboxConfig,
    runner: PredictionRunner<B>,
    stage: RequestStage,
}

impl<B: DetectionBackend> Pipeline<B> {
    pub fn new(workspace: Workspace, letterbox: LetterboxConfig, backend: B) -> Self {
        Self {
            workspace,
            letterbox,
            runner: PredictionRunner::new(backend),
            stage: RequestStage::Idle,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn backend(&self) -> &B {
        self.runner.backend()
    }

    pub fn stage(&self) -> RequestStage {
        self.stage
    }

    #[instrument(skip(self, upload), fields(filename = %upload.filename))]
    pub fn process(&mut self, upload: &UploadedImage) -> Result<PipelineOutput, PipelineError> {
        let result = self.run_stages(upload);
        if let Err(e) = &result {
            tracing::warn!("Request failed after {:?}: {}", self.stage, e);
        }
        self.transition(RequestStage::Idle);
        result
    }

    fn run_stages(&mut self, upload: &UploadedImage) -> Result<PipelineOutput, PipelineError> {
        upload.validate()?;

        let failures = self.workspace.reset()?;
        if !failures.is_empty() {
            tracing::warn!("{} stale artifacts could not be removed", failures.len());
        }
        self.transition(RequestStage::WorkspacePurged);

        let original = store_upload(upload, &self.workspace)?;
        self.transition(RequestStage::Uploaded);

        let resized = resize_with_padding(
            &original.path,
            self.workspace.dir_for(ArtifactRole::Resized),
            &self.letterbox,
        )?;
        self.transition(RequestStage::Normalized);

        let prediction = self
            .runner
            .run(&resized.path, self.workspace.dir_for(ArtifactRole::Predicted))?;
        self.transition(RequestStage::Predicted);

        tracing::info!(
            "Serving {} -> {} -> {}",
            original.file_name(),
            resized.file_name(),
            prediction.predicted.file_name()
        );
        self.transition(RequestStage::Served);
        Ok(PipelineOutput {
            original,
            resized,
            prediction,
        })
    }

    fn transition(&mut self, next: RequestStage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal request transition {:?} -> {:?}",
            self.stage,
            next
        );
        tracing::debug!("{:?} -> {:?}", self.stage, next);
        self.stage = next;
    }
}
