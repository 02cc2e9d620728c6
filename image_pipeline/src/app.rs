use crate::{
    config::Config,
    pipeline::{Pipeline, PipelineOutput},
    upload::UploadedImage,
};
use anyhow::Context;
use std::path::Path;
use yolo_detector::OrtDetector;

pub fn start_app(config: &Config, image_path: &Path) -> anyhow::Result<PipelineOutput> {
    if let Err(e) = config.model.validate_all() {
        tracing::error!("Configuration validation failed: {}", e);
        anyhow::bail!(e);
    }

    let detector = match OrtDetector::new(&config.model) {
        Ok(detector) => detector,
        Err(e) => {
            tracing::error!("Failed to initialize detector: {:?}", e);
            return Err(e.into());
        }
    };

    let upload = UploadedImage::from_path(image_path)
        .with_context(|| format!("failed to read {}", image_path.display()))?;

    let mut pipeline = Pipeline::new(
        config.workspace.clone(),
        config.letterbox.clone(),
        detector,
    );
    let output = pipeline.process(&upload)?;

    Ok(output)
}
