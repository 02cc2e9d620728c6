use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Failed to load model session: {0}")]
    Session(#[from] ort::Error),
    #[error("Failed to load labels: {0}")]
    Labels(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Failed to write annotated image: {0}")]
    Annotation(#[from] image::ImageError),
    #[error("Scratch directory error: {0}")]
    Scratch(#[from] std::io::Error),
}
