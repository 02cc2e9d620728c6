mod annotate;
mod detection;
mod error;
mod labels;
mod ort_detector;

pub mod backend;
pub mod config;

pub use annotate::save_annotated;
pub use backend::{DetectionBackend, Inference};
pub use config::ModelConfig;
pub use detection::Detection;
pub use error::DetectorError;
pub use labels::{ColorLabel, LabelTable};
pub use ort_detector::OrtDetector;
