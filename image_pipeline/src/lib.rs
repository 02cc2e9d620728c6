mod letterbox;
mod runner;
mod telemetry;
mod upload;

pub mod app;
pub mod config;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod workspace;

pub use app::start_app;
pub use error::{CleanupFailure, PipelineError};
pub use letterbox::{letterbox, resize_with_padding, LetterboxGeometry};
pub use pipeline::{Pipeline, PipelineOutput, RequestStage};
pub use runner::{PredictionResult, PredictionRunner};
pub use telemetry::init_tracing;
pub use upload::{allowed_file, store_upload, UploadedImage, ALLOWED_EXTENSIONS};
pub use workspace::Workspace;
