use crate::{
    annotate::save_annotated,
    backend::{DetectionBackend, Inference},
    config::{ModelConfig, Validatable},
    detection::{decode_output, DecodeParams},
    error::DetectorError,
    labels::LabelTable,
};
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::{Array, ArrayD, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

fn transform_image(image: &DynamicImage, input_size: u32) -> Array<f32, Ix4> {
    let size = input_size as usize;
    let img = image.resize_exact(input_size, input_size, FilterType::CatmullRom);

    let mut input = Array::zeros((1, 3, size, size));
    for pixel in img.pixels() {
        let x = pixel.0 as _;
        let y = pixel.1 as _;
        let [r, g, b, _] = pixel.2 .0;
        input[[0, 0, y, x]] = (r as f32) / 255.;
        input[[0, 1, y, x]] = (g as f32) / 255.;
        input[[0, 2, y, x]] = (b as f32) / 255.;
    }

    input
}

fn build_session(model_path: &Path) -> Result<Session, ort::Error> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .commit_from_file(model_path)?;
    Ok(session)
}

/// YOLOv8 ONNX detector. Loaded once and reused across requests; the session
/// sits behind a mutex because inference needs exclusive access to it.
pub struct OrtDetector {
    session: Mutex<Session>,
    labels: LabelTable,
    input_size: u32,
    min_probability: f32,
    iou_threshold: f32,
    scratch_root: PathBuf,
}

impl OrtDetector {
    pub fn new(model_config: &ModelConfig) -> Result<Self, DetectorError> {
        let session = build_session(&model_config.get_path())?;
        let labels = LabelTable::load(&model_config.get_labels_path())?;

        tracing::info!(
            "Loaded model {} with {} class labels",
            model_config.get_path().display(),
            labels.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
            input_size: model_config.input_size,
            min_probability: model_config.min_probability,
            iou_threshold: model_config.iou_threshold,
            scratch_root: model_config.scratch_root.clone(),
        })
    }

    fn run_inference(&self, input: &Array<f32, Ix4>) -> Result<ArrayD<f32>, DetectorError> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| DetectorError::Inference(format!("session mutex poisoned: {}", e)))?;

        let tensor_ref = TensorRef::from_array_view(input.view())?;
        let outputs = session.run(ort::inputs![tensor_ref])?;

        let (shape, data) = outputs["output0"].try_extract_tensor::<f32>()?;
        let array = ArrayD::from_shape_vec(shape.to_ixdyn(), data.to_vec())
            .map_err(|e| DetectorError::Inference(format!("invalid tensor shape: {}", e)))?;

        Ok(array)
    }
}

impl DetectionBackend for OrtDetector {
    fn infer(&self, image: &DynamicImage) -> Result<Inference, DetectorError> {
        let (image_width, image_height) = image.dimensions();
        let input = transform_image(image, self.input_size);
        let output = self.run_inference(&input)?;

        let params = DecodeParams {
            input_size: self.input_size,
            image_width,
            image_height,
            min_probability: self.min_probability,
            iou_threshold: self.iou_threshold,
        };
        let detections = decode_output(output.view(), &params, &self.labels)?;

        tracing::debug!("Model returned {} detections", detections.len());
        for (i, detection) in detections.iter().enumerate() {
            tracing::debug!(
                "Detection {}: class_id={}, confidence={:.3}, bbox=({:.1}, {:.1}, {:.1}, {:.1})",
                i,
                detection.class_id,
                detection.confidence,
                detection.x1,
                detection.y1,
                detection.x2,
                detection.y2
            );
        }

        let annotated_path = save_annotated(image, &detections, &self.labels, &self.scratch_root)?;

        Ok(Inference {
            annotated_path,
            detections,
        })
    }

    fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }
}
