use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub onnx_file: String,
    pub model_dir: PathBuf,
    pub labels_file: String,
    pub labels_dir: PathBuf,
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    #[serde(default = "default_min_probability")]
    pub min_probability: f32,
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,
}

fn default_input_size() -> u32 {
    640
}

fn default_min_probability() -> f32 {
    0.5
}

fn default_iou_threshold() -> f32 {
    0.7
}

fn default_scratch_root() -> PathBuf {
    PathBuf::from("runs")
}

pub trait Validatable {
    fn get_path(&self) -> PathBuf;

    fn validate(&self) -> Result<(), String> {
        if !self.get_path().exists() {
            return Err(format!("File not found: {:?}", self.get_path()));
        }
        Ok(())
    }
}

impl ModelConfig {
    pub fn get_labels_path(&self) -> PathBuf {
        self.labels_dir.join(&self.labels_file)
    }

    pub fn validate_all(&self) -> Result<(), String> {
        self.validate()?;
        if !self.get_labels_path().exists() {
            return Err(format!("Labels file not found: {:?}", self.get_labels_path()));
        }
        if self.input_size == 0 {
            return Err("Model input size must be non-zero".to_string());
        }
        Ok(())
    }
}

impl Validatable for ModelConfig {
    fn get_path(&self) -> PathBuf {
        self.model_dir.join(&self.onnx_file)
    }
}
