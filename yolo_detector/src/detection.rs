use crate::{error::DetectorError, labels::LabelTable};
use ndarray::{ArrayViewD, Axis, Ix3};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub class_id: u32,
    pub label: String,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Detection {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.) * (self.y2 - self.y1).max(0.)
    }
}

fn intersection(box1: &Detection, box2: &Detection) -> f32 {
    let width = box1.x2.min(box2.x2) - box1.x1.max(box2.x1);
    let height = box1.y2.min(box2.y2) - box1.y1.max(box2.y1);
    width.max(0.) * height.max(0.)
}

fn union(box1: &Detection, box2: &Detection) -> f32 {
    box1.area() + box2.area() - intersection(box1, box2)
}

pub fn iou(box1: &Detection, box2: &Detection) -> f32 {
    let union = union(box1, box2);
    if union <= 0. {
        return 0.;
    }
    intersection(box1, box2) / union
}

#[derive(Debug, Clone, Copy)]
pub struct DecodeParams {
    pub input_size: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub min_probability: f32,
    pub iou_threshold: f32,
}

/// Decodes a YOLOv8 head shaped `[1, 4 + classes, anchors]` into
/// confidence-ordered, NMS-filtered detections in image pixel coordinates.
pub fn decode_output(
    output: ArrayViewD<'_, f32>,
    params: &DecodeParams,
    labels: &LabelTable,
) -> Result<Vec<Detection>, DetectorError> {
    let output = output
        .into_dimensionality::<Ix3>()
        .map_err(|e| DetectorError::Inference(format!("unexpected output shape: {}", e)))?;
    if output.shape()[0] == 0 {
        return Err(DetectorError::Inference(format!(
            "output has an empty batch: {:?}",
            output.shape()
        )));
    }
    if output.shape()[1] <= 4 {
        return Err(DetectorError::Inference(format!(
            "output has no class scores: {:?}",
            output.shape()
        )));
    }

    let output = output.index_axis_move(Axis(0), 0);
    let input_size = params.input_size as f32;
    let scale_x = params.image_width as f32 / input_size;
    let scale_y = params.image_height as f32 / input_size;
    let max_x = params.image_width as f32;
    let max_y = params.image_height as f32;

    let mut boxes = Vec::new();
    for anchor in output.axis_iter(Axis(1)) {
        let (class_id, prob) = anchor
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |accum, row| if row.1 > accum.1 { row } else { accum });

        if prob < params.min_probability {
            continue;
        }

        let xc = anchor[0] * scale_x;
        let yc = anchor[1] * scale_y;
        let w = anchor[2] * scale_x;
        let h = anchor[3] * scale_y;
        let class_id = class_id as u32;

        boxes.push(Detection {
            class_id,
            label: labels.label_for(class_id),
            confidence: prob,
            x1: (xc - w / 2.).clamp(0., max_x),
            y1: (yc - h / 2.).clamp(0., max_y),
            x2: (xc + w / 2.).clamp(0., max_x),
            y2: (yc + h / 2.).clamp(0., max_y),
        });
    }

    Ok(non_max_suppression(boxes, params.iou_threshold))
}

pub fn non_max_suppression(mut boxes: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    boxes.sort_by(|box1, box2| box2.confidence.total_cmp(&box1.confidence));
    let mut result = Vec::new();

    while !boxes.is_empty() {
        let best = boxes.remove(0);
        boxes.retain(|candidate| iou(&best, candidate) < iou_threshold);
        result.push(best);
    }

    result
}
