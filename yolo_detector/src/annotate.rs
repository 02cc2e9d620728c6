use crate::{
    backend::annotated_artifact_path, detection::Detection, error::DetectorError,
    labels::LabelTable,
};
use image::{DynamicImage, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use std::path::{Path, PathBuf};

const LINE_WIDTH: u32 = 2;

/// Draws each detection as a hollow rectangle in its label colour.
pub fn annotate(image: &mut RgbImage, detections: &[Detection], labels: &LabelTable) {
    let (w, h) = (image.width() as i32, image.height() as i32);

    for bbox in detections {
        let x_min = (bbox.x1.round() as i32).clamp(0, w);
        let y_min = (bbox.y1.round() as i32).clamp(0, h);
        let x_max = (bbox.x2.round() as i32).clamp(0, w);
        let y_max = (bbox.y2.round() as i32).clamp(0, h);
        let rw = (x_max - x_min).max(1) as u32;
        let rh = (y_max - y_min).max(1) as u32;
        let color = labels.color_for(bbox.class_id);

        tracing::trace!(
            "Drawing {} ({:.2}) at ({}, {}) {}x{}",
            bbox.label,
            bbox.confidence,
            x_min,
            y_min,
            rw,
            rh
        );

        for t in 0..LINE_WIDTH.min(rw / 2).min(rh / 2).max(1) {
            let inner = Rect::at(x_min + t as i32, y_min + t as i32)
                .of_size((rw - 2 * t).max(1), (rh - 2 * t).max(1));
            draw_hollow_rect_mut(image, inner, color);
        }
    }
}

/// Renders the detections over a copy of `image` and writes it to the scratch
/// convention under `scratch_root`.
pub fn save_annotated(
    image: &DynamicImage,
    detections: &[Detection],
    labels: &LabelTable,
    scratch_root: &Path,
) -> Result<PathBuf, DetectorError> {
    let mut canvas = image.to_rgb8();
    annotate(&mut canvas, detections, labels);

    let path = annotated_artifact_path(scratch_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    canvas.save(&path)?;
    tracing::debug!("Annotated image written to {}", path.display());

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::ColorLabel;
    use image::Rgb;

    #[test]
    fn test_annotate_draws_box_outline() {
        let mut image = RgbImage::new(20, 20);
        let labels = LabelTable::new(vec![ColorLabel {
            label: "cat".to_string(),
            red: 255,
            green: 0,
            blue: 0,
        }]);
        let detections = vec![Detection {
            class_id: 0,
            label: "cat".to_string(),
            confidence: 0.9,
            x1: 5.,
            y1: 5.,
            x2: 15.,
            y2: 15.,
        }];

        annotate(&mut image, &detections, &labels);

        assert_eq!(*image.get_pixel(5, 5), Rgb([255, 0, 0]));
        assert_eq!(*image.get_pixel(6, 10), Rgb([255, 0, 0]));
        assert_eq!(*image.get_pixel(10, 10), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_save_annotated_uses_scratch_convention() {
        let scratch = tempfile::tempdir().unwrap();
        let image = DynamicImage::new_rgb8(32, 16);

        let path = save_annotated(&image, &[], &LabelTable::default(), scratch.path()).unwrap();

        assert_eq!(path, scratch.path().join("detect/predict/image0.jpg"));
        let written = image::open(&path).unwrap();
        assert_eq!((written.width(), written.height()), (32, 16));
    }
}
