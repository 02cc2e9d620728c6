//! Aspect-preserving resize onto a fixed, black canvas.
//!
//! Scaling always uses bilinear filtering so resized artifacts are
//! reproducible pixel for pixel.

use crate::{
    config::LetterboxConfig,
    error::PipelineError,
    naming::{base_name, resized_path, ArtifactPath, ArtifactRole},
};
use image::{
    imageops::{self, FilterType},
    DynamicImage, GenericImageView, ImageReader, RgbImage,
};
use std::path::Path;

const FILTER: FilterType = FilterType::Triangle;

/// Size of the scaled source and its offset on the target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterboxGeometry {
    pub new_width: u32,
    pub new_height: u32,
    pub pad_x: u32,
    pub pad_y: u32,
}

impl LetterboxGeometry {
    pub fn fit(source: (u32, u32), target: (u32, u32)) -> Result<Self, PipelineError> {
        let (src_w, src_h) = source;
        let (target_w, target_h) = target;
        if src_w == 0 || src_h == 0 {
            return Err(PipelineError::InvalidImage(format!(
                "source has a zero dimension: {}x{}",
                src_w, src_h
            )));
        }
        if target_w == 0 || target_h == 0 {
            return Err(PipelineError::InvalidImage(format!(
                "letterbox target has a zero dimension: {}x{}",
                target_w, target_h
            )));
        }

        let aspect = src_w as f64 / src_h as f64;
        let (new_width, new_height) = if aspect > target_w as f64 / target_h as f64 {
            (target_w, (target_w as f64 / aspect).round() as u32)
        } else {
            ((target_h as f64 * aspect).round() as u32, target_h)
        };
        let (new_width, new_height) = (new_width.min(target_w), new_height.min(target_h));

        if new_width == 0 || new_height == 0 {
            return Err(PipelineError::InvalidImage(format!(
                "{}x{} collapses to {}x{} on a {}x{} canvas",
                src_w, src_h, new_width, new_height, target_w, target_h
            )));
        }

        Ok(Self {
            new_width,
            new_height,
            pad_x: (target_w - new_width) / 2,
            pad_y: (target_h - new_height) / 2,
        })
    }
}

/// Decodes by content, falling back to the extension when the format cannot
/// be guessed.
pub(crate) fn load_image(path: &Path) -> Result<DynamicImage, PipelineError> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| PipelineError::io(path, e))?
        .decode()
        .map_err(|e| PipelineError::from_image(path, e))
}

pub fn letterbox(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
) -> Result<RgbImage, PipelineError> {
    let geometry = LetterboxGeometry::fit(image.dimensions(), (target_width, target_height))?;

    let scaled = image
        .resize_exact(geometry.new_width, geometry.new_height, FILTER)
        .to_rgb8();
    let mut canvas = RgbImage::new(target_width, target_height);
    imageops::replace(
        &mut canvas,
        &scaled,
        geometry.pad_x as i64,
        geometry.pad_y as i64,
    );

    Ok(canvas)
}

/// Loads an uploaded image, letterboxes it and saves it as `resize_<name>`
/// under `resized_dir`.
pub fn resize_with_padding(
    image_path: &Path,
    resized_dir: &Path,
    config: &LetterboxConfig,
) -> Result<ArtifactPath, PipelineError> {
    let image = load_image(image_path)?;
    let padded = letterbox(&image, config.target_width, config.target_height)?;

    let destination = resized_path(&base_name(&image_path.to_string_lossy()), resized_dir);
    padded
        .save(&destination)
        .map_err(|e| PipelineError::from_image(&destination, e))?;

    tracing::debug!(
        "Letterboxed {} ({}x{}) into {}",
        image_path.display(),
        image.width(),
        image.height(),
        destination.display()
    );

    Ok(ArtifactPath::new(ArtifactRole::Resized, destination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_exact_aspect_match_has_no_padding() {
        let geometry = LetterboxGeometry::fit((1920, 1080), (960, 540)).unwrap();

        assert_eq!(
            geometry,
            LetterboxGeometry {
                new_width: 960,
                new_height: 540,
                pad_x: 0,
                pad_y: 0,
            }
        );
    }

    #[test]
    fn test_wide_source_is_width_bound() {
        let geometry = LetterboxGeometry::fit((1000, 500), (960, 540)).unwrap();

        assert_eq!(geometry.new_width, 960);
        assert_eq!(geometry.new_height, 480);
        assert_eq!(geometry.pad_x, 0);
        assert_eq!(geometry.pad_y, 30);
    }

    #[test]
    fn test_tall_source_is_height_bound() {
        let geometry = LetterboxGeometry::fit((300, 600), (960, 540)).unwrap();

        assert_eq!(geometry.new_width, 270);
        assert_eq!(geometry.new_height, 540);
        assert_eq!(geometry.pad_x, 345);
        assert_eq!(geometry.pad_y, 0);
    }

    #[test]
    fn test_small_source_is_upscaled() {
        let geometry = LetterboxGeometry::fit((16, 9), (960, 540)).unwrap();

        assert_eq!((geometry.new_width, geometry.new_height), (960, 540));
    }

    #[test]
    fn test_odd_padding_leaves_remainder_bottom_right() {
        // 3x1 on 10x10 scales to 10x3, leaving 7 rows of padding.
        let geometry = LetterboxGeometry::fit((3, 1), (10, 10)).unwrap();

        assert_eq!((geometry.new_width, geometry.new_height), (10, 3));
        assert_eq!(geometry.pad_y, 3);
        assert_eq!(10 - geometry.new_height - geometry.pad_y, 4);
    }

    #[test]
    fn test_degenerate_aspect_is_rejected() {
        let err = LetterboxGeometry::fit((10_000, 1), (960, 540)).unwrap_err();

        assert!(matches!(err, PipelineError::InvalidImage(_)));
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        assert!(matches!(
            LetterboxGeometry::fit((0, 10), (960, 540)),
            Err(PipelineError::InvalidImage(_))
        ));
        assert!(matches!(
            LetterboxGeometry::fit((10, 10), (0, 540)),
            Err(PipelineError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_output_always_matches_target() {
        let sources = [(1, 1), (7, 3), (3, 7), (1920, 1080), (500, 1000), (641, 479)];
        for (w, h) in sources {
            let image = DynamicImage::new_rgb8(w, h);
            let out = letterbox(&image, 96, 54).unwrap();
            assert_eq!(out.dimensions(), (96, 54), "source {}x{}", w, h);

            let geometry = LetterboxGeometry::fit((w, h), (96, 54)).unwrap();
            let expected = geometry.new_width as f64 * h as f64 / w as f64;
            assert!(
                (geometry.new_height as f64 - expected).abs() <= 1.0,
                "source {}x{}",
                w,
                h
            );
        }
    }

    #[test]
    fn test_content_is_centered_on_black_canvas() {
        let white = RgbImage::from_pixel(100, 50, Rgb([255, 255, 255]));
        let image = DynamicImage::ImageRgb8(white);

        let out = letterbox(&image, 100, 100).unwrap();

        // 25 rows of padding above and below the 100x50 content.
        assert_eq!(*out.get_pixel(50, 10), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(50, 50), Rgb([255, 255, 255]));
        assert_eq!(*out.get_pixel(50, 90), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_resize_with_padding_writes_prefixed_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cat.png");
        RgbImage::new(40, 20).save(&source).unwrap();
        let resized_dir = dir.path().join("resized");
        std::fs::create_dir_all(&resized_dir).unwrap();
        let config = LetterboxConfig {
            target_width: 96,
            target_height: 54,
        };

        let artifact = resize_with_padding(&source, &resized_dir, &config).unwrap();

        assert_eq!(artifact.role, ArtifactRole::Resized);
        assert_eq!(artifact.path, resized_dir.join("resize_cat.png"));
        let written = image::open(&artifact.path).unwrap();
        assert_eq!(written.dimensions(), (96, 54));
    }

    #[test]
    fn test_resize_with_padding_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.png");
        std::fs::write(&source, b"not an image").unwrap();
        let config = LetterboxConfig {
            target_width: 96,
            target_height: 54,
        };

        let err = resize_with_padding(&source, dir.path(), &config).unwrap_err();

        assert!(matches!(err, PipelineError::InvalidImage(_)));
    }
}
