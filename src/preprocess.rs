use image::{imageops, GrayImage, RgbImage};
use imageproc::{contrast, edges::canny, filter::gaussian_blur_f32};
use log::debug;
use logging_timer::time;

use crate::config::{PreprocessConfig, ShapeSource};
use crate::error::{OmrError, Result};

/// Single-channel representations derived from one capture.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub gray: GrayImage,
    pub equalized: Option<GrayImage>,
    pub blurred: GrayImage,
    pub threshold: GrayImage,
    pub edges: GrayImage,
    pub shape_source: ShapeSource,
}

impl ProcessedImage {
    pub fn representation(&self, source: ShapeSource) -> &GrayImage {
        match source {
            ShapeSource::Threshold => &self.threshold,
            ShapeSource::Edges => &self.edges,
        }
    }

    /// The representation shapes are detected in.
    pub fn shapes(&self) -> &GrayImage {
        self.representation(self.shape_source)
    }
}

/// Converts a color capture into grayscale, blurred, binary and edge images.
#[time]
pub fn preprocess(img: &RgbImage, config: &PreprocessConfig) -> Result<ProcessedImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(OmrError::InvalidImage);
    }

    let gray = imageops::grayscale(img);

    let equalized = if config.equalize {
        Some(contrast::equalize_histogram(&gray))
    } else {
        None
    };

    let sigma = config.blur_sigma();
    let blurred = gaussian_blur_f32(equalized.as_ref().unwrap_or(&gray), sigma);

    let mut threshold = contrast::threshold(&blurred, config.threshold);
    if config.invert {
        imageops::invert(&mut threshold);
    }

    let edges = canny(&blurred, config.canny_low, config.canny_high);

    debug!(
        "preprocessed {}x{} image (equalize={}, sigma={:.2}, threshold={}, canny={}/{})",
        img.width(),
        img.height(),
        config.equalize,
        sigma,
        config.threshold,
        config.canny_low,
        config.canny_high
    );

    Ok(ProcessedImage {
        gray,
        equalized,
        blurred,
        threshold,
        edges,
        shape_source: config.shape_source,
    })
}
