use std::path::Path;

use image::{DynamicImage, RgbImage};
use imageproc::rect::Rect;
use log::{debug, warn};
use logging_timer::time;

use crate::annotate::{annotate, AnnotateOptions};
use crate::classify::classify_regions;
use crate::config::PipelineConfig;
use crate::debug::ImageDebugWriter;
use crate::error::{OmrError, Result};
use crate::image_utils::crop;
use crate::preprocess::preprocess;
use crate::regions::detect;
use crate::types::AnswerList;

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub answers: AnswerList,
    /// Detected regions in answer area coordinates, in question order.
    pub regions: Vec<Rect>,
    /// The answer area within the capture.
    pub answer_area: Rect,
    /// The capture with every region outlined.
    pub annotated: RgbImage,
}

/// Loads a capture from disk as a color image. A file that cannot be decoded
/// is reported as [`OmrError::ImageOpen`], the unreadable-input form of an
/// invalid image.
pub fn load_form_image(path: &Path) -> Result<RgbImage> {
    image::open(path)
        .map(|img| img.into_rgb8())
        .map_err(|source| OmrError::ImageOpen {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads the answers marked on a captured form.
pub fn run_pipeline(img: &RgbImage, config: &PipelineConfig) -> Result<PipelineOutput> {
    run_pipeline_with(
        img,
        config,
        &AnnotateOptions::default(),
        &ImageDebugWriter::disabled(),
    )
}

#[time]
pub fn run_pipeline_with(
    img: &RgbImage,
    config: &PipelineConfig,
    annotate_options: &AnnotateOptions,
    debug_writer: &ImageDebugWriter,
) -> Result<PipelineOutput> {
    if img.width() == 0 || img.height() == 0 {
        return Err(OmrError::InvalidImage);
    }
    config.validate()?;

    let answer_area = find_answer_area(img, config);
    let area_image = crop(img, &answer_area);

    let processed = preprocess(&area_image, &config.preprocess)?;
    debug_writer.write("gray", || DynamicImage::ImageLuma8(processed.gray.clone()));
    if let Some(equalized) = &processed.equalized {
        debug_writer.write("equalized", || DynamicImage::ImageLuma8(equalized.clone()));
    }
    debug_writer.write("blurred", || DynamicImage::ImageLuma8(processed.blurred.clone()));
    debug_writer.write("threshold", || {
        DynamicImage::ImageLuma8(processed.threshold.clone())
    });
    debug_writer.write("canny", || DynamicImage::ImageLuma8(processed.edges.clone()));

    let regions = detect(processed.shapes(), &config.detect)?;

    let answers = classify_regions(
        &regions,
        processed.representation(config.classify.source),
        &config.options,
        &config.classify,
    );
    debug!("classified {} regions: {:?}", regions.len(), answers);

    let annotated = annotate(
        img,
        (answer_area.left(), answer_area.top()),
        &regions,
        &answers,
        annotate_options,
    );
    debug_writer.write("regions", || DynamicImage::ImageRgb8(annotated.clone()));

    Ok(PipelineOutput {
        answers,
        regions,
        answer_area,
        annotated,
    })
}

/// Gets the part of the capture to read answers from.
fn find_answer_area(img: &RgbImage, config: &PipelineConfig) -> Rect {
    let whole = Rect::at(0, 0).of_size(img.width(), img.height());
    match &config.roi {
        None => whole,
        Some(roi) => match roi.clamp_to(img.dimensions()) {
            Some(area) => {
                if area.width() != roi.width || area.height() != roi.height {
                    warn!(
                        "answer area {:?} clamped to {:?} for {}x{} image",
                        roi,
                        area,
                        img.width(),
                        img.height()
                    );
                }
                area
            }
            None => {
                warn!(
                    "answer area {:?} is outside {}x{} image, using whole image",
                    roi,
                    img.width(),
                    img.height()
                );
                whole
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassifyPolicy, ColumnBasis, RoiConfig, ShapeSource, Strategy};
    use crate::image_utils::RED;
    use crate::types::AnswerLabel::{Blank, A, B, C, E};
    use image::Rgb;
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use tempfile::tempdir;

    const PAPER: Rgb<u8> = Rgb([235, 235, 235]);
    const INK: Rgb<u8> = Rgb([25, 25, 25]);

    /// A 600px wide form with one marked bubble per row. Each option owns a
    /// 120px column.
    fn bubble_form(marked_columns: &[u32], top_margin: u32) -> RgbImage {
        let height = top_margin + 60 * marked_columns.len() as u32 + 20;
        let mut img = RgbImage::from_pixel(600, height, PAPER);
        for (row, &column) in marked_columns.iter().enumerate() {
            draw_filled_rect_mut(
                &mut img,
                Rect::at(column as i32 * 120 + 45, (top_margin + 20 + row as u32 * 60) as i32)
                    .of_size(30, 30),
                INK,
            );
        }
        img
    }

    /// Bubble preset reading each bubble's option from its position across
    /// the answer area.
    fn bubble_config(roi: Option<RoiConfig>) -> PipelineConfig {
        let mut config = PipelineConfig {
            roi,
            ..PipelineConfig::for_strategy(Strategy::BubbleThreshold)
        };
        config.classify.policy = ClassifyPolicy::Position {
            column_basis: ColumnBasis::AnswerArea,
        };
        config
    }

    #[test]
    fn test_reads_bubble_form() {
        let img = bubble_form(&[2, 0, 4, 1], 0);
        let output = run_pipeline(&img, &bubble_config(None)).unwrap();
        assert_eq!(output.answers, vec![C, A, E, B]);
        assert_eq!(output.regions.len(), 4);
        assert_eq!(output.annotated.dimensions(), img.dimensions());
    }

    #[test]
    fn test_reads_only_answer_area() {
        // a header with a bubble-sized blot above the answer area
        let mut img = bubble_form(&[3, 1], 100);
        draw_filled_rect_mut(&mut img, Rect::at(20, 20).of_size(40, 40), INK);
        let roi = RoiConfig {
            x: 0,
            y: 100,
            width: 600,
            height: 1000,
        };

        let output = run_pipeline(&img, &bubble_config(Some(roi))).unwrap();
        assert_eq!(output.answers.len(), 2);
        assert_eq!(output.answer_area, Rect::at(0, 100).of_size(600, 140));

        // outlines are drawn in capture coordinates
        let first = output.regions[0];
        assert!(first.top() < 40);
        assert_eq!(
            *output
                .annotated
                .get_pixel(first.left() as u32, first.top() as u32 + 100),
            RED
        );
    }

    #[test]
    fn test_zero_dimension_image_is_invalid() {
        assert!(matches!(
            run_pipeline(&RgbImage::new(0, 0), &PipelineConfig::default()),
            Err(OmrError::InvalidImage)
        ));
    }

    #[test]
    fn test_blank_page_has_no_regions() {
        let img = RgbImage::from_pixel(400, 300, PAPER);
        assert!(matches!(
            run_pipeline(&img, &bubble_config(None)),
            Err(OmrError::NoRegionsFound)
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = bubble_config(None);
        config.preprocess.blur_kernel_size = 2;
        assert!(matches!(
            run_pipeline(&bubble_form(&[0], 0), &config),
            Err(OmrError::InvalidConfig(_))
        ));
    }

    /// Three outlined answer boxes with 200px option columns. The first row
    /// marks B, the second is empty and the third marks E.
    fn boxed_form() -> RgbImage {
        let mut img = RgbImage::from_pixel(1100, 680, PAPER);
        let rows: [Option<i32>; 3] = [Some(1), None, Some(4)];
        for (row, mark) in rows.iter().enumerate() {
            let top = 20 + row as i32 * 220;
            for inset in 0..3 {
                let shrink = 2 * inset as u32;
                draw_hollow_rect_mut(
                    &mut img,
                    Rect::at(50 + inset, top + inset).of_size(1000 - shrink, 200 - shrink),
                    INK,
                );
            }
            if let Some(column) = mark {
                draw_filled_rect_mut(
                    &mut img,
                    Rect::at(50 + column * 200 + 40, top + 40).of_size(120, 120),
                    INK,
                );
            }
        }
        img
    }

    #[test]
    fn test_reads_boxed_rows_with_box_edges_preset() {
        let config = PipelineConfig {
            roi: None,
            ..PipelineConfig::for_strategy(Strategy::BoxEdges)
        };

        let output = run_pipeline(&boxed_form(), &config).unwrap();
        assert_eq!(output.regions.len(), 3);
        for region in &output.regions {
            // the traced edge sits on or just outside the drawn outline
            assert!((1000..=1004).contains(&region.width()), "{:?}", region);
            assert!((200..=204).contains(&region.height()), "{:?}", region);
        }
        assert!(output.regions.windows(2).all(|w| w[0].top() < w[1].top()));
        assert_eq!(output.answers, vec![B, Blank, E]);
    }

    #[test]
    fn test_reads_boxed_rows_traced_in_threshold_image() {
        let mut config = PipelineConfig {
            roi: None,
            ..PipelineConfig::for_strategy(Strategy::BoxEdges)
        };
        config.preprocess.shape_source = ShapeSource::Threshold;

        let output = run_pipeline(&boxed_form(), &config).unwrap();
        assert_eq!(output.regions.len(), 3);
        assert_eq!(output.answers, vec![B, Blank, E]);
    }

    #[test]
    fn test_writes_debug_images() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("form.png");
        let writer = ImageDebugWriter::new(input);
        run_pipeline_with(
            &bubble_form(&[0, 1], 0),
            &bubble_config(None),
            &AnnotateOptions::default(),
            &writer,
        )
        .unwrap();

        for label in ["gray", "blurred", "threshold", "canny", "regions"] {
            assert!(
                dir.path().join(format!("form_debug_{}.png", label)).exists(),
                "{} debug image",
                label
            );
        }
        assert!(!dir.path().join("form_debug_equalized.png").exists());
    }

    #[test]
    fn test_load_form_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("form.png");
        bubble_form(&[0], 0).save(&path).unwrap();
        assert_eq!(load_form_image(&path).unwrap().dimensions(), (600, 80));

        assert!(matches!(
            load_form_image(&dir.path().join("missing.png")),
            Err(OmrError::ImageOpen { .. })
        ));

        let garbage = dir.path().join("garbage.png");
        std::fs::write(&garbage, b"not an image").unwrap();
        let err = load_form_image(&garbage).unwrap_err();
        assert!(matches!(err, OmrError::ImageOpen { .. }));
        assert!(err.is_invalid_image());
        assert!(OmrError::InvalidImage.is_invalid_image());
        assert!(!OmrError::NoRegionsFound.is_invalid_image());
    }
}
