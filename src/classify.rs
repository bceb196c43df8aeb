use image::GrayImage;
use imageproc::rect::Rect;
use log::debug;
use logging_timer::time;
use rayon::prelude::*;

use crate::config::{ClassifyConfig, ClassifyPolicy, ColumnBasis};
use crate::geometry::center_of_rect;
use crate::image_utils::fill_percentage;
use crate::types::{AnswerLabel, AnswerList};

/// Determines which option, if any, is marked in a region.
///
/// Both policies split a width into `options.len()` columns using integer
/// division. Any remainder is a strip at the right edge that belongs to no
/// column: the last column ends `width % options.len()` pixels short of the
/// right edge and a center falling in that strip reads as blank.
pub fn classify(
    region: &Rect,
    img: &GrayImage,
    options: &[AnswerLabel],
    config: &ClassifyConfig,
) -> AnswerLabel {
    match config.policy {
        ClassifyPolicy::Position { column_basis } => {
            let span = match column_basis {
                ColumnBasis::Region => region.width(),
                ColumnBasis::AnswerArea => img.width(),
            };
            classify_by_position(region, span, options)
        }
        ClassifyPolicy::FillRatio { threshold } => {
            classify_by_fill_ratio(region, img, options, threshold)
        }
    }
}

/// Classifies every region, keeping region order.
#[time]
pub fn classify_regions(
    regions: &[Rect],
    img: &GrayImage,
    options: &[AnswerLabel],
    config: &ClassifyConfig,
) -> AnswerList {
    regions
        .par_iter()
        .map(|region| classify(region, img, options, config))
        .collect()
}

/// Reads the answer from where the region sits horizontally. `span` is split
/// into `options.len()` columns and the region's center x, in answer area
/// coordinates, is divided by the column width to get the option index.
pub fn classify_by_position(region: &Rect, span: u32, options: &[AnswerLabel]) -> AnswerLabel {
    if options.is_empty() {
        return AnswerLabel::Blank;
    }

    let column_width = span / options.len() as u32;
    if column_width == 0 {
        return AnswerLabel::Blank;
    }

    let x_center = center_of_rect(region).x;
    if x_center < 0.0 {
        return AnswerLabel::Blank;
    }

    let index = (x_center / column_width as f32) as usize;
    options.get(index).copied().unwrap_or(AnswerLabel::Blank)
}

/// Splits the region into one column per option and picks the column with
/// the most foreground. Ties go to the leftmost column. The result is blank
/// unless the winner's fill percentage is above `threshold`.
pub fn classify_by_fill_ratio(
    region: &Rect,
    img: &GrayImage,
    options: &[AnswerLabel],
    threshold: f32,
) -> AnswerLabel {
    let fills = column_fill_percentages(region, img, options.len());
    if fills.is_empty() {
        return AnswerLabel::Blank;
    }

    let (best_index, best_fill) = fills
        .iter()
        .enumerate()
        .fold((0, fills[0]), |(best_index, best_fill), (i, &fill)| {
            if fill > best_fill {
                (i, fill)
            } else {
                (best_index, best_fill)
            }
        });

    debug!(
        "region at ({}, {}) column fills {:?}, best column {} at {:.1}%",
        region.left(),
        region.top(),
        fills,
        best_index,
        best_fill
    );

    if best_fill > threshold {
        options[best_index]
    } else {
        AnswerLabel::Blank
    }
}

/// Gets the foreground percentage of each of `count` equal-width columns of
/// the region, left to right. Returns nothing if the columns would be empty.
pub fn column_fill_percentages(region: &Rect, img: &GrayImage, count: usize) -> Vec<f32> {
    if count == 0 {
        return vec![];
    }

    let column_width = region.width() / count as u32;
    if column_width == 0 {
        return vec![];
    }

    (0..count as u32)
        .map(|i| {
            let column = Rect::at(region.left() + (i * column_width) as i32, region.top())
                .of_size(column_width, region.height());
            fill_percentage(img, &column)
        })
        .collect()
}
