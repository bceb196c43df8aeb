use image::GrayImage;
use imageproc::{
    contours::{find_contours, Contour},
    geometry::{approximate_polygon_dp, arc_length},
    rect::Rect,
};
use log::debug;
use logging_timer::time;

use crate::config::{AcceptancePolicy, DetectConfig, RetrievalMode};
use crate::error::{OmrError, Result};
use crate::geometry::{get_contour_bounding_rect, sort_in_reading_order};

/// Finds answer regions in a binary or edge image and returns them in
/// reading order, which is also question order.
#[time]
pub fn detect(img: &GrayImage, config: &DetectConfig) -> Result<Vec<Rect>> {
    let contours = find_contours::<u32>(img);
    debug!("found {} contours", contours.len());

    let regions = find_answer_regions(&contours, config);
    debug!(
        "accepted {} of {} contours as answer regions",
        regions.len(),
        contours.len()
    );

    if regions.is_empty() {
        return Err(OmrError::NoRegionsFound);
    }

    Ok(regions)
}

/// Filters contours down to the ones that could be answer regions and sorts
/// their bounding rects into reading order.
pub fn find_answer_regions(contours: &[Contour<u32>], config: &DetectConfig) -> Vec<Rect> {
    let mut rects = contours
        .iter()
        .filter(|contour| match config.retrieval {
            RetrievalMode::Tree => true,
            RetrievalMode::External => contour.parent.is_none(),
        })
        .filter_map(|contour| {
            let bounds = get_contour_bounding_rect(contour)?;
            contour_is_acceptable(contour, &bounds, &config.acceptance).then_some(bounds)
        })
        .collect::<Vec<Rect>>();

    sort_in_reading_order(&mut rects);
    rects
}

/// Determines whether a contour with the given bounds passes an acceptance
/// policy.
pub fn contour_is_acceptable(
    contour: &Contour<u32>,
    bounds: &Rect,
    policy: &AcceptancePolicy,
) -> bool {
    match *policy {
        AcceptancePolicy::SizeWindow { min, max } => {
            (min..=max).contains(&bounds.width()) && (min..=max).contains(&bounds.height())
        }
        AcceptancePolicy::Quadrilateral {
            min_size,
            epsilon_ratio,
        } => {
            bounds.width() > min_size
                && bounds.height() > min_size
                && is_contour_quadrilateral(contour, epsilon_ratio)
        }
    }
}

/// Determines whether a contour simplifies to a four-vertex polygon when
/// points closer than `epsilon_ratio` of its perimeter are dropped.
pub fn is_contour_quadrilateral(contour: &Contour<u32>, epsilon_ratio: f64) -> bool {
    if contour.points.len() < 4 {
        return false;
    }

    let epsilon = epsilon_ratio * arc_length(&contour.points, true);
    if epsilon <= 0.0 {
        return false;
    }

    approximate_polygon_dp(&contour.points, epsilon, true).len() == 4
}
