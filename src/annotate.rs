use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
    rect::Rect,
};
use rusttype::{Font, Scale};

use crate::error::{OmrError, Result};
use crate::geometry::translate_rect;
use crate::image_utils::{DARK_GREEN, RED, WHITE_RGB};
use crate::types::AnswerLabel;

#[derive(Clone, Default)]
pub struct AnnotateOptions {
    /// Font for question labels. Without one, regions are only outlined.
    pub font: Option<Font<'static>>,
}

impl AnnotateOptions {
    pub fn with_font_file(path: &Path) -> Result<Self> {
        Ok(Self {
            font: Some(load_font(path)?),
        })
    }
}

pub fn load_font(path: &Path) -> Result<Font<'static>> {
    let bytes = std::fs::read(path).map_err(|e| {
        OmrError::InvalidConfig(format!("reading font {}: {}", path.display(), e))
    })?;
    Font::try_from_vec(bytes)
        .ok_or_else(|| OmrError::InvalidConfig(format!("{} is not a valid font", path.display())))
}

/// Draws the detected regions onto a copy of the capture. `origin` is where
/// the answer area the regions were found in sits within `img`.
pub fn annotate(
    img: &RgbImage,
    origin: (i32, i32),
    regions: &[Rect],
    answers: &[AnswerLabel],
    options: &AnnotateOptions,
) -> RgbImage {
    let mut canvas = img.clone();
    let (dx, dy) = origin;

    for rect in regions {
        let rect = translate_rect(rect, dx, dy);
        draw_hollow_rect_mut(&mut canvas, rect, RED);
        let inner_width = rect.width().saturating_sub(2).max(1);
        let inner_height = rect.height().saturating_sub(2).max(1);
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(rect.left() + 1, rect.top() + 1).of_size(inner_width, inner_height),
            RED,
        );
    }

    if let Some(font) = &options.font {
        let scale = Scale::uniform(18.0);
        for (i, (rect, answer)) in regions.iter().zip(answers).enumerate() {
            let rect = translate_rect(rect, dx, dy);
            let text = format!("{}:{}", i + 1, answer);
            let (_, text_height) = text_size(scale, font, &text);
            draw_text_with_background_mut(
                &mut canvas,
                &text,
                rect.left(),
                (rect.top() - text_height - 2).max(0),
                scale,
                font,
                DARK_GREEN,
                WHITE_RGB,
            );
        }
    }

    canvas
}

#[allow(clippy::too_many_arguments)]
fn draw_text_with_background_mut(
    canvas: &mut RgbImage,
    text: &str,
    x: i32,
    y: i32,
    scale: Scale,
    font: &Font,
    text_color: Rgb<u8>,
    background_color: Rgb<u8>,
) {
    let (text_width, text_height) = text_size(scale, font, text);
    if text_width <= 0 || text_height <= 0 {
        return;
    }

    draw_filled_rect_mut(
        canvas,
        Rect::at(x, y).of_size(text_width as u32, text_height as u32),
        background_color,
    );
    draw_text_mut(canvas, text_color, x, y, scale, font, text);
}
