use image::{imageops, GrayImage, Luma, Rgb, RgbImage};
use imageproc::rect::Rect;

pub const WHITE: Luma<u8> = Luma([u8::MAX]);
pub const BLACK: Luma<u8> = Luma([u8::MIN]);

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const DARK_GREEN: Rgb<u8> = Rgb([0, 127, 0]);
pub const WHITE_RGB: Rgb<u8> = Rgb([255, 255, 255]);

/// Copies the given area out of a color image.
pub fn crop(img: &RgbImage, area: &Rect) -> RgbImage {
    imageops::crop_imm(
        img,
        area.left() as u32,
        area.top() as u32,
        area.width(),
        area.height(),
    )
    .to_image()
}

/// Determines the number of non-zero pixels of `img` inside `area`. The
/// parts of `area` outside the image are not counted.
pub fn count_foreground(img: &GrayImage, area: &Rect) -> u32 {
    let left = area.left().max(0) as u32;
    let top = area.top().max(0) as u32;
    let right = (area.right() + 1).max(0) as u32;
    let bottom = (area.bottom() + 1).max(0) as u32;

    let mut count = 0;
    for y in top..bottom.min(img.height()) {
        for x in left..right.min(img.width()) {
            if *img.get_pixel(x, y) != BLACK {
                count += 1;
            }
        }
    }
    count
}

/// Determines the percentage of `area` covered by non-zero pixels of `img`.
pub fn fill_percentage(img: &GrayImage, area: &Rect) -> f32 {
    let total = area.width() * area.height();
    count_foreground(img, area) as f32 * 100.0 / total as f32
}
