//! Raster primitives used to build the card.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use rusttype::{point, Font, Scale};

/// Scales `source` to `size`×`size` and masks it to the inscribed circle.
/// Pixels outside the circle become fully transparent, pixels inside fully opaque.
pub fn circular_avatar(source: &DynamicImage, size: u32) -> RgbaImage {
    let mut avatar = source
        .resize_exact(size, size, FilterType::Lanczos3)
        .to_rgba8();

    let radius = size as f32 / 2.0;
    for (x, y, pixel) in avatar.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        pixel.0[3] = if dx * dx + dy * dy <= radius * radius {
            255
        } else {
            0
        };
    }
    avatar
}

pub fn fit_background(background: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(&background.to_rgba8(), width, height, FilterType::Lanczos3)
}

/// Draws `text` with its top-left at (`x`, `y`).
pub fn draw_text(
    img: &mut RgbaImage,
    font: &Font<'static>,
    px: f32,
    x: i32,
    y: i32,
    color: Rgba<u8>,
    text: &str,
) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let origin = point(x as f32, y as f32 + v_metrics.ascent);

    for glyph in font.layout(text, scale, origin) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, v| {
            let px = gx as i32 + bb.min.x;
            let py = gy as i32 + bb.min.y;
            if px < 0 || py < 0 || px as u32 >= img.width() || py as u32 >= img.height() {
                return;
            }
            if v <= 0.0 {
                return;
            }
            blend(img.get_pixel_mut(px as u32, py as u32), color, v.min(1.0));
        });
    }
}

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, alpha: f32) {
    let inv = 1.0 - alpha;
    for channel in 0..3 {
        dst.0[channel] = (src.0[channel] as f32 * alpha + dst.0[channel] as f32 * inv).round() as u8;
    }
    dst.0[3] = 255;
}
