//! Local foreground/background merge.
//!
//! Produces the flat pixel composite that the remote edit collaborator
//! later blends photorealistically. Output dimensions always equal the
//! background's; the foreground is resized (aspect preserved) and
//! drawn center-anchored, clipped where it overhangs the canvas. Pure
//! and deterministic: identical inputs produce byte-identical PNG
//! output.

use std::io::Cursor;

use image::imageops::FilterType;

use crate::asset::ImageAsset;
use crate::placement::{BASE_FRACTION, Placement};
use crate::{WanderError, WanderResult};

pub fn merge(
    background: &ImageAsset,
    foreground: &ImageAsset,
    placement: Placement,
) -> WanderResult<ImageAsset> {
    let bg = background.decode()?;
    let fg = foreground.decode()?;
    let placement = placement.clamped();

    let (bg_w, bg_h) = bg.dimensions();
    let (fg_w, fg_h) = fg.dimensions();
    if fg_w == 0 || fg_h == 0 {
        return Err(WanderError::decode("foreground has zero dimensions"));
    }

    let draw_w = (bg_w as f32 * BASE_FRACTION * placement.scale)
        .round()
        .max(1.0) as u32;
    let draw_h = (draw_w as f32 * fg_h as f32 / fg_w as f32).round().max(1.0) as u32;

    let resized = image::imageops::resize(&fg, draw_w, draw_h, FilterType::Triangle);

    // Anchor denotes the foreground's visual center.
    let origin_x = (bg_w as f32 * placement.anchor_x - draw_w as f32 / 2.0).round() as i64;
    let origin_y = (bg_h as f32 * placement.anchor_y - draw_h as f32 / 2.0).round() as i64;

    let mut canvas = bg;
    image::imageops::overlay(&mut canvas, &resized, origin_x, origin_y);

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| WanderError::render(format!("encode composite png: {e}")))?;

    Ok(ImageAsset::new(out, "image/png"))
}
