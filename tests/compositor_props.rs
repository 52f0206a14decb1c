use std::io::Cursor;

use image::RgbaImage;
use wanderframe::{BASE_FRACTION, ImageAsset, Placement, merge};

const BLUE: [u8; 4] = [0, 0, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn solid_asset(w: u32, h: u32, px: [u8; 4]) -> ImageAsset {
    let img = RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageAsset::new(buf, "image/png")
}

fn red_width_in_row(asset: &ImageAsset, y: u32) -> usize {
    let px = asset.decode().unwrap();
    (0..px.width()).filter(|&x| px.get_pixel(x, y).0 == RED).count()
}

#[test]
fn scale_multiplies_the_base_width_fraction() {
    let bg = solid_asset(400, 300, BLUE);
    let fg = solid_asset(60, 60, RED);

    let half = merge(&bg, &fg, Placement::new(0.5, 0.5, 0.5)).unwrap();
    let double = merge(&bg, &fg, Placement::new(0.5, 0.5, 2.0)).unwrap();

    let base = 400.0 * BASE_FRACTION;
    assert_eq!(red_width_in_row(&half, 150), (base * 0.5).round() as usize);
    assert_eq!(red_width_in_row(&double, 150), (base * 2.0).round() as usize);
}

#[test]
fn edge_anchor_clips_the_overhang() {
    let bg = solid_asset(200, 200, BLUE);
    let fg = solid_asset(40, 40, RED);

    // Centered on the right edge: only the left half of the foreground
    // lands on the canvas.
    let out = merge(&bg, &fg, Placement::new(1.0, 0.5, 1.0)).unwrap();
    let px = out.decode().unwrap();
    assert_eq!(px.dimensions(), (200, 200));
    assert_eq!(px.get_pixel(199, 100).0, RED);
    assert_eq!(px.get_pixel(100, 100).0, BLUE);

    let visible = red_width_in_row(&out, 100);
    let full = (200.0 * BASE_FRACTION).round() as usize;
    assert!(visible < full);
    assert!(visible >= full / 2 - 1);
}

#[test]
fn oversized_foreground_never_grows_the_canvas() {
    let bg = solid_asset(64, 48, BLUE);
    let fg = solid_asset(1024, 768, RED);
    let out = merge(&bg, &fg, Placement::new(0.5, 0.5, 2.0)).unwrap();
    assert_eq!(out.decode().unwrap().dimensions(), (64, 48));
}

#[test]
fn composite_is_a_png_asset() {
    let bg = solid_asset(30, 30, BLUE);
    let fg = solid_asset(10, 10, RED);
    let out = merge(&bg, &fg, Placement::default()).unwrap();
    assert_eq!(out.mime(), "image/png");
    // And round-trips through the asset constructors unchanged.
    let rebuilt = ImageAsset::from_bytes(out.bytes().to_vec()).unwrap();
    assert_eq!(rebuilt.mime(), "image/png");
}

#[test]
fn transparent_foreground_pixels_leave_background_visible() {
    let bg = solid_asset(100, 100, BLUE);
    let fg = solid_asset(20, 20, [255, 0, 0, 0]);
    let out = merge(&bg, &fg, Placement::default()).unwrap();
    let px = out.decode().unwrap();
    assert_eq!(px.get_pixel(50, 50).0, BLUE);
}
