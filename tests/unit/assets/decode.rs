use std::io::Cursor;

use super::*;

fn png_bytes(img: RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn solid_png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    png_bytes(RgbaImage::from_pixel(w, h, image::Rgba(px)))
}

#[test]
fn decode_image_png_dimensions() {
    let img = decode_image(&solid_png(3, 2, [10, 20, 30, 255])).unwrap();
    assert_eq!((img.width(), img.height()), (3, 2));
}

#[test]
fn unknown_bytes_are_unsupported_format() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, OgError::UnsupportedFormat(_)), "{err}");
    assert!(err.is_recoverable());

    let err = decode_image(&[]).unwrap_err();
    assert!(matches!(err, OgError::UnsupportedFormat(_)), "{err}");
}

#[test]
fn truncated_png_is_decode_error() {
    let mut bytes = solid_png(16, 16, [1, 2, 3, 255]);
    bytes.truncate(bytes.len() / 2);
    let err = decode_image(&bytes).unwrap_err();
    assert!(matches!(err, OgError::Decode(_)), "{err}");
}

#[test]
fn from_straight_premultiplies() {
    let img = RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();
    let prepared = DecodedImage::from_straight(img);
    assert_eq!(
        prepared.rgba8_premul,
        vec![
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn cover_fills_every_target_pixel() {
    let bytes = solid_png(400, 200, [200, 10, 10, 255]);
    let target = PixelRect::new(0, 0, 100, 100);
    let out = normalize(&bytes, target, FitMode::Cover, NormalizeOpts::default()).unwrap();

    assert_eq!((out.width, out.height), (100, 100));
    assert!(out.rgba8_premul.chunks_exact(4).all(|px| px[3] == 255));
    assert_eq!(out.coverage_bounds(), Some(PixelRect::new(0, 0, 100, 100)));
}

#[test]
fn cover_crops_around_the_center() {
    // 200x100: left half red, right half blue. A 100x100 cover keeps the middle 100 columns.
    let img = RgbaImage::from_fn(200, 100, |x, _| {
        if x < 100 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 255, 255])
        }
    });
    let out = normalize(
        &png_bytes(img),
        PixelRect::new(0, 0, 100, 100),
        FitMode::Cover,
        NormalizeOpts::default(),
    )
    .unwrap();

    let left = out.pixel(10, 50).unwrap();
    let right = out.pixel(90, 50).unwrap();
    assert!(left[0] > 200 && left[2] < 50, "{left:?}");
    assert!(right[2] > 200 && right[0] < 50, "{right:?}");
}

#[test]
fn contain_never_crops_and_pads_transparently() {
    let bytes = solid_png(400, 200, [10, 200, 10, 255]);
    let target = PixelRect::new(920, 40, 100, 100);
    let out = normalize(&bytes, target, FitMode::Contain, NormalizeOpts::default()).unwrap();

    assert_eq!((out.width, out.height), (100, 100));
    let bounds = out.coverage_bounds().unwrap();
    assert_eq!(bounds, PixelRect::new(0, 25, 100, 50));
    assert_eq!(out.pixel(50, 0).unwrap()[3], 0);
    assert_eq!(out.pixel(50, 99).unwrap()[3], 0);
}

#[test]
fn contain_without_upscale_keeps_native_size() {
    let bytes = solid_png(10, 10, [0, 0, 0, 255]);
    let opts = NormalizeOpts {
        allow_upscale: false,
        flatten: None,
    };
    let out = normalize(&bytes, PixelRect::new(0, 0, 100, 100), FitMode::Contain, opts).unwrap();
    assert_eq!(out.coverage_bounds(), Some(PixelRect::new(45, 45, 10, 10)));

    let upscaled = normalize(
        &bytes,
        PixelRect::new(0, 0, 100, 100),
        FitMode::Contain,
        NormalizeOpts::default(),
    )
    .unwrap();
    assert_eq!(
        upscaled.coverage_bounds(),
        Some(PixelRect::new(0, 0, 100, 100))
    );
}

#[test]
fn flatten_removes_transparency() {
    let bytes = solid_png(8, 8, [0, 0, 0, 0]);
    let opts = NormalizeOpts {
        allow_upscale: true,
        flatten: Some(Rgba8::WHITE),
    };
    let out = normalize(&bytes, PixelRect::new(0, 0, 8, 8), FitMode::Cover, opts).unwrap();
    assert!(
        out.rgba8_premul
            .chunks_exact(4)
            .all(|px| px == [255, 255, 255, 255])
    );
}

#[test]
fn empty_target_is_rejected() {
    let bytes = solid_png(8, 8, [0, 0, 0, 255]);
    let err = normalize(
        &bytes,
        PixelRect::new(0, 0, 0, 8),
        FitMode::Cover,
        NormalizeOpts::default(),
    )
    .unwrap_err();
    assert!(matches!(err, OgError::Validation(_)));
}

#[test]
fn solid_and_pixel_lookup() {
    let img = DecodedImage::solid(2, 2, Rgba8::rgb(1, 2, 3));
    assert_eq!(img.pixel(1, 1), Some([1, 2, 3, 255]));
    assert_eq!(img.pixel(2, 0), None);
}
