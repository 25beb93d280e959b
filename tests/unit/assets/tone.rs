use super::*;

#[test]
fn black_is_dark_and_white_is_light() {
    assert_eq!(classify(&DecodedImage::solid(4, 4, Rgba8::BLACK)), Tone::Dark);
    assert_eq!(classify(&DecodedImage::solid(4, 4, Rgba8::WHITE)), Tone::Light);
}

#[test]
fn classification_is_deterministic() {
    let img = DecodedImage::solid(32, 16, Rgba8::rgb(120, 140, 90));
    let first = classify(&img);
    for _ in 0..8 {
        assert_eq!(classify(&img), first);
    }
}

#[test]
fn threshold_is_inclusive_for_dark() {
    // Mid gray 127/255 sits just under 0.5.
    assert_eq!(
        classify(&DecodedImage::solid(2, 2, Rgba8::rgb(127, 127, 127))),
        Tone::Dark
    );
    assert_eq!(
        classify(&DecodedImage::solid(2, 2, Rgba8::rgb(128, 128, 128))),
        Tone::Light
    );
}

#[test]
fn green_weighs_more_than_blue() {
    assert_eq!(
        classify(&DecodedImage::solid(2, 2, Rgba8::rgb(0, 255, 0))),
        Tone::Light
    );
    assert_eq!(
        classify(&DecodedImage::solid(2, 2, Rgba8::rgb(0, 0, 255))),
        Tone::Dark
    );
}

#[test]
fn average_ignores_transparent_pixels() {
    let mut img = DecodedImage::solid(2, 1, Rgba8::WHITE);
    // Second pixel fully transparent: premultiplied zeros.
    img.rgba8_premul[4..8].copy_from_slice(&[0, 0, 0, 0]);
    let avg = average_color(&img).unwrap();
    assert!(avg.iter().all(|c| (c - 1.0).abs() < 1e-9), "{avg:?}");

    let clear = DecodedImage::solid(3, 3, Rgba8::rgba(0, 0, 0, 0));
    assert_eq!(average_color(&clear), None);
    assert_eq!(classify(&clear), Tone::Light);
}

#[test]
fn luminosity_weights() {
    assert!((luminosity([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-9);
    assert!((luminosity([0.0, 1.0, 0.0]) - 0.7152).abs() < 1e-9);
    assert_eq!(luminosity([0.0, 0.0, 0.0]), 0.0);
}

#[test]
fn palettes_contrast_with_their_tone() {
    let dark = Tone::Dark.palette();
    let light = Tone::Light.palette();
    let lum = |c: Rgba8| {
        luminosity([
            f64::from(c.r) / 255.0,
            f64::from(c.g) / 255.0,
            f64::from(c.b) / 255.0,
        ])
    };
    assert!(lum(dark.title) > 0.5);
    assert!(lum(light.title) <= 0.5);
}
