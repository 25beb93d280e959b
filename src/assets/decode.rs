use std::io::Cursor;

use image::{DynamicImage, ImageError, RgbaImage, imageops::FilterType};

use crate::foundation::{
    core::{FitMode, PixelRect, Rgba8},
    error::{OgError, OgResult},
};

/// Owned raster in premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

impl DecodedImage {
    /// Take ownership of a straight-alpha RGBA image and premultiply it.
    pub fn from_straight(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut rgba8_premul = img.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Self {
            width,
            height,
            rgba8_premul,
        }
    }

    /// Solid image, mostly useful for tests and placeholders.
    pub fn solid(width: u32, height: u32, color: Rgba8) -> Self {
        let px = color.to_premul();
        let rgba8_premul = px
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 4)
            .collect();
        Self {
            width,
            height,
            rgba8_premul,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8_premul.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Bounding box of all pixels with non-zero alpha.
    pub fn coverage_bounds(&self) -> Option<PixelRect> {
        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0u32, 0u32);
        let mut any = false;
        for (i, px) in self.rgba8_premul.chunks_exact(4).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let x = (i % self.width as usize) as u32;
            let y = (i / self.width as usize) as u32;
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
            any = true;
        }
        any.then(|| PixelRect::new(min.0, min.1, max.0 - min.0 + 1, max.1 - min.1 + 1))
    }
}

/// Options applied by [`normalize`] after the fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizeOpts {
    /// Contain-fit may scale small sources up to the target.
    pub allow_upscale: bool,
    /// Composite transparent pixels over this color (alpha ignored).
    pub flatten: Option<Rgba8>,
}

impl Default for NormalizeOpts {
    fn default() -> Self {
        Self {
            allow_upscale: true,
            flatten: None,
        }
    }
}

/// Decode encoded image bytes into a straight-alpha [`DynamicImage`].
///
/// Unrecognized encodings map to [`OgError::UnsupportedFormat`], malformed data to
/// [`OgError::Decode`].
pub fn decode_image(bytes: &[u8]) -> OgResult<DynamicImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OgError::decode(format!("read image header: {e}")))?;
    if reader.format().is_none() {
        return Err(OgError::unsupported_format("unrecognized image encoding"));
    }

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(u) => OgError::unsupported_format(u.to_string()),
        other => OgError::decode(other.to_string()),
    })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(OgError::decode("image has zero width or height"));
    }
    Ok(img)
}

/// Decode `bytes` and fit them to `target`'s dimensions.
///
/// The result is always exactly `target.w x target.h`:
///
/// - [`FitMode::Cover`] scales until the target is covered and center-crops the excess.
/// - [`FitMode::Contain`] scales until the image fits, centers it, and leaves transparent
///   padding. With `allow_upscale = false` a source that already fits keeps its native size.
pub fn normalize(
    bytes: &[u8],
    target: PixelRect,
    fit: FitMode,
    opts: NormalizeOpts,
) -> OgResult<DecodedImage> {
    let img = decode_image(bytes)?;
    fit_image(&img, target, fit, opts)
}

/// Fit an already decoded image; see [`normalize`].
pub fn fit_image(
    img: &DynamicImage,
    target: PixelRect,
    fit: FitMode,
    opts: NormalizeOpts,
) -> OgResult<DecodedImage> {
    if target.is_empty() {
        return Err(OgError::validation("normalize target must be non-empty"));
    }

    let mut fitted = match fit {
        FitMode::Cover => img
            .resize_to_fill(target.w, target.h, FilterType::CatmullRom)
            .to_rgba8(),
        FitMode::Contain => contain(img, target.w, target.h, opts.allow_upscale),
    };

    if let Some(bg) = opts.flatten {
        flatten_in_place(&mut fitted, bg);
    }

    Ok(DecodedImage::from_straight(fitted))
}

fn contain(img: &DynamicImage, w: u32, h: u32, allow_upscale: bool) -> RgbaImage {
    let (sw, sh) = (f64::from(img.width()), f64::from(img.height()));
    let mut scale = (f64::from(w) / sw).min(f64::from(h) / sh);
    if !allow_upscale {
        scale = scale.min(1.0);
    }

    let nw = ((sw * scale).round() as u32).clamp(1, w);
    let nh = ((sh * scale).round() as u32).clamp(1, h);
    let scaled = if (nw, nh) == (img.width(), img.height()) {
        img.to_rgba8()
    } else {
        img.resize_exact(nw, nh, FilterType::CatmullRom).to_rgba8()
    };

    let mut out = RgbaImage::new(w, h);
    image::imageops::replace(
        &mut out,
        &scaled,
        i64::from((w - nw) / 2),
        i64::from((h - nh) / 2),
    );
    out
}

fn flatten_in_place(img: &mut RgbaImage, bg: Rgba8) {
    fn mix(c: u8, b: u8, a: u16) -> u8 {
        ((u16::from(c) * a + u16::from(b) * (255 - a) + 127) / 255) as u8
    }

    for px in img.pixels_mut() {
        let a = u16::from(px[3]);
        px.0 = [mix(px[0], bg.r, a), mix(px[1], bg.g, a), mix(px[2], bg.b, a), 255];
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
