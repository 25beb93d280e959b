use rayon::prelude::*;

use crate::{assets::decode::DecodedImage, foundation::core::Rgba8};

/// Perceived brightness class of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Light,
    Dark,
}

/// Colors used to draw the markup layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextPalette {
    pub title: Rgba8,
    pub body: Rgba8,
    pub accent: Rgba8,
    pub panel: Rgba8,
}

impl Tone {
    /// Contrasting palette: light text over dark images and dark text over light ones.
    pub fn palette(self) -> TextPalette {
        match self {
            Tone::Dark => TextPalette {
                title: Rgba8::WHITE,
                body: Rgba8::rgb(0xe5, 0xe7, 0xeb),
                accent: Rgba8::rgb(0x93, 0xc5, 0xfd),
                panel: Rgba8::rgba(0, 0, 0, 0x73),
            },
            Tone::Light => TextPalette {
                title: Rgba8::rgb(0x11, 0x18, 0x27),
                body: Rgba8::rgb(0x37, 0x41, 0x51),
                accent: Rgba8::rgb(0x1d, 0x4e, 0xd8),
                panel: Rgba8::rgba(255, 255, 255, 0x8c),
            },
        }
    }
}

/// Alpha-weighted average color with `0..=1` channels. `None` for fully transparent images.
pub fn average_color(img: &DecodedImage) -> Option<[f64; 3]> {
    // sum(c * a / 255) / sum(a) is the alpha-weighted straight mean, already scaled to 0..1.
    let sums = img
        .rgba8_premul
        .par_chunks_exact(4)
        .fold(
            || [0u64; 4],
            |mut acc, px| {
                for (a, &c) in acc.iter_mut().zip(px) {
                    *a += u64::from(c);
                }
                acc
            },
        )
        .reduce(
            || [0u64; 4],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );

    if sums[3] == 0 {
        return None;
    }
    let alpha = sums[3] as f64;
    Some([
        sums[0] as f64 / alpha,
        sums[1] as f64 / alpha,
        sums[2] as f64 / alpha,
    ])
}

/// Relative luminosity in `[0, 1]` of an sRGB triple given in `0..=1` channels.
pub fn luminosity(rgb: [f64; 3]) -> f64 {
    (0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]).clamp(0.0, 1.0)
}

/// Classify `img` as [`Tone::Dark`] when its average luminosity is `<= 0.5`.
pub fn classify(img: &DecodedImage) -> Tone {
    let Some(avg) = average_color(img) else {
        return Tone::Light;
    };
    let l = luminosity(avg);
    let tone = if l <= 0.5 { Tone::Dark } else { Tone::Light };
    tracing::debug!(luminosity = l, ?tone, "classified image tone");
    tone
}

#[cfg(test)]
#[path = "../../tests/unit/assets/tone.rs"]
mod tests;
