use std::io::Cursor;

use rayon::prelude::*;

use crate::{
    assets::decode::DecodedImage,
    foundation::{
        core::{Canvas, Rgba8},
        error::{OgError, OgResult},
    },
    text::markup::MarkupLayer,
};

pub const PNG_CONTENT_TYPE: &str = "image/png";

pub type PremulRgba8 = [u8; 4];

/// Bottom layer of every stack.
#[derive(Clone, Debug, PartialEq)]
pub enum BackgroundFill {
    Flat(Rgba8),
    /// Vertical gradient, `from` on the first row.
    Gradient { from: Rgba8, to: Rgba8 },
    /// Full-bleed photo, already fitted to the canvas.
    Photo(DecodedImage),
}

/// Raster placed at a top/left offset on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterOverlay {
    pub image: DecodedImage,
    pub left: u32,
    pub top: u32,
}

/// One entry of a [`LayerStack`], bottom to top.
#[derive(Clone, Copy, Debug)]
pub enum CompositeLayer<'a> {
    Background(&'a BackgroundFill),
    Raster(&'a RasterOverlay),
    Markup(&'a MarkupLayer),
}

/// Ordered layers for one card: background first, raster overlays in push order, markup last.
#[derive(Clone, Debug)]
pub struct LayerStack {
    background: BackgroundFill,
    overlays: Vec<RasterOverlay>,
    markup: Option<MarkupLayer>,
}

impl LayerStack {
    pub fn new(background: BackgroundFill) -> Self {
        Self {
            background,
            overlays: Vec::new(),
            markup: None,
        }
    }

    pub fn push_overlay(&mut self, overlay: RasterOverlay) {
        self.overlays.push(overlay);
    }

    pub fn set_markup(&mut self, markup: MarkupLayer) {
        self.markup = Some(markup);
    }

    pub fn background(&self) -> &BackgroundFill {
        &self.background
    }

    pub fn overlays(&self) -> &[RasterOverlay] {
        &self.overlays
    }

    pub fn markup(&self) -> Option<&MarkupLayer> {
        self.markup.as_ref()
    }

    /// Whether any layer carries photo pixels.
    pub fn has_photo(&self) -> bool {
        matches!(self.background, BackgroundFill::Photo(_)) || !self.overlays.is_empty()
    }

    /// Layers in z-order, bottom to top.
    pub fn layers(&self) -> impl Iterator<Item = CompositeLayer<'_>> {
        std::iter::once(CompositeLayer::Background(&self.background))
            .chain(self.overlays.iter().map(CompositeLayer::Raster))
            .chain(self.markup.iter().map(CompositeLayer::Markup))
    }
}

/// Encoded card image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderResult {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Flatten `stack` onto `canvas` and encode a PNG. No IO.
pub fn compose(
    stack: &LayerStack,
    canvas: Canvas,
    svg_opts: &usvg::Options<'_>,
) -> OgResult<RenderResult> {
    let frame = compose_pixels(stack, canvas, svg_opts)?;
    let bytes = encode_png(&frame)?;
    Ok(RenderResult {
        bytes,
        content_type: PNG_CONTENT_TYPE,
        width: frame.width,
        height: frame.height,
    })
}

/// Flatten `stack` into a premultiplied canvas without encoding.
pub fn compose_pixels(
    stack: &LayerStack,
    canvas: Canvas,
    svg_opts: &usvg::Options<'_>,
) -> OgResult<DecodedImage> {
    let mut frame = DecodedImage {
        width: canvas.width,
        height: canvas.height,
        rgba8_premul: vec![0u8; canvas.byte_len()?],
    };

    for layer in stack.layers() {
        match layer {
            CompositeLayer::Background(fill) => fill_background(&mut frame, fill),
            CompositeLayer::Raster(o) => blit_over(&mut frame, &o.image, o.left, o.top),
            CompositeLayer::Markup(m) => {
                let tree = usvg::Tree::from_str(&m.svg, svg_opts)
                    .map_err(|e| OgError::encode(format!("parse markup layer: {e}")))?;
                let layer = rasterize_svg(&tree, canvas)?;
                blit_over(&mut frame, &layer, 0, 0);
            }
        }
    }

    Ok(frame)
}

fn fill_background(frame: &mut DecodedImage, fill: &BackgroundFill) {
    let stride = frame.width as usize * 4;
    let height = frame.height.max(1);
    match fill {
        BackgroundFill::Flat(c) => {
            let px = c.to_premul();
            frame
                .rgba8_premul
                .par_chunks_exact_mut(4)
                .for_each(|d| d.copy_from_slice(&px));
        }
        BackgroundFill::Gradient { from, to } => {
            let (from, to) = (*from, *to);
            frame
                .rgba8_premul
                .par_chunks_mut(stride)
                .enumerate()
                .for_each(|(y, row)| {
                    let t = if height > 1 {
                        y as f32 / (height - 1) as f32
                    } else {
                        0.0
                    };
                    let px = lerp_rgba(from, to, t).to_premul();
                    for d in row.chunks_exact_mut(4) {
                        d.copy_from_slice(&px);
                    }
                });
        }
        BackgroundFill::Photo(img) => blit_over(frame, img, 0, 0),
    }
}

fn lerp_rgba(a: Rgba8, b: Rgba8, t: f32) -> Rgba8 {
    fn lerp(a: u8, b: u8, t: f32) -> u8 {
        (f32::from(a) + (f32::from(b) - f32::from(a)) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    }
    let t = t.clamp(0.0, 1.0);
    Rgba8::rgba(
        lerp(a.r, b.r, t),
        lerp(a.g, b.g, t),
        lerp(a.b, b.b, t),
        lerp(a.a, b.a, t),
    )
}

/// Source-over `src` onto `dst` at `(left, top)`, clipped to `dst`.
fn blit_over(dst: &mut DecodedImage, src: &DecodedImage, left: u32, top: u32) {
    if left >= dst.width || top >= dst.height {
        return;
    }
    let w = src.width.min(dst.width - left) as usize;
    let h = src.height.min(dst.height - top) as usize;
    if w == 0 || h == 0 {
        return;
    }

    let dst_stride = dst.width as usize * 4;
    let src_stride = src.width as usize * 4;
    let x0 = left as usize * 4;

    dst.rgba8_premul
        .par_chunks_mut(dst_stride)
        .skip(top as usize)
        .take(h)
        .zip(src.rgba8_premul.par_chunks(src_stride))
        .for_each(|(drow, srow)| {
            over_row(&mut drow[x0..x0 + w * 4], &srow[..w * 4]);
        });
}

fn over_row(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
}

/// Premultiplied source-over.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn rasterize_svg(tree: &usvg::Tree, canvas: Canvas) -> OgResult<DecodedImage> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| OgError::encode("failed to allocate markup pixmap"))?;

    let sx = (canvas.width as f32) / tree.size().width();
    let sy = (canvas.height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(DecodedImage {
        width: canvas.width,
        height: canvas.height,
        rgba8_premul: pixmap.take(),
    })
}

fn encode_png(frame: &DecodedImage) -> OgResult<Vec<u8>> {
    let mut straight = frame.rgba8_premul.clone();
    demultiply_in_place(&mut straight);

    let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
        .ok_or_else(|| OgError::encode("frame buffer does not match its dimensions"))?;

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| OgError::encode(e.to_string()))?;
    Ok(bytes)
}

fn demultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
