use crate::{
    foundation::core::{Canvas, FitMode, PixelRect, RoundedRect},
    request::Variant,
};

/// Outer padding between canvas edge and panel/thumbnail.
pub const PADDING: u32 = 40;
/// Horizontal inset of the text column from its container edge.
pub const TEXT_INSET: u32 = 60;
/// Side length of the corner thumbnail.
pub const THUMBNAIL_SIDE: u32 = 240;
pub const PANEL_RADIUS: f64 = 20.0;

/// Where the photo layer sits in the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayRole {
    /// Replaces the background fill (full-bleed).
    Background,
    /// Raster overlay blended above the background.
    Inset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OverlaySpec {
    pub rect: PixelRect,
    pub fit: FitMode,
    pub role: OverlayRole,
    pub allow_upscale: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanelSpec {
    pub rect: PixelRect,
    pub radius: f64,
}

impl PanelSpec {
    pub fn shape(self) -> RoundedRect {
        RoundedRect::from_rect(self.rect.to_kurbo(), self.radius)
    }
}

/// Placement for one variant. Every per-variant difference lives here.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutGeometry {
    pub variant: Variant,
    pub canvas: Canvas,
    pub overlay: Option<OverlaySpec>,
    pub text_origin_x: u32,
    /// Right edge of the text column.
    pub text_max_x: u32,
    /// Title baseline.
    pub title_y: u32,
    /// Baseline of the first body line.
    pub body_top: u32,
    /// Body baselines below this are dropped.
    pub body_bottom: u32,
    /// Brand label baseline.
    pub brand_y: u32,
    pub panel: Option<PanelSpec>,
    pub uses_dominant_color: bool,
}

/// Geometry for `variant` on the 1200x630 canvas.
pub fn select_geometry(variant: Variant) -> LayoutGeometry {
    let canvas = Canvas::OG;
    let (w, h) = (canvas.width, canvas.height);
    let inset_panel = PanelSpec {
        rect: PixelRect::new(PADDING, PADDING, w - 2 * PADDING, h - 2 * PADDING),
        radius: PANEL_RADIUS,
    };

    let base = LayoutGeometry {
        variant,
        canvas,
        overlay: None,
        text_origin_x: TEXT_INSET,
        text_max_x: w - TEXT_INSET,
        title_y: 120,
        body_top: 200,
        body_bottom: h - 100,
        brand_y: h - 60,
        panel: None,
        uses_dominant_color: false,
    };

    match variant {
        Variant::Default => LayoutGeometry {
            panel: Some(inset_panel),
            ..base
        },
        Variant::ImageBackground => LayoutGeometry {
            overlay: Some(OverlaySpec {
                rect: canvas.bounds(),
                fit: FitMode::Cover,
                role: OverlayRole::Background,
                allow_upscale: true,
            }),
            panel: Some(inset_panel),
            uses_dominant_color: true,
            ..base
        },
        Variant::CornerThumbnail => {
            let x = w - PADDING - THUMBNAIL_SIDE;
            LayoutGeometry {
                overlay: Some(OverlaySpec {
                    rect: PixelRect::new(x, PADDING, THUMBNAIL_SIDE, THUMBNAIL_SIDE),
                    fit: FitMode::Contain,
                    role: OverlayRole::Inset,
                    allow_upscale: false,
                }),
                text_max_x: x - PADDING,
                ..base
            }
        }
        Variant::SplitView => {
            let mid = w / 2;
            LayoutGeometry {
                overlay: Some(OverlaySpec {
                    rect: PixelRect::new(0, 0, mid, h),
                    fit: FitMode::Cover,
                    role: OverlayRole::Inset,
                    allow_upscale: true,
                }),
                text_origin_x: mid + TEXT_INSET,
                ..base
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
