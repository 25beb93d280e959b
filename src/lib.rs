//! ogcard renders social preview cards (1200x630 PNG) from a title, body text, an optional
//! source photo, and one of a closed set of layout variants.
//!
//! # Pipeline overview
//!
//! 1. **Select**: `Variant -> LayoutGeometry` (every per-variant difference is data)
//! 2. **Fetch** (optional): `Url -> bytes`, bounded by a [`Deadline`]; the only IO step
//! 3. **Normalize**: cover/contain fit of the photo into the layout's slot
//! 4. **Analyze**: Light/Dark tone of the photo picks a readable text palette
//! 5. **Lay out**: body lines become bullet/bold/plain [`TextRun`]s inside an SVG markup layer
//! 6. **Composite**: background, photo overlay, markup, bottom to top, encoded as PNG
//!
//! Problems acquiring the photo never fail a render: the card is produced without it.
//!
//! ```no_run
//! use ogcard::{RenderConfig, RenderRequest, Renderer, Variant};
//!
//! let renderer = Renderer::new(RenderConfig::default())?;
//! let req = RenderRequest::new("Launch", "- Fast\n- Reliable", None, Variant::Default)?;
//! let png = renderer.render(&req)?;
//! std::fs::write("card.png", &png.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod layout;
pub mod render;
pub mod request;
pub mod text;

pub use assets::decode::{DecodedImage, NormalizeOpts, decode_image, fit_image, normalize};
pub use assets::fetch::{
    AssetFetcher, CancelToken, Deadline, FetchError, FileFetcher, HttpFetcher, SchemeFetcher,
};
pub use assets::tone::{TextPalette, Tone, average_color, classify, luminosity};
pub use config::{BackgroundStyle, FetchConfig, RenderConfig, Theme};
pub use foundation::core::{Canvas, FitMode, PixelRect, Rgba8};
pub use foundation::error::{OgError, OgResult};
pub use layout::geometry::{
    LayoutGeometry, OverlayRole, OverlaySpec, PanelSpec, select_geometry,
};
pub use render::composite::{
    BackgroundFill, CompositeLayer, LayerStack, PNG_CONTENT_TYPE, RasterOverlay, RenderResult,
    compose, compose_pixels,
};
pub use render::pipeline::Renderer;
pub use request::{RenderRequest, Variant};
pub use text::fonts::FontSet;
pub use text::markup::{CardText, MarkupLayer, build_markup};
pub use text::runs::{LineMetrics, RunStyle, Runs, TextRun, layout_runs, layout_runs_with};
