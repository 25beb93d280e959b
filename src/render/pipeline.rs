use std::{sync::Arc, time::Duration};

use url::Url;

use crate::{
    assets::{
        decode::{DecodedImage, NormalizeOpts, normalize},
        fetch::{AssetFetcher, Deadline, SchemeFetcher},
        tone::{TextPalette, classify},
    },
    config::{BackgroundStyle, RenderConfig},
    foundation::error::OgResult,
    layout::geometry::{LayoutGeometry, OverlayRole, OverlaySpec, select_geometry},
    render::composite::{BackgroundFill, LayerStack, RasterOverlay, RenderResult, compose},
    request::RenderRequest,
    text::{
        fonts::FontSet,
        markup::{CardText, build_markup},
    },
};

/// Renders cards. Holds only immutable state, so one value can serve concurrent requests.
///
/// Pipeline for one request:
/// 1. [`select_geometry`] for the request's variant
/// 2. fetch the source image, if the variant has a photo slot (the only blocking step)
/// 3. normalize the photo to the slot; on any failure continue without it
/// 4. pick the text palette, from the photo's tone when the layout asks for it
/// 5. build the markup layer and composite everything into a PNG
#[derive(Clone)]
pub struct Renderer {
    config: RenderConfig,
    fonts: FontSet,
    fetcher: Arc<dyn AssetFetcher>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Validate `config`, load fonts, and use the scheme-dispatching fetcher.
    pub fn new(config: RenderConfig) -> OgResult<Self> {
        config.validate()?;
        let fetcher = Arc::new(SchemeFetcher::new(&config.fetch)?);
        let fonts = FontSet::load(config.fonts_dir.as_deref());
        Ok(Self {
            config,
            fonts,
            fetcher,
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_fonts(mut self, fonts: FontSet) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render with the configured fetch timeout as the deadline.
    pub fn render(&self, req: &RenderRequest) -> OgResult<RenderResult> {
        let deadline = Deadline::after(Duration::from_millis(self.config.fetch.timeout_ms));
        self.render_until(req, &deadline)
    }

    /// Render, bounding the source image fetch by `deadline`.
    ///
    /// An expired or cancelled deadline only drops the photo; the card still renders.
    #[tracing::instrument(skip_all, fields(variant = %req.variant))]
    pub fn render_until(&self, req: &RenderRequest, deadline: &Deadline) -> OgResult<RenderResult> {
        req.validate()?;
        let geometry = select_geometry(req.variant);

        let photo = match (&req.source_image, geometry.overlay) {
            (Some(uri), Some(_)) => self.acquire(uri, deadline),
            (Some(_), None) => {
                tracing::debug!("variant has no photo slot, ignoring source image");
                None
            }
            (None, _) => None,
        };

        self.render_with_photo(req, photo.as_deref())
    }

    /// Render from already fetched photo bytes. Performs no IO.
    pub fn render_with_photo(
        &self,
        req: &RenderRequest,
        photo: Option<&[u8]>,
    ) -> OgResult<RenderResult> {
        req.validate()?;
        let geometry = select_geometry(req.variant);
        let stack = self.build_stack(req, &geometry, photo);
        compose(&stack, geometry.canvas, &self.fonts.svg_options())
    }

    /// Assemble the layer stack for `req`. Undecodable photo bytes are dropped.
    pub fn build_stack(
        &self,
        req: &RenderRequest,
        geometry: &LayoutGeometry,
        photo: Option<&[u8]>,
    ) -> LayerStack {
        let theme = &self.config.theme;

        let photo = match (geometry.overlay, photo) {
            (Some(spec), Some(bytes)) => self.normalize_photo(bytes, spec).map(|img| (spec, img)),
            _ => None,
        };

        let palette: TextPalette = match &photo {
            Some((_, img)) if geometry.uses_dominant_color => classify(img).palette(),
            _ => theme.palette(),
        };

        let mut stack = match photo {
            Some((spec, img)) if spec.role == OverlayRole::Background => {
                LayerStack::new(BackgroundFill::Photo(img))
            }
            photo => {
                let mut stack = LayerStack::new(theme_background(theme.background));
                if let Some((spec, image)) = photo {
                    stack.push_overlay(RasterOverlay {
                        image,
                        left: spec.rect.x,
                        top: spec.rect.y,
                    });
                }
                stack
            }
        };

        stack.set_markup(build_markup(
            geometry,
            theme,
            &palette,
            CardText {
                title: &req.title,
                content: &req.content,
                brand: self.config.brand.as_deref(),
            },
        ));
        stack
    }

    fn acquire(&self, uri: &Url, deadline: &Deadline) -> Option<Vec<u8>> {
        match self.fetcher.fetch(uri, deadline) {
            Ok(bytes) => {
                tracing::debug!(bytes = bytes.len(), "fetched source image");
                Some(bytes)
            }
            Err(e) => {
                tracing::warn!(uri = %uri, error = %e, "source image unavailable, rendering without photo");
                None
            }
        }
    }

    fn normalize_photo(&self, bytes: &[u8], spec: OverlaySpec) -> Option<DecodedImage> {
        let opts = NormalizeOpts {
            allow_upscale: spec.allow_upscale,
            flatten: (spec.role == OverlayRole::Background)
                .then_some(self.config.theme.photo_matte),
        };
        normalize(bytes, spec.rect, spec.fit, opts)
            .inspect_err(|e| {
                tracing::warn!(error = %e, "source image unusable, rendering without photo");
            })
            .ok()
    }
}

fn theme_background(style: BackgroundStyle) -> BackgroundFill {
    match style {
        BackgroundStyle::Flat(c) => BackgroundFill::Flat(c),
        BackgroundStyle::Gradient { from, to } => BackgroundFill::Gradient { from, to },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
