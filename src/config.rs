use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::tone::TextPalette,
    foundation::{
        core::Rgba8,
        error::{OgError, OgResult},
    },
};

/// Canvas fill used when no full-bleed photo is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStyle {
    Flat(Rgba8),
    /// Vertical gradient, `from` at the top.
    Gradient { from: Rgba8, to: Rgba8 },
}

/// Visual theme for variants whose text color does not follow the photo.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: BackgroundStyle,
    /// Flatten color for full-bleed photos with transparency.
    pub photo_matte: Rgba8,
    pub panel: Rgba8,
    pub title: Rgba8,
    pub body: Rgba8,
    pub accent: Rgba8,
    pub font_family: String,
    pub title_size_px: f32,
    pub body_size_px: f32,
    pub brand_size_px: f32,
    pub line_height_px: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: BackgroundStyle::Gradient {
                from: Rgba8::rgb(0xe0, 0xe7, 0xff),
                to: Rgba8::rgb(0xf8, 0xfa, 0xfc),
            },
            photo_matte: Rgba8::WHITE,
            panel: Rgba8::rgba(255, 255, 255, 217),
            title: Rgba8::rgb(0x1f, 0x29, 0x37),
            body: Rgba8::rgb(0x4b, 0x55, 0x63),
            accent: Rgba8::rgb(0x3b, 0x82, 0xf6),
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            title_size_px: 50.0,
            body_size_px: 30.0,
            brand_size_px: 24.0,
            line_height_px: 44.0,
        }
    }
}

impl Theme {
    /// Static palette used when the layout does not derive colors from the photo.
    pub fn palette(&self) -> TextPalette {
        TextPalette {
            title: self.title,
            body: self.body,
            accent: self.accent,
            panel: self.panel,
        }
    }
}

/// Limits for source image retrieval.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Overall budget for one fetch when the caller does not pass a deadline.
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub max_bytes: u64,
    pub user_agent: String,
    /// Serve `file://` source images from the local filesystem. Off by default.
    pub allow_file_urls: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
            max_bytes: 10 * 1024 * 1024,
            user_agent: concat!("ogcard/", env!("CARGO_PKG_VERSION")).to_string(),
            allow_file_urls: false,
        }
    }
}

/// Everything a [`crate::Renderer`] needs besides the request.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub theme: Theme,
    /// Label drawn bottom-left in the accent color.
    pub brand: Option<String>,
    pub fetch: FetchConfig,
    /// Extra `.ttf`/`.otf`/`.ttc` files loaded next to the system fonts.
    pub fonts_dir: Option<PathBuf>,
}

impl RenderConfig {
    pub fn from_json_str(s: &str) -> OgResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| OgError::config(format!("config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> OgResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> OgResult<()> {
        let t = &self.theme;
        for (name, v) in [
            ("title_size_px", t.title_size_px),
            ("body_size_px", t.body_size_px),
            ("brand_size_px", t.brand_size_px),
            ("line_height_px", t.line_height_px),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(OgError::config(format!("{name} must be finite and > 0")));
            }
        }
        if t.font_family.trim().is_empty() {
            return Err(OgError::config("font_family must be non-empty"));
        }
        if self.fetch.max_bytes == 0 {
            return Err(OgError::config("fetch.max_bytes must be > 0"));
        }
        if self.fetch.timeout_ms == 0 {
            return Err(OgError::config("fetch.timeout_ms must be > 0"));
        }
        if self.fetch.connect_timeout_ms == 0 {
            return Err(OgError::config("fetch.connect_timeout_ms must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
