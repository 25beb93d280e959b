use std::{fmt, str::FromStr};

use url::Url;

use crate::foundation::error::{OgError, OgResult};

/// Closed set of card layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    /// Flat background with an inset translucent panel.
    #[default]
    Default,
    /// Full-bleed photo behind a panel; text color follows the photo's tone.
    ImageBackground,
    /// Small contained photo in the top-right corner.
    CornerThumbnail,
    /// Photo on the left half, text on the right half.
    SplitView,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Default,
        Variant::ImageBackground,
        Variant::CornerThumbnail,
        Variant::SplitView,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Default => "Default",
            Variant::ImageBackground => "ImageBackground",
            Variant::CornerThumbnail => "CornerThumbnail",
            Variant::SplitView => "SplitView",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = OgError;

    /// Accepts `SplitView`, `split-view`, `split_view`, `splitview` and so on.
    fn from_str(s: &str) -> OgResult<Self> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "default" => Ok(Variant::Default),
            "imagebackground" => Ok(Variant::ImageBackground),
            "cornerthumbnail" => Ok(Variant::CornerThumbnail),
            "splitview" => Ok(Variant::SplitView),
            _ => Err(OgError::invalid_variant(s)),
        }
    }
}

impl serde::Serialize for Variant {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Variant {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One render request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub title: String,
    pub content: String,
    #[serde(default, alias = "source_image", alias = "imageUrl")]
    pub source_image: Option<Url>,
    #[serde(default)]
    pub variant: Variant,
}

// Wire shape of a request; the variant stays a raw tag until `Variant::from_str` sees it.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    title: String,
    content: String,
    #[serde(default, alias = "source_image", alias = "imageUrl")]
    source_image: Option<Url>,
    #[serde(default)]
    variant: Option<String>,
}

impl RenderRequest {
    /// Build and validate a request. `source_image` must be an absolute URI.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        source_image: Option<&str>,
        variant: Variant,
    ) -> OgResult<Self> {
        let source_image = source_image
            .map(|s| {
                Url::parse(s.trim())
                    .map_err(|e| OgError::validation(format!("invalid source image uri: {e}")))
            })
            .transpose()?;
        let req = Self {
            title: title.into(),
            content: content.into(),
            source_image,
            variant,
        };
        req.validate()?;
        Ok(req)
    }

    /// Parse request JSON. An unknown `variant` tag is [`OgError::InvalidVariant`]; any other
    /// shape problem is [`OgError::Validation`].
    pub fn from_json_str(s: &str) -> OgResult<Self> {
        let raw: RawRequest = serde_json::from_str(s)
            .map_err(|e| OgError::validation(format!("request json: {e}")))?;
        let variant = raw
            .variant
            .as_deref()
            .map(str::parse::<Variant>)
            .transpose()?
            .unwrap_or_default();
        let req = Self {
            title: raw.title,
            content: raw.content,
            source_image: raw.source_image,
            variant,
        };
        req.validate()?;
        Ok(req)
    }

    pub fn validate(&self) -> OgResult<()> {
        if self.title.trim().is_empty() {
            return Err(OgError::validation("title must be non-empty"));
        }
        if self.content.trim().is_empty() {
            return Err(OgError::validation("content must be non-empty"));
        }
        Ok(())
    }
}
