use crate::assets::fetch::FetchError;

/// Convenience result type used across ogcard.
pub type OgResult<T> = Result<T, OgError>;

/// Top-level error taxonomy used by the rendering APIs.
///
/// Image acquisition failures ([`OgError::Fetch`], [`OgError::Decode`],
/// [`OgError::UnsupportedFormat`]) are recovered inside the pipeline; the rest surface to the
/// caller.
#[derive(thiserror::Error, Debug)]
pub enum OgError {
    /// Unrecognized layout variant tag.
    #[error("invalid variant: {0}")]
    InvalidVariant(String),

    /// Request fields violate their invariants.
    #[error("validation error: {0}")]
    Validation(String),

    /// Source image could not be retrieved.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Source image bytes are malformed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Source image uses an encoding we cannot recognize.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Final raster could not be produced.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid render configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OgError {
    /// Build an [`OgError::InvalidVariant`] value.
    pub fn invalid_variant(tag: impl Into<String>) -> Self {
        Self::InvalidVariant(tag.into())
    }

    /// Build an [`OgError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`OgError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build an [`OgError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build an [`OgError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`OgError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the pipeline degrades to a text-only render instead of failing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Fetch(_) | Self::Decode(_) | Self::UnsupportedFormat(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
