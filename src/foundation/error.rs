use std::path::PathBuf;

/// Convenience result type used across fadegif.
pub type FadeGifResult<T> = Result<T, FadeGifError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Every stage failure aborts the job and surfaces as exactly one of these values. The only
/// locally recovered failure (embedded color-profile conversion) never reaches this type.
#[derive(thiserror::Error, Debug)]
pub enum FadeGifError {
    /// An input path did not resolve to a readable, decodable image.
    #[error("missing input '{}': {reason}", path.display())]
    MissingInput {
        /// The offending path as given by the caller.
        path: PathBuf,
        /// Human-readable cause (io or decode error).
        reason: String,
    },

    /// Fewer than two usable images remained after loading.
    #[error("insufficient images: need at least 2, got {found}")]
    InsufficientImages {
        /// Number of usable images.
        found: usize,
    },

    /// The configured crop rectangle is degenerate or outside an image.
    #[error("invalid crop: {0}")]
    InvalidCrop(String),

    /// The output container could not be produced or written.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The job was cancelled by its caller.
    #[error("job cancelled")]
    Cancelled,

    /// A job is already running on this worker.
    #[error("a generation job is already in progress")]
    Busy,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stable, payload-free classification of a [`FadeGifError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`FadeGifError::MissingInput`].
    MissingInput,
    /// See [`FadeGifError::InsufficientImages`].
    InsufficientImages,
    /// See [`FadeGifError::InvalidCrop`].
    InvalidCrop,
    /// See [`FadeGifError::Encode`].
    Encode,
    /// See [`FadeGifError::Validation`].
    Validation,
    /// See [`FadeGifError::Cancelled`].
    Cancelled,
    /// See [`FadeGifError::Busy`].
    Busy,
    /// See [`FadeGifError::Other`].
    Internal,
}

impl FadeGifError {
    /// Build a [`FadeGifError::MissingInput`] value.
    pub fn missing_input(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::MissingInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`FadeGifError::InvalidCrop`] value.
    pub fn invalid_crop(msg: impl Into<String>) -> Self {
        Self::InvalidCrop(msg.into())
    }

    /// Build a [`FadeGifError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FadeGifError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput { .. } => ErrorKind::MissingInput,
            Self::InsufficientImages { .. } => ErrorKind::InsufficientImages,
            Self::InvalidCrop(_) => ErrorKind::InvalidCrop,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Busy => ErrorKind::Busy,
            Self::Other(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
