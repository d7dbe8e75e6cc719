//! Error types for fetching and rendering facts

use thiserror::Error;

/// Result type alias for factpaper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration, fetching content or
/// laying out a display.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed configuration (fatal at startup)
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network error talking to the content provider or image host
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The provider answered with a payload we could not understand
    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    /// Failed to decode or preprocess the decorative image
    #[error("Image processing failed: {0}")]
    ImageError(String),

    /// The canvas cannot host the requested layout
    #[error("Layout failed: {0}")]
    LayoutError(String),

    /// Failed to render content
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "net")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::DecodeError(err.to_string())
        } else {
            Error::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::DecodeError(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageError(err.to_string())
    }
}
