//! factpaper
//!
//! Fetches a short fact from a remote API and lays it out as a 1-bit bitmap
//! for e-paper displays such as the TRMNL.
//!
//! # Features
//!
//! - **Adaptive layout**: the body font shrinks until the wrapped fact fits
//! - **Cached provider**: one fetch per cache window, shared across requests
//! - **Never blank**: failures render an error page instead of nothing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use factpaper::{CachedProvider, ChuckNorrisClient, DisplayConfig, Renderer};
//! use factpaper::rendering::font::select_font_source;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChuckNorrisClient::new(factpaper::DEFAULT_FACT_API, Duration::from_secs(10))?;
//! let provider = CachedProvider::new(Box::new(client), Duration::from_secs(3600));
//!
//! let renderer = Renderer::new(DisplayConfig::default(), select_font_source(None), None);
//! let frame = renderer.render(provider.get().as_ref());
//! std::fs::write("display.bmp", &frame.bmp_data)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod cache;
pub mod config;
pub mod provider;
pub mod rendering;

// HTTP surface for devices polling the display
#[cfg(feature = "net")]
pub mod server;

pub use cache::CachedProvider;
pub use config::AppConfig;
#[cfg(feature = "net")]
pub use provider::ChuckNorrisClient;
pub use provider::{ContentProvider, FactId, FactRecord, DEFAULT_FACT_API};
pub use rendering::{Frame, Renderer};

/// Output bitmap dimensions
///
/// # Examples
///
/// ```
/// let d = factpaper::DisplayConfig::default();
/// assert_eq!((d.width, d.height), (800, 480));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display() {
        let display = DisplayConfig::default();
        assert_eq!(display.width, 800);
        assert_eq!(display.height, 480);
    }

    #[test]
    fn test_custom_display() {
        let display = DisplayConfig {
            width: 640,
            height: 384,
        };
        assert_eq!(display.width, 640);
        assert_eq!(display.height, 384);
    }
}
