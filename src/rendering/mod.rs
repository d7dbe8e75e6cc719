//! Layout engine: turns a fact record into a monochrome bitmap.
//!
//! Every call to [`Renderer::render`] yields a complete BMP of the configured
//! size. Missing data produces the "no data" error page, and any failure in
//! the normal path (an `Err` or a panic) is redirected to the error page with
//! the failure message.

pub mod bmp;
pub mod canvas;
pub mod decoration;
pub mod error_page;
pub mod font;
pub mod layout;
pub mod text;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use embedded_graphics::primitives::Rectangle;
use sha2::{Digest, Sha256};

use crate::provider::FactRecord;
use crate::{DisplayConfig, Error, Result};
use canvas::Canvas;
use decoration::DecorativeImage;
use error_page::{draw_error_page, NO_DATA_MESSAGE};
use font::FontSource;
use layout::{FitParams, LayoutMetrics, PageComposer, TITLE_TEXT};

/// An encoded display frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub bmp_data: Vec<u8>,
}

impl Frame {
    pub fn from_canvas(canvas: &Canvas) -> Self {
        Self {
            width: canvas.width(),
            height: canvas.height(),
            bmp_data: bmp::encode(canvas),
        }
    }

    /// Content hash of the encoded bitmap, hex encoded.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bmp_data))
    }
}

/// A composed page plus where things ended up on it.
#[derive(Debug, Clone)]
pub struct Page {
    pub canvas: Canvas,
    pub header_height: u32,
    /// Bounding box the body text was drawn in
    pub body: Rectangle,
    pub font_size: u32,
    /// False when the text overflowed even at the minimum font size
    pub fits: bool,
}

/// Renders fact records. Holds only read-only state, so a single instance
/// can serve concurrent render calls.
#[derive(Debug, Clone)]
pub struct Renderer {
    display: DisplayConfig,
    metrics: LayoutMetrics,
    fit: FitParams,
    fonts: Arc<dyn FontSource>,
    image: Option<Arc<DecorativeImage>>,
}

impl Renderer {
    pub fn new(
        display: DisplayConfig,
        fonts: Arc<dyn FontSource>,
        image: Option<DecorativeImage>,
    ) -> Self {
        Self {
            display,
            metrics: LayoutMetrics::default(),
            fit: FitParams::default(),
            fonts,
            image: image.map(Arc::new),
        }
    }

    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_fit_params(mut self, fit: FitParams) -> Self {
        self.fit = fit;
        self
    }

    pub fn display(&self) -> DisplayConfig {
        self.display
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Render `record` (or the "no data" page) to an encoded frame.
    pub fn render(&self, record: Option<&FactRecord>) -> Frame {
        Frame::from_canvas(&self.render_canvas(record))
    }

    /// Render `record` to a canvas. Never fails.
    pub fn render_canvas(&self, record: Option<&FactRecord>) -> Canvas {
        let Some(record) = record.filter(|r| !r.fact.trim().is_empty()) else {
            log::warn!("No fact data available, rendering error page");
            return self.error_canvas(NO_DATA_MESSAGE);
        };

        match catch_unwind(AssertUnwindSafe(|| self.compose(record))) {
            Ok(Ok(page)) => page.canvas,
            Ok(Err(e)) => {
                log::error!("Error generating display: {}", e);
                self.error_canvas(&e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Error generating display: {}", message);
                self.error_canvas(&message)
            }
        }
    }

    /// Compose the full page for `record`: header, fitted body and footer.
    pub fn compose(&self, record: &FactRecord) -> Result<Page> {
        let DisplayConfig { width, height } = self.display;
        if width == 0 || height == 0 {
            return Err(Error::LayoutError(format!(
                "display {}x{} has no pixels",
                width, height
            )));
        }
        let mut canvas = Canvas::new(width, height);
        let composer = PageComposer {
            metrics: &self.metrics,
            fit: &self.fit,
            fonts: self.fonts.as_ref(),
        };

        let header_height = composer.draw_header(&mut canvas, self.image.as_deref(), TITLE_TEXT);
        let (fitted, body) = composer.draw_body(&mut canvas, header_height, &record.fact);
        composer.draw_footer(&mut canvas, &record.fact_id.to_string(), &record.timestamp);

        Ok(Page {
            canvas,
            header_height,
            body,
            font_size: fitted.font_size,
            fits: fitted.fits,
        })
    }

    /// Error page carrying `message`. Falls back to a blank canvas if the
    /// error page itself cannot be drawn.
    pub fn error_canvas(&self, message: &str) -> Canvas {
        let DisplayConfig { width, height } = self.display;
        catch_unwind(AssertUnwindSafe(|| {
            draw_error_page(width, height, self.fonts.as_ref(), message)
        }))
        .unwrap_or_else(|payload| {
            log::error!(
                "Error page failed ({}), emitting blank canvas",
                panic_message(payload.as_ref())
            );
            Canvas::new(width, height)
        })
    }

    pub fn render_error(&self, message: &str) -> Frame {
        Frame::from_canvas(&self.error_canvas(message))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "render panicked".to_string()
    }
}
