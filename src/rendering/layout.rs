//! Full-page layout: header, adaptive body text and footer.
//!
//! The page is split into three horizontal zones. The header holds the
//! optional decorative image and the title, the footer holds the fact id and
//! timestamp, and the body text is fitted into whatever remains.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::canvas::Canvas;
use super::decoration::DecorativeImage;
use super::font::{Font, FontSource};
use super::text::{wrap_words, TextBlock};

pub const TITLE_TEXT: &str = "Chuck Norris Fact";

/// Fixed geometry of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutMetrics {
    /// Left/right inset of separator lines and footer text
    pub side_margin: u32,
    /// Top-left corner of the decorative image
    pub image_offset: Point,
    /// Gap between the image's right edge and the title
    pub title_gap: u32,
    /// Title top when there is no image
    pub title_top: u32,
    /// Gap between the lowest header element and the separator
    pub separator_gap: u32,
    pub separator_stroke: u32,
    /// Header zone height with an image
    pub header_tall: u32,
    /// Header zone height without an image
    pub header_short: u32,
    /// Footer zone height
    pub footer_height: u32,
    /// Footer separator distance above the bottom edge
    pub footer_line_offset: u32,
    /// Footer text distance below the footer separator
    pub footer_text_gap: u32,
    /// Left/right inset of the body content rectangle
    pub content_margin: u32,
    pub title_size: u32,
    pub meta_size: u32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            side_margin: 20,
            image_offset: Point::new(20, 20),
            title_gap: 20,
            title_top: 40,
            separator_gap: 20,
            separator_stroke: 2,
            header_tall: 180,
            header_short: 120,
            footer_height: 80,
            footer_line_offset: 60,
            footer_text_gap: 10,
            content_margin: 40,
            title_size: 48,
            meta_size: 16,
        }
    }
}

/// Bounds of the descending font-size search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitParams {
    pub max_font_size: u32,
    pub min_font_size: u32,
    pub step: u32,
    /// Subtracted from both content dimensions before testing a fit
    pub inner_padding: u32,
    /// Character used to estimate the average glyph width
    pub probe_char: char,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            max_font_size: 48,
            min_font_size: 24,
            step: 2,
            inner_padding: 40,
            probe_char: 'x',
        }
    }
}

/// Outcome of fitting body text into the content rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedText {
    pub font_size: u32,
    pub block: TextBlock,
    /// Measured size of `block` at `font_size`
    pub size: Size,
    /// False when even `min_font_size` overflowed
    pub fits: bool,
}

/// Line gap used for body text at `font_size`.
pub fn line_spacing(font_size: u32) -> u32 {
    (font_size as f32 * 0.3) as u32
}

/// Characters per line estimated from the probe glyph width. Never zero.
pub fn chars_per_line(font: &dyn Font, usable_width: u32, probe: char) -> usize {
    let mut buf = [0u8; 4];
    let probe_width = font.text_width(probe.encode_utf8(&mut buf)).max(1);
    ((usable_width / probe_width) as usize).max(1)
}

fn wrap_at(text: &str, font: &dyn Font, usable_width: u32, probe: char) -> TextBlock {
    let limit = chars_per_line(font, usable_width, probe);
    TextBlock::new(wrap_words(text, limit), line_spacing(font.size()))
}

/// Pick the largest font size whose wrapped text fits in `area`.
///
/// Sizes are tried from `max_font_size` down to `min_font_size` in steps of
/// `step`. If none fits, `min_font_size` is used and the overflow is
/// accepted.
pub fn fit_text(text: &str, fonts: &dyn FontSource, area: Size, params: &FitParams) -> FittedText {
    let usable = Size::new(
        area.width.saturating_sub(params.inner_padding),
        area.height.saturating_sub(params.inner_padding),
    );
    let step = params.step.max(1);

    let mut chosen = None;
    let mut size = params.max_font_size;
    while size >= params.min_font_size {
        let font = fonts.resolve(size);
        let block = wrap_at(text, font.as_ref(), usable.width, params.probe_char);
        let measured = block.measure(font.as_ref());
        if measured.width <= usable.width && measured.height <= usable.height {
            chosen = Some(size);
            break;
        }
        match size.checked_sub(step) {
            Some(next) => size = next,
            None => break,
        }
    }

    let fits = chosen.is_some();
    let font_size = chosen.unwrap_or(params.min_font_size);
    if !fits {
        log::debug!(
            "Text of {} chars overflows at minimum size {}",
            text.chars().count(),
            font_size
        );
    }

    // Re-wrap at the final size so drawing matches what was measured.
    let font = fonts.resolve(font_size);
    let block = wrap_at(text, font.as_ref(), usable.width, params.probe_char);
    let size = block.measure(font.as_ref());
    FittedText {
        font_size,
        block,
        size,
        fits,
    }
}

/// Format an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Offsets are converted to UTC, naive values are taken as UTC. Anything
/// that does not parse is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw.trim())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Composes the three page zones onto a canvas.
pub struct PageComposer<'a> {
    pub metrics: &'a LayoutMetrics,
    pub fit: &'a FitParams,
    pub fonts: &'a dyn FontSource,
}

impl PageComposer<'_> {
    /// Draw the header and return the header zone height.
    pub fn draw_header(
        &self,
        canvas: &mut Canvas,
        image: Option<&DecorativeImage>,
        title: &str,
    ) -> u32 {
        let m = self.metrics;
        let font = self.fonts.resolve(m.title_size);
        let title_w = font.text_width(title);
        let title_h = font.line_height();
        let right = canvas.width() as i32 - m.side_margin as i32;

        match image {
            Some(image) => {
                let at = m.image_offset;
                canvas.blit(image.bitmap(), at);

                let x = at.x + image.width() as i32 + m.title_gap as i32;
                let y = at.y + (image.height() as i32 - title_h as i32) / 2;
                let y = y.max(0);
                font.draw(canvas, Point::new(x, y), title);

                let bottom = (at.y + image.height() as i32).max(y + title_h as i32);
                let line_y = bottom + m.separator_gap as i32;
                canvas.hline(m.side_margin as i32, right, line_y, m.separator_stroke);
                m.header_tall
            }
            None => {
                let x = ((canvas.width() as i32 - title_w as i32) / 2).max(0);
                let y = m.title_top as i32;
                font.draw(canvas, Point::new(x, y), title);

                let line_y = y + title_h as i32 + m.separator_gap as i32;
                canvas.hline(m.side_margin as i32, right, line_y, m.separator_stroke);
                m.header_short
            }
        }
    }

    /// The body content rectangle below a header of `header_height`.
    pub fn content_area(&self, canvas: &Canvas, header_height: u32) -> Rectangle {
        let m = self.metrics;
        let width = canvas
            .width()
            .saturating_sub(2 * m.content_margin);
        let height = canvas
            .height()
            .saturating_sub(header_height + m.footer_height);
        Rectangle::new(
            Point::new(m.content_margin as i32, header_height as i32),
            Size::new(width, height),
        )
    }

    /// Fit and draw the fact text; returns the fit and where it was drawn.
    pub fn draw_body(
        &self,
        canvas: &mut Canvas,
        header_height: u32,
        text: &str,
    ) -> (FittedText, Rectangle) {
        let area = self.content_area(canvas, header_height);
        let fitted = fit_text(text, self.fonts, area.size, self.fit);
        log::debug!(
            "Body text fitted at {}px ({} lines, fits: {})",
            fitted.font_size,
            fitted.block.lines.len(),
            fitted.fits
        );

        let x = ((canvas.width() as i32 - fitted.size.width as i32) / 2).max(0);
        let slack = area.size.height as i32 - fitted.size.height as i32;
        let y = header_height as i32 + (slack / 2).max(0);
        let font = self.fonts.resolve(fitted.font_size);
        fitted
            .block
            .draw_centered(canvas, font.as_ref(), Point::new(x, y), fitted.size.width);

        let placed = Rectangle::new(Point::new(x, y), fitted.size);
        (fitted, placed)
    }

    /// Draw the footer separator, fact id label and formatted timestamp.
    pub fn draw_footer(&self, canvas: &mut Canvas, fact_id: &str, timestamp: &str) {
        let m = self.metrics;
        let font = self.fonts.resolve(m.meta_size);
        let line_y = canvas.height() as i32 - m.footer_line_offset as i32;
        let right = canvas.width() as i32 - m.side_margin as i32;
        canvas.hline(m.side_margin as i32, right, line_y, 1);

        let text_y = line_y + m.footer_text_gap as i32;
        let label = format!("Fact ID: {}", fact_id);
        font.draw(canvas, Point::new(m.side_margin as i32, text_y), &label);

        let stamp = format_timestamp(timestamp);
        let stamp_x = (right - font.text_width(&stamp) as i32).max(0);
        font.draw(canvas, Point::new(stamp_x, text_y), &stamp);
    }
}
