//! Font resolution for the three text roles (title, body, meta).
//!
//! A [`FontSource`] hands out [`Font`]s of one fixed family at any pixel
//! size. Two strategies exist: [`TrueTypeSource`] rasterizes a TrueType file
//! with `rusttype`, and [`BuiltinSource`] scales the bitmap fonts that ship
//! with `embedded-graphics`. [`select_font_source`] picks one at startup and
//! never fails: if no TrueType file can be loaded the built-in fonts serve
//! every role.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10, FONT_8X13, FONT_9X18};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use rusttype::{point, Scale};

use super::canvas::{infallible, Canvas, Magnified, INK};
use crate::{Error, Result};

/// System locations probed when no font path is configured.
pub const DEFAULT_FONT_PATHS: &[&str] = &[
    "arial.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A font instantiated at a concrete pixel size.
pub trait Font: Send + Sync {
    /// Nominal size in pixels
    fn size(&self) -> u32;

    /// Rendered width of a single line of text
    fn text_width(&self, text: &str) -> u32;

    /// Height of one line, without inter-line spacing
    fn line_height(&self) -> u32;

    /// Draw one line of text with its top-left corner at `top_left`
    fn draw(&self, canvas: &mut Canvas, top_left: Point, text: &str);
}

/// Resolves fonts of one family at arbitrary sizes.
pub trait FontSource: Send + Sync + fmt::Debug {
    fn family(&self) -> &str;

    fn resolve(&self, size: u32) -> Box<dyn Font>;
}

// --- TrueType -------------------------------------------------------------

pub struct TrueTypeSource {
    family: String,
    font: Arc<rusttype::Font<'static>>,
}

impl TrueTypeSource {
    pub fn from_bytes(family: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let font = rusttype::Font::try_from_vec(bytes)
            .ok_or_else(|| Error::RenderError("not a usable TrueType font".into()))?;
        Ok(Self {
            family: family.into(),
            font: Arc::new(font),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let family = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "truetype".to_string());
        Self::from_bytes(family, bytes)
    }
}

impl fmt::Debug for TrueTypeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrueTypeSource")
            .field("family", &self.family)
            .finish()
    }
}

impl FontSource for TrueTypeSource {
    fn family(&self) -> &str {
        &self.family
    }

    fn resolve(&self, size: u32) -> Box<dyn Font> {
        let scale = Scale::uniform(size.max(1) as f32);
        let v = self.font.v_metrics(scale);
        Box::new(TrueTypeFace {
            font: Arc::clone(&self.font),
            size,
            scale,
            ascent: v.ascent,
            line_height: (v.ascent - v.descent).ceil().max(1.0) as u32,
        })
    }
}

struct TrueTypeFace {
    font: Arc<rusttype::Font<'static>>,
    size: u32,
    scale: Scale,
    ascent: f32,
    line_height: u32,
}

impl Font for TrueTypeFace {
    fn size(&self) -> u32 {
        self.size
    }

    fn text_width(&self, text: &str) -> u32 {
        self.font
            .layout(text, self.scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
            .ceil()
            .max(0.0) as u32
    }

    fn line_height(&self) -> u32 {
        self.line_height
    }

    fn draw(&self, canvas: &mut Canvas, top_left: Point, text: &str) {
        let origin = point(top_left.x as f32, top_left.y as f32 + self.ascent);
        for glyph in self.font.layout(text, self.scale, origin) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|x, y, coverage| {
                if coverage >= 0.5 {
                    canvas.set(bb.min.x + x as i32, bb.min.y + y as i32, INK);
                }
            });
        }
    }
}

// --- Built-in bitmap fonts --------------------------------------------------

/// The `embedded-graphics` ASCII fonts, integer-scaled to approximate the
/// requested size.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl BuiltinSource {
    /// Base face and magnification for a requested pixel size.
    fn face(size: u32) -> (MonoFace, u32) {
        match size {
            s if s >= 20 => (MonoFace::Px10x20, s / 20),
            18 | 19 => (MonoFace::Px9x18, 1),
            13..=17 => (MonoFace::Px8x13, 1),
            _ => (MonoFace::Px6x10, 1),
        }
    }
}

impl FontSource for BuiltinSource {
    fn family(&self) -> &str {
        "builtin"
    }

    fn resolve(&self, size: u32) -> Box<dyn Font> {
        let (face, factor) = Self::face(size);
        Box::new(BuiltinFace { face, factor, size })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MonoFace {
    Px6x10,
    Px8x13,
    Px9x18,
    Px10x20,
}

impl MonoFace {
    fn font(self) -> MonoFont<'static> {
        match self {
            MonoFace::Px6x10 => FONT_6X10,
            MonoFace::Px8x13 => FONT_8X13,
            MonoFace::Px9x18 => FONT_9X18,
            MonoFace::Px10x20 => FONT_10X20,
        }
    }
}

struct BuiltinFace {
    face: MonoFace,
    factor: u32,
    size: u32,
}

impl Font for BuiltinFace {
    fn size(&self) -> u32 {
        self.size
    }

    fn text_width(&self, text: &str) -> u32 {
        let n = text.chars().count() as u32;
        if n == 0 {
            return 0;
        }
        let font = self.face.font();
        let glyphs = n * font.character_size.width;
        let gaps = (n - 1) * font.character_spacing;
        (glyphs + gaps) * self.factor
    }

    fn line_height(&self) -> u32 {
        self.face.font().character_size.height * self.factor
    }

    fn draw(&self, canvas: &mut Canvas, top_left: Point, text: &str) {
        let font = self.face.font();
        let style = MonoTextStyle::new(&font, INK);
        let mut target = Magnified {
            canvas,
            origin: top_left,
            factor: self.factor,
        };
        let text = Text::with_baseline(text, Point::zero(), style, Baseline::Top);
        infallible(text.draw(&mut target));
    }
}

/// Choose the font strategy once at startup.
///
/// With an explicit `path` only that file is tried; otherwise
/// [`DEFAULT_FONT_PATHS`] are probed in order. Falls back to
/// [`BuiltinSource`] when nothing loads.
pub fn select_font_source(path: Option<&Path>) -> Arc<dyn FontSource> {
    let candidates: Vec<PathBuf> = match path {
        Some(p) => vec![p.to_path_buf()],
        None => DEFAULT_FONT_PATHS.iter().map(PathBuf::from).collect(),
    };

    for candidate in &candidates {
        match TrueTypeSource::from_path(candidate) {
            Ok(source) => {
                log::info!("Using TrueType font {}", candidate.display());
                return Arc::new(source);
            }
            Err(e) => log::debug!("Font {} unavailable: {}", candidate.display(), e),
        }
    }

    log::warn!("Failed to load a TrueType font, using built-in bitmap fonts");
    Arc::new(BuiltinSource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_faces_scale_with_size() {
        let src = BuiltinSource;
        assert_eq!(src.resolve(48).line_height(), 40);
        assert_eq!(src.resolve(24).line_height(), 20);
        assert_eq!(src.resolve(16).line_height(), 13);
        assert_eq!(src.resolve(8).line_height(), 10);
        assert_eq!(src.resolve(48).size(), 48);
    }

    #[test]
    fn builtin_width_counts_characters() {
        let f = BuiltinSource.resolve(48);
        assert_eq!(f.text_width(""), 0);
        assert_eq!(f.text_width("x"), 20);
        assert_eq!(f.text_width("xxxx"), 80);
        // non-ascii still occupies one cell
        assert_eq!(f.text_width("é"), 20);
    }

    #[test]
    fn builtin_draw_inks_inside_its_box() {
        let f = BuiltinSource.resolve(40);
        let mut c = Canvas::new(200, 100);
        f.draw(&mut c, Point::new(10, 10), "Hi");
        assert!(c.ink_count() > 0);
        let all = embedded_graphics::primitives::Rectangle::new(Point::zero(), c.size());
        let b = c.ink_bounds(all).unwrap();
        assert!(b.top_left.x >= 10 && b.top_left.y >= 10);
        let br = b.bottom_right().unwrap();
        assert!(br.x < 10 + f.text_width("Hi") as i32);
        assert!(br.y < 10 + f.line_height() as i32);
    }

    fn system_truetype() -> Option<TrueTypeSource> {
        let found = DEFAULT_FONT_PATHS
            .iter()
            .find_map(|p| TrueTypeSource::from_path(Path::new(p)).ok());
        if found.is_none() {
            println!("No system TrueType font found. Skipping.");
        }
        found
    }

    #[test]
    fn truetype_width_grows_with_text() {
        let Some(src) = system_truetype() else {
            return;
        };
        let f = src.resolve(32);
        assert_eq!(f.size(), 32);
        assert_eq!(f.text_width(""), 0);
        let mut last = 0;
        for text in ["H", "Ho", "Hou", "Hous", "House"] {
            let w = f.text_width(text);
            assert!(w > last, "{:?} is {}px, not wider than {}", text, w, last);
            last = w;
        }
        assert!(src.resolve(48).text_width("House") > last);
        assert!(src.resolve(48).line_height() > f.line_height());
    }

    #[test]
    fn truetype_draw_inks_inside_its_box() {
        let Some(src) = system_truetype() else {
            return;
        };
        for size in [16, 24, 48] {
            let f = src.resolve(size);
            let text = "Hello, Chuck";
            let mut c = Canvas::new(800, 200);
            f.draw(&mut c, Point::new(10, 10), text);
            let all = embedded_graphics::primitives::Rectangle::new(Point::zero(), c.size());
            let b = c.ink_bounds(all).unwrap();
            assert!(b.top_left.x >= 10 - 1 && b.top_left.y >= 10 - 1);
            let br = b.bottom_right().unwrap();
            assert!(br.x <= 10 + f.text_width(text) as i32, "size {}", size);
            assert!(br.y <= 10 + f.line_height() as i32, "size {}", size);
        }
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let err = TrueTypeSource::from_bytes("junk", vec![1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, Error::RenderError(_)));
        assert!(TrueTypeSource::from_path(Path::new("/definitely/missing.ttf")).is_err());
    }

    #[test]
    fn selection_falls_back_to_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a font").unwrap();
        let src = select_font_source(Some(file.path()));
        assert_eq!(src.family(), "builtin");
    }
}
