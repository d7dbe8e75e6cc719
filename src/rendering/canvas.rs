//! 1-bit raster used for every render call.
//!
//! Pixels are stored one per `bool` (`true` = ink/black). The BMP encoder
//! maps ink to bit value 0 and paper to bit value 1, so a fresh canvas is
//! all white. Writes outside `[0, width) x [0, height)` are dropped, which
//! keeps every drawn element inside the canvas.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PointsIter, PrimitiveStyle, Rectangle};

/// Ink color for drawing on a [`Canvas`]
pub const INK: BinaryColor = BinaryColor::On;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    ink: Vec<bool>,
}

impl Canvas {
    /// Create a blank (all white) canvas.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            ink: vec![false; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (x, y) is inked. Out-of-bounds reads as paper.
    pub fn is_ink(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.ink[i]).unwrap_or(false)
    }

    pub fn set(&mut self, x: i32, y: i32, color: BinaryColor) {
        if let Some(i) = self.index(x, y) {
            self.ink[i] = color.is_on();
        }
    }

    /// Number of inked pixels, handy for tests and diagnostics.
    pub fn ink_count(&self) -> usize {
        self.ink.iter().filter(|p| **p).count()
    }

    /// Bounding box of all inked pixels inside `area`, if any.
    pub fn ink_bounds(&self, area: Rectangle) -> Option<Rectangle> {
        let mut min = Point::new(i32::MAX, i32::MAX);
        let mut max = Point::new(i32::MIN, i32::MIN);
        for p in area.points() {
            if self.is_ink(p.x, p.y) {
                min = min.component_min(p);
                max = max.component_max(p);
            }
        }
        if min.x > max.x {
            return None;
        }
        Some(Rectangle::with_corners(min, max))
    }

    /// Row `y` as packed bits, MSB first, bit set for paper. Rows are padded
    /// with paper to a whole byte.
    pub(crate) fn packed_row(&self, y: u32) -> Vec<u8> {
        let mut row = vec![0u8; (self.width as usize).div_ceil(8)];
        for x in 0..self.width {
            if !self.is_ink(x as i32, y as i32) {
                row[(x / 8) as usize] |= 0x80 >> (x % 8);
            }
        }
        // Padding bits past the right edge stay paper.
        let tail = self.width % 8;
        if tail != 0 {
            if let Some(last) = row.last_mut() {
                *last |= 0xFF >> tail;
            }
        }
        row
    }

    /// Horizontal separator from `x0` to `x1` (inclusive), `stroke` rows
    /// thick starting at row `y`.
    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, stroke: u32) {
        if x1 < x0 {
            return;
        }
        let size = Size::new((x1 - x0 + 1) as u32, stroke.max(1));
        let bar = Rectangle::new(Point::new(x0, y), size)
            .into_styled(PrimitiveStyle::with_fill(INK));
        infallible(bar.draw(self));
    }

    /// Copy the inked pixels of `src` with its top-left corner at `at`.
    pub fn blit(&mut self, src: &Canvas, at: Point) {
        for y in 0..src.height as i32 {
            for x in 0..src.width as i32 {
                if src.is_ink(x, y) {
                    self.set(at.x + x, at.y + y, INK);
                }
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            self.set(p.x, p.y, color);
        }
        Ok(())
    }
}

/// Draw target that magnifies every pixel into a `factor x factor` block of
/// the underlying canvas, offset by `origin`. Used to scale the built-in
/// bitmap fonts.
pub(crate) struct Magnified<'a> {
    pub canvas: &'a mut Canvas,
    pub origin: Point,
    pub factor: u32,
}

impl OriginDimensions for Magnified<'_> {
    fn size(&self) -> Size {
        let f = self.factor.max(1);
        Size::new(self.canvas.width.div_ceil(f), self.canvas.height.div_ceil(f))
    }
}

impl DrawTarget for Magnified<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let f = self.factor.max(1) as i32;
        for Pixel(p, color) in pixels {
            let x0 = self.origin.x + p.x * f;
            let y0 = self.origin.y + p.y * f;
            for dy in 0..f {
                for dx in 0..f {
                    self.canvas.set(x0 + dx, y0 + dy, color);
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn infallible<T>(r: Result<T, Infallible>) -> T {
    match r {
        Ok(v) => v,
        Err(never) => match never {},
    }
}
