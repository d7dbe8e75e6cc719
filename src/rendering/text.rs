//! Greedy word wrapping and multi-line text blocks.

use embedded_graphics::prelude::*;

use super::canvas::Canvas;
use super::font::Font;

/// Wrap `text` greedily so that no line exceeds `max_chars` characters.
///
/// Words are separated by any whitespace and are never split. A word longer
/// than `max_chars` gets a line of its own and exceeds the limit. Empty or
/// whitespace-only input yields no lines.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Lines of text laid out together with a fixed gap between lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub spacing: u32,
}

impl TextBlock {
    pub fn new(lines: Vec<String>, spacing: u32) -> Self {
        Self { lines, spacing }
    }

    /// Bounding box of the block rendered with `font`: widest line by the
    /// sum of line heights and inter-line gaps.
    pub fn measure(&self, font: &dyn Font) -> Size {
        if self.lines.is_empty() {
            return Size::zero();
        }
        let width = self
            .lines
            .iter()
            .map(|l| font.text_width(l))
            .max()
            .unwrap_or(0);
        let n = self.lines.len() as u32;
        let height = n * font.line_height() + (n - 1) * self.spacing;
        Size::new(width, height)
    }

    /// Draw with every line centered inside a block of `block_width`
    /// starting at `top_left`.
    pub fn draw_centered(
        &self,
        canvas: &mut Canvas,
        font: &dyn Font,
        top_left: Point,
        block_width: u32,
    ) {
        let step = (font.line_height() + self.spacing) as i32;
        for (i, line) in self.lines.iter().enumerate() {
            let w = font.text_width(line);
            let dx = (block_width.saturating_sub(w) / 2) as i32;
            let y = top_left.y + i as i32 * step;
            font.draw(canvas, Point::new(top_left.x + dx, y), line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::font::{BuiltinSource, FontSource};

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap_words("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(
            lines,
            vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn long_word_gets_its_own_line() {
        let lines = wrap_words("a supercalifragilistic b", 5);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn whitespace_is_normalised() {
        assert_eq!(wrap_words("  one\ttwo\n\nthree  ", 80), vec!["one two three"]);
        assert!(wrap_words("", 10).is_empty());
        assert!(wrap_words("   \n ", 10).is_empty());
    }

    #[test]
    fn zero_width_behaves_like_one() {
        assert_eq!(wrap_words("a b", 0), vec!["a", "b"]);
    }

    #[test]
    fn measure_includes_line_spacing() {
        let font = BuiltinSource.resolve(40); // 20x40 cells
        let block = TextBlock::new(vec!["abc".into(), "a".into()], 12);
        assert_eq!(block.measure(font.as_ref()), Size::new(60, 40 + 12 + 40));
        assert_eq!(TextBlock::new(vec![], 12).measure(font.as_ref()), Size::zero());
    }

    #[test]
    fn draw_centered_offsets_short_lines() {
        let font = BuiltinSource.resolve(20);
        let block = TextBlock::new(vec!["MMMM".into(), "MM".into()], 0);
        let mut canvas = Canvas::new(100, 60);
        block.draw_centered(&mut canvas, font.as_ref(), Point::zero(), 40);
        // second line starts 10px in and sits one line height lower
        let second = embedded_graphics::primitives::Rectangle::new(
            Point::new(0, 20),
            Size::new(100, 20),
        );
        let b = canvas.ink_bounds(second).unwrap();
        assert!(b.top_left.x >= 10);
        assert!(b.bottom_right().unwrap().x < 30);
    }
}
