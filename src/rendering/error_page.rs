//! Full-page error display.

use embedded_graphics::prelude::*;

use super::canvas::Canvas;
use super::font::FontSource;
use super::text::{wrap_words, TextBlock};

pub const ERROR_TITLE: &str = "Error";
/// Shown when the provider had nothing to render
pub const NO_DATA_MESSAGE: &str = "No Chuck Norris fact available";

const WRAP_CHARS: usize = 40;
const LINE_SPACING: u32 = 10;
const TITLE_TOP: i32 = 40;
const TITLE_SIZE: u32 = 48;
const MESSAGE_SIZE: u32 = 32;

/// Draw a centered "Error" heading and the wrapped `message` in the middle
/// of a fresh canvas.
pub fn draw_error_page(width: u32, height: u32, fonts: &dyn FontSource, message: &str) -> Canvas {
    let mut canvas = Canvas::new(width, height);

    let title_font = fonts.resolve(TITLE_SIZE);
    let x = ((width as i32 - title_font.text_width(ERROR_TITLE) as i32) / 2).max(0);
    title_font.draw(&mut canvas, Point::new(x, TITLE_TOP), ERROR_TITLE);

    let font = fonts.resolve(MESSAGE_SIZE);
    let block = TextBlock::new(wrap_words(message, WRAP_CHARS), LINE_SPACING);
    let size = block.measure(font.as_ref());
    let x = ((width as i32 - size.width as i32) / 2).max(0);
    let y = ((height as i32 - size.height as i32) / 2).max(0);
    block.draw_centered(&mut canvas, font.as_ref(), Point::new(x, y), size.width);

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::font::BuiltinSource;
    use embedded_graphics::primitives::Rectangle;

    #[test]
    fn error_page_has_heading_and_message() {
        let c = draw_error_page(800, 480, &BuiltinSource, NO_DATA_MESSAGE);
        assert_eq!(c.size(), Size::new(800, 480));

        // heading occupies the 40px band starting at y=40
        let heading = Rectangle::new(Point::new(0, 40), Size::new(800, 40));
        let hb = c.ink_bounds(heading).unwrap();
        assert!((hb.center().x - 400).abs() <= 10);

        // message is vertically centered
        let middle = Rectangle::new(Point::new(0, 200), Size::new(800, 80));
        assert!(c.ink_bounds(middle).is_some());
    }

    #[test]
    fn long_messages_wrap_at_forty_chars() {
        let msg = "Failed to fetch fact: error sending request for url (https://api.chucknorris.io/jokes/random)";
        let lines = wrap_words(msg, WRAP_CHARS);
        assert!(lines.len() > 1);
        let c = draw_error_page(800, 480, &BuiltinSource, msg);
        assert!(c.ink_count() > 0);
    }

    #[test]
    fn tiny_canvas_is_still_well_formed() {
        let c = draw_error_page(10, 10, &BuiltinSource, NO_DATA_MESSAGE);
        assert_eq!((c.width(), c.height()), (10, 10));
    }
}
