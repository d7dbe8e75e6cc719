//! Rendering with a system TrueType font. Skipped when none is installed.

use std::path::Path;
use std::sync::Arc;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use factpaper::provider::FactStatus;
use factpaper::rendering::font::{FontSource, TrueTypeSource, DEFAULT_FONT_PATHS};
use factpaper::rendering::layout::{fit_text, FitParams};
use factpaper::{DisplayConfig, FactId, FactRecord, Renderer};

fn system_font() -> Option<Arc<TrueTypeSource>> {
    let found = DEFAULT_FONT_PATHS
        .iter()
        .find_map(|p| TrueTypeSource::from_path(Path::new(p)).ok());
    if found.is_none() {
        println!("No system TrueType font found. Skipping.");
    }
    found.map(Arc::new)
}

fn record(fact: &str) -> FactRecord {
    FactRecord {
        fact: fact.to_string(),
        fact_id: FactId::Number(42),
        timestamp: "2024-01-15T10:30:00+00:00".into(),
        icon_url: None,
        status: FactStatus::Ok,
    }
}

const FACTS: &[&str] = &[
    "Chuck Norris can slam a revolving door.",
    "Chuck Norris can unit test an entire application with a single assert.",
    "When Chuck Norris does a pushup, he isn't lifting himself up, he's pushing the Earth down. \
     Gravity has filed a complaint and Chuck Norris has chosen to ignore it, as is his custom.",
];

#[test]
fn test_fit_stays_inside_area_with_truetype() {
    let Some(fonts) = system_font() else {
        return;
    };
    let params = FitParams::default();
    let area = Size::new(720, 280);
    let long = "Chuck Norris counted to infinity. Twice. ".repeat(30);

    for text in FACTS.iter().copied().chain([long.as_str()]) {
        let fitted = fit_text(text, fonts.as_ref(), area, &params);
        assert!(fitted.font_size >= params.min_font_size);
        assert!(fitted.font_size <= params.max_font_size);
        if fitted.fits {
            assert!(fitted.size.width <= area.width - params.inner_padding, "{:?}", text);
            assert!(fitted.size.height <= area.height - params.inner_padding, "{:?}", text);
        } else {
            assert_eq!(fitted.font_size, params.min_font_size);
        }
    }

    let fitted = fit_text(&long, fonts.as_ref(), area, &params);
    assert!(!fitted.fits);
}

#[test]
fn test_body_clears_the_header_with_truetype() {
    let Some(fonts) = system_font() else {
        return;
    };
    let r = Renderer::new(DisplayConfig::default(), fonts, None);

    for fact in FACTS {
        let page = r.compose(&record(fact)).unwrap();
        assert_eq!(page.header_height, 120);
        assert!(page.body.top_left.y >= 120);

        let separator = (0..120)
            .find(|&y| page.canvas.is_ink(20, y))
            .expect("header separator");
        // nothing between the separator and the header boundary
        let gap_top = separator + 2;
        let gap = Rectangle::new(Point::new(0, gap_top), Size::new(800, (120 - gap_top) as u32));
        assert!(page.canvas.ink_bounds(gap).is_none(), "{:?}", fact);

        // body ink sits in the body zone, above the footer separator
        let body_zone = Rectangle::new(Point::new(0, 120), Size::new(800, 300));
        let inked = page.canvas.ink_bounds(body_zone).unwrap();
        assert!(inked.top_left.y >= page.body.top_left.y - 1);
        assert!(inked.top_left.x >= page.body.top_left.x - 1);
        let br = inked.bottom_right().unwrap();
        assert!(br.x <= page.body.top_left.x + page.body.size.width as i32);
    }
}

#[test]
fn test_truetype_rendering_is_deterministic() {
    let Some(fonts) = system_font() else {
        return;
    };
    let r = Renderer::new(DisplayConfig::default(), fonts, None);
    let rec = record(FACTS[1]);
    let a = r.render(Some(&rec));
    let b = r.render(Some(&rec));
    assert_eq!(a.digest(), b.digest());
    assert_eq!(a.bmp_data.len(), 62 + 100 * 480);
}

#[test]
fn test_truetype_error_page_is_drawn() {
    let Some(fonts) = system_font() else {
        return;
    };
    let family = fonts.family().to_string();
    let r = Renderer::new(DisplayConfig::default(), fonts, None);
    let canvas = r.render_canvas(None);
    assert!(canvas.ink_count() > 0, "{} drew nothing", family);
}
