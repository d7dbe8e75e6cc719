//! Render a few sample facts offline and write them as BMP files

use factpaper::rendering::font::select_font_source;
use factpaper::{DisplayConfig, FactId, FactRecord, Renderer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("factpaper - offline render sample\n");

    let out_dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let renderer = Renderer::new(DisplayConfig::default(), select_font_source(None), None);

    let long = "Chuck Norris counted to infinity. Twice. ".repeat(12);
    let facts = [
        "Chuck Norris can slam a revolving door.",
        "Chuck Norris doesn't read books. He stares them down until he gets the information he wants. \
         Then he stares at the library until it hands over the sequel.",
        long.as_str(),
    ];

    for (i, fact) in facts.iter().enumerate() {
        let record = FactRecord::new(*fact, FactId::Number(i as i64 + 1), None);
        let page = renderer.compose(&record)?;
        let frame = renderer.render(Some(&record));
        let path = format!("{}/sample-{}.bmp", out_dir, i + 1);
        std::fs::write(&path, &frame.bmp_data)?;
        println!(
            "{}: {} chars at {}px (fits: {}) -> {}",
            i + 1,
            fact.chars().count(),
            page.font_size,
            page.fits,
            path
        );
    }

    let path = format!("{}/sample-error.bmp", out_dir);
    std::fs::write(&path, &renderer.render(None).bmp_data)?;
    println!("no data -> {}", path);

    Ok(())
}
