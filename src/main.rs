use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use factpaper::config::load_env_file;
use factpaper::rendering::decoration::fetch_decoration;
use factpaper::rendering::font::select_font_source;
use factpaper::server::App;
use factpaper::{AppConfig, CachedProvider, ChuckNorrisClient, Renderer};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "factpaper")]
#[command(about = "Chuck Norris facts for e-paper displays", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the current fact once and write the BMP
    Render {
        /// Output file; standard output when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve the display over HTTP on HOST:PORT
    Serve {
        /// Number of request handling threads
        #[arg(long, default_value_t = num_cpus::get())]
        workers: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = load_env_file().context("Failed to load configuration")?;
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_logging(config.debug);
    if let Some(path) = env_file {
        log::debug!("Loaded environment from {}", path.display());
    }
    config.validate().context("Refusing to start")?;

    let fonts = select_font_source(config.font_path.as_deref());
    let image = config
        .image_url
        .as_deref()
        .and_then(|url| fetch_decoration(url, FETCH_TIMEOUT));
    let renderer = Renderer::new(config.display, fonts, image);
    log::info!(
        "Display {}x{}, decorative image: {}",
        config.display.width,
        config.display.height,
        if renderer.has_image() { "loaded" } else { "none" }
    );

    let client = ChuckNorrisClient::new(config.fact_api_url.clone(), FETCH_TIMEOUT)
        .context("Failed to create content provider")?;
    log::debug!("Fetching facts from {}", client.url());
    let provider = CachedProvider::new(Box::new(client), config.cache_ttl());

    match cli.command {
        Commands::Render { output } => {
            let frame = renderer.render(provider.get().as_ref());
            match output {
                Some(path) => {
                    std::fs::write(&path, &frame.bmp_data)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!(
                        "Wrote {}x{} display to {}",
                        frame.width,
                        frame.height,
                        path.display()
                    );
                }
                None => {
                    let mut out = std::io::stdout().lock();
                    out.write_all(&frame.bmp_data)?;
                    out.flush()?;
                }
            }
        }
        Commands::Serve { workers } => {
            let addr = format!("{}:{}", config.host, config.port);
            let app = Arc::new(App::new(renderer, provider, config.refresh_interval));
            app.serve(&addr, workers)?;
        }
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}
