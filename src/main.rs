use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use slidesync::chrome::{ChromeHandle, SinkSelect};
use slidesync::config::{self, Config};
use slidesync::deck::{parse_deck, render_text};
use slidesync::input::InputSource;
use slidesync::page::PageLayout;
use slidesync::session::{Session, SessionOptions};
use slidesync::theme::{self, Theme};
use slidesync::trace::{parse_script, run_trace};

#[derive(Parser)]
#[command(name = "slidesync", about = "Scroll-synchronized slide deck viewer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Input Markdown deck (for view mode; use `-` for stdin)
    #[arg(global = true)]
    input: Option<PathBuf>,

    /// Color theme (overrides the saved preference's default)
    #[arg(long, global = true, value_enum)]
    theme: Option<Theme>,

    /// Visibility ratio a slide must exceed to become the active link
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Jump instantly instead of smooth scrolling
    #[arg(long, global = true)]
    reduced_motion: bool,

    /// Log output file path (enables logging when specified)
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a scroll script against a headless page and print navigation updates
    Trace {
        /// Input Markdown deck
        deck: PathBuf,

        /// Trace script (one command per line)
        script: PathBuf,

        /// Viewport height in document units
        #[arg(long, default_value_t = 800.0)]
        viewport_height: f64,

        /// Height of every slide (defaults to the viewport height)
        #[arg(long)]
        slide_height: Option<f64>,

        /// Run without the given UI sink (repeatable)
        #[arg(long, value_enum)]
        disable: Vec<SinkSelect>,
    },
    /// Export the deck as plain text, one form-feed separated page per slide
    Export {
        /// Input Markdown deck (use `-` for stdin)
        deck: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Wrap width in columns
        #[arg(long, default_value_t = 80)]
        width: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Some(log_path) = &cli.log {
        let file = match fs::File::create(log_path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error: failed to open log file {}: {e}", log_path.display());
                std::process::exit(1);
            }
        };
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else if cli.command.is_some() {
        env_logger::init();
    }
    // viewer mode + no --log: logger stays off so the alternate screen is clean

    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    cfg.merge_cli(&config::CliOverrides {
        theme: cli.theme,
        threshold: cli.threshold,
        reduced_motion: cli.reduced_motion,
    });
    let config = cfg.resolve();

    let result = match cli.command {
        Some(Command::Trace {
            deck,
            script,
            viewport_height,
            slide_height,
            disable,
        }) => cmd_trace(&deck, &script, &config, viewport_height, slide_height, &disable),
        Some(Command::Export { deck, output, width }) => cmd_export(deck, output, width),
        None => match InputSource::from_arg(cli.input) {
            Some(source) => slidesync::viewer::run(source, config, theme::prefs_path()),
            None => {
                eprintln!("Error: input deck required (or pipe via stdin)");
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn cmd_trace(
    deck: &Path,
    script: &Path,
    config: &Config,
    viewport_height: f64,
    slide_height: Option<f64>,
    disable: &[SinkSelect],
) -> Result<()> {
    let markdown = fs::read_to_string(deck)
        .with_context(|| format!("failed to read {}", deck.display()))?;
    let script_text = fs::read_to_string(script)
        .with_context(|| format!("failed to read {}", script.display()))?;

    let slides = parse_deck(&markdown)?;
    let steps = parse_script(&script_text)
        .with_context(|| format!("in script {}", script.display()))?;

    if !(viewport_height.is_finite() && viewport_height > 0.0) {
        anyhow::bail!("--viewport-height must be a positive number");
    }
    let slide_height = slide_height.unwrap_or(viewport_height);
    if !(slide_height.is_finite() && slide_height > 0.0) {
        anyhow::bail!("--slide-height must be a positive number");
    }

    let page = PageLayout::uniform(slides.iter().map(|s| s.id.as_str()), slide_height, viewport_height)?;
    info!(
        "trace: {} slide(s), slide height {slide_height}, viewport {viewport_height}, {} step(s)",
        page.deck.len(),
        steps.len()
    );

    let chrome = ChromeHandle::new();
    let links = chrome.links(page.deck.slides().iter().map(|s| s.id.as_str()));
    let options = SessionOptions {
        nav: config.engine.nav_options(),
        threshold: config.engine.threshold,
        margin: config.engine.margin,
        smooth_speed: config.viewer.smooth_speed,
    };
    let mut session = Session::new(&page, chrome.sinks(disable), links, options);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_trace(&mut session, &chrome, &steps, &mut out)?;
    out.flush()?;
    Ok(())
}

fn cmd_export(deck: PathBuf, output: Option<PathBuf>, width: usize) -> Result<()> {
    let source = InputSource::from_arg(Some(deck)).context("input deck required")?;
    let slides = parse_deck(&source.read_to_string()?)?;
    let text = render_text(&slides, width);
    match output {
        Some(path) => {
            fs::write(&path, &text).with_context(|| format!("failed to write {}", path.display()))?;
            info!("export: {} slide(s) to {}", slides.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(text.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}
