//! tunesleuth - command-line front end
//!
//! Scans a music folder, reports the organizational patterns it follows and
//! looks tracks up in MusicBrainz. Read-only: no tags are written and no
//! files are moved.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};
use tunesleuth_core::{Library, MetadataMatcher, PatternDetector, Scanner, TuneSleuthConfig};

mod report;

#[derive(Parser, Debug)]
#[command(name = "tunesleuth")]
#[command(about = "Your music library's private investigator")]
#[command(version)]
struct Cli {
    /// Config file (overrides TUNESLEUTH_CONFIG and the default location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a folder and print library statistics
    Scan {
        path: PathBuf,
    },

    /// Detect naming and folder patterns
    Analyze {
        path: PathBuf,

        /// Show explanations and examples for each pattern
        #[arg(short, long)]
        explain: bool,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look tracks up in MusicBrainz
    Lookup {
        path: PathBuf,

        /// Maximum matches per track (defaults to matcher.default_limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Look up every track, not just those with incomplete tags
        #[arg(short, long)]
        all: bool,
    },
}

/// Log level used until the config file has been read
const STARTUP_LEVEL: &str = "info";

fn startup_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        STARTUP_LEVEL
    }
}

/// Directive to switch to once the config is loaded; `None` keeps the
/// filter chosen at startup
fn configured_directive(verbose: bool, env_override: bool, level: &str) -> Option<String> {
    if verbose || env_override || level.trim().is_empty() {
        None
    } else {
        Some(level.trim().to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging first: config resolution reports its fallbacks through it
    let env_filter = EnvFilter::try_from_default_env();
    let env_override = env_filter.is_ok();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|_| EnvFilter::new(startup_directive(cli.verbose))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = TuneSleuthConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(level) = configured_directive(cli.verbose, env_override, &config.logging.level) {
        filter_handle
            .reload(EnvFilter::new(level))
            .context("Failed to apply configured log level")?;
    }

    info!("Starting TuneSleuth v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Scan { path } => {
            let library = scan(&config, &path)?;
            print!("{}", report::library_summary(&library));
        }
        Command::Analyze {
            path,
            explain,
            json,
        } => {
            let mut library = scan(&config, &path)?;
            let detector = PatternDetector::with_settings(config.detector.clone());
            let analysis = detector.analyze(&mut library);

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print!("{}", report::analysis(&analysis, explain));
            }
        }
        Command::Lookup { path, limit, all } => {
            let limit = limit.unwrap_or(config.matcher.default_limit);
            lookup(&config, &path, limit, all).await?;
        }
    }

    Ok(())
}

fn scan(config: &TuneSleuthConfig, path: &Path) -> Result<Library> {
    let scanner = Scanner::new(config.scanner.clone()).with_progress(|progress| {
        if let Some(file) = &progress.current_file {
            debug!(
                "[{:>5.1}%] {}",
                progress.progress_percent(),
                file.display()
            );
        }
    });

    scanner
        .scan(path)
        .with_context(|| format!("Failed to scan {}", path.display()))
}

/// Look tracks up one at a time through a single rate-limited matcher
async fn lookup(config: &TuneSleuthConfig, path: &Path, limit: usize, all: bool) -> Result<()> {
    let mut library = scan(config, path)?;
    if library.is_empty() {
        println!("No tracks found in library.");
        return Ok(());
    }

    PatternDetector::with_settings(config.detector.clone()).analyze(&mut library);

    let matcher = MetadataMatcher::musicbrainz(config.matcher.clone())
        .context("Failed to create metadata matcher")?;

    let candidates: Vec<_> = library
        .tracks()
        .iter()
        .filter(|t| all || !t.has_complete_tags())
        .collect();

    println!(
        "Looking up {} of {} tracks in MusicBrainz",
        candidates.len(),
        library.len()
    );
    println!();

    let mut matched = 0;
    for (index, track) in candidates.iter().enumerate() {
        let matches = matcher.lookup_track(track, limit).await;
        if !matches.is_empty() {
            matched += 1;
        }
        print!(
            "{}",
            report::track_matches(index + 1, candidates.len(), track, &matches)
        );
    }

    println!(
        "{} of {} tracks had at least one match. No tags were modified.",
        matched,
        candidates.len()
    );

    Ok(())
}
