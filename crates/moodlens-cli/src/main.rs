use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moodlens_core::{
    build_classifier, ClassifierKind, FrameEvent, FrameReport, LandmarkSet, Mood, Session,
};
use moodlens_media::{Language, MediaCatalog, MediaDescriptor, MediaSelection};
use tracing_subscriber::EnvFilter;

mod config;
mod engine;
mod overlay;
mod replay;

use config::Config;
use replay::{ReplaySource, UNAVAILABLE_STATUS};

#[derive(Parser)]
#[command(name = "moodlens", version, about = "Mood readouts from face-mesh landmarks")]
struct Cli {
    /// TOML config file (overrides MOODLENS_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay recorded landmark frames through the mood pipeline
    Scan {
        /// JSONL file, one detector callback per line
        frames: PathBuf,
        /// Classifier to use: rules or network
        #[arg(long)]
        classifier: Option<ClassifierKind>,
        /// Language for the media pick
        #[arg(long)]
        language: Option<String>,
        /// Pick media for the final mood once the scan stops
        #[arg(long)]
        play: bool,
        /// Write the last detected face as a PNG overlay
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// Emit one JSON report per frame instead of text
        #[arg(long)]
        json: bool,
    },
    /// Pick media for a language and mood
    Play {
        #[arg(long)]
        language: Option<String>,
        #[arg(long, default_value = "neutral")]
        mood: String,
        /// Hand the URL to the system opener
        #[arg(long)]
        open: bool,
    },
    /// List the mood vocabulary
    Moods,
    /// Dump the media catalog as JSON
    Catalog {
        #[arg(long)]
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Command::Scan {
            frames,
            classifier,
            language,
            play,
            overlay,
            json,
        } => {
            if let Some(kind) = classifier {
                config.classifier = kind;
            }
            if let Some(language) = language {
                config.language = language;
            }
            cmd_scan(&config, &frames, play, overlay.as_deref(), json).await
        }
        Command::Play {
            language,
            mood,
            open,
        } => {
            let catalog = load_catalog(&config)?;
            let language = language.unwrap_or(config.language);
            let selection = catalog.select_by_name(&language, &mood);
            show_selection(&selection, open);
            Ok(())
        }
        Command::Moods => {
            for mood in Mood::ALL {
                println!("{:<10} {}", mood.as_str(), mood.description());
            }
            Ok(())
        }
        Command::Catalog { language } => {
            let catalog = load_catalog(&config)?;
            cmd_catalog(&catalog, language.as_deref())
        }
    }
}

async fn cmd_scan(
    config: &Config,
    frames: &Path,
    play: bool,
    overlay_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut source = match ReplaySource::open(frames) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "frame source unavailable");
            println!("{UNAVAILABLE_STATUS}");
            return Err(e.into());
        }
    };
    let catalog = if play { Some(load_catalog(config)?) } else { None };

    let kind = config.classifier;
    let rules = config.rules.clone();
    let network = config.network.clone();
    let classifier = tokio::task::spawn_blocking(move || build_classifier(kind, rules, &network))
        .await
        .context("classifier setup panicked")?;

    let session = Session::new(config.session_config(), classifier);
    let engine = engine::spawn_engine(session)?;

    let id = engine.start().await?;
    tracing::info!(session = %id, frames = %frames.display(), "scan started");
    if !json {
        println!("Scanning...");
    }

    let mut last_face: Option<LandmarkSet> = None;
    let mut analysed = 0usize;
    for event in source.by_ref() {
        if let FrameEvent::Face { landmarks, .. } = &event {
            if overlay_path.is_some() {
                last_face = Some(landmarks.clone());
            }
        }
        let Some(report) = engine.frame(event).await? else {
            continue;
        };
        analysed += 1;
        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            match &report {
                FrameReport::Analyzed(readout) => {
                    println!("{readout} | {}", readout.description())
                }
                FrameReport::NotFound => println!("{report}"),
            }
        }
    }

    engine.stop().await?;
    let mood = engine.current_mood().await?;
    tracing::info!(
        session = %id,
        frames = analysed,
        skipped = source.skipped(),
        mood = %mood,
        "scan finished"
    );
    if !json {
        println!("Stopped. Mood: {} ({})", mood, mood.description());
    }

    if let Some(path) = overlay_path {
        match &last_face {
            Some(landmarks) => overlay::save(landmarks, path)
                .with_context(|| format!("failed to write overlay {}", path.display()))?,
            None => tracing::warn!("no face seen, overlay not written"),
        }
    }

    if let Some(catalog) = &catalog {
        let selection = catalog.select_by_name(&config.language, mood.as_str());
        show_selection(&selection, false);
    }

    Ok(())
}

fn cmd_catalog(catalog: &MediaCatalog, language: Option<&str>) -> Result<()> {
    let languages: Vec<Language> = match language {
        Some(name) => vec![name.parse::<Language>()?],
        None => catalog.languages().collect(),
    };

    let mut out: BTreeMap<Language, BTreeMap<Mood, &MediaDescriptor>> = BTreeMap::new();
    for language in languages {
        let Some(by_mood) = catalog.entries_for(language) else {
            continue;
        };
        out.insert(language, by_mood.iter().map(|(m, d)| (*m, d)).collect());
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn load_catalog(config: &Config) -> Result<MediaCatalog> {
    match &config.catalog_path {
        Some(path) => MediaCatalog::load(path).context("failed to load media catalog"),
        None => Ok(MediaCatalog::builtin()),
    }
}

fn show_selection(selection: &MediaSelection<'_>, open: bool) {
    let url = selection.url();
    println!("{selection}");
    println!("{url}");
    if open {
        open_url(&url);
    }
}

/// Best effort: a missing opener is logged, not fatal.
fn open_url(url: &str) {
    #[cfg(target_os = "macos")]
    let mut cmd = std::process::Command::new("open");
    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut cmd = std::process::Command::new("xdg-open");

    match cmd.arg(url).spawn() {
        Ok(_) => tracing::debug!(url, "opener launched"),
        Err(e) => tracing::warn!(url, error = %e, "failed to launch media opener"),
    }
}
