use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facecat_store::FaceStore;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod catalog;
mod config;
mod engine;
mod live;
mod shell;
mod status;
#[cfg(test)]
mod testing;

use catalog::Catalog;
use config::Config;
use engine::LazyEngine;
use live::{LiveOptions, LiveReporter, StopSignal};
use shell::{LiveSettings, Shell};

#[derive(Parser)]
#[command(name = "facecat", about = "Catalog known faces and identify them in photos or a live camera feed")]
struct Cli {
    /// Path to the face catalog database (overrides FACECAT_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify every face in a photo
    Identify {
        /// Photo to identify
        image: PathBuf,
    },
    /// Add the first face found in a photo under a name
    Add {
        /// Name to store the face under
        #[arg(short, long)]
        name: String,
        /// Photo containing the face
        image: PathBuf,
    },
    /// Delete every face stored under a name
    Delete {
        name: String,
    },
    /// List known faces
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recognize faces from the camera until Ctrl-C
    Live {
        /// V4L2 device (overrides FACECAT_CAMERA_DEVICE)
        #[arg(long)]
        device: Option<String>,
        /// Keep the latest annotated frame in this PNG
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Stop after this many processed frames
        #[arg(long)]
        max_frames: Option<usize>,
    },
    /// Interactive menu
    Shell {
        /// V4L2 device used by Live Recognition
        #[arg(long)]
        device: Option<String>,
        /// Keep the latest annotated live frame in this PNG
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct FaceSummary<'a> {
    id: i64,
    name: &'a str,
    dims: usize,
    created_at: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let stop = StopSignal::new();
    tokio::spawn(watch_interrupts(stop.clone()));

    tokio::task::block_in_place(|| run(cli.command, config, stop))
}

/// Route Ctrl-C to a running live session, or exit when none is listening.
async fn watch_interrupts(stop: StopSignal) {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            return;
        }
        if stop.request() {
            tracing::info!("stopping live recognition");
        } else {
            std::process::exit(130);
        }
    }
}

fn run(command: Commands, config: Config, stop: StopSignal) -> Result<()> {
    let store = FaceStore::open(&config.db_path)
        .with_context(|| format!("failed to open face catalog {}", config.db_path.display()))?;
    let mut catalog = Catalog::new(store, LazyEngine::new(&config));

    match command {
        Commands::Identify { image } => println!("{}", catalog.identify(&image)?),
        Commands::Add { name, image } => println!("{}", catalog.add(&name, &image)?),
        Commands::Delete { name } => println!("{}", catalog.delete(&name)?),
        Commands::List { json } => list(&catalog, json)?,
        Commands::Live {
            device,
            snapshot,
            max_frames,
        } => {
            let device = device.unwrap_or_else(|| config.camera_device.clone());
            let options = LiveOptions {
                max_frames,
                annotate: snapshot.is_some(),
            };
            println!("Live recognition on {device}, press Ctrl-C to stop");
            let mut reporter = LiveReporter::new(std::io::stdout(), snapshot);
            let summary = catalog.live_camera(&device, &stop, &options, &mut reporter)?;
            if let live::LiveEnd::CaptureFailed(reason) | live::LiveEnd::RecognitionFailed(reason) = summary.end {
                anyhow::bail!("live recognition failed after {} frames: {reason}", summary.frames);
            }
        }
        Commands::Shell { device, snapshot } => {
            let settings = LiveSettings {
                device: device.unwrap_or_else(|| config.camera_device.clone()),
                snapshot,
                stop,
            };
            let stdin = std::io::stdin();
            Shell::new(&mut catalog, settings, stdin.lock(), std::io::stdout()).run()?;
        }
    }

    catalog.close()
}

fn list<E: facecat_core::FaceEncoder>(catalog: &Catalog<E>, json: bool) -> Result<()> {
    let known = catalog.known();
    if json {
        let faces: Vec<FaceSummary<'_>> = known
            .iter()
            .map(|face| FaceSummary {
                id: face.id,
                name: &face.name,
                dims: face.embedding.len(),
                created_at: &face.created_at,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&faces)?);
    } else if known.is_empty() {
        println!("No known faces");
    } else {
        for face in known {
            println!("{:>4}  {:<24} {}", face.id, face.name, face.created_at);
        }
    }
    Ok(())
}
