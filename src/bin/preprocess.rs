//! Preprocessor binary: consolidates the raw tab-separated interaction logs into the
//! parquet tables used downstream.
//!
//! ## Input
//!
//! A directory of tab-separated files, each with a header naming at least
//! `user_id, anime_id, score, favorite, status, progress`.
//!
//! ## Output
//!
//! - `interactions_score_favorite.parquet`: one row per interaction, keyed by integer `user_id`
//! - `user_name_id.parquet`: the `user_name -> user_id` mapping for this run
//!
//! ## Usage
//!
//! ```sh
//! cargo run --release --bin preprocess
//! cargo run --release --bin preprocess -- --interactions-raw data/interactions_raw
//! ```

use std::path::PathBuf;

use anirec::progress::ProgressReporter;
use anirec::settings::Settings;
use anirec_ingest::{LoadObserver, NoopObserver};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Consolidate raw interaction logs into parquet tables with dense user ids")]
struct Args {
    /// Directory of raw interaction files. Overrides ANIREC_INTERACTIONS_RAW.
    #[arg(long)]
    interactions_raw: Option<PathBuf>,

    /// Output path of the interaction table. Overrides ANIREC_INTERACTIONS_OUT.
    #[arg(long)]
    interactions_out: Option<PathBuf>,

    /// Output path of the user name to id table. Overrides ANIREC_USER_NAME_ID_OUT.
    #[arg(long)]
    user_name_id_out: Option<PathBuf>,

    /// Do not draw a progress bar.
    #[arg(long, default_value_t = false)]
    no_progress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::from_env()?;

    let mut paths = settings.paths.pipeline_paths();
    if let Some(p) = args.interactions_raw {
        paths.interactions_raw = p;
    }
    if let Some(p) = args.interactions_out {
        paths.interactions_out = p;
    }
    if let Some(p) = args.user_name_id_out {
        paths.user_name_id_out = p;
    }

    info!("Raw dir:      {}", paths.interactions_raw.display());
    info!("Interactions: {}", paths.interactions_out.display());
    info!("User ids:     {}", paths.user_name_id_out.display());

    let mut reporter = ProgressReporter::new();
    let mut quiet = NoopObserver;
    let observer: &mut dyn LoadObserver = if args.no_progress {
        &mut quiet
    } else {
        &mut reporter
    };

    anirec_ingest::run(&paths, observer)?;
    Ok(())
}
