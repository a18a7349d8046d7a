//! Batch feature extraction.
//!
//! Reads a list of `<local_path>\t<output_path>` lines and writes one JSON
//! record per entry to the output file.

mod config;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use photofeat::{read_list, run_batch, FeatureExtractor};
use tracing::{error, info, warn};

use crate::config::{Config, FACE_MODEL_VAR};

/// Exit status when the run is interrupted (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

const ENV_HELP: &str = "\
Environment:
  PHOTOFEAT_MAX_EDGE    Longer edge after downscaling, in pixels [default: 1200]
  PHOTOFEAT_FACE_MODEL  SeetaFace model file [default: model/seeta_fd_frontal_v1.0.bin]
                        No model is bundled; without a readable file every record has faces: []
  RUST_LOG              Log filter for stderr [default: info]";

/// Extract faces, saliency, aesthetic and horizon features from a list of images
#[derive(Parser, Debug)]
#[command(name = "photofeat")]
#[command(version, after_help = ENV_HELP)]
struct Args {
    /// Text file: <local_path><TAB><output_path> per line
    #[arg(long)]
    list: PathBuf,

    /// Output JSON Lines file (created or truncated)
    #[arg(long)]
    out: PathBuf,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    if let Err(e) = ctrlc::set_handler(|| std::process::exit(EXIT_INTERRUPTED)) {
        warn!(error = %e, "could not install interrupt handler");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = Config::from_env();
    info!(
        "Starting photofeat v{} (max edge {} px)",
        env!("CARGO_PKG_VERSION"),
        config.max_edge
    );

    let file = File::create(&args.out)
        .with_context(|| format!("creating output {}", args.out.display()))?;
    let mut out = BufWriter::new(file);

    let entries = read_list(&args.list)
        .with_context(|| format!("reading list {}", args.list.display()))?;
    info!(entries = entries.len(), list = %args.list.display(), "list loaded");

    let extractor = FeatureExtractor::new()
        .max_edge(config.max_edge)
        .face_model(&config.face_model);
    let capabilities = extractor.capabilities();
    info!("capabilities: {capabilities}");
    if !capabilities.all() {
        warn!(
            missing = ?capabilities.missing(),
            "some features will use neutral defaults"
        );
    }
    if !capabilities.faces {
        warn!(
            model = %config.face_model.display(),
            "no usable face model; set {FACE_MODEL_VAR} to a SeetaFace model file to detect faces"
        );
    }
    let summary = run_batch(&extractor, &entries, &mut out)
        .with_context(|| format!("writing {}", args.out.display()))?;

    info!(
        processed = summary.processed,
        failed = summary.failed,
        out = %args.out.display(),
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn both_paths_are_required() {
        assert!(Args::try_parse_from(["photofeat", "--list", "a.tsv"]).is_err());
        assert!(Args::try_parse_from(["photofeat", "--out", "b.jsonl"]).is_err());
        let args =
            Args::try_parse_from(["photofeat", "--list", "a.tsv", "--out", "b.jsonl"]).unwrap();
        assert_eq!(args.list, PathBuf::from("a.tsv"));
        assert_eq!(args.out, PathBuf::from("b.jsonl"));
    }

    #[test]
    fn help_lists_environment_settings() {
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("PHOTOFEAT_MAX_EDGE"));
        assert!(help.contains("PHOTOFEAT_FACE_MODEL"));
        assert!(help.contains("No model is bundled"));
    }

    #[test]
    fn no_extra_flags_accepted() {
        let parsed = Args::try_parse_from([
            "photofeat", "--list", "a", "--out", "b", "--max-edge", "10",
        ]);
        assert!(parsed.is_err());
    }
}
