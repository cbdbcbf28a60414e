//! CLI entry point for the istock-miner tool.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use istock_miner::layout::DEFAULT_BACKEND;
use istock_miner::{
    DEFAULT_CONCURRENCY, DatasetLayout, MediaType, Miner, MinerConfig, MiningReport, Orientation,
    PeopleCount, SearchCriteria, SimilarityKind, SimilarityProbe,
};
use serde::Serialize;
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::{FileConfig, load_file_config};
use cli::Args;

#[derive(Debug, Serialize)]
struct RunOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<SimilarityProbe>,
    report: MiningReport,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = load_file_config(args.config.as_deref())?.unwrap_or_default();
    debug!(?file_config, "file configuration loaded");

    let criteria = SearchCriteria::new(&args.phrase)
        .with_media_type(MediaType::from_label(&args.media_type))
        .with_people_count(PeopleCount::from_label(&args.people_count))
        .with_orientation(Orientation::from_label(&args.orientation))
        .with_page_count(args.pages);
    let layout = build_layout(&args, &file_config);
    let config = build_miner_config(&args, &file_config);

    let mut miner = Miner::new(criteria, layout, config).context("Failed to set up the miner")?;

    let similarity = match args.similar.as_deref() {
        Some(asset_id) => {
            let kind = SimilarityKind::from_label(&args.similar_kind).unwrap_or_default();
            Some(miner.more_like_this(asset_id, kind).await)
        }
        None => None,
    };

    let report = miner.mine().await.with_context(|| {
        format!(
            "Mining run into '{}' failed",
            miner.destination().display()
        )
    })?;

    info!(
        written = report.stats.assets_written,
        failed = report.stats.assets_failed,
        pages_failed = report.stats.pages_failed,
        "Mining finished"
    );

    if args.json {
        let output = RunOutput { similarity, report };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize run report")?
        );
    }

    Ok(())
}

/// CLI values win over the config file, which wins over built-in defaults.
fn build_layout(args: &Args, file: &FileConfig) -> DatasetLayout {
    let root = args
        .dataset_root
        .clone()
        .or_else(|| file.dataset_root.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let backend = args
        .backend
        .clone()
        .or_else(|| file.backend.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND.to_string());

    DatasetLayout {
        root,
        backend,
        categorized: !args.uncategorized,
    }
}

fn build_miner_config(args: &Args, file: &FileConfig) -> MinerConfig {
    let concurrency = args
        .concurrency
        .map(usize::from)
        .or(file.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);

    let mut config = MinerConfig::default().with_concurrency(concurrency);
    if let Some(secs) = file.index_timeout_secs {
        config.index_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(secs) = file.image_timeout_secs {
        config.image_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(secs) = file.connect_timeout_secs {
        config.connect_timeout = Duration::from_secs(secs);
    }
    if args.no_jitter || file.politeness == Some(false) {
        debug!("politeness pauses disabled");
        config = config.without_jitter();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["istock-miner", "dog"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_layout_defaults() {
        let layout = build_layout(&args(&[]), &FileConfig::default());
        assert_eq!(layout, DatasetLayout::default());
    }

    #[test]
    fn test_cli_wins_over_file() {
        let file = FileConfig {
            dataset_root: Some(PathBuf::from("/from/file")),
            backend: Some("file_backend".to_string()),
            concurrency: Some(4),
            ..FileConfig::default()
        };
        let cli = args(&["--dataset-root", "/from/cli", "-c", "8", "--uncategorized"]);

        let layout = build_layout(&cli, &file);
        assert_eq!(layout.root, PathBuf::from("/from/cli"));
        assert_eq!(layout.backend, "file_backend");
        assert!(!layout.categorized);

        assert_eq!(build_miner_config(&cli, &file).concurrency, 8);
        assert_eq!(build_miner_config(&args(&[]), &file).concurrency, 4);
    }

    #[test]
    fn test_file_timeouts_and_politeness() {
        let file = FileConfig {
            image_timeout_secs: Some(7),
            connect_timeout_secs: Some(3),
            politeness: Some(false),
            ..FileConfig::default()
        };
        let config = build_miner_config(&args(&[]), &file);
        assert_eq!(config.image_timeout, Some(Duration::from_secs(7)));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(config.index_jitter.is_disabled());
        assert!(config.download_jitter.is_disabled());
    }

    #[test]
    fn test_politeness_on_by_default() {
        let config = build_miner_config(&args(&[]), &FileConfig::default());
        assert!(!config.index_jitter.is_disabled());
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }
}
