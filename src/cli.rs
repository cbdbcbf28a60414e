//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Crawl a stock image catalog for a phrase and download new thumbnails.
///
/// Images already present in the destination directory are skipped, so
/// repeated runs only fetch what is new.
#[derive(Parser, Debug)]
#[command(name = "istock-miner")]
#[command(author, version, about)]
pub struct Args {
    /// Search phrase (an empty phrase disables the run)
    pub phrase: String,

    /// Media type filter: photo, illustration, vector or undefined
    #[arg(short = 'm', long, default_value = "photography")]
    pub media_type: String,

    /// People count filter: none, one, two, group or undefined
    #[arg(long = "people", default_value = "none")]
    pub people_count: String,

    /// Orientation filter: square, vertical, horizontal, panoramic_vertical,
    /// panoramic_horizontal or undefined
    #[arg(short = 'o', long, default_value = "undefined")]
    pub orientation: String,

    /// Number of index pages to crawl (out-of-range values fall back to 1)
    #[arg(short = 'p', long, default_value_t = 1, allow_negative_numbers = true)]
    pub pages: i64,

    /// Store images under the `undefined` directory instead of the phrase
    #[arg(long)]
    pub uncategorized: bool,

    /// Dataset root directory
    #[arg(short = 'd', long)]
    pub dataset_root: Option<PathBuf>,

    /// Backend directory under the dataset root
    #[arg(short = 'b', long)]
    pub backend: Option<String>,

    /// Crawl images similar to this asset id instead of the phrase search
    #[arg(short = 's', long)]
    pub similar: Option<String>,

    /// Similarity kind used with --similar
    #[arg(long, default_value = "content", value_parser = ["content", "color"])]
    pub similar_kind: String,

    /// Concurrent downloads (1-32)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub concurrency: Option<u8>,

    /// Disable the random pauses between requests
    #[arg(long)]
    pub no_jitter: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/istock-miner/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_phrase_only_uses_defaults() {
        let args = Args::try_parse_from(["istock-miner", "dog"]).unwrap();
        assert_eq!(args.phrase, "dog");
        assert_eq!(args.media_type, "photography");
        assert_eq!(args.people_count, "none");
        assert_eq!(args.orientation, "undefined");
        assert_eq!(args.pages, 1);
        assert!(!args.uncategorized);
        assert!(args.concurrency.is_none());
        assert!(args.similar.is_none());
        assert_eq!(args.similar_kind, "content");
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_phrase_is_required() {
        let result = Args::try_parse_from(["istock-miner"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_empty_phrase_is_accepted() {
        let args = Args::try_parse_from(["istock-miner", ""]).unwrap();
        assert!(args.phrase.is_empty());
    }

    #[test]
    fn test_cli_filters_are_passed_through() {
        let args = Args::try_parse_from([
            "istock-miner",
            "red panda",
            "--media-type",
            "vector",
            "--people",
            "group",
            "--orientation",
            "square",
            "--pages",
            "5",
            "--uncategorized",
        ])
        .unwrap();
        assert_eq!(args.phrase, "red panda");
        assert_eq!(args.media_type, "vector");
        assert_eq!(args.people_count, "group");
        assert_eq!(args.orientation, "square");
        assert_eq!(args.pages, 5);
        assert!(args.uncategorized);
    }

    #[test]
    fn test_cli_negative_pages_parse() {
        let args = Args::try_parse_from(["istock-miner", "dog", "-p", "-3"]).unwrap();
        assert_eq!(args.pages, -3);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["istock-miner", "dog", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_concurrency_range() {
        let args = Args::try_parse_from(["istock-miner", "dog", "-c", "32"]).unwrap();
        assert_eq!(args.concurrency, Some(32));

        let result = Args::try_parse_from(["istock-miner", "dog", "-c", "0"]);
        assert!(result.is_err());
        let result = Args::try_parse_from(["istock-miner", "dog", "-c", "33"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_similar_kind_is_validated() {
        let args = Args::try_parse_from([
            "istock-miner",
            "horse",
            "--similar",
            "1280951754",
            "--similar-kind",
            "color",
        ])
        .unwrap();
        assert_eq!(args.similar.as_deref(), Some("1280951754"));
        assert_eq!(args.similar_kind, "color");

        let result = Args::try_parse_from(["istock-miner", "horse", "--similar-kind", "shape"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["istock-miner", "--help"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayHelp
        );
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["istock-miner", "--version"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayVersion
        );
    }

    #[test]
    fn test_cli_unknown_flag_is_rejected() {
        let result = Args::try_parse_from(["istock-miner", "dog", "--retries", "3"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::UnknownArgument
        );
    }
}
