//! Command-line arguments for the futures board.
//!
//! Every flag except `--config` overrides the matching value from the settings file.
use clap::Parser;
use futures_common::SortMode;
use futures_common::net::QUOTE_ENDPOINT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON settings file. Missing files fall back to defaults.
    #[clap(long, default_value = "futures-board.json")]
    pub config: String,

    /// Futures codes to track, separated by commas (e.g. `RB2405,AG2412`).
    #[clap(long, value_delimiter = ',')]
    pub codes: Vec<String>,

    /// Path to a text file with futures codes.
    /// Codes may be separated by commas, spaces, or new lines.
    #[clap(long)]
    pub codes_file: Option<String>,

    /// Base URL of the snapshot endpoint.
    #[clap(long, default_value = QUOTE_ENDPOINT)]
    pub endpoint: String,

    /// Refresh interval in milliseconds.
    #[clap(long, default_value_t = 5000)]
    pub interval_ms: u64,

    /// Sort order of the futures list.
    #[clap(long, value_enum)]
    pub sort: Option<SortMode>,

    /// Fetch once, print, and exit.
    #[clap(long)]
    pub once: bool,

    /// Print the category tree after every refresh.
    #[clap(long)]
    pub tree: bool,

    /// Step the saved sort order (normal, asc, desc) before starting.
    #[clap(long)]
    pub cycle_sort: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["futures_board"]).unwrap();
        assert_eq!(args.config, "futures-board.json");
        assert_eq!(args.endpoint, QUOTE_ENDPOINT);
        assert_eq!(args.interval_ms, 5000);
        assert!(args.codes.is_empty());
        assert!(args.sort.is_none());
        assert!(!args.once);
    }

    #[test]
    fn codes_split_on_commas_and_sort_parses() {
        let args = Args::try_parse_from([
            "futures_board",
            "--codes",
            "RB2405,AG2412",
            "--sort",
            "desc",
            "--once",
        ])
        .unwrap();
        assert_eq!(args.codes, ["RB2405", "AG2412"]);
        assert_eq!(args.sort, Some(SortMode::Desc));
        assert!(args.once);
    }
}
