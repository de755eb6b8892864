//! Futures Board: a terminal board that polls futures snapshots and prints them as a
//! status line and, optionally, a category tree.
//!
//! Usage example (CLI):
//! ```bash
//! futures_board --codes RB2405,AG2412 --sort desc --tree
//! futures_board --codes-file ./futures.txt --once
//! ```
//!
//! Concurrency and shutdown:
//! - A `crossbeam_channel::tick` drives the fetch cycle on the main thread.
//! - The service broadcasts every publish as a `ListUpdate`; the board subscribes and
//!   redraws from the update, never from the fetch result directly.
//! - Ctrl+C sends on a shutdown channel; `select!` multiplexes ticks, updates and
//!   shutdown.
#![warn(missing_docs)]
mod args;
mod terminal;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use crossbeam_channel::{Receiver, bounded, select, tick};
use futures_common::codes::{CodeList, CodeListParser};
use futures_common::{FeedError, Result, Settings};
use futures_service::{
    BarFamily, FutureTree, HttpQuoteSource, ListUpdate, LogNotifier, QuoteService, StatusBar,
};
use log::{debug, info, warn};

use crate::args::Args;
use crate::terminal::{TerminalHost, status_line, tree_lines};

/// Board state redrawn on every published update.
struct Board {
    settings: Settings,
    tree: FutureTree,
    bar: StatusBar<TerminalHost>,
    print_tree: bool,
}

impl Board {
    fn redraw(&mut self, update: &ListUpdate) {
        self.bar.refresh_futures(update.new.records(), &self.settings);
        for slot in self.bar.slots(BarFamily::Future) {
            debug!("{}", slot.tooltip());
        }

        println!(
            "[{}] {}",
            Local::now().format("%H:%M:%S"),
            status_line(self.bar.slots(BarFamily::Future))
        );
        if self.print_tree {
            for line in tree_lines(&self.tree, &update.new) {
                println!("{}", line);
            }
        }
    }
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let config_path = normalize_path(&args.config);
    let mut settings = Settings::load(&config_path)?;
    apply_overrides(&args, &mut settings)?;

    let mut tree = FutureTree::new(settings.future_sort, &settings.label_format.sidebar);
    if args.cycle_sort {
        tree.change_order(&mut settings);
        settings.save(&config_path)?;
    }

    let source = HttpQuoteSource::new(&args.endpoint)?;
    let mut service = QuoteService::new(Box::new(source), Box::new(LogNotifier))
        .with_max_fanout(settings.max_fanout);
    let updates = service.subscribe();

    let mut board = Board {
        settings,
        tree,
        bar: StatusBar::new(TerminalHost),
        print_tree: args.tree,
    };
    if board.settings.futures.is_empty() {
        warn!("No futures configured; pass --codes, --codes-file or edit {}", config_path.display());
    }

    if args.once {
        service.fetch(&board.settings.futures, board.tree.order());
        for update in updates.try_iter() {
            board.redraw(&update);
        }
        return Ok(());
    }

    let shutdown = shutdown_channel()?;
    run(&mut service, &mut board, updates, shutdown, args.interval_ms);
    info!("Board stopped");
    Ok(())
}

/// Poll until Ctrl+C, redrawing after every publish.
fn run(
    service: &mut QuoteService,
    board: &mut Board,
    updates: Receiver<ListUpdate>,
    shutdown: Receiver<()>,
    interval_ms: u64,
) {
    let ticker = tick(Duration::from_millis(interval_ms));
    info!("Refreshing every {} ms. Press Ctrl+C to exit.", interval_ms);
    service.fetch(&board.settings.futures, board.tree.order());

    loop {
        select! {
            recv(ticker) -> _ => {
                service.fetch(&board.settings.futures, board.tree.order());
            },
            recv(updates) -> msg => match msg {
                Ok(update) => board.redraw(&update),
                Err(_) => break,
            },
            recv(shutdown) -> _ => break,
        }
    }
}

fn shutdown_channel() -> Result<Receiver<()>> {
    let (tx, rx) = bounded(1);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down board...");
        let _ = tx.try_send(());
    })
    .map_err(|e| FeedError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    Ok(rx)
}

fn apply_overrides(args: &Args, settings: &mut Settings) -> Result<()> {
    if let Some(raw) = &args.codes_file {
        let path = normalize_path(raw);
        if !is_file_exist(&path) {
            return Err(FeedError::ParseCodesFile(format!(
                "{} is not a file",
                path.display()
            )));
        }
        let codes = CodeList::parse_from_file(BufReader::new(File::open(&path)?))?;
        info!("Loaded {} codes from {}", codes.len(), path.display());
        settings.futures = codes;
    }
    if !args.codes.is_empty() {
        settings.futures = args.codes.clone();
    }
    if let Some(sort) = args.sort {
        settings.future_sort = sort;
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &Path) -> bool {
    path.exists() && path.is_file()
}
