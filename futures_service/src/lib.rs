//!
//! Futures quote service and its display projections.
//!
//! This crate aggregates:
//! - `transport` — the `QuoteSource` contract and the HTTP snapshot source.
//! - `service` — `QuoteService`, owner of the published futures snapshot.
//! - `notify` — user notifications, telemetry and price alerts.
//! - `tree` — two-level category tree over the snapshot.
//! - `statusbar` — status-bar slot pools for stocks and futures.
#![warn(missing_docs)]
pub mod notify;
pub mod service;
pub mod statusbar;
pub mod transport;
pub mod tree;

pub use notify::{LogNotifier, Notifier};
pub use service::{FetchOutcome, ListUpdate, QuoteService, Snapshot};
pub use statusbar::{BarFamily, DisplaySlot, SlotHost, StatusBar};
pub use transport::{HttpQuoteSource, QuoteSource};
pub use tree::{FutureTree, TreeNode};
