//!
//! Common types and utilities shared by the quote service and the board binary.
//!
//! This crate aggregates:
//! - `error` — unified error type `FeedError` used across the workspace.
//! - `result` — handy `Result<T, FeedError>` alias.
//! - `record` — the normalized `QuoteRecord` and its category tags.
//! - `format` — fixed-precision rendering and precision inference.
//! - `sort` — `SortMode` and its three-state cycle.
//! - `protocol` — decoder for `var hq_str_<code>="...";` response bodies.
//! - `codes` — code splitting, contract-shape checks and code-list files.
//! - `label` — `${field}` label templates.
//! - `settings` — persisted board settings.
//! - `net` — endpoint constants and URL helpers.
#![warn(missing_docs)]
pub mod codes;
pub mod error;
pub mod format;
pub mod label;
pub mod net;
pub mod protocol;
pub mod record;
pub mod result;
pub mod settings;
pub mod sort;

pub use error::FeedError;
pub use record::{Category, QuoteRecord};
pub use result::Result;
pub use settings::Settings;
pub use sort::SortMode;
