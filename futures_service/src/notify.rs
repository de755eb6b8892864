//! User-facing notifications, telemetry and price alerts.
//!
//! The service reports through a `Notifier` so the host decides how errors reach the
//! user. `LogNotifier` routes everything to the `log` facade, which is what the
//! terminal board uses.
use std::collections::HashMap;

use futures_common::{Category, QuoteRecord};
use log::{error, info, warn};

/// Price movement of one code between two published snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteChange {
    /// Instrument code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Price in the previous snapshot.
    pub previous_price: String,
    /// Price in the new snapshot.
    pub price: String,
    /// Percent change in the new snapshot.
    pub percent: String,
}

/// Sink for user messages, diagnostics and alerts.
pub trait Notifier: Send {
    /// Show an error message to the user.
    fn show_error(&self, message: &str);

    /// Send a diagnostic event with string properties.
    fn telemetry(&self, event: &str, properties: &[(&str, String)]);

    /// Handle price movements after a publish. The default ignores them.
    fn remind(&self, changes: &[QuoteChange]) {
        let _ = changes;
    }
}

/// Notifier that writes everything to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_error(&self, message: &str) {
        error!("{}", message);
    }

    fn telemetry(&self, event: &str, properties: &[(&str, String)]) {
        let props: Vec<String> = properties
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        warn!("telemetry {} {}", event, props.join(" "));
    }

    fn remind(&self, changes: &[QuoteChange]) {
        for change in changes {
            info!(
                "{} ({}) {} -> {} ({}%)",
                change.name, change.code, change.previous_price, change.price, change.percent
            );
        }
    }
}

/// Price changes of supported records present in both snapshots.
pub fn diff_snapshots(old: &[QuoteRecord], new: &[QuoteRecord]) -> Vec<QuoteChange> {
    let previous: HashMap<&str, &QuoteRecord> = old
        .iter()
        .filter(|r| r.category == Category::Future)
        .map(|r| (r.code.as_str(), r))
        .collect();

    new.iter()
        .filter(|r| r.category == Category::Future)
        .filter_map(|record| {
            let before = previous.get(record.code.as_str())?;
            (before.price != record.price).then(|| QuoteChange {
                code: record.code.clone(),
                name: record.name.clone(),
                previous_price: before.price.clone(),
                price: record.price.clone(),
                percent: record.percent.clone(),
            })
        })
        .collect()
}
