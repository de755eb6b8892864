//! Normalized quote record produced by the protocol decoder.
//!
//! A `QuoteRecord` is one instrument's current snapshot with every numeric field
//! already rendered at its display precision. Records for codes the upstream
//! source does not cover (or rejects) are kept as placeholders so every requested
//! code stays visible.
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::codes::split_code;

/// Classification of a record, doubling as the host UI context tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Category {
    /// Contract returned with full fields.
    #[strum(serialize = "future")]
    Future,
    /// Upstream answered but carried no fields for the code.
    #[strum(serialize = "nodata")]
    Unsupported,
    /// Upstream rejected the code outright.
    #[strum(serialize = "failed")]
    Error,
}

/// One instrument's normalized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Exchange-qualified identifier, unique within a published list.
    pub code: String,
    /// First two characters of `code`.
    pub exchange_prefix: String,
    /// Remainder of `code` after the prefix.
    pub symbol: String,
    /// Display name from upstream, or a descriptive placeholder.
    pub name: String,
    /// Opening price.
    pub open: String,
    /// Previous session settlement/close.
    pub previous_close: String,
    /// Last price.
    pub price: String,
    /// Session high.
    pub high: String,
    /// Session low.
    pub low: String,
    /// Traded volume, two decimals with magnitude units.
    pub volume: String,
    /// Upstream date and time joined by a space.
    pub updated_at: String,
    /// `price - previous_close` at the record precision.
    pub change: String,
    /// Signed percentage (`+1.23` / `-0.50`), empty for placeholders.
    pub percent: String,
    /// Supported, unsupported or rejected.
    pub category: Category,
}

impl QuoteRecord {
    fn placeholder(code: &str, name: String, category: Category) -> Self {
        let (exchange_prefix, symbol) = split_code(code);
        QuoteRecord {
            code: code.to_string(),
            exchange_prefix,
            symbol,
            name,
            open: String::new(),
            previous_close: String::new(),
            price: String::new(),
            high: String::new(),
            low: String::new(),
            volume: String::new(),
            updated_at: String::new(),
            change: String::new(),
            percent: String::new(),
            category,
        }
    }

    /// Placeholder for a code the upstream source answers with no fields.
    pub fn unsupported(code: &str) -> Self {
        Self::placeholder(
            code,
            format!("Quote source does not support {}", code),
            Category::Unsupported,
        )
    }

    /// Error row for a code the upstream source rejects.
    pub fn invalid(code: &str) -> Self {
        let mut record = Self::placeholder(code, "Invalid code".to_string(), Category::Error);
        record.percent = "0".to_string();
        record
    }

    /// Error row for a code that was not retried after a failed batch.
    pub fn skipped(code: &str) -> Self {
        let mut record = Self::placeholder(
            code,
            "Not retried after batch failure".to_string(),
            Category::Error,
        );
        record.percent = "0".to_string();
        record
    }

    /// Label shown for the record when it has no market data of its own.
    pub fn placeholder_label(&self) -> Option<String> {
        match self.category {
            Category::Future => None,
            Category::Unsupported => Some(self.name.clone()),
            Category::Error => Some(format!(
                "{} {}, check whether the exchange prefix is missing",
                self.code,
                self.name.to_lowercase()
            )),
        }
    }

    /// Whether the record is currently falling (its percent carries a minus).
    pub fn is_falling(&self) -> bool {
        self.percent.contains('-')
    }
}
