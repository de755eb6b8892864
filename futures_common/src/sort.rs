//! Ordering policies for the published quote list.
//!
//! `SortMode` is persisted in the settings file as the integers `0` (normal), `1`
//! (ascending) and `-1` (descending), so the cycle below steps through the integer
//! values and maps anything above one to descending.

use std::cmp::Ordering;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::error::FeedError;
use crate::format::parse_decimal;
use crate::record::QuoteRecord;

/// Ordering applied to the quote list after every fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display)]
#[serde(into = "i8", try_from = "i8")]
#[strum(serialize_all = "lowercase")]
pub enum SortMode {
    /// Upstream (request) order.
    #[default]
    Normal,
    /// Ascending by percent change.
    Asc,
    /// Descending by percent change.
    Desc,
}

impl From<SortMode> for i8 {
    fn from(mode: SortMode) -> i8 {
        match mode {
            SortMode::Normal => 0,
            SortMode::Asc => 1,
            SortMode::Desc => -1,
        }
    }
}

impl TryFrom<i8> for SortMode {
    type Error = FeedError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SortMode::Normal),
            1 => Ok(SortMode::Asc),
            -1 => Ok(SortMode::Desc),
            other => Err(FeedError::Format(format!("unknown sort order {}", other))),
        }
    }
}

impl SortMode {
    /// Next mode in the NORMAL -> ASC -> DESC -> NORMAL cycle.
    pub fn cycle(self) -> SortMode {
        let next = i8::from(self) + 1;
        if next > 1 {
            SortMode::Desc
        } else if next == 1 {
            SortMode::Asc
        } else {
            SortMode::Normal
        }
    }
}

fn percent_value(record: &QuoteRecord) -> Decimal {
    parse_decimal(&record.percent).unwrap_or(Decimal::ZERO)
}

/// Order `records` under `mode`.
///
/// `Normal` returns the list untouched. `Asc`/`Desc` order by the numeric percent
/// change; records without a percent count as zero and ties keep their relative order.
pub fn sort_records(mut records: Vec<QuoteRecord>, mode: SortMode) -> Vec<QuoteRecord> {
    let compare = |a: &QuoteRecord, b: &QuoteRecord| -> Ordering {
        percent_value(a).cmp(&percent_value(b))
    };
    match mode {
        SortMode::Normal => {}
        SortMode::Asc => records.sort_by(compare),
        SortMode::Desc => records.sort_by(|a, b| compare(b, a)),
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;

    fn record(code: &str, percent: &str) -> QuoteRecord {
        let mut record = QuoteRecord::unsupported(code);
        record.category = Category::Future;
        record.percent = percent.to_string();
        record
    }

    fn codes(records: &[QuoteRecord]) -> Vec<&str> {
        records.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn cycle_visits_asc_then_desc_then_normal() {
        let first = SortMode::Normal.cycle();
        let second = first.cycle();
        let third = second.cycle();
        assert_eq!(first, SortMode::Asc);
        assert_eq!(second, SortMode::Desc);
        assert_eq!(third, SortMode::Normal);
    }

    #[test]
    fn normal_is_identity() {
        let list = vec![record("A", "+1.00"), record("B", "-2.00"), record("C", "+0.50")];
        let once = sort_records(list.clone(), SortMode::Normal);
        let twice = sort_records(once.clone(), SortMode::Normal);
        assert_eq!(once, list);
        assert_eq!(twice, list);
    }

    #[test]
    fn asc_and_desc_compare_signed_percent() {
        let list = vec![record("A", "+1.00"), record("B", "-2.00"), record("C", "+10.50")];
        assert_eq!(codes(&sort_records(list.clone(), SortMode::Asc)), ["B", "A", "C"]);
        assert_eq!(codes(&sort_records(list, SortMode::Desc)), ["C", "A", "B"]);
    }

    #[test]
    fn ties_keep_request_order() {
        let list = vec![
            record("A", "+1.00"),
            record("B", ""),
            record("C", "+1.00"),
            record("D", "+0.00"),
        ];
        assert_eq!(codes(&sort_records(list.clone(), SortMode::Asc)), ["B", "D", "A", "C"]);
        assert_eq!(codes(&sort_records(list, SortMode::Desc)), ["A", "C", "B", "D"]);
    }

    #[test]
    fn persists_as_integers() {
        assert_eq!(serde_json::to_string(&SortMode::Desc).unwrap(), "-1");
        let mode: SortMode = serde_json::from_str("1").unwrap();
        assert_eq!(mode, SortMode::Asc);
        assert!(serde_json::from_str::<SortMode>("7").is_err());
    }
}
