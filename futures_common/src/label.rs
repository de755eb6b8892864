//! Label templates for tree leaves and status-bar slots.
//!
//! Templates contain `${field}` placeholders, optionally followed by a
//! `| padRight N` modifier that pads the substituted value with spaces to `N`
//! characters (10 when `N` is omitted). Unknown fields render as empty text.
use serde::{Deserialize, Serialize};

use crate::record::QuoteRecord;

/// Default template for status-bar slots.
pub const DEFAULT_STATUS_BAR_FORMAT: &str = "「${name}」${price} ${icon}（${percent}）";
/// Default template for tree leaves.
pub const DEFAULT_SIDEBAR_FORMAT: &str = "${percent}%   ${price}   「${name}」";
/// Icon for rising (or flat) records.
pub const RISE_ICON: &str = "📈";
/// Icon for falling records.
pub const FALL_ICON: &str = "📉";

const DEFAULT_PAD_WIDTH: usize = 10;

/// User-configurable label templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelFormat {
    /// Template for status-bar slot text.
    pub status_bar: String,
    /// Template for tree leaf labels.
    pub sidebar: String,
}

impl Default for LabelFormat {
    fn default() -> Self {
        LabelFormat {
            status_bar: DEFAULT_STATUS_BAR_FORMAT.to_string(),
            sidebar: DEFAULT_SIDEBAR_FORMAT.to_string(),
        }
    }
}

/// Value of a template field for `record`, using the upstream field names.
pub fn record_field<'a>(record: &'a QuoteRecord, key: &str) -> Option<&'a str> {
    let value = match key {
        "code" => &record.code,
        "name" => &record.name,
        "type" => &record.exchange_prefix,
        "symbol" => &record.symbol,
        "open" => &record.open,
        "yestclose" => &record.previous_close,
        "price" => &record.price,
        "high" => &record.high,
        "low" => &record.low,
        "volume" => &record.volume,
        "time" => &record.updated_at,
        "updown" => &record.change,
        "percent" => &record.percent,
        _ => return None,
    };
    Some(value.as_str())
}

fn pad_width(modifier: &str) -> Option<usize> {
    let rest = modifier.trim().strip_prefix("padRight")?;
    let rest = rest.trim().trim_start_matches('|').trim();
    if rest.is_empty() {
        return Some(DEFAULT_PAD_WIDTH);
    }
    rest.parse().ok()
}

/// Substitute every placeholder in `template` through `lookup`.
pub fn render_template<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let inner = &after[..end];
        let (key, modifier) = match inner.split_once('|') {
            Some((key, modifier)) => (key.trim(), pad_width(modifier)),
            None => (inner.trim(), None),
        };
        let value = lookup(key).unwrap_or_default();
        match modifier {
            Some(width) => {
                let len = value.chars().count();
                out.push_str(&value);
                out.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
            }
            None => out.push_str(&value),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Render `template` for `record`; `overrides` take precedence over record fields.
pub fn render_record(template: &str, record: &QuoteRecord, overrides: &[(&str, String)]) -> String {
    render_template(template, |key| {
        overrides
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.clone())
            .or_else(|| record_field(record, key).map(str::to_string))
    })
}
