//! Decoder for the plaintext snapshot protocol.
//!
//! A response body is a run of statements of the form
//!
//! ```text
//! var hq_str_RB2405="螺纹钢2405,145959,3620.000,3631.000,...";
//! ```
//!
//! each terminated by `;\n`. A body containing `FAILED` means the upstream rejected
//! the batch as a whole; this module only reports that outcome, the fan-out retry is
//! the caller's concern because it needs the transport.
//!
//! Every statement yields exactly one `QuoteRecord`: contracts with full fields are
//! normalized, everything else becomes an unsupported placeholder.
use log::debug;
use rust_decimal::Decimal;

use crate::codes::{is_contract_code, split_code};
use crate::error::FeedError;
use crate::format::{
    format_decimal, format_fixed, format_percent, format_volume, infer_precision, parse_decimal,
    price_change, round_change,
};
use crate::record::{Category, QuoteRecord};
use crate::result::Result;

/// Token signalling a batch-level rejection.
pub const FAILURE_MARKER: &str = "FAILED";
/// Separator between statements.
pub const STATEMENT_TERMINATOR: &str = ";\n";
/// Left-hand side prefix of every statement.
pub const STATEMENT_PREFIX: &str = "var hq_str_";

/// Field offsets inside a futures statement.
mod field {
    pub const NAME: usize = 0;
    pub const OPEN: usize = 2;
    pub const HIGH: usize = 3;
    pub const LOW: usize = 4;
    pub const PREVIOUS_CLOSE: usize = 5;
    pub const PRICE: usize = 8;
    pub const VOLUME: usize = 14;
    pub const TIME: usize = 17;
    pub const DATE: usize = 30;
}

/// Records decoded from one response plus the per-category counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedBatch {
    /// One record per statement, in response order.
    pub records: Vec<QuoteRecord>,
    /// Number of records with full contract fields.
    pub supported_count: usize,
    /// Number of placeholder records for unsupported codes.
    pub unsupported_count: usize,
}

impl DecodedBatch {
    /// Append another batch, summing the counters.
    pub fn extend(&mut self, other: DecodedBatch) {
        self.records.extend(other.records);
        self.supported_count += other.supported_count;
        self.unsupported_count += other.unsupported_count;
    }

    /// Append one record, counting it by category. Error rows count towards neither.
    pub fn push(&mut self, record: QuoteRecord) {
        match record.category {
            Category::Future => self.supported_count += 1,
            Category::Unsupported => self.unsupported_count += 1,
            Category::Error => {}
        }
        self.records.push(record);
    }
}

/// Outcome of decoding one response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The body carries the batch failure marker.
    BatchFailed,
    /// The body was decoded statement by statement.
    Batch(DecodedBatch),
}

/// Whether `body` signals a batch-level failure.
pub fn is_batch_failure(body: &str) -> bool {
    body.contains(FAILURE_MARKER)
}

/// Decode a full response body.
///
/// Returns `FeedError::Malformed` if a statement does not follow the
/// `var hq_str_<code>="..."` shape.
pub fn decode_response(body: &str) -> Result<Decoded> {
    if is_batch_failure(body) {
        return Ok(Decoded::BatchFailed);
    }

    let mut batch = DecodedBatch::default();
    for statement in body.split(STATEMENT_TERMINATOR) {
        if statement.trim().is_empty() {
            continue;
        }
        batch.push(decode_statement(statement)?);
    }
    debug!(
        "Decoded {} statements ({} supported, {} unsupported)",
        batch.records.len(),
        batch.supported_count,
        batch.unsupported_count
    );
    Ok(Decoded::Batch(batch))
}

/// Split one statement into its code and comma-separated fields.
pub fn split_statement(statement: &str) -> Result<(&str, Vec<&str>)> {
    let statement = statement.trim().trim_end_matches(';');
    let (lhs, rhs) = statement
        .split_once("=\"")
        .ok_or_else(|| FeedError::Malformed(statement.to_string()))?;
    let code = lhs
        .trim()
        .strip_prefix(STATEMENT_PREFIX)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| FeedError::Malformed(statement.to_string()))?;
    let payload = rhs.strip_suffix('"').unwrap_or(rhs);
    Ok((code, payload.split(',').collect()))
}

/// Decode one statement into a record.
pub fn decode_statement(statement: &str) -> Result<QuoteRecord> {
    let (code, fields) = split_statement(statement)?;
    if fields.len() > 1 && is_contract_code(code) {
        Ok(decode_contract(code, &fields))
    } else {
        debug!("No data for {} ({} fields)", code, fields.len());
        Ok(QuoteRecord::unsupported(code))
    }
}

fn decode_contract(code: &str, fields: &[&str]) -> QuoteRecord {
    let get = |idx: usize| fields.get(idx).copied().unwrap_or("").trim();
    let open = get(field::OPEN);
    let previous_close = get(field::PREVIOUS_CLOSE);
    let price = get(field::PRICE);
    let high = get(field::HIGH);
    let low = get(field::LOW);
    let precision = infer_precision(open, previous_close, price, high, low);

    let open = format_fixed(open, precision, false);
    let previous_close = format_fixed(previous_close, precision, false);
    let price = format_fixed(price, precision, false);

    let open_value = parse_decimal(&open).unwrap_or(Decimal::ZERO);
    let close_value = parse_decimal(&previous_close).unwrap_or(Decimal::ZERO);
    // During the pre-open auction open and price both report zero.
    let last_value = if open_value <= Decimal::ZERO {
        close_value
    } else {
        parse_decimal(&price).unwrap_or(Decimal::ZERO)
    };
    let change = round_change(price_change(last_value, close_value), precision);

    let (exchange_prefix, symbol) = split_code(code);
    QuoteRecord {
        code: code.to_string(),
        exchange_prefix,
        symbol,
        name: get(field::NAME).to_string(),
        open,
        previous_close,
        price,
        high: format_fixed(high, precision, false),
        low: format_fixed(low, precision, false),
        volume: format_volume(get(field::VOLUME)),
        updated_at: format!("{} {}", get(field::DATE), get(field::TIME)),
        change: format_decimal(change, precision, false),
        percent: format_percent(change, close_value),
        category: Category::Future,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(code: &str, values: &[(usize, &str)]) -> String {
        let mut fields = vec![""; 32];
        for (idx, value) in values {
            fields[*idx] = *value;
        }
        format!("var hq_str_{}=\"{}\";\n", code, fields.join(","))
    }

    fn rebar(open: &str, close: &str, price: &str) -> String {
        statement(
            "RB2405",
            &[
                (field::NAME, "螺纹钢2405"),
                (field::OPEN, open),
                (field::HIGH, "3151.25"),
                (field::LOW, "3147.0"),
                (field::PREVIOUS_CLOSE, close),
                (field::PRICE, price),
                (field::VOLUME, "123456"),
                (field::TIME, "14:59:59"),
                (field::DATE, "2024-03-15"),
            ],
        )
    }

    fn batch(body: &str) -> DecodedBatch {
        match decode_response(body).unwrap() {
            Decoded::Batch(batch) => batch,
            Decoded::BatchFailed => panic!("unexpected batch failure"),
        }
    }

    #[test]
    fn decodes_a_supported_contract() {
        let decoded = batch(&rebar("3150.2", "3148.0", "3150.5"));
        assert_eq!(decoded.supported_count, 1);
        assert_eq!(decoded.unsupported_count, 0);

        let record = &decoded.records[0];
        assert_eq!(record.code, "RB2405");
        assert_eq!(record.exchange_prefix, "RB");
        assert_eq!(record.symbol, "2405");
        assert_eq!(record.name, "螺纹钢2405");
        assert_eq!(record.open, "3150.20");
        assert_eq!(record.previous_close, "3148.00");
        assert_eq!(record.price, "3150.50");
        assert_eq!(record.high, "3151.25");
        assert_eq!(record.low, "3147.00");
        assert_eq!(record.volume, "12.35万");
        assert_eq!(record.updated_at, "2024-03-15 14:59:59");
        assert_eq!(record.change, "2.50");
        assert_eq!(record.percent, "+0.08");
        assert_eq!(record.category, Category::Future);
    }

    #[test]
    fn falling_contract_has_negative_change_and_percent() {
        let decoded = batch(&rebar("3150", "3200", "3100"));
        let record = &decoded.records[0];
        assert_eq!(record.change, "-100.00");
        assert_eq!(record.percent, "-3.13");
    }

    #[test]
    fn zero_open_uses_previous_close_as_price() {
        let decoded = batch(&rebar("0.0000", "100.00", "0.0000"));
        let record = &decoded.records[0];
        assert_eq!(record.change, "0.00");
        assert_eq!(record.percent, "+0.00");
        assert_eq!(record.price, "0.00");
    }

    #[test]
    fn negative_prices_keep_their_sign() {
        let body = statement(
            "CL2005",
            &[
                (field::NAME, "WTI2005"),
                (field::OPEN, "10.00"),
                (field::HIGH, "18.00"),
                (field::LOW, "-40.32"),
                (field::PREVIOUS_CLOSE, "18.27"),
                (field::PRICE, "-37.63"),
            ],
        );
        let decoded = batch(&body);
        let record = &decoded.records[0];
        assert_eq!(record.price, "-37.63");
        assert_eq!(record.low, "-40.32");
        assert_eq!(record.change, "-55.90");
        assert_eq!(record.percent, "-305.97");
        assert!(record.is_falling());
    }

    #[test]
    fn negative_open_triggers_the_zero_open_guard() {
        let decoded = batch(&rebar("-1.00", "100.00", "-5.00"));
        let record = &decoded.records[0];
        assert_eq!(record.open, "-1.00");
        assert_eq!(record.change, "0.00");
        assert_eq!(record.percent, "+0.00");
    }

    #[test]
    fn extreme_fields_do_not_abort_decoding() {
        let body = statement(
            "RB2405",
            &[
                (field::OPEN, "1"),
                (field::PREVIOUS_CLOSE, "0.0001"),
                (field::PRICE, "79228162514264337593543950"),
            ],
        );
        let decoded = batch(&body);
        assert_eq!(decoded.supported_count, 1);
        assert_eq!(decoded.records[0].percent, "+0.00");
    }

    #[test]
    fn single_field_code_is_unsupported() {
        let body = "var hq_str_XX9999=\"\";\n";
        let decoded = batch(body);
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].category, Category::Unsupported);
        assert_eq!(decoded.unsupported_count, 1);
        assert_eq!(decoded.supported_count, 0);
    }

    #[test]
    fn non_contract_shape_is_unsupported() {
        let body = statement("sh000001", &[(field::NAME, "上证指数"), (field::OPEN, "3000")]);
        let decoded = batch(&body);
        assert_eq!(decoded.records[0].category, Category::Unsupported);
        assert_eq!(decoded.unsupported_count, 1);
    }

    #[test]
    fn keeps_statement_order_and_counts() {
        let body = format!(
            "{}var hq_str_AB12=\"\";\n{}",
            rebar("1", "1", "1"),
            statement("AG2412", &[(field::OPEN, "5000"), (field::PREVIOUS_CLOSE, "5000")])
        );
        let decoded = batch(&body);
        let codes: Vec<&str> = decoded.records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["RB2405", "AB12", "AG2412"]);
        assert_eq!(decoded.supported_count, 2);
        assert_eq!(decoded.unsupported_count, 1);
    }

    #[test]
    fn body_without_trailing_terminator_keeps_last_statement() {
        let body = "var hq_str_AB12=\"\";\nvar hq_str_CD34=\"\"";
        assert_eq!(batch(body).records.len(), 2);
    }

    #[test]
    fn failure_marker_short_circuits() {
        assert_eq!(decode_response("FAILED").unwrap(), Decoded::BatchFailed);
    }

    #[test]
    fn malformed_statement_is_an_error() {
        assert!(matches!(
            decode_response("hello world;\n"),
            Err(FeedError::Malformed(_))
        ));
        assert!(matches!(
            decode_response("var hq_str_=\"1,2\";\n"),
            Err(FeedError::Malformed(_))
        ));
    }
}
