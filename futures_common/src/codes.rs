//! Instrument code helpers shared by the service and the board binary.

use std::collections::HashSet;
use std::io::BufRead;

use crate::error::FeedError;

/// Width of the exchange prefix at the start of every code.
pub const PREFIX_LEN: usize = 2;
/// Prefix assumed when a code is too short to carry one.
pub const DEFAULT_PREFIX: &str = "sh";

/// Split a code into its exchange prefix and symbol at the fixed prefix boundary.
pub fn split_code(code: &str) -> (String, String) {
    let boundary = code
        .char_indices()
        .nth(PREFIX_LEN)
        .map(|(idx, _)| idx)
        .unwrap_or(code.len());
    let (prefix, symbol) = code.split_at(boundary);
    let prefix = if prefix.is_empty() { DEFAULT_PREFIX } else { prefix };
    (prefix.to_string(), symbol.to_string())
}

/// Whether `code` has the futures contract shape: ASCII letters followed by exactly
/// four digits (e.g. `RB2405`, `IF2406`).
pub fn is_contract_code(code: &str) -> bool {
    let letters = code.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let digits = &code[letters..];
    letters > 0 && digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit())
}

/// Drop repeated codes, keeping the first occurrence and the original order.
pub fn dedup_codes(codes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty() && seen.insert(code.to_string()))
        .map(str::to_string)
        .collect()
}

/// Trait providing file parsing for code lists.
pub trait CodeListParser {
    /// Parses codes from a buffered reader.
    ///
    /// Codes may be separated by commas, spaces or new lines; blank entries are skipped.
    /// Returns an error if a line cannot be read or a code contains characters other
    /// than ASCII letters, digits and `_`.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<String>, FeedError>;
}

/// Marker type implementing [`CodeListParser`] for plain-text code lists.
pub struct CodeList;

impl CodeListParser for CodeList {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<String>, FeedError> {
        let mut codes = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(FeedError::Io)?;
            for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
                if token.is_empty() {
                    continue;
                }
                if !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(FeedError::ParseCodesFile(format!("invalid code {:?}", token)));
                }
                codes.push(token.to_string());
            }
        }
        Ok(codes)
    }
}
