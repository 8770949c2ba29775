//! CPF shape checks. Only the digit count is verified, never the check digits.

use crate::utils::error::Result;
use std::collections::HashMap;

pub const IDENTIFIER_DIGITS: usize = 11;

fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_valid_identifier(raw: &str) -> bool {
    digits_only(raw).len() == IDENTIFIER_DIGITS
}

/// Groups the digits as `ddd.ddd.ddd-dd` by fixed offsets.
///
/// Callers validate first: shorter input still formats, it just produces
/// truncated groups instead of panicking.
pub fn format_identifier(raw: &str) -> String {
    let digits = digits_only(raw);
    let slice = |start: usize, end: usize| {
        let end = end.min(digits.len());
        digits.get(start.min(end)..end).unwrap_or_default()
    };

    format!(
        "{}.{}.{}-{}",
        slice(0, 3),
        slice(3, 6),
        slice(6, 9),
        slice(9, digits.len())
    )
}

/// Pre-supplied identifiers: a CSV with a header row, enrollment id in the
/// first column and the raw CPF in the second. Later rows win on duplicate ids.
pub fn parse_identifier_csv(data: &[u8]) -> Result<HashMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut identifiers = HashMap::new();
    for row in reader.records() {
        let row = row?;
        match (row.get(0), row.get(1)) {
            (Some(id), Some(raw)) if !id.is_empty() => {
                identifiers.insert(id.to_string(), raw.to_string());
            }
            _ => tracing::warn!("Skipping identifiers row {:?}", row.position().map(|p| p.line())),
        }
    }

    Ok(identifiers)
}
