//! Human-facing sequence numbers (`WT00000001`).
//!
//! # Responsibility
//! - Format and parse sequence numbers.
//! - Derive the next number for the local scope and for the remote scope.
//!
//! # Invariants
//! - Parsing never fails: unparsable suffixes count as `0`.
//! - The local and remote scopes are computed independently and never
//!   reconciled against each other.
//! - A failing remote query degrades to a timestamp-based number instead of
//!   failing the surrounding save.

use crate::id::now_millis;
use crate::model::entity::{SequenceFormat, CREATED_AT_FIELD};
use crate::normalize::CanonicalRecord;
use crate::repo::remote_store::{RemoteTable, SelectQuery};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static LEADING_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\+?(\d+)").expect("valid leading digits regex"));

impl SequenceFormat {
    /// Renders `value` as prefix + zero-padded digits.
    pub fn format(&self, value: u64) -> String {
        format!("{}{:0width$}", self.prefix, value, width = self.width)
    }

    /// Extracts the numeric suffix, treating anything unparsable as `0`.
    pub fn parse_suffix(&self, raw: &str) -> u64 {
        let trimmed = raw.trim_start();
        let digits = trimmed.strip_prefix(self.prefix).unwrap_or(trimmed);
        LEADING_DIGITS_RE
            .captures(digits)
            .and_then(|captures| captures.get(1))
            .and_then(|digits| digits.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    }

    fn read_suffix(&self, record: &CanonicalRecord) -> Option<u64> {
        [self.canonical, self.wire]
            .into_iter()
            .filter_map(|key| record.get(key))
            .find_map(Value::as_str)
            .map(|raw| self.parse_suffix(raw))
    }
}

/// Returns `max(suffix) + 1` over `records`, or `1` when none carry a number.
pub fn next_local(format: &SequenceFormat, records: &[CanonicalRecord]) -> u64 {
    records
        .iter()
        .filter_map(|record| format.read_suffix(record))
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

/// Returns the suffix of the most recently created remote row plus one.
///
/// - No rows, or a latest row without a number, yields `1`.
/// - A failing query yields the current epoch milliseconds. This is unique in
///   practice but not collision-free.
pub async fn next_remote(remote: &dyn RemoteTable, table: &str, format: &SequenceFormat) -> u64 {
    let query = SelectQuery::columns(&[format.wire])
        .order_desc(CREATED_AT_FIELD.wire)
        .limit(1);

    match remote.select(table, &query).await {
        Ok(rows) => rows
            .first()
            .and_then(|row| row.get(format.wire))
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
            .map_or(1, |raw| format.parse_suffix(raw).saturating_add(1)),
        Err(err) => {
            let fallback = now_millis();
            warn!(
                "event=sequence_next module=sequence status=degraded table={} fallback={} error={}",
                table, fallback, err
            );
            fallback
        }
    }
}
