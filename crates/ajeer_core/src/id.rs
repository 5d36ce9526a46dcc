//! Identifiers and creation timestamps for locally created records.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Returns a new opaque, globally unique record id.
///
/// Only the local store calls this; remote ids come from the backend.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns the current UTC time as an RFC 3339 string with milliseconds.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Returns the current Unix time in milliseconds.
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}
