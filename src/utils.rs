// Utility functions
use chrono::Utc;

/// Current UTC time as second-precision ISO-8601 with a `Z` suffix,
/// e.g. "2025-01-31T14:02:07Z". This is the `fetched_at` wire format.
pub fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
