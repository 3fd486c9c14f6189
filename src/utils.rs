use chrono::{DateTime, Utc};
use std::time::SystemTime;

pub fn unix(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}

/// Trims trailing line breaks only, keeping other whitespace a name may hold.
pub fn trim_newlines(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}
