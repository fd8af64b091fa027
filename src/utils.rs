//! Utility functions for the skill ladder

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique match record ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds elapsed from `start` to `end`, clamped at zero
pub fn elapsed_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().max(0)
}

/// Format a rating delta with an explicit sign, e.g. "+12.3" / "-8.0"
pub fn signed_delta(delta: f64) -> String {
    if delta >= 0.0 {
        format!("+{:.1}", delta)
    } else {
        format!("{:.1}", delta)
    }
}
