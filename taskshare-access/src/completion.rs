//! Completion flag and timestamp transitions.

use chrono::{DateTime, Utc};

/// Applies a requested completion flag.
///
/// The timestamp is set to `now` only on `false -> true`, cleared only on
/// `true -> false`, and otherwise left alone.
pub fn transition(
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    requested: Option<bool>,
    now: DateTime<Utc>,
) -> (bool, Option<DateTime<Utc>>) {
    match (completed, requested) {
        (false, Some(true)) => (true, Some(now)),
        (true, Some(false)) => (false, None),
        _ => (completed, completed_at),
    }
}
