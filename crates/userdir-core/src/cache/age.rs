use chrono::{DateTime, Utc};

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Render how long ago `then` was, relative to `now`.
///
/// Hours and days round to the nearest whole unit. A `then` in the future
/// reads as "just now".
pub fn age_display(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes().max(0);
    if minutes == 0 {
        "just now".to_string()
    } else if minutes < MINUTES_PER_HOUR {
        format!("{}m ago", minutes)
    } else if minutes < MINUTES_PER_DAY {
        format!("{}h ago", round_to(minutes, MINUTES_PER_HOUR))
    } else {
        format!("{}d ago", round_to(minutes, MINUTES_PER_DAY))
    }
}

fn round_to(minutes: i64, unit: i64) -> i64 {
    (minutes + unit / 2) / unit
}
