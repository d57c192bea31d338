use chrono::{DateTime, FixedOffset, Utc};

const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| unreachable!("offset is in range"))
}

/// Render a UTC instant in Indian Standard Time, e.g. `7 Feb 2026, 08:00:45 PM IST`.
pub fn format_ist(at: DateTime<Utc>) -> String {
    format!("{} IST", at.with_timezone(&ist()).format("%-d %b %Y, %I:%M:%S %p"))
}
