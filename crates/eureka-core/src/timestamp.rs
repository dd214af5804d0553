//! Display formatting for wire timestamps.

/// Shown when a timestamp cannot be shortened.
pub const TIMESTAMP_PLACEHOLDER: &str = "??:??:??";

/// Extracts `HH:MM:SS` from an ISO-8601 timestamp such as
/// `2024-01-01T13:45:09.1230000-05:00`.
///
/// The text between the first `T` and the next `.` (or the end) is used if it
/// has the `DD:DD:DD` shape. Anything else yields [`TIMESTAMP_PLACEHOLDER`].
pub fn format_timestamp(timestamp: &str) -> &str {
    let Some((_, time)) = timestamp.split_once('T') else {
        return TIMESTAMP_PLACEHOLDER;
    };
    let time = time.split_once('.').map_or(time, |(whole, _)| whole);

    if is_clock_time(time) {
        time
    } else {
        TIMESTAMP_PLACEHOLDER
    }
}

fn is_clock_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 8
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            2 | 5 => *byte == b':',
            _ => byte.is_ascii_digit(),
        })
}
