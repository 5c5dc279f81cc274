//! Text formatting shared by the commands.

use crate::utils::config::{MICROS_PER_MILLI, MICROS_PER_SECOND};

/// Format a duration given in microseconds
///
/// Seconds above one second, milliseconds above one millisecond,
/// microseconds otherwise.
pub fn fmt_time(time_us: f64) -> String {
    if time_us / MICROS_PER_SECOND > 1.0 {
        format!("{:.2}s", time_us / MICROS_PER_SECOND)
    } else if time_us / MICROS_PER_MILLI > 1.0 {
        format!("{:.2}ms", time_us / MICROS_PER_MILLI)
    } else {
        format!("{:.1}us", time_us)
    }
}

/// Format a 0-1 fraction as a right-aligned whole percentage
pub fn fmt_share(fraction: f64) -> String {
    format!("{:3.0}%", fraction * 100.0)
}

/// Truncate `text` to at most `width` characters
pub fn clip(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
