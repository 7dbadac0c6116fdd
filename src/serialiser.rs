use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};

/// Formats a duration as `HH:MM:SS.mmm`.
///
/// The hour field carries the full hour count, so durations of a day or
/// more keep their day component (`25:00:00.000`) and still parse back to
/// the same value. Sub-millisecond precision is truncated.
pub fn format_timestamp(timestamp: Duration) -> String {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.subsec_millis();
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

pub fn write_lines<W: Write, S: AsRef<str>>(buf: &mut W, lines: &[S]) -> Result<()> {
    for line in lines {
        buf.write_all(line.as_ref().as_bytes())
            .context("Failed to write output.")?;
    }
    Ok(())
}
