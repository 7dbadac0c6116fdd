use crate::cue::{is_timing_line, TimingLine};
use crate::error::{Result, VttError};
use crate::parser::{parse_adjustment, parse_timestamp};
use crate::serialiser::format_timestamp;

use std::str::FromStr;
use std::time::Duration;

use log::{debug, warn};

/// From `threshold` onwards, move cues by `offset` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Adjustment {
    threshold: Duration,
    offset: i64,
}

impl Adjustment {
    pub fn new(threshold: Duration, offset: i64) -> Self {
        Self { threshold, offset }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn offset_millis(&self) -> i64 {
        self.offset
    }
}

impl FromStr for Adjustment {
    type Err = VttError;

    fn from_str(s: &str) -> Result<Self> {
        parse_adjustment(s)
    }
}

/// Adjustments in descending threshold order, so the first one that applies
/// to a cue shadows every adjustment with a smaller threshold.
#[derive(Debug, Clone, Default)]
pub struct Adjustments(Vec<Adjustment>);

impl Adjustments {
    pub fn new(mut adjustments: Vec<Adjustment>) -> Self {
        adjustments.sort_by(|a, b| b.cmp(a));
        for adj in &adjustments {
            debug!(
                "From {} onwards, shift by {}ms",
                format_timestamp(adj.threshold()),
                adj.offset_millis()
            );
        }
        Self(adjustments)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn select(&self, cue_start: Duration) -> Option<i64> {
        select_adjustment(cue_start, &self.0)
    }
}

/// Returns the offset of the first adjustment whose threshold does not
/// exceed `cue_start`.
pub fn select_adjustment(cue_start: Duration, adjustments: &[Adjustment]) -> Option<i64> {
    adjustments
        .iter()
        .find(|adj| adj.threshold <= cue_start)
        .map(|adj| adj.offset)
}

/// Moves `timestamp` by a signed number of milliseconds, stopping at zero.
pub fn shift_by(timestamp: Duration, offset: i64) -> Duration {
    let delta = Duration::from_millis(offset.unsigned_abs());
    if offset >= 0 {
        timestamp + delta
    } else {
        timestamp.checked_sub(delta).unwrap_or_else(|| {
            warn!(
                "Shifting {} by {}ms lands before zero, clamping to 00:00:00.000",
                format_timestamp(timestamp),
                offset
            );
            Duration::ZERO
        })
    }
}

/// Rewrites both timestamps of a cue by the adjustment selected for its
/// start. The end follows the start even if it lies past a later threshold.
pub fn rewrite_cue_timing(
    start: &str,
    end: &str,
    adjustments: &Adjustments,
) -> Result<(String, String)> {
    let (start, end) = rewrite_times(
        parse_timestamp(start)?,
        parse_timestamp(end)?,
        adjustments,
    );
    Ok((format_timestamp(start), format_timestamp(end)))
}

fn rewrite_times(start: Duration, end: Duration, adjustments: &Adjustments) -> (Duration, Duration) {
    match adjustments.select(start) {
        Some(offset) => (shift_by(start, offset), shift_by(end, offset)),
        None => (start, end),
    }
}

/// Shifts one input line. Lines without a cue timing arrow come back as is.
pub fn shift_line(line: &str, adjustments: &Adjustments) -> Result<String> {
    if !is_timing_line(line) {
        return Ok(line.to_string());
    }
    let timing = TimingLine::parse(line)?;
    let (start, end) = rewrite_cue_timing(timing.start, timing.end, adjustments)?;
    Ok(timing.render_text(&start, &end))
}
