use crate::cue::{Block, CueBlock, TimingLine};
use crate::error::{Result, VttError};
use crate::parser::parse_snip;
use crate::serialiser::format_timestamp;

use std::str::FromStr;
use std::time::Duration;

use log::debug;

/// The half-open interval `[start, stop)` cut out of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Snip {
    start: Duration,
    stop: Duration,
}

impl Snip {
    pub fn new(start: Duration, stop: Duration) -> Self {
        Self { start, stop }
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn stop(&self) -> Duration {
        self.stop
    }

    pub fn len(&self) -> Duration {
        self.stop.saturating_sub(self.start)
    }
}

impl FromStr for Snip {
    type Err = VttError;

    fn from_str(s: &str) -> Result<Self> {
        parse_snip(s)
    }
}

/// Snips sorted by start time, none overlapping another.
#[derive(Debug, Clone, Default)]
pub struct Snips(Vec<Snip>);

impl Snips {
    pub fn new(mut snips: Vec<Snip>) -> Result<Self> {
        snips.sort();
        for pair in snips.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.start < prev.stop {
                return Err(VttError::argument(
                    &format!(
                        "{}-{}",
                        format_timestamp(next.start),
                        format_timestamp(next.stop)
                    ),
                    format!(
                        "overlaps the snip {}-{}",
                        format_timestamp(prev.start),
                        format_timestamp(prev.stop)
                    ),
                ));
            }
        }
        for snip in &snips {
            debug!(
                "Snipping {} to {}",
                format_timestamp(snip.start()),
                format_timestamp(snip.stop())
            );
        }
        Ok(Self(snips))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn apply(&self, cue_start: Duration, cue_end: Duration) -> CueResult {
        apply_snips(cue_start, cue_end, &self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueResult {
    Dropped,
    Kept(Duration, Duration),
}

impl CueResult {
    /// Whether the snips cut into the cue itself rather than only moving it.
    pub fn is_clamped(&self, cue_start: Duration, cue_end: Duration) -> bool {
        match *self {
            CueResult::Dropped => false,
            CueResult::Kept(start, end) => {
                end.saturating_sub(start) != cue_end.saturating_sub(cue_start)
            }
        }
    }
}

/// Re-times a cue against snips in ascending order.
///
/// Snips lying wholly before the cue start are collected in `removed` and
/// taken off both endpoints at the end. A snip the cue spans is taken off
/// its end straight away, so later snips are tested against the shortened
/// end.
pub fn apply_snips(cue_start: Duration, cue_end: Duration, snips: &[Snip]) -> CueResult {
    let mut start = cue_start;
    let mut end = cue_end;
    let mut removed = Duration::ZERO;

    for snip in snips {
        if start < snip.start {
            if end < snip.start {
                // before the snip
            } else if end < snip.stop {
                end = snip.start;
            } else {
                end -= snip.len();
            }
        } else if start < snip.stop {
            if end < snip.stop {
                return CueResult::Dropped;
            }
            start = snip.stop;
            removed += snip.len();
        } else {
            removed += snip.len();
        }
    }

    CueResult::Kept(
        start.saturating_sub(removed),
        end.saturating_sub(removed),
    )
}

/// Produces the output lines of one block. A dropped cue yields no lines at
/// all, identifiers and payload included.
pub fn process_block(block: Block, snips: &Snips) -> Result<Vec<String>> {
    let cue = match block {
        Block::Comment(lines) | Block::Other(lines) => return Ok(lines),
        Block::Cue(cue) => cue,
    };
    let CueBlock {
        mut identifiers,
        timing,
        payload,
    } = cue;

    let timing = TimingLine::parse(&timing)?;
    let (start, end) = timing.times()?;
    let result = snips.apply(start, end);
    match result {
        CueResult::Dropped => {
            debug!("Dropping cue {} --> {}", timing.start, timing.end);
            Ok(vec![])
        }
        CueResult::Kept(new_start, new_end) => {
            if result.is_clamped(start, end) {
                debug!(
                    "Clamping cue {} --> {} to {} --> {}",
                    timing.start,
                    timing.end,
                    format_timestamp(new_start),
                    format_timestamp(new_end)
                );
            }
            identifiers.push(timing.render(new_start, new_end));
            identifiers.extend(payload);
            Ok(identifiers)
        }
    }
}
