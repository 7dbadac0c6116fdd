use crate::error::{Result, VttError};
use crate::parser::parse_timestamp;
use crate::serialiser::format_timestamp;

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

pub const ARROW: &str = "-->";

const TIMING_LINE_FORMAT: &str = "<start> --> <end>[settings]";

fn timing_line_regex() -> &'static Regex {
    static TIMING_LINE: OnceLock<Regex> = OnceLock::new();
    TIMING_LINE.get_or_init(|| {
        Regex::new(r"(?s)^([^ \t]+)([ \t]+)(-->)([ \t]+)([^ \t\r\n]+)(.*)$")
            .expect("Failed to compile timing line regex")
    })
}

pub fn is_timing_line(line: &str) -> bool {
    line.contains(ARROW)
}

/// A cue timing line split into its timestamps and the literal text around
/// them. `rest` holds cue settings and the line terminator, if any.
#[derive(Debug, PartialEq, Eq)]
pub struct TimingLine<'a> {
    pub start: &'a str,
    ws_before_arrow: &'a str,
    ws_after_arrow: &'a str,
    pub end: &'a str,
    rest: &'a str,
}

impl<'a> TimingLine<'a> {
    pub fn parse(line: &'a str) -> Result<Self> {
        let caps = timing_line_regex().captures(line).ok_or_else(|| {
            VttError::format("cue timing line", line.trim_end(), TIMING_LINE_FORMAT)
        })?;
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        Ok(TimingLine {
            start: group(1),
            ws_before_arrow: group(2),
            ws_after_arrow: group(4),
            end: group(5),
            rest: group(6),
        })
    }

    pub fn times(&self) -> Result<(Duration, Duration)> {
        Ok((parse_timestamp(self.start)?, parse_timestamp(self.end)?))
    }

    /// Rebuilds the line with new timestamps and the original surroundings.
    pub fn render(&self, start: Duration, end: Duration) -> String {
        self.render_text(&format_timestamp(start), &format_timestamp(end))
    }

    pub fn render_text(&self, start: &str, end: &str) -> String {
        let mut line = String::with_capacity(start.len() + end.len() + self.rest.len() + 8);
        line.push_str(start);
        line.push_str(self.ws_before_arrow);
        line.push_str(ARROW);
        line.push_str(self.ws_after_arrow);
        line.push_str(end);
        line.push_str(self.rest);
        line
    }
}

/// The lines of a cue block, split around its timing line.
#[derive(Debug, PartialEq, Eq)]
pub struct CueBlock {
    pub identifiers: Vec<String>,
    pub timing: String,
    pub payload: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Block {
    /// A `NOTE` block.
    Comment(Vec<String>),
    Cue(CueBlock),
    /// Anything without a timing line: the header, `STYLE` and `REGION`
    /// blocks, stray text.
    Other(Vec<String>),
}

pub fn segment(lines: Vec<String>) -> Block {
    if lines.first().map_or(false, |l| l.starts_with("NOTE")) {
        return Block::Comment(lines);
    }
    let timing_at = match lines.iter().position(|l| is_timing_line(l)) {
        Some(i) => i,
        None => return Block::Other(lines),
    };
    let mut identifiers = lines;
    let mut payload = identifiers.split_off(timing_at);
    let timing = payload.remove(0);
    Block::Cue(CueBlock {
        identifiers,
        timing,
        payload,
    })
}
