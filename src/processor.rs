use crate::cue::{is_timing_line, segment, Block};
use crate::serialiser::write_lines;
use crate::shift::{shift_line, Adjustments};
use crate::snip::{process_block, Snips};

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::info;

/// Reads lines ended by `\n`, `\r\n` or a lone `\r`, with their terminators
/// still attached, so output can be written back byte for byte.
struct RawLines<R> {
    reader: R,
}

impl<R: BufRead> RawLines<R> {
    fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<usize> {
        loop {
            let (found, used) = {
                let available = self.reader.fill_buf()?;
                if available.is_empty() {
                    return Ok(line.len());
                }
                match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                    Some(i) => {
                        line.extend_from_slice(&available[..=i]);
                        (true, i + 1)
                    }
                    None => {
                        line.extend_from_slice(available);
                        (false, available.len())
                    }
                }
            };
            self.reader.consume(used);
            if found {
                break;
            }
        }
        if line.last() == Some(&b'\r') && self.reader.fill_buf()?.first() == Some(&b'\n') {
            line.push(b'\n');
            self.reader.consume(1);
        }
        Ok(line.len())
    }
}

impl<R: BufRead> Iterator for RawLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        match self.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(
                String::from_utf8(line)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err)),
            ),
            Err(err) => Some(Err(err)),
        }
    }
}

fn raw_lines<R: BufRead>(reader: R) -> impl Iterator<Item = (usize, Result<String>)> {
    RawLines { reader }
        .enumerate()
        .map(|(i, line)| {
            let line_no = i + 1;
            (
                line_no,
                line.with_context(|| format!("Failed to read input line {}", line_no)),
            )
        })
}

fn is_blank(line: &str) -> bool {
    matches!(line, "\n" | "\r" | "\r\n")
}

/// Counters for the end-of-run log line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub lines: usize,
    pub cues: usize,
    pub dropped: usize,
}

/// Rewrites every cue timing line by the matching adjustment, line by line.
pub fn shift<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    adjustments: &Adjustments,
) -> Result<Stats> {
    let mut stats = Stats::default();
    for (line_no, line) in raw_lines(input) {
        let line = line?;
        let shifted = shift_line(&line, adjustments).with_context(|| {
            format!("line {}: cannot shift cue timing line '{}'", line_no, line.trim_end())
        })?;
        if is_timing_line(&line) {
            stats.cues += 1;
        }
        write_lines(output, &[shifted])?;
        stats.lines = line_no;
    }
    output.flush().context("Failed to write output.")?;
    info!("Shifted {} cues over {} lines", stats.cues, stats.lines);
    Ok(stats)
}

/// Cuts the snips out of the timeline, block by block. A block that comes
/// out empty takes its blank separator line with it.
pub fn snip<R: BufRead, W: Write>(input: R, output: &mut W, snips: &Snips) -> Result<Stats> {
    let mut stats = Stats::default();
    let mut block = Vec::new();
    let mut block_start = 1;
    for (line_no, line) in raw_lines(input) {
        let line = line?;
        stats.lines = line_no;
        if is_blank(&line) {
            let out = snip_block(std::mem::take(&mut block), block_start, snips, &mut stats)?;
            if !out.is_empty() {
                write_lines(output, &out)?;
                write_lines(output, &[line])?;
            }
            block_start = line_no + 1;
        } else {
            block.push(line);
        }
    }
    let out = snip_block(block, block_start, snips, &mut stats)?;
    write_lines(output, &out)?;
    output.flush().context("Failed to write output.")?;
    info!(
        "Read {} lines, dropped {} of {} cues",
        stats.lines, stats.dropped, stats.cues
    );
    Ok(stats)
}

fn snip_block(
    lines: Vec<String>,
    first_line_no: usize,
    snips: &Snips,
    stats: &mut Stats,
) -> Result<Vec<String>> {
    let block = segment(lines);
    let timing_line = match &block {
        Block::Cue(cue) => Some((
            first_line_no + cue.identifiers.len(),
            cue.timing.trim_end().to_string(),
        )),
        _ => None,
    };
    let (line_no, timing) = match timing_line {
        Some(found) => found,
        None => return Ok(process_block(block, snips)?),
    };
    stats.cues += 1;
    let out = process_block(block, snips).with_context(|| {
        format!("line {}: cannot snip cue timing line '{}'", line_no, timing)
    })?;
    if out.is_empty() {
        stats.dropped += 1;
    }
    Ok(out)
}
