mod cue;
mod error;
mod parser;
mod processor;
mod serialiser;
mod shift;
mod snip;

use crate::shift::{Adjustment, Adjustments};
use crate::snip::{Snip, Snips};

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use log::{debug, LevelFilter};

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .init();

    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Shift and snip cue timings in WebVTT subtitles")]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-"
    )]
    input: String,
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
        default_value = "-"
    )]
    output: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Move cues by a fixed offset from a point in time onwards")]
    Shift {
        #[arg(
            value_name = "ADJUSTMENT",
            help = "<timestamp><+|-><milliseconds>, e.g. 00:11:22.333+4444. \
                    Only the adjustment with the latest timestamp not after a cue's start applies to it."
        )]
        adjustments: Vec<Adjustment>,
    },
    #[command(about = "Cut time ranges out of the subtitles and close the gaps")]
    Snip {
        #[arg(
            value_name = "SNIP",
            help = "<timestamp>-<timestamp>, e.g. 00:10:00.000-00:20:00.000"
        )]
        snips: Vec<Snip>,
    },
}

fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let file = File::open(path).context(format!("Failed to open input file: '{}'", path))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        let file =
            File::create(path).context(format!("Failed to create output file: '{}'", path))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Shift { adjustments } => {
            let adjustments = Adjustments::new(adjustments);
            if adjustments.is_empty() {
                debug!("No adjustments given, copying input unchanged");
            }
            let input = open_input(&cli.input)?;
            let mut output = open_output(&cli.output)?;
            processor::shift(input, &mut output, &adjustments)
                .context(format!("Failed to shift subtitles from '{}'", cli.input))?;
        }
        Command::Snip { snips } => {
            let snips = Snips::new(snips)?;
            if snips.is_empty() {
                debug!("No snips given, copying input unchanged");
            }
            let input = open_input(&cli.input)?;
            let mut output = open_output(&cli.output)?;
            processor::snip(input, &mut output, &snips)
                .context(format!("Failed to snip subtitles from '{}'", cli.input))?;
        }
    }

    Ok(())
}
