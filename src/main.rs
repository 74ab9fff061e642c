use subedit::{parse_timestamp, processor, serialiser, Edit, Millis, Parser};

use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser as ClapParser, Subcommand};
use log::{debug, LevelFilter};

fn main() {
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
#[command(about = "Edit SRT subtitles", version)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-",
        global = true
    )]
    input: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
        default_value = "-",
        global = true
    )]
    output: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write a backup of the original input to the specified file.",
        global = true
    )]
    backup: Option<String>,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Log more details to standard error. Repeat for debug output.",
        global = true
    )]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the input unchanged
    Dump,
    /// Number the subtitles sequentially from 1
    Renumber,
    /// Drop everything before TIME and move the rest back to start at zero
    Trim {
        #[arg(short, long, value_name = "TIME", value_parser = time_arg)]
        time: Millis,
    },
    /// Remove a span of time and close the gap
    Cut {
        #[arg(
            long,
            value_name = "START-END",
            value_parser = span_arg,
            conflicts_with_all = ["start", "end"],
            required_unless_present_all = ["start", "end"]
        )]
        between: Option<(Millis, Millis)>,
        #[arg(long, value_name = "TIME", value_parser = time_arg, requires = "end")]
        start: Option<Millis>,
        #[arg(long, value_name = "TIME", value_parser = time_arg, requires = "start")]
        end: Option<Millis>,
    },
    /// Remove subtitles without visible text
    DeleteEmpty,
    /// Remove subtitles shown for TIME or less
    DeleteByDuration {
        #[arg(short, long, value_name = "TIME", value_parser = time_arg)]
        time: Millis,
    },
    /// Remove the first subtitle with the given number
    Delete {
        #[arg(short, long, allow_negative_numbers = true)]
        number: i64,
    },
    /// Order subtitles by start time
    Sort,
}

impl Command {
    fn edit(&self) -> Result<Option<Edit>> {
        let edit = match *self {
            Command::Dump => return Ok(None),
            Command::Renumber => Edit::Renumber,
            Command::Trim { time } => Edit::TrimTo(time),
            Command::Cut { between, start, end } => {
                let (start, end) = match (between, start, end) {
                    (Some(span), _, _) => span,
                    (None, Some(start), Some(end)) => (start, end),
                    _ => bail!("Either --between or both --start and --end are required."),
                };
                if end < start {
                    bail!("The end of the cut lies before its start.");
                }
                Edit::Cut { start, end }
            }
            Command::DeleteEmpty => Edit::DeleteEmpty,
            Command::DeleteByDuration { time } => Edit::DeleteByDuration(time),
            Command::Delete { number } => Edit::Delete(number),
            Command::Sort => Edit::Sort,
        };
        Ok(Some(edit))
    }
}

fn time_arg(arg: &str) -> Result<Millis, String> {
    parse_timestamp(arg).map_err(|err| err.to_string())
}

fn span_arg(arg: &str) -> Result<(Millis, Millis), String> {
    let (start, end) = arg
        .split_once('-')
        .ok_or_else(|| format!("Expected START-END, got '{}'", arg))?;
    Ok((time_arg(start)?, time_arg(end)?))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let data = if cli.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&cli.input)
            .context(format!("Failed to open input file: '{}'", cli.input))?
    };

    if let Some(backup_path) = &cli.backup {
        std::fs::write(backup_path, &data)
            .context(format!("Failed to write backup file: '{}'", backup_path))?;
    }

    let edit = match cli.command.edit()? {
        Some(edit) => edit,
        None => return write_output(&cli.output, |dst| {
            dst.write_all(data.as_bytes())?;
            Ok(())
        }),
    };

    let mut track = Parser::new()
        .parse(&data)
        .context(format!("Failed to parse SRT file: '{}'", cli.input))?;
    processor::ensure_not_empty(&track)?;

    let report = processor::process(&mut track, &edit);
    debug!(
        "{} subtitles deleted, {} remaining",
        report.deleted, report.remaining
    );

    write_output(&cli.output, |dst| serialiser::serialise(&track, dst))
}

fn write_output<F>(output: &str, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    if output == "-" {
        let stdout = io::stdout();
        let mut dst = stdout.lock();
        write(&mut dst)
    } else {
        let mut dst = std::fs::File::create(output)
            .context(format!("Failed to create output file: '{}'", output))?;
        write(&mut dst)
    }
}
