use crate::error::{Result, SrtError};
use crate::srt::{Millis, Subtitle, SubtitleTrack};

use std::borrow::Cow;

use log::debug;
use nom::bytes::complete::tag;
use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map_res};
use nom::error::{convert_error, VerboseError};
use nom::{Finish, IResult};
use once_cell::sync::Lazy;
use regex::Regex;

// number, show_at, hide_at, text lines, terminated by a blank line.
static BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(-?[0-9]+)\n([0-9,:]+) --> ([0-9,:]+)\n((?:.+\n)*)^\n")
        .expect("block pattern is valid")
});

pub struct Parser;
impl Parser {
    pub fn new() -> Self {
        Self {}
    }

    /// Scans `input` for SRT blocks. Text between blocks that does not match
    /// the block layout is skipped, but a block with an unreadable number or
    /// timestamp fails the whole parse.
    pub fn parse(&mut self, input: &str) -> Result<SubtitleTrack> {
        let input = normalise(input);
        let input = format!("{}\n\n", input);

        let mut subs = Vec::new();
        for caps in BLOCK.captures_iter(&input) {
            let sub = Subtitle::from_parts(&caps[1], &caps[2], &caps[3], &caps[4])?;
            subs.push(sub);
        }
        let track = SubtitleTrack::new(subs);
        debug!(
            "Parsed {} subtitles ({} live)",
            track.physical_len(),
            track.len()
        );
        Ok(track)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse(input: &str) -> Result<SubtitleTrack> {
    Parser::new().parse(input)
}

fn normalise(input: &str) -> Cow<'_, str> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    if input.contains('\r') {
        Cow::Owned(input.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Converts `H:MM:SS,mmm` to milliseconds. Every group may have any number
/// of digits; the ranges of minutes, seconds and milliseconds are not checked.
pub fn parse_timestamp(input: &str) -> Result<Millis> {
    let (_, (hours, minutes, seconds, millis)) = all_consuming(timestamp)(input)
        .finish()
        .map_err(|err| SrtError::InvalidTimestamp {
            input: input.to_string(),
            detail: convert_error(input, err),
        })?;

    let total = millis + seconds * 1000 + minutes * 60 * 1000 + hours * 60 * 60 * 1000;
    Millis::try_from(total).map_err(|_| SrtError::TimestampOverflow(input.to_string()))
}

fn timestamp(input: &str) -> IResult<&str, (u64, u64, u64, u64), VerboseError<&str>> {
    let number = || map_res(digit1, |s: &str| s.parse::<u32>().map(u64::from));

    let (input, hours) = number()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = number()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = number()(input)?;
    let (input, _) = tag(",")(input)?;
    let (input, millis) = number()(input)?;

    Ok((input, (hours, minutes, seconds, millis)))
}
