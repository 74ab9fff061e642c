use crate::srt::{Millis, SequenceNumber, Subtitle, SubtitleTrack, DELETED_MARKER};

use std::fmt;
use std::io::{self, BufWriter};

use anyhow::{Context, Result};

/// Writes every live subtitle of the track, followed by one blank line.
pub fn serialise<W: io::Write>(track: &SubtitleTrack, dst: W) -> Result<()> {
    use std::io::Write;

    let mut writer = BufWriter::new(dst);
    writer
        .write_all(render(track).as_bytes())
        .context("Failed to write subtitles.")?;
    writer.flush().context("Failed to write subtitles.")?;
    Ok(())
}

pub fn render(track: &SubtitleTrack) -> String {
    track.to_string()
}

pub fn format_timestamp(timestamp: Millis) -> String {
    let hours = timestamp / 3_600_000;
    let minutes = (timestamp % 3_600_000) / 60_000;
    let seconds = (timestamp % 60_000) / 1000;
    let millis = timestamp % 1000;
    format!("{}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

pub(crate) fn write_track<W: fmt::Write>(buf: &mut W, track: &SubtitleTrack) -> fmt::Result {
    for (_, sub) in track.iter() {
        write_sub(buf, sub)?;
    }
    writeln!(buf)
}

pub(crate) fn write_sub<W: fmt::Write>(buf: &mut W, sub: &Subtitle) -> fmt::Result {
    let num = match sub.sequence_number {
        SequenceNumber::Assigned(num) => num,
        SequenceNumber::Deleted => DELETED_MARKER,
    };
    writeln!(buf, "{}", num)?;
    write_ts(buf, sub.show_at)?;
    write!(buf, " --> ")?;
    write_ts(buf, sub.hide_at)?;
    writeln!(buf)?;
    writeln!(buf, "{}", sub.text)
}

fn write_ts<W: fmt::Write>(buf: &mut W, timestamp: Millis) -> fmt::Result {
    write!(buf, "{}", format_timestamp(timestamp))
}

impl fmt::Display for Subtitle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_sub(f, self)
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_track(f, self)
    }
}
