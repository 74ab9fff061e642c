//! Reading, editing and writing SubRip (`.srt`) subtitle files.
//!
//! A file is parsed into a [`SubtitleTrack`], edited in place and rendered
//! back to text. Deleting a subtitle only marks it; call
//! [`SubtitleTrack::renumber`] before writing so the numbering is sequential
//! again.

pub mod error;
pub mod parser;
pub mod processor;
pub mod serialiser;
pub mod srt;

pub use crate::error::{Result, SrtError};
pub use crate::parser::{parse, parse_timestamp, Parser};
pub use crate::processor::{process, Edit, ProcessReport};
pub use crate::serialiser::{format_timestamp, render, serialise};
pub use crate::srt::{Millis, SequenceNumber, Subtitle, SubtitleTrack};
