use crate::error::{Result, SrtError};
use crate::parser::parse_timestamp;

/// Milliseconds since the start of the track.
pub type Millis = u32;

/// Number that marks a deleted block in SRT text.
pub const DELETED_MARKER: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceNumber {
    Assigned(i64),
    Deleted,
}

impl From<i64> for SequenceNumber {
    fn from(num: i64) -> Self {
        if num == DELETED_MARKER {
            SequenceNumber::Deleted
        } else {
            SequenceNumber::Assigned(num)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub(crate) sequence_number: SequenceNumber,
    pub(crate) show_at: Millis,
    pub(crate) hide_at: Millis,
    pub(crate) text: String,
}

impl Subtitle {
    pub fn new(
        sequence_number: i64,
        show_at: Millis,
        hide_at: Millis,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sequence_number: sequence_number.into(),
            show_at,
            hide_at,
            text: text.into(),
        }
    }

    /// Builds a subtitle from the raw fields of a matched SRT block.
    pub fn from_parts(num: &str, show_at: &str, hide_at: &str, text: &str) -> Result<Self> {
        let num: i64 = num
            .parse()
            .map_err(|source| SrtError::InvalidSequenceNumber {
                input: num.to_string(),
                source,
            })?;
        Ok(Self::new(
            num,
            parse_timestamp(show_at)?,
            parse_timestamp(hide_at)?,
            text,
        ))
    }

    pub fn sequence_number(&self) -> SequenceNumber {
        self.sequence_number
    }

    pub fn show_at(&self) -> Millis {
        self.show_at
    }

    pub fn hide_at(&self) -> Millis {
        self.hide_at
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mark_deleted(&mut self) {
        self.sequence_number = SequenceNumber::Deleted;
    }

    pub fn is_deleted(&self) -> bool {
        self.sequence_number == SequenceNumber::Deleted
    }

    /// Display duration. An end before the start counts as zero.
    pub fn duration(&self) -> Millis {
        self.hide_at.saturating_sub(self.show_at)
    }

    pub(crate) fn shift_back(&mut self, by: Millis) {
        self.show_at = self.show_at.saturating_sub(by);
        self.hide_at = self.hide_at.saturating_sub(by);
    }
}

/// An ordered list of subtitles in file order.
///
/// Deleted subtitles stay in place so positions returned by
/// [`SubtitleTrack::delete`] remain valid; they are skipped by every
/// iteration, count and rendering.
#[derive(Debug, Clone, Default)]
pub struct SubtitleTrack {
    pub(crate) subtitles: Vec<Subtitle>,
    pub(crate) live: usize,
}

impl SubtitleTrack {
    pub fn new(subtitles: Vec<Subtitle>) -> Self {
        let live = subtitles.iter().filter(|s| !s.is_deleted()).count();
        Self { subtitles, live }
    }

    /// Number of subtitles that have not been deleted.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of stored subtitles, deleted ones included.
    pub fn physical_len(&self) -> usize {
        self.subtitles.len()
    }

    pub fn subtitles(&self) -> &[Subtitle] {
        &self.subtitles
    }

    /// Live subtitles paired with their 1-based rank among live subtitles.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Subtitle)> + '_ {
        self.subtitles
            .iter()
            .filter(|s| !s.is_deleted())
            .enumerate()
            .map(|(i, s)| (i + 1, s))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Subtitle)> + '_ {
        self.subtitles
            .iter_mut()
            .filter(|s| !s.is_deleted())
            .enumerate()
            .map(|(i, s)| (i + 1, s))
    }
}
