use crate::srt::{Millis, SequenceNumber, Subtitle, SubtitleTrack};

use anyhow::{anyhow, Result};
use log::{debug, info};

/// One edit applied to a track before it is renumbered and written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Renumber,
    TrimTo(Millis),
    Cut { start: Millis, end: Millis },
    DeleteEmpty,
    DeleteByDuration(Millis),
    Delete(i64),
    Sort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessReport {
    pub deleted: usize,
    pub remaining: usize,
}

/// Fails when the input held no subtitle blocks at all. Blocks that were
/// already deleted still count.
pub fn ensure_not_empty(track: &SubtitleTrack) -> Result<()> {
    if track.physical_len() == 0 {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }
    Ok(())
}

/// Applies `edit` and renumbers the remaining subtitles from 1.
pub fn process(track: &mut SubtitleTrack, edit: &Edit) -> ProcessReport {
    let deleted = match *edit {
        Edit::Renumber => 0,
        Edit::TrimTo(cutoff) => track.trim_to(cutoff),
        Edit::Cut { start, end } => track.cut(start, end),
        Edit::DeleteEmpty => track.delete_empty(),
        Edit::DeleteByDuration(max) => track.delete_by_duration(max),
        Edit::Delete(num) => match track.delete(num) {
            Some(_) => 1,
            None => 0,
        },
        Edit::Sort => {
            track.sort();
            0
        }
    };
    let remaining = track.renumber();
    info!("{:?}: deleted {}, {} remaining", edit, deleted, remaining);
    ProcessReport { deleted, remaining }
}

impl SubtitleTrack {
    /// Sets the number of every live subtitle to its rank among live
    /// subtitles. Returns the last number assigned.
    pub fn renumber(&mut self) -> usize {
        let mut last = 0;
        for (rank, sub) in self.iter_mut() {
            sub.sequence_number = SequenceNumber::Assigned(rank as i64);
            last = rank;
        }
        last
    }

    /// Deletes the first subtitle in storage order whose number is `num`,
    /// returning its position.
    pub fn delete(&mut self, num: i64) -> Option<usize> {
        let pos = self
            .subtitles
            .iter()
            .position(|s| s.sequence_number == SequenceNumber::Assigned(num))?;
        self.subtitles[pos].mark_deleted();
        self.live -= 1;
        debug!("Deleted subtitle {} at position {}", num, pos);
        Some(pos)
    }

    /// Drops every subtitle that starts before `cutoff` and moves the rest
    /// back by `cutoff`.
    pub fn trim_to(&mut self, cutoff: Millis) -> usize {
        let mut deleted = 0;
        for (_, sub) in self.iter_mut() {
            if sub.show_at < cutoff {
                sub.mark_deleted();
                deleted += 1;
            } else {
                sub.shift_back(cutoff);
            }
        }
        self.live -= deleted;
        deleted
    }

    /// Removes the span `[start, end)`. Subtitles starting inside it are
    /// dropped and later ones are moved back to close the gap.
    pub fn cut(&mut self, start: Millis, end: Millis) -> usize {
        let gap = end.saturating_sub(start);
        let mut deleted = 0;
        for (_, sub) in self.iter_mut() {
            if sub.show_at >= start && sub.show_at < end {
                sub.mark_deleted();
                deleted += 1;
            } else if sub.show_at >= end {
                sub.shift_back(gap);
            }
        }
        self.live -= deleted;
        deleted
    }

    /// Deletes every live subtitle for which `pred` returns true. The
    /// predicate receives the live rank and the subtitle.
    pub fn delete_if<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(usize, &Subtitle) -> bool,
    {
        let mut deleted = 0;
        for (rank, sub) in self.iter_mut() {
            if pred(rank, &*sub) {
                debug!("Deleting subtitle at rank {}", rank);
                sub.mark_deleted();
                deleted += 1;
            }
        }
        self.live -= deleted;
        deleted
    }

    pub fn delete_empty(&mut self) -> usize {
        self.delete_if(|_, sub| sub.text.trim().is_empty())
    }

    /// Deletes subtitles shown for `max` milliseconds or less.
    pub fn delete_by_duration(&mut self, max: Millis) -> usize {
        self.delete_if(|_, sub| sub.duration() <= max)
    }

    /// Stable sort by start time. Numbers are left alone.
    pub fn sort(&mut self) {
        self.subtitles.sort_by_key(|s| s.show_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn live_count(track: &SubtitleTrack) -> usize {
        track.subtitles().iter().filter(|s| !s.is_deleted()).count()
    }

    fn starts(track: &SubtitleTrack) -> Vec<Millis> {
        track.iter().map(|(_, s)| s.show_at()).collect()
    }

    const SPACED: &str = "1
0:00:00,000 --> 0:00:10,000

2
0:00:10,000 --> 0:00:20,000

3
0:00:30,000 --> 0:00:40,000

4
0:00:50,000 --> 0:01:00,000

5
0:01:00,000 --> 0:01:10,000";

    #[test]
    fn renumber_assigns_live_ranks() {
        let mut track = parse(
            "1
0:02:21,860 --> 0:02:24,520

3
0:02:24,520 --> 0:02:27,400
最初の3つは、
0+0 = 0

-1
0:02:24,520 --> 0:02:27,400

7
0:02:24,520 --> 0:02:27,400",
        )
        .unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track.renumber(), 3);

        let numbers: Vec<SequenceNumber> = track
            .subtitles()
            .iter()
            .map(|s| s.sequence_number())
            .collect();
        assert_eq!(
            numbers,
            vec![
                SequenceNumber::Assigned(1),
                SequenceNumber::Assigned(2),
                SequenceNumber::Deleted,
                SequenceNumber::Assigned(3),
            ]
        );
    }

    #[test]
    fn delete_by_number() {
        let mut track = parse(
            "1
0:02:21,860 --> 0:02:24,520

3
0:02:24,520 --> 0:02:27,400

5
0:02:24,520 --> 0:02:27,400

7
0:02:24,520 --> 0:02:27,400",
        )
        .unwrap();
        assert_eq!(track.delete(5), Some(2));
        assert_eq!(track.len(), 3);
        assert_eq!(track.delete(5), None);
        assert_eq!(track.delete(42), None);
        assert_eq!(track.len(), 3);
        assert_eq!(live_count(&track), 3);
    }

    #[test]
    fn delete_never_matches_deleted_entries() {
        let mut track = parse("-1\n0:00:00,000 --> 0:00:01,000\nx\n").unwrap();
        assert_eq!(track.delete(-1), None);
        assert_eq!(track.len(), 0);
    }

    #[test]
    fn delete_takes_first_duplicate() {
        let mut track = parse(
            "2\n0:00:00,000 --> 0:00:01,000\na\n\n2\n0:00:01,000 --> 0:00:02,000\nb\n",
        )
        .unwrap();
        assert_eq!(track.delete(2), Some(0));
        assert_eq!(track.delete(2), Some(1));
        assert!(track.is_empty());
    }

    #[test]
    fn trim_to_rebases_time() {
        let mut track = parse(SPACED).unwrap();
        assert_eq!(track.trim_to(40_000), 3);
        assert_eq!(track.len(), 2);
        assert_eq!(live_count(&track), 2);
        assert_eq!(starts(&track), vec![10_000, 20_000]);
        assert_eq!(track.subtitles()[3].hide_at(), 20_000);
        assert_eq!(track.subtitles()[4].hide_at(), 30_000);
    }

    #[test]
    fn trim_to_zero_changes_nothing() {
        let mut track = parse(SPACED).unwrap();
        assert_eq!(track.trim_to(0), 0);
        assert_eq!(starts(&track), vec![0, 10_000, 30_000, 50_000, 60_000]);
    }

    #[test]
    fn cut_closes_the_gap() {
        let mut track = parse(SPACED).unwrap();
        assert_eq!(track.cut(30_000, 60_000), 2);
        assert_eq!(track.len(), 3);
        assert_eq!(live_count(&track), 3);
        assert_eq!(starts(&track), vec![0, 10_000, 30_000]);
        assert_eq!(track.subtitles()[4].hide_at(), 40_000);
    }

    #[test]
    fn cut_with_reversed_bounds_is_noop() {
        let mut track = parse(SPACED).unwrap();
        assert_eq!(track.cut(60_000, 30_000), 0);
        assert_eq!(starts(&track), vec![0, 10_000, 30_000, 50_000, 60_000]);
    }

    #[test]
    fn delete_empty() {
        let mut track = parse(
            "1
0:00:00,000 --> 0:00:10,000
aaa

2
0:00:10,000 --> 0:00:20,000

3
0:00:30,000 --> 0:00:40,000


4
0:00:50,000 --> 0:01:00,000
bbb

5
0:01:00,000 --> 0:01:10,000
\t  \n
6
0:01:10,000 --> 0:01:20,000",
        )
        .unwrap();
        assert_eq!(track.subtitles()[4].text(), "\t  \n");
        assert_eq!(track.delete_empty(), 4);
        let texts: Vec<&str> = track.iter().map(|(_, s)| s.text()).collect();
        assert_eq!(texts, vec!["aaa\n", "bbb\n"]);
        assert_eq!(live_count(&track), track.len());
    }

    #[test]
    fn delete_by_duration() {
        let mut track = parse(
            "1
0:00:00,000 --> 0:00:10,000
aaa

2
0:00:10,000 --> 0:00:15,000

3
0:00:15,000 --> 0:00:25,000


4
0:00:25,000 --> 0:00:35,000
bbb

5
0:00:35,000 --> 0:00:40,000


6
0:00:40,000 --> 0:00:45,000",
        )
        .unwrap();
        assert_eq!(track.delete_by_duration(5_000), 3);
        assert_eq!(track.len(), 3);
    }

    #[test]
    fn delete_by_duration_drops_inverted_entries() {
        let mut track = SubtitleTrack::new(vec![
            Subtitle::new(1, 10_000, 5_000, "backwards"),
            Subtitle::new(2, 10_000, 20_000, "fine"),
        ]);
        assert_eq!(track.delete_by_duration(1_000), 1);
        assert_eq!(track.iter().next().map(|(_, s)| s.text()), Some("fine"));
    }

    #[test]
    fn delete_if_sees_live_rank() {
        let mut track = parse(SPACED).unwrap();
        track.delete(2);
        assert_eq!(track.delete_if(|rank, _| rank == 2), 1);
        assert_eq!(starts(&track), vec![0, 50_000, 60_000]);
    }

    #[test]
    fn sort_is_stable_by_start() {
        let mut track = SubtitleTrack::new(vec![
            Subtitle::new(1, 25_000, 35_000, "a"),
            Subtitle::new(2, 15_000, 25_000, "b"),
            Subtitle::new(3, 10_000, 15_000, "c"),
            Subtitle::new(4, 0, 10_000, "d"),
            Subtitle::new(5, 35_000, 40_000, "e"),
            Subtitle::new(6, 40_000, 45_000, "f"),
            Subtitle::new(7, 10_000, 12_000, "g"),
        ]);
        track.sort();
        let order: Vec<&str> = track.iter().map(|(_, s)| s.text()).collect();
        assert_eq!(order, vec!["d", "c", "g", "b", "a", "e", "f"]);
        assert_eq!(
            track.subtitles()[0].sequence_number(),
            SequenceNumber::Assigned(4)
        );
    }

    #[test]
    fn sort_keeps_deleted_entries_hidden() {
        let mut track = SubtitleTrack::new(vec![
            Subtitle::new(1, 20_000, 21_000, "a"),
            Subtitle::new(-1, 0, 1_000, "gone"),
            Subtitle::new(2, 10_000, 11_000, "b"),
        ]);
        track.sort();
        assert!(track.subtitles()[0].is_deleted());
        assert_eq!(track.len(), 2);
        let order: Vec<&str> = track.iter().map(|(_, s)| s.text()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn process_renumbers_after_edit() {
        let mut track = parse(SPACED).unwrap();
        let report = process(&mut track, &Edit::Cut { start: 30_000, end: 60_000 });
        assert_eq!(report, ProcessReport { deleted: 2, remaining: 3 });
        assert_eq!(
            track.to_string(),
            "1
0:00:00,000 --> 0:00:10,000

2
0:00:10,000 --> 0:00:20,000

3
0:00:30,000 --> 0:00:40,000


"
        );
    }

    #[test]
    fn process_delete_missing_number() {
        let mut track = parse(SPACED).unwrap();
        let report = process(&mut track, &Edit::Delete(99));
        assert_eq!(report, ProcessReport { deleted: 0, remaining: 5 });
    }

    #[test]
    fn count_tracks_every_edit() {
        let mut track = parse(SPACED).unwrap();
        track.delete(3);
        track.trim_to(5_000);
        track.cut(20_000, 30_000);
        track.delete_empty();
        track.sort();
        assert_eq!(track.len(), live_count(&track));
        assert!(track.is_empty());
    }

    #[test]
    fn ensure_not_empty_rejects_blank_input() {
        let track = parse("").unwrap();
        assert!(ensure_not_empty(&track).is_err());
    }

    #[test]
    fn ensure_not_empty_accepts_deleted_blocks() {
        let mut track = parse("-1\n0:00:00,000 --> 0:00:01,000\nx\n").unwrap();
        assert!(track.is_empty());
        assert!(ensure_not_empty(&track).is_ok());

        let report = process(&mut track, &Edit::Renumber);
        assert_eq!(report, ProcessReport { deleted: 0, remaining: 0 });
        assert_eq!(track.to_string(), "\n");
    }
}
