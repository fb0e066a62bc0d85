//! Lyric cursor: picks the line to display for a given playback estimate.
//!
//! Pure functions of `(track, estimate)` so the same inputs always yield the
//! same selection.

use crate::lyrics::parser::{LyricLine, LyricTrack, TrackMode};

/// The display selection for one render tick.
#[derive(Debug, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Track has no lines at all (lyrics unavailable).
    Empty,
    /// Synced track, but the estimate is before the first line's offset.
    NotStarted,
    /// Synced track with an active line plus clamped context lines.
    Synced {
        index: usize,
        prev: Option<&'a LyricLine>,
        current: &'a LyricLine,
        next: Option<&'a LyricLine>,
    },
    /// Plain track: the whole block is "current", no line highlighting.
    Block(&'a [LyricLine]),
}

/// Select the active line: the last line whose offset is `<= estimate_ms`.
/// Past the final offset the last line stays current indefinitely.
pub fn select(track: &LyricTrack, estimate_ms: u64) -> Selection<'_> {
    if track.lines.is_empty() {
        return Selection::Empty;
    }
    if track.mode == TrackMode::Plain {
        return Selection::Block(&track.lines);
    }

    // Lines are sorted ascending by offset.
    let count = track
        .lines
        .partition_point(|l| l.offset_ms <= estimate_ms);
    if count == 0 {
        return Selection::NotStarted;
    }

    let index = count - 1;
    Selection::Synced {
        index,
        prev: index.checked_sub(1).and_then(|i| track.lines.get(i)),
        current: &track.lines[index],
        next: track.lines.get(index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> LyricTrack {
        LyricTrack::parse("[00:01.00]Hello\n[00:03.50]World")
    }

    #[test]
    fn test_before_first_line() {
        assert_eq!(select(&track(), 500), Selection::NotStarted);
    }

    #[test]
    fn test_exactly_at_offset() {
        let t = track();
        match select(&t, 1_000) {
            Selection::Synced {
                index,
                prev,
                current,
                next,
            } => {
                assert_eq!(index, 0);
                assert!(prev.is_none());
                assert_eq!(current.text, "Hello");
                assert_eq!(next.map(|l| l.text.as_str()), Some("World"));
            }
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_between_lines() {
        let t = track();
        match select(&t, 2_000) {
            Selection::Synced { current, next, .. } => {
                assert_eq!(current.text, "Hello");
                assert_eq!(next.map(|l| l.text.as_str()), Some("World"));
            }
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_last_line_sticks() {
        let t = track();
        for est in [3_500, 3_501, 9_000, u64::MAX] {
            match select(&t, est) {
                Selection::Synced {
                    index,
                    prev,
                    current,
                    next,
                } => {
                    assert_eq!(index, 1);
                    assert_eq!(prev.map(|l| l.text.as_str()), Some("Hello"));
                    assert_eq!(current.text, "World");
                    assert!(next.is_none());
                }
                other => panic!("unexpected selection at {est}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_plain_block() {
        let t = LyricTrack::parse("line one\nline two");
        match select(&t, 0) {
            Selection::Block(lines) => assert_eq!(lines.len(), 2),
            other => panic!("unexpected selection: {other:?}"),
        }
        // Estimate is irrelevant in plain mode.
        assert_eq!(select(&t, 99_999), select(&t, 0));
    }

    #[test]
    fn test_empty_track() {
        assert_eq!(select(&LyricTrack::empty(), 5_000), Selection::Empty);
    }

    #[test]
    fn test_duplicate_offsets_pick_last() {
        let t = LyricTrack::parse("[00:01.00]a\n[00:01.00]b\n[00:02.00]c");
        match select(&t, 1_500) {
            Selection::Synced { index, current, .. } => {
                assert_eq!(index, 1);
                assert_eq!(current.text, "b");
            }
            other => panic!("unexpected selection: {other:?}"),
        }
    }
}
