//! LRC format parser
//!
//! Turns raw lyrics text into a [`LyricTrack`]:
//! [00:12.34] Hello world
//! [00:15.00] Another line
//!
//! Input with no recognizable timestamps at all falls back to a plain
//! (unsynced) track with every line at offset 0.

/// A single line of lyrics with its offset from track start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    /// Offset in milliseconds from start of the track.
    pub offset_ms: u64,
    /// Display text; may be empty for a blank line.
    pub text: String,
}

impl LyricLine {
    pub fn new(offset_ms: u64, text: impl Into<String>) -> Self {
        Self {
            offset_ms,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    /// Lines carry timestamps and are highlighted one at a time.
    Synced,
    /// No timing information; rendered as a static block.
    Plain,
}

/// An ordered sequence of lyric lines for one song.
///
/// Replaced wholesale on song change, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricTrack {
    pub lines: Vec<LyricLine>,
    pub mode: TrackMode,
}

impl LyricTrack {
    /// An empty synced track: the degraded state when no lyrics are available.
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            mode: TrackMode::Synced,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Parse raw lyrics text.
    ///
    /// Lines starting with one or more `[mm:ss.xxx]` timestamps become synced
    /// lines (one per timestamp). Untimed lines among timed ones are metadata
    /// and are dropped, as are lines with a malformed timestamp. If nothing in
    /// the input is timed, the whole input becomes a plain track.
    pub fn parse(content: &str) -> Self {
        let mut lines = Vec::new();
        let mut saw_timestamp = false;

        for raw in content.lines() {
            if let Some(parsed) = parse_timed_line(raw.trim_end()) {
                saw_timestamp = true;
                lines.extend(parsed);
            }
        }

        if saw_timestamp {
            // Stable sort keeps encounter order for duplicate offsets.
            lines.sort_by_key(|l| l.offset_ms);
            return Self {
                lines,
                mode: TrackMode::Synced,
            };
        }

        if content.is_empty() {
            return Self::empty();
        }

        Self {
            lines: content
                .lines()
                .map(|l| LyricLine::new(0, l.trim_end()))
                .collect(),
            mode: TrackMode::Plain,
        }
    }
}

/// Parse a line like `[00:12.34]Text` or `[00:12.34][01:02.00]Text`.
///
/// Returns `None` for untimed lines (no leading timestamp) and for lines
/// whose leading bracket looks like a timestamp but fails validation; both
/// are dropped from synced output.
fn parse_timed_line(line: &str) -> Option<Vec<LyricLine>> {
    let mut offsets = Vec::new();
    let mut rest = line;

    while let Some(stripped) = rest.strip_prefix('[') {
        let end = stripped.find(']')?;
        let stamp = &stripped[..end];
        if !looks_like_timestamp(stamp) {
            // Metadata tag such as [ti:Title]. If it leads the line the whole
            // line is untimed and gets dropped below.
            break;
        }
        offsets.push(parse_timestamp(stamp)?);
        rest = &stripped[end + 1..];
    }

    if offsets.is_empty() {
        return None;
    }

    let text = rest.trim().to_string();
    Some(
        offsets
            .into_iter()
            .map(|ms| LyricLine::new(ms, text.clone()))
            .collect(),
    )
}

/// Shape check distinguishing `12:34.56` from metadata like `ti:Title`.
fn looks_like_timestamp(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit()) && s.contains(':')
}

/// Parse `mm:ss`, `mm:ss.x`, `mm:ss.xx` or `mm:ss.xxx` into milliseconds.
///
/// Minutes are unbounded in width; seconds must be below 60; the fraction is
/// padded or truncated to millisecond precision (`.5` is 500 ms, `.12` is
/// 120 ms). Anything else is malformed.
fn parse_timestamp(s: &str) -> Option<u64> {
    let (min_str, rest) = s.split_once(':')?;
    let (sec_str, frac_str) = match rest.split_once('.') {
        Some((sec, frac)) => (sec, Some(frac)),
        None => (rest, None),
    };

    if min_str.is_empty() || !min_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let minutes: u64 = min_str.parse().ok()?;

    if sec_str.is_empty() || !sec_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let seconds: u64 = sec_str.parse().ok()?;
    if seconds > 59 {
        return None;
    }

    let millis = match frac_str {
        None => 0,
        Some(f) => {
            if f.is_empty() || f.len() > 3 || !f.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let digits: u64 = f.parse().ok()?;
            match f.len() {
                1 => digits * 100,
                2 => digits * 10,
                _ => digits,
            }
        }
    };

    Some(minutes * 60_000 + seconds * 1_000 + millis)
}

/// Format an offset back into `mm:ss.xxx`.
pub fn format_offset(offset_ms: u64) -> String {
    let minutes = offset_ms / 60_000;
    let seconds = (offset_ms % 60_000) / 1_000;
    let millis = offset_ms % 1_000;
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:12"), Some(12_000));
        assert_eq!(parse_timestamp("01:30"), Some(90_000));
        assert_eq!(parse_timestamp("00:12.5"), Some(12_500));
        assert_eq!(parse_timestamp("00:12.34"), Some(12_340));
        assert_eq!(parse_timestamp("00:12.345"), Some(12_345));
        // Unbounded minute width.
        assert_eq!(parse_timestamp("100:00"), Some(6_000_000));
    }

    #[test]
    fn test_parse_timestamp_malformed() {
        assert_eq!(parse_timestamp("00:60"), None);
        assert_eq!(parse_timestamp("00:99.00"), None);
        assert_eq!(parse_timestamp("ab:12"), None);
        assert_eq!(parse_timestamp("00:ab"), None);
        assert_eq!(parse_timestamp("00:12.abc"), None);
        assert_eq!(parse_timestamp("00:12.1234"), None);
        assert_eq!(parse_timestamp("00:12."), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_offset_roundtrip() {
        for ms in [0, 500, 12_340, 12_345, 90_000, 3_599_999] {
            assert_eq!(parse_timestamp(&format_offset(ms)), Some(ms));
        }
    }

    #[test]
    fn test_parse_synced() {
        let track = LyricTrack::parse("[00:01.00]Hello\n[00:03.50]World");
        assert_eq!(track.mode, TrackMode::Synced);
        assert_eq!(
            track.lines,
            vec![
                LyricLine::new(1_000, "Hello"),
                LyricLine::new(3_500, "World"),
            ]
        );
    }

    #[test]
    fn test_metadata_lines_dropped() {
        let lrc = "[ti:Test Song]\n[ar:Test Artist]\n[00:12.34]First\n[00:15.00]Second\n";
        let track = LyricTrack::parse(lrc);
        assert_eq!(track.mode, TrackMode::Synced);
        assert_eq!(track.lines.len(), 2);
        assert_eq!(track.lines[0].text, "First");
    }

    #[test]
    fn test_malformed_line_dropped_others_kept() {
        let lrc = "[00:01.00]Good\n[00:99.00]Bad seconds\n[00:03.00]Also good";
        let track = LyricTrack::parse(lrc);
        assert_eq!(track.mode, TrackMode::Synced);
        let texts: Vec<&str> = track.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Good", "Also good"]);
    }

    #[test]
    fn test_multiple_timestamps_one_line() {
        let track = LyricTrack::parse("[00:05.00][00:25.00]Chorus line\n[00:10.00]Verse");
        assert_eq!(track.lines.len(), 3);
        assert_eq!(track.lines[0], LyricLine::new(5_000, "Chorus line"));
        assert_eq!(track.lines[1], LyricLine::new(10_000, "Verse"));
        assert_eq!(track.lines[2], LyricLine::new(25_000, "Chorus line"));
    }

    #[test]
    fn test_sort_stable_on_duplicate_offsets() {
        let track = LyricTrack::parse("[00:02.00]b\n[00:01.00]a\n[00:02.00]c");
        let texts: Vec<&str> = track.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_plain_fallback() {
        let input = "Just some words\n\nAnother stanza";
        let track = LyricTrack::parse(input);
        assert_eq!(track.mode, TrackMode::Plain);
        assert!(track.lines.iter().all(|l| l.offset_ms == 0));
        let joined: Vec<&str> = track.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(joined, vec!["Just some words", "", "Another stanza"]);
    }

    #[test]
    fn test_empty_input() {
        let track = LyricTrack::parse("");
        assert_eq!(track.mode, TrackMode::Synced);
        assert!(track.is_empty());
    }

    #[test]
    fn test_blank_timed_line_kept() {
        let track = LyricTrack::parse("[00:01.00]Words\n[00:02.00]");
        assert_eq!(track.lines.len(), 2);
        assert_eq!(track.lines[1], LyricLine::new(2_000, ""));
    }
}
