//! Session controller: owns the current song, its lyrics and the playback
//! clock, and decides what happens on each recognition result.
//!
//! The session is `Idle` until the recognizer reports a song, then
//! `Identified` until sustained silence sends it back. All state for the
//! current song is replaced wholesale on a song change; there is no partial
//! update to observe mid-transition.

use crate::lyrics::LyricTrack;
use crate::recognize::SongMatch;
use crate::song::SongId;
use crate::sync::PlaybackClock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// No song identified yet (startup, or after sustained silence).
    Idle,
    /// A song is known; the clock is running and a track (possibly empty)
    /// is loaded.
    Identified(SongId),
}

pub struct Session {
    phase: Phase,
    clock: PlaybackClock,
    track: LyricTrack,
    silence_polls: u32,
    silence_debounce: u32,
}

impl Session {
    pub fn new(default_offset_ms: i64, carry_offset: bool, silence_debounce: u32) -> Self {
        Self {
            phase: Phase::Idle,
            clock: PlaybackClock::new(default_offset_ms, carry_offset),
            track: LyricTrack::empty(),
            silence_polls: 0,
            silence_debounce,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn current_song(&self) -> Option<&SongId> {
        match &self.phase {
            Phase::Identified(song) => Some(song),
            Phase::Idle => None,
        }
    }

    pub fn track(&self) -> &LyricTrack {
        &self.track
    }

    pub fn current_estimate_ms(&self) -> u64 {
        self.clock.current_estimate_ms()
    }

    pub fn manual_offset_ms(&self) -> i64 {
        self.clock.manual_offset_ms()
    }

    pub fn adjust_offset(&mut self, delta_ms: i64) -> i64 {
        self.clock.adjust_offset(delta_ms)
    }

    /// Consume a successful identification. Returns the song to fetch lyrics
    /// for when this was an actual song change; re-identifying the current
    /// song is a no-op.
    pub fn on_match(&mut self, m: &SongMatch) -> Option<SongId> {
        self.silence_polls = 0;
        if !self.clock.song_changed(&m.song, m.play_offset_ms) {
            return None;
        }
        self.phase = Phase::Identified(m.song.clone());
        // Empty until the fetch lands; the display falls back to metadata.
        self.track = LyricTrack::empty();
        Some(m.song.clone())
    }

    /// "No match" keeps whatever state we have. The sample was loud enough
    /// to try, so it also resets the silence counter.
    pub fn on_no_match(&mut self) {
        self.silence_polls = 0;
    }

    /// A poll whose captured audio was below the silence threshold. After
    /// the configured number of consecutive silent polls the session returns
    /// to `Idle`. Returns true when that transition happened.
    pub fn on_silent_poll(&mut self) -> bool {
        self.silence_polls += 1;
        if matches!(self.phase, Phase::Identified(_)) && self.silence_polls >= self.silence_debounce
        {
            self.to_idle();
            return true;
        }
        false
    }

    /// Apply a completed lyrics fetch. Results for a song that is no longer
    /// current are stale and discarded. `None` (not found or fetch failure)
    /// degrades to an empty track; the session stays `Identified` either way.
    /// Returns whether the result was applied.
    pub fn on_lyrics(&mut self, song: &SongId, track: Option<LyricTrack>) -> bool {
        match &self.phase {
            Phase::Identified(current) if current.same_song(song) => {
                self.track = track.unwrap_or_else(LyricTrack::empty);
                true
            }
            _ => false,
        }
    }

    fn to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.track = LyricTrack::empty();
        self.clock.stop();
        self.silence_polls = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{Selection, select};

    fn hit(artist: &str, title: &str, offset_ms: u64) -> SongMatch {
        SongMatch {
            song: SongId::new(artist, title),
            duration_ms: 240_000,
            play_offset_ms: offset_ms,
        }
    }

    #[test]
    fn test_idle_to_identified() {
        let mut s = Session::new(0, false, 3);
        assert_eq!(*s.phase(), Phase::Idle);

        let fetch = s.on_match(&hit("Coldplay", "Yellow", 10_000));
        assert_eq!(fetch, Some(SongId::new("Coldplay", "Yellow")));
        assert_eq!(
            *s.phase(),
            Phase::Identified(SongId::new("Coldplay", "Yellow"))
        );
        assert!(s.track().is_empty());
        assert!(s.current_estimate_ms() >= 10_000);
    }

    #[test]
    fn test_repeated_match_is_noop() {
        let mut s = Session::new(0, false, 3);
        assert!(s.on_match(&hit("a", "b", 0)).is_some());
        assert!(s.on_match(&hit("a", "b", 0)).is_none());
        assert!(s.on_match(&hit("a", "b", 90_000)).is_none());
    }

    #[test]
    fn test_song_change_replaces_track() {
        let mut s = Session::new(0, false, 3);
        s.on_match(&hit("a", "one", 0));
        s.on_lyrics(
            &SongId::new("a", "one"),
            Some(LyricTrack::parse("[00:01.00]Hello")),
        );
        assert!(!s.track().is_empty());

        let fetch = s.on_match(&hit("a", "two", 0));
        assert_eq!(fetch, Some(SongId::new("a", "two")));
        assert!(s.track().is_empty());
    }

    #[test]
    fn test_stale_lyrics_discarded() {
        let mut s = Session::new(0, false, 3);
        s.on_match(&hit("a", "one", 0));
        // Song changes before the fetch for "one" completes.
        s.on_match(&hit("a", "two", 0));

        let applied = s.on_lyrics(
            &SongId::new("a", "one"),
            Some(LyricTrack::parse("[00:01.00]Stale")),
        );
        assert!(!applied);
        assert!(s.track().is_empty());

        let applied = s.on_lyrics(
            &SongId::new("a", "two"),
            Some(LyricTrack::parse("[00:01.00]Fresh")),
        );
        assert!(applied);
        assert_eq!(s.track().lines[0].text, "Fresh");
    }

    #[test]
    fn test_not_found_keeps_identified_with_empty_track() {
        let mut s = Session::new(0, false, 3);
        s.on_match(&hit("a", "b", 0));
        assert!(s.on_lyrics(&SongId::new("a", "b"), None));

        assert_eq!(*s.phase(), Phase::Identified(SongId::new("a", "b")));
        assert!(s.track().is_empty());
        // Querying the cursor on the empty track is well-defined.
        assert_eq!(select(s.track(), s.current_estimate_ms()), Selection::Empty);
    }

    #[test]
    fn test_silence_debounce() {
        let mut s = Session::new(0, false, 3);
        s.on_match(&hit("a", "b", 0));

        assert!(!s.on_silent_poll());
        assert!(!s.on_silent_poll());
        // One loud poll resets the counter.
        s.on_no_match();
        assert!(!s.on_silent_poll());
        assert!(!s.on_silent_poll());
        assert!(s.on_silent_poll());
        assert_eq!(*s.phase(), Phase::Idle);
        assert!(s.current_song().is_none());
    }

    #[test]
    fn test_silence_in_idle_stays_idle() {
        let mut s = Session::new(0, false, 2);
        for _ in 0..5 {
            assert!(!s.on_silent_poll());
        }
        assert_eq!(*s.phase(), Phase::Idle);
    }

    #[test]
    fn test_end_to_end_sync() {
        let mut s = Session::new(0, false, 3);
        s.on_match(&hit("Artist", "Song", 0));
        s.on_lyrics(
            &SongId::new("Artist", "Song"),
            Some(LyricTrack::parse("[00:01.00]Hello\n[00:03.50]World")),
        );

        assert_eq!(select(s.track(), 500), Selection::NotStarted);
        match select(s.track(), 2_000) {
            Selection::Synced { current, next, .. } => {
                assert_eq!(current.text, "Hello");
                assert_eq!(next.map(|l| l.text.as_str()), Some("World"));
            }
            other => panic!("unexpected selection: {other:?}"),
        }
        match select(s.track(), 9_000) {
            Selection::Synced { current, next, .. } => {
                assert_eq!(current.text, "World");
                assert!(next.is_none());
            }
            other => panic!("unexpected selection: {other:?}"),
        }
    }
}
