//! Playback clock: estimates the current position in the identified track.
//!
//! The anchor is the wall-clock instant the track is deemed to have started
//! (now minus the play offset ACRCloud reports). The operator's manual
//! correction is added on top of the elapsed time and may be adjusted at any
//! point without touching the anchor.

use crate::song::SongId;
use std::time::{Duration, Instant};

pub struct PlaybackClock {
    identity: Option<SongId>,
    anchor: Instant,
    manual_offset_ms: i64,
    default_offset_ms: i64,
    carry_offset: bool,
}

impl PlaybackClock {
    pub fn new(default_offset_ms: i64, carry_offset: bool) -> Self {
        Self {
            identity: None,
            anchor: Instant::now(),
            manual_offset_ms: default_offset_ms,
            default_offset_ms,
            carry_offset,
        }
    }

    pub fn identity(&self) -> Option<&SongId> {
        self.identity.as_ref()
    }

    /// Anchor the clock for a new song at `position_ms` into the track.
    ///
    /// The manual offset resets to its configured default unless
    /// `carry_offset` keeps the operator's correction across songs.
    pub fn start_at(&mut self, identity: SongId, position_ms: u64) {
        self.anchor = Instant::now()
            .checked_sub(Duration::from_millis(position_ms))
            .unwrap_or_else(Instant::now);
        if !self.carry_offset {
            self.manual_offset_ms = self.default_offset_ms;
        }
        self.identity = Some(identity);
    }

    /// Signal a recognition result. Re-anchors only when the identity
    /// actually changed; repeated reports of the same song are no-ops so
    /// every poll doesn't cause a spurious reset. Returns whether a change
    /// happened.
    pub fn song_changed(&mut self, identity: &SongId, position_ms: u64) -> bool {
        if let Some(current) = &self.identity
            && current.same_song(identity)
        {
            return false;
        }
        self.start_at(identity.clone(), position_ms);
        true
    }

    /// Forget the current song (silence detected, back to Idle).
    pub fn stop(&mut self) {
        self.identity = None;
    }

    /// Add a signed correction, effective immediately. Returns the new total.
    pub fn adjust_offset(&mut self, delta_ms: i64) -> i64 {
        self.manual_offset_ms += delta_ms;
        self.manual_offset_ms
    }

    pub fn manual_offset_ms(&self) -> i64 {
        self.manual_offset_ms
    }

    /// Estimated position in the track, clamped at 0 when the correction
    /// would push it negative.
    pub fn current_estimate_ms(&self) -> u64 {
        let elapsed = self.anchor.elapsed().as_millis() as i64;
        (elapsed + self.manual_offset_ms).max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(title: &str) -> SongId {
        SongId::new("Artist", title)
    }

    #[test]
    fn test_start_at_position() {
        let mut clock = PlaybackClock::new(0, false);
        clock.start_at(id("a"), 2_000);
        let est = clock.current_estimate_ms();
        assert!((2_000..2_200).contains(&est), "estimate was {est}");
    }

    #[test]
    fn test_adjust_offset_commutes() {
        let mut clock = PlaybackClock::new(0, false);
        clock.start_at(id("a"), 5_000);
        let before = clock.current_estimate_ms();
        clock.adjust_offset(500);
        clock.adjust_offset(-500);
        let after = clock.current_estimate_ms();
        assert!(after >= before);
        assert!(after - before < 200, "drifted by {}", after - before);
    }

    #[test]
    fn test_estimate_clamped_at_zero() {
        let mut clock = PlaybackClock::new(0, false);
        clock.start_at(id("a"), 0);
        clock.adjust_offset(-60_000);
        assert_eq!(clock.current_estimate_ms(), 0);
    }

    #[test]
    fn test_same_identity_is_noop() {
        let mut clock = PlaybackClock::new(0, false);
        clock.start_at(id("a"), 30_000);
        let before = clock.current_estimate_ms();
        assert!(!clock.song_changed(&id("a"), 0));
        assert!(!clock.song_changed(&id("a"), 0));
        // Anchor untouched: the estimate keeps trending from ~30s.
        assert!(clock.current_estimate_ms() >= before);
    }

    #[test]
    fn test_new_identity_resets() {
        let mut clock = PlaybackClock::new(0, false);
        clock.start_at(id("a"), 30_000);
        assert!(clock.song_changed(&id("b"), 1_000));
        let est = clock.current_estimate_ms();
        assert!(est < 5_000, "estimate was {est}");
        assert_eq!(clock.identity().map(|s| s.title.as_str()), Some("b"));
    }

    #[test]
    fn test_offset_reset_vs_carry() {
        let mut reset = PlaybackClock::new(0, false);
        reset.start_at(id("a"), 0);
        reset.adjust_offset(1_500);
        reset.song_changed(&id("b"), 0);
        assert_eq!(reset.manual_offset_ms(), 0);

        let mut carry = PlaybackClock::new(0, true);
        carry.start_at(id("a"), 0);
        carry.adjust_offset(1_500);
        carry.song_changed(&id("b"), 0);
        assert_eq!(carry.manual_offset_ms(), 1_500);
    }
}
