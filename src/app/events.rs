use crate::lyrics::LyricTrack;
use crate::recognize::SongMatch;
use crate::song::SongId;

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    /// Display refresh; also drives the poll scheduler.
    Tick,
    /// Result of one capture + recognition poll.
    Poll(PollEvent),
    /// Completed lyrics fetch (cache or network). `track` is None for
    /// not-found and fetch failures.
    Lyrics {
        song: SongId,
        track: Option<LyricTrack>,
    },
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Resize,
}

#[derive(Debug, Clone)]
pub enum PollEvent {
    Match(SongMatch),
    NoMatch,
    /// Captured audio was below the silence threshold; never sent upstream.
    Silent { rms: f64 },
    CaptureError(String),
    RecognitionError(String),
}
