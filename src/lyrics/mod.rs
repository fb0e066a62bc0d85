//! Lyrics retrieval and parsing.
//!
//! - LRCLIB API client for fetching raw lyrics text
//! - LRC format parser producing [`parser::LyricTrack`]

pub mod lrclib;
pub mod parser;

pub use lrclib::LrclibClient;
pub use parser::{LyricLine, LyricTrack, TrackMode};

use crate::song::SongId;

/// Raw fetched lyrics plus the parsed track. The raw text is what goes into
/// the on-disk cache; the track is what the session displays.
#[derive(Debug, Clone)]
pub struct FetchedLyrics {
    pub raw: String,
    pub album: Option<String>,
    pub track: LyricTrack,
}

/// Fetch lyrics for a song from LRCLIB. `Ok(None)` means an explicit
/// "not found"; errors are network or API failures.
pub async fn fetch_lyrics(
    client: &LrclibClient,
    song: &SongId,
) -> anyhow::Result<Option<FetchedLyrics>> {
    let hit = client.search(&song.artist, &song.title).await?;

    Ok(hit.and_then(|hit| {
        let track = LyricTrack::parse(&hit.content);
        if track.is_empty() {
            // A result with empty lyrics text is as good as no result.
            return None;
        }
        Some(FetchedLyrics {
            raw: hit.content,
            album: hit.album,
            track,
        })
    }))
}
