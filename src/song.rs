//! Song identity as reported by the recognition service.

use std::fmt;

/// The (artist, title) pair used to detect song changes and key the lyrics
/// cache. Album is carried for display and search hints only; it is not part
/// of the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongId {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
}

impl SongId {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
        }
    }

    /// Normalized cache key: case- and whitespace-insensitive.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}",
            self.artist.trim().to_lowercase(),
            self.title.trim().to_lowercase()
        )
    }

    /// Identity comparison ignores the album (ACRCloud album names vary
    /// between identifications of the same song).
    pub fn same_song(&self, other: &SongId) -> bool {
        self.cache_key() == other.cache_key()
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.artist, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_normalization() {
        let a = SongId::new("Coldplay", "Yellow");
        let b = SongId::new("  coldplay ", "YELLOW");
        assert_eq!(a.cache_key(), b.cache_key());
        assert!(a.same_song(&b));
    }

    #[test]
    fn test_album_not_part_of_identity() {
        let mut a = SongId::new("Coldplay", "Yellow");
        let mut b = a.clone();
        a.album = Some("Parachutes".into());
        b.album = Some("Greatest Hits".into());
        assert!(a.same_song(&b));
    }
}
