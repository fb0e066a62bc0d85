//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API serving synchronized (LRC format) lyrics.
//! API Documentation: https://lrclib.net/docs

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct LrclibResponse {
    #[serde(rename = "albumName")]
    album_name: Option<String>,
    #[serde(rename = "plainLyrics")]
    plain_lyrics: Option<String>,
    #[serde(rename = "syncedLyrics")]
    synced_lyrics: Option<String>,
}

/// Raw lyrics text as returned by LRCLIB, before parsing.
#[derive(Debug, Clone)]
pub struct LyricsHit {
    pub content: String,
    pub album: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";
    const USER_AGENT: &'static str = "lyrid/0.1.0 (https://github.com/lyrid)";

    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(Self::USER_AGENT)
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Search for lyrics by artist and title.
    ///
    /// The album is deliberately left out of the query: recognition services
    /// report album names that rarely match LRCLIB's database, and a mismatch
    /// turns a hit into a miss. Synced results are preferred over plain ones.
    pub async fn search(&self, artist: &str, title: &str) -> anyhow::Result<Option<LyricsHit>> {
        let url = format!(
            "{}/search?artist_name={}&track_name={}",
            self.base_url,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("LRCLIB search error: {}", response.status());
        }

        let results: Vec<LrclibResponse> = response.json().await?;

        let best = results
            .iter()
            .find(|r| r.synced_lyrics.as_deref().is_some_and(|s| !s.is_empty()))
            .or_else(|| {
                results
                    .iter()
                    .find(|r| r.plain_lyrics.as_deref().is_some_and(|s| !s.is_empty()))
            });

        Ok(best.map(|r| LyricsHit {
            content: r
                .synced_lyrics
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| r.plain_lyrics.clone())
                .unwrap_or_default(),
            album: r.album_name.clone(),
        }))
    }
}
