//! ACRCloud song identification client.
//!
//! Sends a short WAV sample to the ACRCloud `/v1/identify` endpoint, signed
//! with HMAC-SHA1 over the request parameters, and extracts the best match
//! from the response. The fingerprinting itself is entirely the vendor's
//! side of the wire.

use crate::song::SongId;
use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha1::Sha1;

const IDENTIFY_URI: &str = "/v1/identify";

/// Outcome of one identification request. Network and API failures surface
/// as `Err` from [`AcrClient::identify`]; an explicit "no match" is a normal
/// outcome, not an error.
#[derive(Debug, Clone)]
pub enum RecognitionOutcome {
    Match(SongMatch),
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct SongMatch {
    pub song: SongId,
    pub duration_ms: u64,
    /// How far into the track the sample was taken, per the vendor.
    pub play_offset_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AcrClient {
    client: reqwest::Client,
    host: String,
    access_key: String,
    access_secret: String,
}

impl AcrClient {
    pub fn new(host: &str, access_key: &str, access_secret: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()?,
            host: host.to_string(),
            access_key: access_key.to_string(),
            access_secret: access_secret.to_string(),
        })
    }

    /// Identify a song from a WAV-encoded audio sample.
    pub async fn identify(&self, wav: Vec<u8>) -> anyhow::Result<RecognitionOutcome> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string();
        let signature = self.sign(&timestamp)?;
        let sample_bytes = wav.len().to_string();

        let form = reqwest::multipart::Form::new()
            .part(
                "sample",
                reqwest::multipart::Part::bytes(wav)
                    .file_name("sample.wav")
                    .mime_str("audio/wav")?,
            )
            .text("access_key", self.access_key.clone())
            .text("data_type", "audio")
            .text("signature_version", "1")
            .text("signature", signature)
            .text("sample_bytes", sample_bytes)
            .text("timestamp", timestamp);

        let url = format!("https://{}{}", self.host, IDENTIFY_URI);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("send identify request")?
            .error_for_status()
            .context("identify request status")?;

        let body: serde_json::Value = response.json().await.context("parse identify response")?;
        parse_response(&body)
    }

    /// `POST\n/v1/identify\n{key}\naudio\n1\n{timestamp}` signed with the
    /// access secret, base64 encoded.
    fn sign(&self, timestamp: &str) -> anyhow::Result<String> {
        let string_to_sign = format!(
            "POST\n{IDENTIFY_URI}\n{}\naudio\n1\n{timestamp}",
            self.access_key
        );
        let mut mac = Hmac::<Sha1>::new_from_slice(self.access_secret.as_bytes())
            .context("init hmac")?;
        mac.update(string_to_sign.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

fn parse_response(body: &serde_json::Value) -> anyhow::Result<RecognitionOutcome> {
    let code = body
        .pointer("/status/code")
        .and_then(|c| c.as_i64())
        .unwrap_or(-1);

    // 1001: no result for this sample. Anything else nonzero is an API error
    // (bad credentials, rate limit, ...).
    if code == 1001 {
        return Ok(RecognitionOutcome::NoMatch);
    }
    if code != 0 {
        let msg = body
            .pointer("/status/msg")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        anyhow::bail!("ACRCloud error {code}: {msg}");
    }

    let music = body
        .pointer("/metadata/music/0")
        .context("no music entry in match response")?;

    let title = music
        .get("title")
        .and_then(|t| t.as_str())
        .context("match has no title")?;
    let artist = music
        .pointer("/artists/0/name")
        .and_then(|a| a.as_str())
        .unwrap_or("");
    let album = music
        .pointer("/album/name")
        .and_then(|a| a.as_str())
        .filter(|a| !a.is_empty())
        .map(String::from);

    let mut song = SongId::new(artist, title);
    song.album = album;

    Ok(RecognitionOutcome::Match(SongMatch {
        song,
        duration_ms: music
            .get("duration_ms")
            .and_then(|d| d.as_u64())
            .unwrap_or(0),
        play_offset_ms: music
            .get("play_offset_ms")
            .and_then(|d| d.as_u64())
            .unwrap_or(0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_match() {
        let body = json!({
            "status": { "code": 0, "msg": "Success" },
            "metadata": { "music": [{
                "title": "Yellow",
                "artists": [{ "name": "Coldplay" }],
                "album": { "name": "Parachutes" },
                "duration_ms": 266_000,
                "play_offset_ms": 42_500
            }]}
        });
        match parse_response(&body).unwrap() {
            RecognitionOutcome::Match(m) => {
                assert_eq!(m.song.artist, "Coldplay");
                assert_eq!(m.song.title, "Yellow");
                assert_eq!(m.song.album.as_deref(), Some("Parachutes"));
                assert_eq!(m.play_offset_ms, 42_500);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_parse_no_match() {
        let body = json!({ "status": { "code": 1001, "msg": "No result" } });
        assert!(matches!(
            parse_response(&body).unwrap(),
            RecognitionOutcome::NoMatch
        ));
    }

    #[test]
    fn test_parse_api_error() {
        let body = json!({ "status": { "code": 3003, "msg": "Limit exceeded" } });
        assert!(parse_response(&body).is_err());
    }

    #[test]
    fn test_parse_missing_artist_tolerated() {
        let body = json!({
            "status": { "code": 0 },
            "metadata": { "music": [{ "title": "Instrumental" }]}
        });
        match parse_response(&body).unwrap() {
            RecognitionOutcome::Match(m) => {
                assert_eq!(m.song.title, "Instrumental");
                assert_eq!(m.song.artist, "");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
