//! On-disk lyrics cache (sqlite).
//!
//! Keyed by the normalized song identity so a song identified twice is only
//! fetched once. Entries are immutable content per key; the upsert is
//! last-write-wins, which is harmless for identical content.

use anyhow::Context;
use rusqlite::{Connection, params};
use std::path::Path;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        let s = Self { conn };
        s.init_schema()?;
        Ok(s)
    }

    #[cfg(test)]
    fn open_in_memory() -> anyhow::Result<Self> {
        let s = Self {
            conn: Connection::open_in_memory()?,
        };
        s.init_schema()?;
        Ok(s)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
CREATE TABLE IF NOT EXISTS lyrics_cache (
  song_key TEXT PRIMARY KEY,
  artist TEXT NOT NULL,
  title TEXT NOT NULL,
  album TEXT,
  content TEXT NOT NULL,
  fetched_at INTEGER NOT NULL
);
"#,
            )
            .context("init schema")?;
        Ok(())
    }

    /// Raw lyrics text for a song key, if cached.
    pub fn get_lyrics(&self, song_key: &str) -> anyhow::Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT content FROM lyrics_cache WHERE song_key=?1")
            .context("prepare lyrics lookup")?;
        let mut rows = stmt.query(params![song_key]).context("query lyrics")?;
        if let Some(row) = rows.next().context("read lyrics row")? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn cache_lyrics(
        &self,
        song_key: &str,
        artist: &str,
        title: &str,
        album: Option<&str>,
        content: &str,
        now_unix: i64,
    ) -> anyhow::Result<()> {
        self.conn
            .execute(
                r#"
INSERT INTO lyrics_cache(song_key, artist, title, album, content, fetched_at)
VALUES(?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT(song_key) DO UPDATE SET
  album=excluded.album,
  content=excluded.content,
  fetched_at=excluded.fetched_at
"#,
                params![song_key, artist, title, album, content, now_unix],
            )
            .context("cache lyrics")?;
        Ok(())
    }
}
