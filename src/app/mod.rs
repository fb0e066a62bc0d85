pub mod actions;
pub mod events;
pub mod state;

use crate::audio::{self, Sampler};
use crate::config::Config;
use crate::input;
use crate::lyrics::{self, LrclibClient, LyricTrack};
use crate::recognize::{AcrClient, RecognitionOutcome};
use crate::session::Session;
use crate::song::SongId;
use crate::storage::Storage;
use crate::tui::{self, TuiTerminal};
use actions::Action;
use events::{Event, PollEvent};
use state::{AppState, Toast};
use tokio::sync::mpsc;

pub struct App {
    cfg: Config,
    config_path: std::path::PathBuf,
    state: AppState,
    acr: AcrClient,
    lrclib: LrclibClient,
    sampler: Sampler,
}

impl App {
    pub fn new(cfg: Config, config_path: std::path::PathBuf) -> anyhow::Result<Self> {
        cfg.recognition.validate()?;

        let acr = AcrClient::new(
            &cfg.recognition.host,
            &cfg.recognition.access_key,
            &cfg.recognition.access_secret,
        )?;
        let lrclib = LrclibClient::new()?;
        // Open once at startup so schema problems surface before the loop.
        let _ = Storage::open(&cfg.paths.data_dir.join("cache.sqlite3"))?;

        let sampler = Sampler::new(
            cfg.audio.device.clone(),
            cfg.recognition.sample_rate,
            cfg.recognition.record_secs,
        );

        let session = Session::new(
            cfg.sync.manual_offset_ms,
            cfg.sync.carry_offset,
            cfg.silence.debounce_polls,
        );
        let state = AppState::new(session, cfg.recognition.interval_secs, cfg.ui.compact);

        Ok(Self {
            cfg,
            config_path,
            state,
            acr,
            lrclib,
            sampler,
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone());
        spawn_tick_task(tx.clone());

        tui::draw(terminal, &mut self.state)?;

        // Recognize immediately on startup rather than waiting a full
        // interval.
        self.spawn_recognition(&tx);

        while let Some(ev) = rx.recv().await {
            match ev {
                Event::Input(input_ev) => {
                    if let Some(action) = input::map_input_to_action(input_ev) {
                        self.handle_action(action, &tx);
                    }
                }
                Event::Tick => {
                    if self.should_poll() {
                        self.spawn_recognition(&tx);
                    }
                }
                Event::Poll(pe) => self.handle_poll(pe, &tx),
                Event::Lyrics { song, track } => self.handle_lyrics(song, track, &tx),
            }

            if self.state.should_quit {
                break;
            }

            tui::draw(terminal, &mut self.state)?;
        }

        // Persist runtime-adjusted settings.
        self.cfg.ui.compact = self.state.compact;
        let _ = crate::config::save(&self.cfg, Some(&self.config_path));

        Ok(())
    }

    fn should_poll(&self) -> bool {
        if self.state.recognizing {
            return false;
        }
        if self.state.force_recognize {
            return true;
        }
        match self.state.last_poll {
            None => true,
            Some(at) => at.elapsed().as_secs() >= self.state.poll_interval_secs,
        }
    }

    fn handle_action(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::OffsetUp => self.adjust_offset(self.cfg.sync.offset_step_ms),
            Action::OffsetDown => self.adjust_offset(-self.cfg.sync.offset_step_ms),
            Action::ForceRecognize => {
                self.state.force_recognize = true;
                self.state.status = "Recognizing...".into();
                if !self.state.recognizing {
                    self.spawn_recognition(tx);
                }
            }
            Action::ToggleCompact => {
                self.state.compact = !self.state.compact;
            }
            Action::ScrollUp => {
                self.state.plain_scroll = self.state.plain_scroll.saturating_sub(1);
            }
            Action::ScrollDown => {
                let max = self.state.session.track().lines.len().saturating_sub(1);
                self.state.plain_scroll = (self.state.plain_scroll + 1).min(max);
            }
            Action::Resize => {}
        }
    }

    /// Apply a manual correction step and write the new total back to the
    /// config file so it survives restarts.
    fn adjust_offset(&mut self, delta_ms: i64) {
        let total = self.state.session.adjust_offset(delta_ms);
        self.cfg.sync.manual_offset_ms = total;
        if let Err(e) = crate::config::save(&self.cfg, Some(&self.config_path)) {
            tracing::warn!("save config: {e:#}");
        }
        self.state.toast = Some(Toast::info(format!("Offset: {total:+} ms")));
    }

    fn spawn_recognition(&mut self, tx: &mpsc::Sender<Event>) {
        if self.state.recognizing {
            return;
        }
        self.state.recognizing = true;
        self.state.force_recognize = false;

        let sampler = self.sampler.clone();
        let acr = self.acr.clone();
        let sample_rate = self.cfg.recognition.sample_rate;
        let threshold = self.cfg.silence.rms_threshold;
        let tx = tx.clone();

        tokio::spawn(async move {
            let samples =
                match tokio::task::spawn_blocking(move || sampler.capture()).await {
                    Ok(Ok(samples)) => samples,
                    Ok(Err(e)) => {
                        let _ = tx
                            .send(Event::Poll(PollEvent::CaptureError(format!("{e:#}"))))
                            .await;
                        return;
                    }
                    Err(e) => {
                        let _ = tx
                            .send(Event::Poll(PollEvent::CaptureError(format!(
                                "capture task failed: {e}"
                            ))))
                            .await;
                        return;
                    }
                };

            let level = audio::rms(&samples);
            if level < threshold {
                let _ = tx.send(Event::Poll(PollEvent::Silent { rms: level })).await;
                return;
            }

            let wav = match audio::wav_bytes(&samples, sample_rate) {
                Ok(wav) => wav,
                Err(e) => {
                    let _ = tx
                        .send(Event::Poll(PollEvent::CaptureError(format!("{e:#}"))))
                        .await;
                    return;
                }
            };

            let event = match acr.identify(wav).await {
                Ok(RecognitionOutcome::Match(m)) => PollEvent::Match(m),
                Ok(RecognitionOutcome::NoMatch) => PollEvent::NoMatch,
                Err(e) => PollEvent::RecognitionError(format!("{e:#}")),
            };
            let _ = tx.send(Event::Poll(event)).await;
        });
    }

    fn handle_poll(&mut self, pe: PollEvent, tx: &mpsc::Sender<Event>) {
        self.state.recognizing = false;
        self.state.last_poll = Some(std::time::Instant::now());

        match pe {
            PollEvent::Match(m) => {
                self.state.clear_error();
                if let Some(song) = self.state.session.on_match(&m) {
                    tracing::info!("now playing: {song}");
                    self.state.status = format!("Matched: {song}");
                    self.state.plain_scroll = 0;
                    self.request_lyrics(song, tx);
                } else {
                    self.state.status = "Still playing".into();
                }
            }
            PollEvent::NoMatch => {
                self.state.clear_error();
                self.state.session.on_no_match();
                self.state.status = if self.state.session.current_song().is_some() {
                    "No match; keeping current song".into()
                } else {
                    "No match".into()
                };
            }
            PollEvent::Silent { rms } => {
                tracing::debug!("silent poll (rms {rms:.0})");
                if self.state.session.on_silent_poll() {
                    self.state.status = "Silence; listening...".into();
                }
            }
            PollEvent::CaptureError(e) => {
                self.state.note_error(format!("Capture failed: {e}"));
            }
            PollEvent::RecognitionError(e) => {
                self.state.note_error(format!("Recognition failed: {e}"));
            }
        }
    }

    /// Start a lyrics fetch for `song`, or queue it when one is already in
    /// flight; the queued identity is picked up when the current fetch
    /// completes.
    fn request_lyrics(&mut self, song: SongId, tx: &mpsc::Sender<Event>) {
        if self.state.lyrics_loading {
            self.state.pending_fetch = Some(song);
            return;
        }
        self.state.lyrics_loading = true;

        let storage = self.storage_handle();
        let lrclib = self.lrclib.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let key = song.cache_key();

            // Cache first.
            if let Ok(Ok(Some(content))) = tokio::task::spawn_blocking({
                let storage = storage.clone();
                let key = key.clone();
                move || storage.get_lyrics(&key)
            })
            .await
            {
                let track = LyricTrack::parse(&content);
                let _ = tx.send(Event::Lyrics {
                    song,
                    track: Some(track),
                })
                .await;
                return;
            }

            // Then LRCLIB. Not-found and errors both degrade to None; the
            // session keeps showing song metadata.
            let track = match lyrics::fetch_lyrics(&lrclib, &song).await {
                Ok(Some(fetched)) => {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_secs() as i64;
                    let _ = tokio::task::spawn_blocking({
                        let storage = storage.clone();
                        let song = song.clone();
                        let raw = fetched.raw.clone();
                        let album = fetched.album.clone();
                        move || {
                            storage.cache_lyrics(
                                &song.cache_key(),
                                &song.artist,
                                &song.title,
                                album.as_deref(),
                                &raw,
                                now,
                            )
                        }
                    })
                    .await;
                    Some(fetched.track)
                }
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!("lyrics fetch failed for {song}: {e:#}");
                    None
                }
            };

            let _ = tx.send(Event::Lyrics { song, track }).await;
        });
    }

    fn handle_lyrics(&mut self, song: SongId, track: Option<LyricTrack>, tx: &mpsc::Sender<Event>) {
        self.state.lyrics_loading = false;

        let had_lyrics = track.is_some();
        if self.state.session.on_lyrics(&song, track) {
            self.state.status = if had_lyrics {
                format!("Lyrics loaded: {song}")
            } else {
                format!("No lyrics found: {song}")
            };
        }

        // A song change arrived while this fetch was running.
        if let Some(pending) = self.state.pending_fetch.take()
            && self
                .state
                .session
                .current_song()
                .is_some_and(|cur| cur.same_song(&pending))
        {
            self.request_lyrics(pending, tx);
        }
    }

    fn storage_handle(&self) -> StorageHandle {
        StorageHandle {
            path: self.cfg.paths.data_dir.join("cache.sqlite3"),
        }
    }
}

fn spawn_tick_task(tx: mpsc::Sender<Event>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(250));
        loop {
            interval.tick().await;
            if tx.send(Event::Tick).await.is_err() {
                break;
            }
        }
    });
}

// rusqlite from async tasks: open per operation under spawn_blocking.
#[derive(Clone)]
struct StorageHandle {
    path: std::path::PathBuf,
}

impl StorageHandle {
    fn open(&self) -> anyhow::Result<Storage> {
        Storage::open(&self.path)
    }

    fn get_lyrics(&self, song_key: &str) -> anyhow::Result<Option<String>> {
        self.open()?.get_lyrics(song_key)
    }

    fn cache_lyrics(
        &self,
        song_key: &str,
        artist: &str,
        title: &str,
        album: Option<&str>,
        content: &str,
        now_unix: i64,
    ) -> anyhow::Result<()> {
        self.open()?
            .cache_lyrics(song_key, artist, title, album, content, now_unix)
    }
}
