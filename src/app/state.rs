use crate::session::Session;
use crate::song::SongId;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Info,
            created_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

pub struct AppState {
    pub should_quit: bool,

    pub session: Session,

    /// At most one in-flight recognition request.
    pub recognizing: bool,
    /// At most one in-flight lyrics fetch; a song change while one is
    /// running queues the newer identity here.
    pub lyrics_loading: bool,
    pub pending_fetch: Option<SongId>,

    pub last_poll: Option<Instant>,
    pub poll_interval_secs: u64,
    pub force_recognize: bool,

    pub compact: bool,
    pub plain_scroll: usize,

    pub toast: Option<Toast>,
    pub status: String,
    /// Last reported error, for log dedup under repeated failures.
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new(session: Session, poll_interval_secs: u64, compact: bool) -> Self {
        Self {
            should_quit: false,
            session,
            recognizing: false,
            lyrics_loading: false,
            pending_fetch: None,
            last_poll: None,
            poll_interval_secs,
            force_recognize: false,
            compact,
            plain_scroll: 0,
            toast: None,
            status: "Listening...".into(),
            last_error: None,
        }
    }

    /// Log an error once; repeats of the same message are only shown in the
    /// status line, not re-logged.
    pub fn note_error(&mut self, message: String) {
        if self.last_error.as_deref() != Some(message.as_str()) {
            tracing::warn!("{message}");
            self.last_error = Some(message.clone());
            self.toast = Some(Toast::error(message.clone()));
        }
        self.status = message;
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Seconds until the next scheduled recognition poll.
    pub fn next_poll_in_secs(&self) -> u64 {
        match self.last_poll {
            None => 0,
            Some(at) => self
                .poll_interval_secs
                .saturating_sub(at.elapsed().as_secs()),
        }
    }
}
