use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEventKind};
use tokio::sync::mpsc;

pub fn spawn_input_task(tx: mpsc::Sender<Event>) {
    tokio::task::spawn_blocking(move || {
        loop {
            if event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                match event::read() {
                    Ok(CtEvent::Key(k)) => {
                        if k.kind == KeyEventKind::Press
                            && tx.blocking_send(Event::Input(InputEvent::Key(k))).is_err()
                        {
                            break;
                        }
                    }
                    Ok(CtEvent::Resize(_, _)) => {
                        if tx.blocking_send(Event::Input(InputEvent::Resize)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(_) => {}
                }
            }
        }
    });
}

pub fn map_input_to_action(ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Key(k) => match k.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),

            // Manual playback correction
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::OffsetUp),
            KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::OffsetDown),

            // Recognize right now
            KeyCode::Char('r') => Some(Action::ForceRecognize),

            // Layout
            KeyCode::Char('c') => Some(Action::ToggleCompact),

            // Plain-lyrics scrolling
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),

            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(map_input_to_action(key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(map_input_to_action(key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(
            map_input_to_action(key(KeyCode::Char('+'))),
            Some(Action::OffsetUp)
        );
        assert_eq!(
            map_input_to_action(key(KeyCode::Char('-'))),
            Some(Action::OffsetDown)
        );
        assert_eq!(
            map_input_to_action(key(KeyCode::Char('r'))),
            Some(Action::ForceRecognize)
        );
        assert_eq!(map_input_to_action(key(KeyCode::Char('x'))), None);
    }
}
