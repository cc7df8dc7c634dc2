//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match app.state {
        AppState::AddingUser | AppState::EditingUser(_) => {
            handle_form_input(app, key);
            false
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            false
        }
        AppState::ConfirmingDelete(_) => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            false
        }
        AppState::ConfirmingQuit => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                true
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
                false
            }
            _ => false,
        },
        AppState::Quitting => true,
        AppState::Normal => {
            handle_normal_input(app, key);
            false
        }
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_form(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(1),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(1),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Esc => app.status_message = None,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.form.focus = app.form.focus.toggle();
        }
        KeyCode::Backspace => app.form.pop_char(),
        KeyCode::Char(c) => app.form.push_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use userdir_core::Config;

    use crate::app::FormField;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let config = Config {
            base_url: Some("http://127.0.0.1:9/users".to_string()),
            ..Default::default()
        };
        App::new(config).expect("Failed to build test app")
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let mut app = test_app();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.state, AppState::ConfirmingQuit);

        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))));
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q')));
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::ShowingHelp);
        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_form_keys_edit_fields() {
        let mut app = test_app();
        app.state = AppState::AddingUser;

        for c in "Bo".chars() {
            handle_input(&mut app, key(KeyCode::Char(c)));
        }
        handle_input(&mut app, key(KeyCode::Tab));
        assert_eq!(app.form.focus, FormField::Email);
        for c in "b@x".chars() {
            handle_input(&mut app, key(KeyCode::Char(c)));
        }
        handle_input(&mut app, key(KeyCode::Backspace));

        assert_eq!(app.form.name, "Bo");
        assert_eq!(app.form.email, "b@");

        // 'q' is text inside a form, not quit
        handle_input(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.state, AppState::AddingUser);

        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Normal);
        assert!(app.form.name.is_empty());
    }
}
