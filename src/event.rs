//! Event Handling
//!
//! Keyboard and event handling for terp.

use crate::app::{App, Mode, Task};
use anyhow::Result;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use std::time::Duration;
use terp::data::Entity;
use terp::form::FormField;

/// Handle events, returns true if app should quit
pub async fn handle_events(app: &mut App) -> Result<bool> {
    if poll(Duration::from_millis(100))? {
        if let Event::Key(key) = read()? {
            return Ok(handle_key_event(app, key.code, key.modifiers));
        }
    }
    Ok(false)
}

pub fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    // Global quit shortcut
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, code, modifiers),
        Mode::Create => handle_create_mode(app, code, modifiers),
        Mode::Help => handle_help_mode(app, code),
        Mode::Confirm => handle_confirm_mode(app, code),
        Mode::Warning => handle_warning_mode(app, code),
        Mode::Describe => handle_describe_mode(app, code, modifiers),
        Mode::Notifications => handle_notifications_mode(app, code),
    }
}

fn handle_normal_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    // Check for double-g (go to top), unless typing into the filter
    if code == KeyCode::Char('g') && !app.filter_active {
        if let Some((KeyCode::Char('g'), time)) = app.last_key_press {
            if time.elapsed() < Duration::from_millis(1000) {
                app.go_to_top();
                app.last_key_press = None;
                return false;
            }
        }
        app.last_key_press = Some((code, std::time::Instant::now()));
        return false;
    }

    // Clear last key press for non-g keys
    app.last_key_press = None;

    // Handle filter input first
    if app.filter_active {
        match code {
            KeyCode::Esc => {
                app.clear_filter();
            },
            KeyCode::Enter => {
                app.filter_active = false;
            },
            KeyCode::Backspace => {
                app.filter_text.pop();
                app.apply_filter();
            },
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.filter_text.push(c);
                app.apply_filter();
            },
            _ => {},
        }
        return false;
    }

    match code {
        // Quit
        KeyCode::Char('q') => return true,

        // Navigation - vim style + accessible alternatives
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Home => app.go_to_top(),
        KeyCode::End | KeyCode::Char('G') => app.go_to_bottom(),
        KeyCode::PageDown => app.page_down(10),
        KeyCode::PageUp => app.page_up(10),

        // Ctrl+D/U for page navigation
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_down(10);
        },
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_up(10);
        },

        // Entity switching
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            if let Some(entity) = Entity::ALL.get(idx) {
                app.switch_entity(*entity);
            }
        },
        KeyCode::Tab => {
            app.switch_entity(app.entity.next());
        },

        // Refresh
        KeyCode::Char('R') => {
            app.schedule(Task::RefreshList);
        },

        // Describe
        KeyCode::Enter | KeyCode::Char('d') => {
            app.enter_describe_mode();
        },

        // New customer
        KeyCode::Char('n') => {
            app.enter_create_mode();
        },

        // Delete
        KeyCode::Delete => {
            app.request_delete();
        },

        // Filter
        KeyCode::Char('/') => {
            app.filter_active = true;
        },

        // Notifications
        KeyCode::Char('N') => {
            app.enter_notifications_mode();
        },

        // Help
        KeyCode::Char('?') => {
            app.enter_help_mode();
        },

        _ => {},
    }

    false
}

fn handle_create_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    // Input is ignored while the create request is in flight
    if app.creating {
        return false;
    }

    match code {
        KeyCode::Esc => {
            app.exit_mode();
        },
        KeyCode::Enter => {
            app.submit_form();
        },
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            app.form.focus_next();
        },
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
            if app.form.focus == FormField::CustomerType =>
        {
            app.form.toggle_type();
        },
        KeyCode::Backspace => {
            app.form.pop_char();
        },
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.form.push_char(c);
        },
        _ => {},
    }
    false
}

fn handle_help_mode(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
            app.exit_mode();
        },
        _ => {},
    }
    false
}

fn handle_confirm_mode(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            app.exit_mode();
        },
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(ref mut pending) = app.pending_delete {
                pending.selected_yes = true;
            }
        },
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(ref mut pending) = app.pending_delete {
                pending.selected_yes = false;
            }
        },
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.confirm_delete();
        },
        KeyCode::Enter => {
            let confirmed = app.pending_delete.as_ref().is_some_and(|p| p.selected_yes);
            if confirmed {
                app.confirm_delete();
            } else {
                app.exit_mode();
            }
        },
        _ => {},
    }
    false
}

fn handle_warning_mode(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Enter => {
            app.dismiss_warning();
        },
        _ => {},
    }
    false
}

fn handle_describe_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => {
            app.exit_mode();
        },
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::PageDown => {
            for _ in 0..10 {
                app.next();
            }
        },
        KeyCode::PageUp => {
            app.describe_scroll = app.describe_scroll.saturating_sub(10);
        },
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..10 {
                app.next();
            }
        },
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.describe_scroll = app.describe_scroll.saturating_sub(10);
        },
        KeyCode::Char('g') | KeyCode::Home => app.go_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.go_to_bottom(),
        KeyCode::Char('R') => app.refresh_describe(),
        _ => {},
    }
    false
}

fn handle_notifications_mode(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('N') => {
            app.exit_mode();
        },
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Char('c') => {
            app.notification_manager.clear();
            app.notifications_selected = 0;
        },
        _ => {},
    }
    false
}
