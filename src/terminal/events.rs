use crossterm::event::{KeyCode, KeyEvent};

use crate::domain::filter::Filter;
use crate::terminal::state::{AppState, Focus, ViewMode};
use crate::terminal::worker::Dispatch;

/// Returns `true` when the app should quit.
pub fn handle_key(key: KeyEvent, state: &mut AppState, jobs: &dyn Dispatch) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,

        KeyCode::Esc => {
            if state.mode == ViewMode::Split {
                state.close_email();
                return false;
            }
            return true;
        }

        KeyCode::Enter => {
            state.open_selected(jobs);
            return false;
        }

        KeyCode::Tab => {
            state.toggle_focus();
            return false;
        }

        KeyCode::Char('f') => {
            state.toggle_favorite();
            return false;
        }

        KeyCode::Char('r') => {
            state.retry(jobs);
            return false;
        }

        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            state.set_filter(Filter::ALL[idx], jobs);
            return false;
        }

        KeyCode::Left | KeyCode::Char('h') => {
            state.set_filter(state.filter.prev(), jobs);
            return false;
        }

        KeyCode::Right | KeyCode::Char('l') => {
            state.set_filter(state.filter.next(), jobs);
            return false;
        }

        _ => {}
    }

    match state.focus {
        Focus::List => handle_list_keys(key, state, jobs),
        Focus::Body => handle_body_keys(key, state),
    }
    false
}

fn handle_list_keys(key: KeyEvent, state: &mut AppState, jobs: &dyn Dispatch) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.move_selection(1, jobs),
        KeyCode::Up | KeyCode::Char('k') => state.move_selection(-1, jobs),
        KeyCode::PageDown => state.move_selection(5, jobs),
        KeyCode::PageUp => state.move_selection(-5, jobs),
        KeyCode::Home => state.select_first(),
        KeyCode::End => state.select_last(jobs),
        _ => {}
    }
}

fn handle_body_keys(key: KeyEvent, state: &mut AppState) {
    if state.mode != ViewMode::Split {
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.scroll_body(1),
        KeyCode::Up | KeyCode::Char('k') => state.scroll_body(-1),
        KeyCode::PageDown => state.scroll_body(10),
        KeyCode::PageUp => state.scroll_body(-10),
        KeyCode::Home => state.body_scroll = 0,
        _ => {}
    }
}
