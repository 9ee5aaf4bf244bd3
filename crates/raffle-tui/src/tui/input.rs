// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the
// orchestrator, or into local ViewState changes (focus, selection, search,
// editor text).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use raffle_core::animator::DrawDuration;

use super::{ConfirmAction, InputMode, Panel, ViewState};
use crate::protocol::UserCommand;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// orchestrator. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // On Windows crossterm also reports releases.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits, whatever the mode.
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    // The winner dialog sits on top of everything else.
    if view_state.winner.is_some() {
        return handle_winner_dialog(key_event, view_state);
    }

    match view_state.mode {
        InputMode::Adding => handle_adding(key_event, view_state),
        InputMode::Searching => handle_searching(key_event, view_state),
        InputMode::Confirm(action) => handle_confirm(key_event, view_state, action),
        InputMode::Normal => handle_normal(key_event, view_state),
    }
}

fn handle_normal(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('d') | KeyCode::Enter => Some(UserCommand::Draw),

        KeyCode::Char('a') => {
            view_state.mode = InputMode::Adding;
            view_state.add_buffer.clear();
            None
        }

        KeyCode::Char('x') | KeyCode::Delete => {
            if view_state.focus != Panel::Participants {
                return None;
            }
            view_state
                .selected_participant()
                .map(|p| UserCommand::DeleteParticipant(p.id))
        }

        KeyCode::Char('C') => {
            view_state.mode = InputMode::Confirm(ConfirmAction::ClearParticipants);
            None
        }
        KeyCode::Char('W') => {
            view_state.mode = InputMode::Confirm(ConfirmAction::ClearWinners);
            None
        }

        KeyCode::Char('+') | KeyCode::Char('=') => Some(UserCommand::SetDrawDuration(
            DrawDuration::clamped(view_state.draw_duration_secs)
                .increment()
                .secs(),
        )),
        KeyCode::Char('-') => Some(UserCommand::SetDrawDuration(
            DrawDuration::clamped(view_state.draw_duration_secs)
                .decrement()
                .secs(),
        )),

        KeyCode::Char('/') => {
            view_state.mode = InputMode::Searching;
            view_state.focus = Panel::Participants;
            None
        }

        KeyCode::Tab => {
            view_state.focus = match view_state.focus {
                Panel::Participants => Panel::Winners,
                Panel::Winners => Panel::Participants,
            };
            None
        }

        KeyCode::Up | KeyCode::Char('k') => {
            move_selection(view_state, -1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_selection(view_state, 1);
            None
        }

        // Esc clears an applied search.
        KeyCode::Esc => {
            view_state.search.clear();
            view_state.clamp_selection();
            None
        }

        KeyCode::Char('q') => Some(UserCommand::Quit),

        _ => None,
    }
}

/// Enter/Esc dismiss; `d` dismisses and draws again.
fn handle_winner_dialog(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Enter | KeyCode::Esc => {
            view_state.winner = None;
            Some(UserCommand::DismissWinner)
        }
        KeyCode::Char('d') => {
            view_state.winner = None;
            Some(UserCommand::Draw)
        }
        KeyCode::Char('q') => Some(UserCommand::Quit),
        _ => None,
    }
}

/// Multi-line editor: Enter starts a new line, Ctrl+S submits, Esc cancels.
fn handle_adding(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    match key_event.code {
        KeyCode::Char('s') if ctrl => {
            view_state.mode = InputMode::Normal;
            Some(UserCommand::AddNames(std::mem::take(&mut view_state.add_buffer)))
        }
        KeyCode::Esc => {
            view_state.mode = InputMode::Normal;
            view_state.add_buffer.clear();
            None
        }
        KeyCode::Enter => {
            view_state.add_buffer.push('\n');
            None
        }
        KeyCode::Backspace => {
            view_state.add_buffer.pop();
            None
        }
        KeyCode::Char(c) if !ctrl => {
            view_state.add_buffer.push(c);
            None
        }
        _ => None,
    }
}

/// Search box: Enter keeps the filter, Esc clears it.
fn handle_searching(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.mode = InputMode::Normal;
            view_state.search.clear();
        }
        KeyCode::Enter => {
            view_state.mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            view_state.search.pop();
        }
        KeyCode::Char(c) => {
            view_state.search.push(c);
        }
        _ => {}
    }
    view_state.clamp_selection();
    None
}

/// y confirms; n or Esc cancels; everything else is blocked.
fn handle_confirm(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    action: ConfirmAction,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.mode = InputMode::Normal;
            Some(match action {
                ConfirmAction::ClearParticipants => UserCommand::ClearParticipants,
                ConfirmAction::ClearWinners => UserCommand::ClearWinners,
            })
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.mode = InputMode::Normal;
            None
        }
        _ => None,
    }
}

fn move_selection(view_state: &mut ViewState, delta: isize) {
    match view_state.focus {
        Panel::Participants => {
            let len = view_state.visible_participants().len();
            if len == 0 {
                view_state.selected = 0;
                return;
            }
            view_state.selected = view_state
                .selected
                .saturating_add_signed(delta)
                .min(len - 1);
        }
        Panel::Winners => {
            let max = view_state.winners.len().saturating_sub(1);
            view_state.winners_scroll = view_state
                .winners_scroll
                .saturating_add_signed(delta)
                .min(max);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
