// Participant list: the active pool, newest first, filtered by the search
// box. The selected row is what `x` deletes.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::tui::{InputMode, Panel, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let focused = state.focus == Panel::Participants;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(title(state));

    let visible = state.visible_participants();
    if visible.is_empty() {
        let message = if state.participants.is_empty() {
            "  No participants. Press a to add names."
        } else {
            "  No names match the search."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|p| ListItem::new(Line::from(Span::raw(p.name.clone()))))
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(if focused { Color::Cyan } else { Color::DarkGray })
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    );

    let mut list_state = ListState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn title(state: &ViewState) -> String {
    let total = state.participants.len();
    let searching = state.mode == InputMode::Searching;
    if state.search.is_empty() && !searching {
        return format!(" Participants ({total}) ");
    }
    let cursor = if searching { "_" } else { "" };
    format!(
        " Participants ({}/{total}) /{}{cursor} ",
        state.visible_participants().len(),
        state.search
    )
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use raffle_core::{Participant, ParticipantId};

    use super::*;

    fn state_with(names: &[&str]) -> ViewState {
        let mut state = ViewState::default();
        state.participants = names
            .iter()
            .enumerate()
            .map(|(i, n)| Participant {
                id: ParticipantId(i as i64),
                name: n.to_string(),
                created_at: Utc::now(),
            })
            .collect();
        state
    }

    #[test]
    fn title_counts_participants() {
        let state = state_with(&["Alice", "Bob"]);
        assert_eq!(title(&state), " Participants (2) ");
    }

    #[test]
    fn title_shows_search_progress() {
        let mut state = state_with(&["Alice", "Bob", "Alina"]);
        state.search = "ali".into();
        assert_eq!(title(&state), " Participants (2/3) /ali ");

        state.mode = InputMode::Searching;
        assert_eq!(title(&state), " Participants (2/3) /ali_ ");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(40, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        for state in [state_with(&[]), state_with(&["Alice", "Bob"])] {
            terminal
                .draw(|frame| render(frame, frame.area(), &state))
                .unwrap();
        }
    }
}
