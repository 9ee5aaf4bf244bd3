// Display panel: the name currently shown, or the placeholder.
//
// Yellow while a draw is shuffling, green once a winner is revealed.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (title, border) = if state.drawing {
        (" Drawing... ", Color::Yellow)
    } else if state.winner.is_some() {
        (" Winner ", Color::Green)
    } else {
        (" Raffle ", Color::Cyan)
    };

    let text = match &state.display {
        Some(name) => Line::from(Span::styled(name.clone(), name_style(state))),
        None => Line::from(Span::styled(
            state.placeholder.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    };

    // Center the single line vertically inside the borders.
    let inner_height = area.height.saturating_sub(2);
    let padding = usize::from(inner_height.saturating_sub(1) / 2);
    let mut lines = vec![Line::default(); padding];
    lines.push(text);

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    );
    frame.render_widget(paragraph, area);
}

fn name_style(state: &ViewState) -> Style {
    let color = if state.drawing {
        Color::Yellow
    } else if state.winner.is_some() {
        Color::Green
    } else {
        Color::White
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
