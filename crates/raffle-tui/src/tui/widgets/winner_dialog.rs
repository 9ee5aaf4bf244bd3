// Winner reveal overlay.
//
// Shown on top of everything once a draw settles, until Enter or Esc.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

const MIN_WIDTH: u16 = 30;
const DIALOG_HEIGHT: u16 = 7;

pub fn render(frame: &mut Frame, area: Rect, name: &str) {
    let width = u16::try_from(name.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(8)
        .max(MIN_WIDTH);
    let dialog_area = centered_rect(width, DIALOG_HEIGHT, area);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            " Winner! ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));

    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            name.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" dismiss  "),
            Span::styled("d", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" draw again"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}
