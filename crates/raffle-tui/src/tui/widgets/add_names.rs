// Add-names editor overlay: one name per line, submitted as a block.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::centered_rect;
use crate::tui::ViewState;

const DIALOG_WIDTH: u16 = 50;
const DIALOG_HEIGHT: u16 = 16;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Add names (one per line) ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" Ctrl+S add | Esc cancel ").style(Style::default().fg(Color::DarkGray)));

    let mut lines: Vec<Line> = state
        .add_buffer
        .split('\n')
        .map(|line| Line::from(line.to_string()))
        .collect();
    if let Some(last) = lines.last_mut() {
        last.push_span(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }

    // Keep the cursor line in view.
    let inner_rows = usize::from(dialog_area.height.saturating_sub(2));
    let scroll = lines.len().saturating_sub(inner_rows);
    let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_shows_buffer_lines() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.add_buffer = "Alice\nBob".into();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Alice"));
        assert!(screen.contains("Bob_"));
    }

    #[test]
    fn long_buffer_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(40, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.add_buffer = (0..100).map(|i| format!("Name {i}")).collect::<Vec<_>>().join("\n");
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
