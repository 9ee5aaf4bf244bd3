// Status bar (top) and help bar (bottom).
//
// The status bar shows pool size, winner count and draw duration, with the
// current notice on the right. The help bar lists the keys for the current
// mode.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::NoticeKind;
use crate::tui::{InputMode, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let summary = Paragraph::new(Line::from(Span::styled(
        summary_text(state),
        Style::default().fg(Color::White),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(summary, left);

    let notice = match state.current_notice() {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Info => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            Line::from(Span::styled(
                format!("{} ", notice.text),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .right_aligned()
        }
        None => Line::default(),
    };
    frame.render_widget(
        Paragraph::new(notice).style(Style::default().bg(Color::DarkGray)),
        right,
    );
}

pub fn summary_text(state: &ViewState) -> String {
    format!(
        " {} remaining | {} drawn | Draw: {}s",
        state.participants.len(),
        state.winners.len(),
        state.draw_duration_secs
    )
}

pub fn render_help(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn help_text(state: &ViewState) -> &'static str {
    if state.winner.is_some() {
        return " Enter/Esc:Dismiss | d:Draw again | q:Quit";
    }
    match state.mode {
        InputMode::Normal => {
            " d:Draw | a:Add | x:Delete | /:Search | +/-:Duration | Tab:Panel | C:Clear pool | W:Clear winners | q:Quit"
        }
        InputMode::Adding => " Enter:New line | Ctrl+S:Add | Esc:Cancel",
        InputMode::Searching => " Type to filter | Enter:Keep | Esc:Clear",
        InputMode::Confirm(_) => " y:Confirm | n/Esc:Cancel",
    }
}
