// Winner history: every past draw, most recent first.
//
// Each row: "{n}. {name}  {drawn_at local time}"

use chrono::Local;
use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use ratatui::Frame;

use raffle_core::Winner;

use crate::tui::{Panel, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let border = if state.focus == Panel::Winners {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" Winners ({}) ", state.winners.len()));

    if state.winners.is_empty() {
        let paragraph = Paragraph::new("  No winners yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    // Subtract 2 for borders
    let visible_rows = usize::from(area.height).saturating_sub(2);
    let total = state.winners.len();
    let scroll_offset = state.winners_scroll.min(total.saturating_sub(visible_rows));

    let items: Vec<ListItem> = state
        .winners
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_rows.max(1))
        .map(|(i, w)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>3}. ", total - i), Style::default().fg(Color::DarkGray)),
                Span::styled(w.name.clone(), Style::default().fg(Color::Green)),
                Span::styled(
                    format!("  {}", format_drawn_at(w)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);

    if total > visible_rows {
        let mut scrollbar_state =
            ScrollbarState::new(total.saturating_sub(visible_rows)).position(scroll_offset);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

/// Draw time in the local timezone.
pub fn format_drawn_at(winner: &Winner) -> String {
    winner
        .drawn_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
