//! Dashboard stat cards
//!
//! One card per headline figure of the overview

use super::super::state::DashboardState;
use super::super::utils::format_rupees;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

/// Title, value and accent colour of each card, left to right.
pub fn card_values(state: &DashboardState) -> [(&'static str, String, Color); 4] {
    let summary = &state.summary;
    [
        ("Total Events", summary.total_events.to_string(), Color::LightBlue),
        ("Verified Teams", summary.total_teams.to_string(), Color::LightYellow),
        ("Total Users", summary.total_users.to_string(), Color::LightMagenta),
        ("Total Revenue", format_rupees(summary.total_revenue), Color::LightGreen),
    ]
}

pub fn render_cards(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (chunk, (title, value, color)) in chunks.iter().zip(card_values(state)) {
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        );
        f.render_widget(card, *chunk);
    }
}
