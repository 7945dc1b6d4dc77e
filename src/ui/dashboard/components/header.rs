//! Dashboard header component
//!
//! Renders the title line and the tab bar

use super::super::state::{DashboardState, Tab};
use super::super::utils::format_elapsed;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use strum::IntoEnumIterator;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn title_text(state: &DashboardState) -> String {
    let status = if state.is_loading() {
        format!("{} loading", SPINNER[state.tick % SPINNER.len()])
    } else if let Some(at) = state.last_refresh() {
        format!("updated {} ago", format_elapsed(at.elapsed().as_secs()))
    } else {
        "not loaded".to_string()
    };
    format!(
        "EVENT ADMIN v{} | {} ({}) | {} | {}",
        env!("CARGO_PKG_VERSION"),
        state.user.name,
        state.user.role(),
        state.environment.api_url(),
        status
    )
}

/// Render header with title and tab bar.
pub fn render_header(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let header_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let title = Paragraph::new(title_text(state))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_type(BorderType::Thick),
        );
    f.render_widget(title, header_chunks[0]);

    let titles: Vec<Line> = Tab::iter()
        .map(|tab| Line::from(format!(" {} ", tab)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(tabs, header_chunks[1]);
}
