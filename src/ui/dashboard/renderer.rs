//! Dashboard main renderer

use super::components::{cards, footer, header, logs, revenue, tables};
use super::state::{DashboardState, Tab};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Color, Style};
use ratatui::widgets::Block;

pub fn render_dashboard(f: &mut Frame, state: &DashboardState) {
    if state.with_background_color {
        f.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(16, 20, 24))),
            f.area(),
        );
    }

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Percentage(25),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(f.area());

    header::render_header(f, main_chunks[0], state);

    match state.tab {
        Tab::Overview => {
            let overview = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Fill(1)])
                .split(main_chunks[1]);
            cards::render_cards(f, overview[0], state);
            revenue::render_revenue_panel(f, overview[1], state);
        }
        Tab::Teams | Tab::Users | Tab::Events => {
            tables::render_table_panel(f, main_chunks[1], state);
        }
    }

    logs::render_logs_panel(f, main_chunks[2], state);
    footer::render_footer(f, main_chunks[3], state);
}
