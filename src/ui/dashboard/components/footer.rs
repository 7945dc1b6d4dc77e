//! Dashboard footer component
//!
//! Renders the key bindings of the current tab

use super::super::state::{DashboardState, Tab};
use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub fn footer_text(state: &DashboardState) -> String {
    if state.search_mode {
        return "Type to search | [Enter/Esc] Done | [Backspace] Delete".to_string();
    }
    let keys = match state.tab {
        Tab::Overview => "[Tab] Switch | [R] Refresh | [Q] Quit",
        Tab::Teams => {
            "[Tab] Switch | [/] Search | [F] Event | [←/→] Page | [V] Toggle verified | [X] Export | [R] Refresh | [Q] Quit"
        }
        Tab::Users => {
            "[Tab] Switch | [/] Search | [F] Role | [←/→] Page | [C] Change role | [X] Export | [R] Refresh | [Q] Quit"
        }
        Tab::Events => "[Tab] Switch | [/] Search | [←/→] Page | [X] Export | [R] Refresh | [Q] Quit",
    };
    keys.to_string()
}

/// Render footer.
pub fn render_footer(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let footer = Paragraph::new(footer_text(state))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_type(BorderType::Thick),
        );
    f.render_widget(footer, area);
}
