//! Login screen module
//!
//! Shown instead of the dashboard when no session is stored.

use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::prelude::{Color, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

pub const LOGIN_HINT: &str = "You are not logged in.\n\n\
    Run `event-admin login --email <EMAIL>` to sign in, then start the dashboard again.\n\n\
    Press any key to exit";

/// Renders the redirect notice.
pub fn render_login(f: &mut Frame) {
    let block = Block::default()
        .title("Login")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(LOGIN_HINT)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(paragraph, f.area());
}
