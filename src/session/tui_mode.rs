//! TUI mode execution

use super::{
    Session,
    messages::{print_session_exit_success, print_session_shutdown, print_session_starting},
};
use crate::api::AdminApi;
use crate::ui::{self, UIConfig};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::sync::Arc;
use std::{error::Error, io};
use tokio::sync::broadcast;

/// Runs the dashboard in the terminal UI
///
/// Sets the terminal up, runs the UI loop until the user quits, then restores
/// the terminal. Without a session the UI shows its login screen.
pub async fn run_tui_mode(
    session: Option<Session>,
    api: Arc<dyn AdminApi>,
    ui_config: UIConfig,
) -> Result<(), Box<dyn Error>> {
    if let Some(session) = &session {
        print_session_starting("TUI", &session.user.name);
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (shutdown_sender, _) = broadcast::channel(1);
    let app = ui::App::new(
        api,
        session,
        shutdown_sender,
        std::env::current_dir()?,
        ui_config,
    );

    let result = ui::run(&mut terminal, app).await;

    // Clean up the terminal after running the application
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;

    print_session_shutdown();
    print_session_exit_success();

    Ok(())
}
