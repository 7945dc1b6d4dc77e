//! Main application state and UI loop
//!
//! Contains the App struct and main UI event handling logic

use crate::activity::{Activity, Source};
use crate::api::AdminApi;
use crate::consts::cli_consts::{EVENT_QUEUE_SIZE, REFRESH_INTERVAL_SECS};
use crate::error_classifier::LogLevel;
use crate::session::{AuthGuard, GuardState, Session};
use crate::ui::dashboard::state::{Tab, ViewUpdate};
use crate::ui::dashboard::{DashboardState, render_dashboard};
use crate::ui::login::render_login;
use crate::ui::splash::render_splash;
use crate::ui::tasks::{TaskContext, spawn_change_role, spawn_refresh, spawn_toggle_verification};
use crossterm::event::{self, Event, KeyCode};
use ratatui::{Frame, Terminal, backend::Backend};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};

/// UI configuration data grouped by concern
#[derive(Debug, Clone)]
pub struct UIConfig {
    pub with_background_color: bool,
    /// Rows per table page.
    pub page_size: usize,
    /// Substring marking the featured event.
    pub featured_marker: String,
}

impl UIConfig {
    pub fn new(with_background_color: bool, page_size: usize, featured_marker: String) -> Self {
        Self {
            with_background_color,
            page_size,
            featured_marker,
        }
    }
}

/// The different screens in the application.
#[derive(Debug)]
pub enum Screen {
    /// Splash screen shown at the start of the application.
    Splash,
    /// Shown when there is no usable session.
    Login,
    /// Dashboard of the signed-in administrator.
    Dashboard(Box<DashboardState>),
}

/// What the loop should do after a key press.
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Quit,
}

/// Application state
pub struct App {
    /// The start time of the application, used for computing uptime.
    start_time: Instant,

    /// Session loaded from the config file, if any.
    session: Option<Session>,

    /// Decides between the dashboard and the login screen.
    guard: AuthGuard,

    api: Arc<dyn AdminApi>,

    /// The current screen being displayed in the application.
    current_screen: Screen,

    /// Receives updates from background tasks.
    update_receiver: mpsc::Receiver<ViewUpdate>,

    tasks: TaskContext,

    /// Directory exports are written to.
    export_dir: PathBuf,

    ui_config: UIConfig,
}

impl App {
    /// Creates a new instance of the application.
    pub fn new(
        api: Arc<dyn AdminApi>,
        session: Option<Session>,
        shutdown_sender: broadcast::Sender<()>,
        export_dir: PathBuf,
        ui_config: UIConfig,
    ) -> Self {
        let (sender, update_receiver) = mpsc::channel(EVENT_QUEUE_SIZE);
        Self {
            start_time: Instant::now(),
            session,
            guard: AuthGuard::new(),
            tasks: TaskContext::new(api.clone(), sender, shutdown_sender),
            api,
            current_screen: Screen::Splash,
            update_receiver,
            export_dir,
            ui_config,
        }
    }

    /// Leaves the splash screen for whatever the guard allows.
    fn leave_splash(&mut self) {
        self.current_screen = match (self.guard.check(self.session.as_ref()), &self.session) {
            (GuardState::Authorized, Some(session)) => {
                let mut state = DashboardState::new(
                    self.api.environment().clone(),
                    session.user.clone(),
                    self.start_time,
                    &self.ui_config,
                );
                state.add_to_activity_log(Activity::success(
                    Source::Session,
                    format!("Signed in as {}", session.user.email),
                ));
                Screen::Dashboard(Box::new(state))
            }
            _ => Screen::Login,
        };
    }

    /// Starts a refresh when one was asked for or the current data is old.
    fn maybe_refresh(&mut self) {
        let Screen::Dashboard(state) = &mut self.current_screen else {
            return;
        };
        let stale = state.last_refresh().is_some_and(|at| {
            at.elapsed() >= Duration::from_secs(REFRESH_INTERVAL_SECS)
        });
        if state.wants_refresh() || (stale && !state.is_loading()) {
            let ticket = state.begin_refresh();
            spawn_refresh(
                self.api.clone(),
                state.featured_marker.clone(),
                ticket,
                self.tasks.sender.clone(),
            );
        }
    }

    fn handle_dashboard_key(&mut self, code: KeyCode) -> KeyOutcome {
        let Screen::Dashboard(state) = &mut self.current_screen else {
            return KeyOutcome::Continue;
        };

        if state.search_mode {
            match code {
                KeyCode::Enter | KeyCode::Esc => state.search_mode = false,
                KeyCode::Backspace => state.pop_search_char(),
                KeyCode::Char(c) => state.push_search_char(c),
                _ => {}
            }
            return KeyOutcome::Continue;
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') => {
                state.close();
                return KeyOutcome::Quit;
            }
            KeyCode::Tab => state.next_tab(),
            KeyCode::BackTab => state.previous_tab(),
            KeyCode::Char('/') if state.tab != Tab::Overview => state.search_mode = true,
            KeyCode::Right => state.next_page(),
            KeyCode::Left => state.previous_page(),
            KeyCode::Down => state.select_next(),
            KeyCode::Up => state.select_previous(),
            KeyCode::Char('f') => state.cycle_category(),
            KeyCode::Char('r') => state.request_refresh(),
            KeyCode::Char('v') if state.tab == Tab::Teams => {
                if let Some(team) = state.selected_team() {
                    spawn_toggle_verification(&self.tasks, team);
                }
            }
            KeyCode::Char('c') if state.tab == Tab::Users => {
                let allowed = self.session.as_ref().map(Session::require_super_admin);
                match (allowed, state.selected_user()) {
                    (Some(Ok(())), Some(user)) => {
                        spawn_change_role(&self.tasks, user);
                    }
                    (Some(Err(e)), _) => state.add_to_activity_log(Activity::error(
                        Source::Users,
                        e.to_string(),
                        LogLevel::Warn,
                    )),
                    _ => {}
                }
            }
            KeyCode::Char('x') => match state.export_current(&self.export_dir) {
                Ok((path, written)) => state.add_to_activity_log(Activity::success(
                    Source::Export,
                    format!("Exported {} rows to {}", written, path.display()),
                )),
                Err(e) => state.add_to_activity_log(Activity::error(
                    Source::Export,
                    e.to_string(),
                    LogLevel::Warn,
                )),
            },
            _ => {}
        }
        KeyOutcome::Continue
    }
}

/// Runs the application UI in a loop, handling events and rendering the appropriate screen.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    let splash_start = Instant::now();
    let splash_duration = Duration::from_secs(2);

    // UI event loop
    loop {
        // Queue all incoming updates for processing
        while let Ok(update) = app.update_receiver.try_recv() {
            if let Screen::Dashboard(state) = &mut app.current_screen {
                state.add_update(update);
            }
        }

        if let Screen::Dashboard(state) = &mut app.current_screen {
            state.update();
        }
        app.maybe_refresh();
        terminal.draw(|f| render(f, &app.current_screen))?;

        // Handle splash transition
        if let Screen::Splash = app.current_screen {
            if splash_start.elapsed() >= splash_duration {
                app.leave_splash();
                continue;
            }
        }

        // Poll for key events
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Skip events that are not KeyEventKind::Press
                if key.kind == event::KeyEventKind::Release {
                    continue;
                }

                match &app.current_screen {
                    Screen::Splash => {
                        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                            break;
                        }
                        // Any other key skips the splash screen
                        app.leave_splash();
                    }
                    Screen::Login => break,
                    Screen::Dashboard(_) => {
                        if app.handle_dashboard_key(key.code) == KeyOutcome::Quit {
                            break;
                        }
                    }
                }
            }
        }
    }

    // Stop background tasks
    let _ = app.tasks.shutdown_sender.send(());
    Ok(())
}

/// Renders the current screen based on the application state.
fn render(f: &mut Frame, screen: &Screen) {
    match screen {
        Screen::Splash => render_splash(f),
        Screen::Login => render_login(f),
        Screen::Dashboard(state) => render_dashboard(f, state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockAdminApi;
    use crate::environment::Environment;
    use crate::models::User;

    fn app(session: Option<Session>) -> App {
        let mut api = MockAdminApi::new();
        api.expect_environment().return_const(Environment::Local);
        let (shutdown_sender, _) = broadcast::channel(1);
        App::new(
            Arc::new(api),
            session,
            shutdown_sender,
            std::env::temp_dir(),
            UIConfig::new(false, 10, "entertainment eve".to_string()),
        )
    }

    fn admin(super_admin: bool) -> Session {
        Session {
            token: "tok".into(),
            user: User {
                id: "me".into(),
                email: "admin@example.com".into(),
                is_admin: true,
                is_super_admin: super_admin,
                ..Default::default()
            },
        }
    }

    #[test]
    fn splash_without_session_goes_to_login() {
        let mut app = app(None);
        app.leave_splash();
        assert!(matches!(app.current_screen, Screen::Login));
    }

    #[test]
    fn splash_with_session_opens_dashboard() {
        let mut app = app(Some(admin(false)));
        app.leave_splash();
        match &app.current_screen {
            Screen::Dashboard(state) => {
                assert!(state.wants_refresh());
                assert_eq!(state.activity_logs.len(), 1);
            }
            other => panic!("unexpected screen: {:?}", other),
        }
    }

    #[test]
    fn search_mode_captures_keys() {
        let mut app = app(Some(admin(false)));
        app.leave_splash();
        app.handle_dashboard_key(KeyCode::Tab);
        app.handle_dashboard_key(KeyCode::Char('/'));
        // 'q' is typed into the search box, not treated as quit
        assert_eq!(app.handle_dashboard_key(KeyCode::Char('q')), KeyOutcome::Continue);
        app.handle_dashboard_key(KeyCode::Enter);
        let Screen::Dashboard(state) = &app.current_screen else {
            panic!("dashboard expected");
        };
        assert_eq!(state.tab, Tab::Teams);
        assert_eq!(state.teams_view.query(), "q");
        assert!(!state.search_mode);
    }

    #[test]
    fn role_change_requires_super_admin() {
        let mut app = app(Some(admin(false)));
        app.leave_splash();
        if let Screen::Dashboard(state) = &mut app.current_screen {
            state.users = vec![User {
                id: "u1".into(),
                ..Default::default()
            }];
            state.switch_tab(Tab::Users);
        }
        app.handle_dashboard_key(KeyCode::Char('c'));
        let Screen::Dashboard(state) = &app.current_screen else {
            panic!("dashboard expected");
        };
        let last = state.activity_logs.back().unwrap();
        assert_eq!(last.msg, "Only Super Admins can change roles!");
    }

    #[test]
    fn quit_closes_dashboard() {
        let mut app = app(Some(admin(true)));
        app.leave_splash();
        assert_eq!(app.handle_dashboard_key(KeyCode::Char('q')), KeyOutcome::Quit);
    }
}
