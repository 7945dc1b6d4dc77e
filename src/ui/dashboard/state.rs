//! Dashboard state management
//!
//! Contains the dashboard state struct, its tabs, and the updates views receive

use crate::activity::Activity;
use crate::aggregation::DashboardSummary;
use crate::api::error::ApiError;
use crate::consts::cli_consts::MAX_ACTIVITY_LOGS;
use crate::environment::Environment;
use crate::fetch::{Snapshot, ViewLifetime, ViewTicket};
use crate::models::{Event, Role, Team, User};
use crate::table::TableView;
use crate::ui::app::UIConfig;

use std::collections::VecDeque;
use std::time::Instant;

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum Tab {
    Overview,
    Teams,
    Users,
    Events,
}

impl Tab {
    pub fn index(self) -> usize {
        match self {
            Tab::Overview => 0,
            Tab::Teams => 1,
            Tab::Users => 2,
            Tab::Events => 3,
        }
    }

    pub fn next(self) -> Tab {
        match self {
            Tab::Overview => Tab::Teams,
            Tab::Teams => Tab::Users,
            Tab::Users => Tab::Events,
            Tab::Events => Tab::Overview,
        }
    }

    pub fn previous(self) -> Tab {
        match self {
            Tab::Overview => Tab::Events,
            Tab::Teams => Tab::Overview,
            Tab::Users => Tab::Teams,
            Tab::Events => Tab::Users,
        }
    }
}

/// A change the server has confirmed, applied to local state before the re-fetch lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    TeamVerification { team_id: String, is_verified: bool },
    RoleChanged { user_id: String, role: Role },
}

/// Messages delivered to the dashboard from background tasks.
#[derive(Debug)]
pub enum ViewUpdate {
    /// Fresh data for the fetch started with `generation`.
    Snapshot {
        generation: u64,
        snapshot: Box<Snapshot>,
    },
    /// The fetch started with `generation` failed as a whole.
    FetchFailed { generation: u64, error: ApiError },
    Confirmed(Mutation),
    Activity(Activity),
}

/// State of the authorized dashboard.
#[derive(Debug)]
pub struct DashboardState {
    /// The environment in which the application is running.
    pub environment: Environment,
    /// The signed-in administrator.
    pub user: User,
    pub start_time: Instant,
    pub with_background_color: bool,
    pub featured_marker: String,

    pub tab: Tab,
    pub summary: DashboardSummary,
    pub events: Vec<Event>,
    pub teams: Vec<Team>,
    /// Users, super-admins first.
    pub users: Vec<User>,

    pub teams_view: TableView,
    pub users_view: TableView,
    pub events_view: TableView,
    /// Highlighted row within the visible page.
    pub selected: usize,
    /// Keystrokes go to the search box of the current tab.
    pub search_mode: bool,

    /// Queue of updates waiting to be applied
    pub pending_updates: VecDeque<ViewUpdate>,
    /// Activity logs for display
    pub activity_logs: VecDeque<Activity>,
    /// Animation tick counter
    pub tick: usize,

    lifetime: ViewLifetime,
    loading: bool,
    refresh_requested: bool,
    last_refresh: Option<Instant>,
}

impl DashboardState {
    pub fn new(environment: Environment, user: User, start_time: Instant, ui_config: &UIConfig) -> Self {
        Self {
            environment,
            user,
            start_time,
            with_background_color: ui_config.with_background_color,
            featured_marker: ui_config.featured_marker.clone(),
            tab: Tab::Overview,
            summary: DashboardSummary::default(),
            events: Vec::new(),
            teams: Vec::new(),
            users: Vec::new(),
            teams_view: TableView::new(ui_config.page_size),
            users_view: TableView::new(ui_config.page_size),
            events_view: TableView::new(ui_config.page_size),
            selected: 0,
            search_mode: false,
            pending_updates: VecDeque::new(),
            activity_logs: VecDeque::new(),
            tick: 0,
            lifetime: ViewLifetime::new(),
            loading: false,
            refresh_requested: true,
            last_refresh: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    /// Starts a new fetch generation, cancelling the one in flight.
    pub fn begin_refresh(&mut self) -> ViewTicket {
        self.loading = true;
        self.refresh_requested = false;
        self.lifetime.begin()
    }

    /// Whether a refresh should be started on this tick.
    pub fn wants_refresh(&self) -> bool {
        self.refresh_requested
    }

    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.lifetime.is_current(generation)
    }

    /// Cancels in-flight fetches. Called when the dashboard is left.
    pub fn close(&mut self) {
        self.lifetime.end();
        self.loading = false;
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.loading = false;
        self.last_refresh = Some(Instant::now());
    }

    pub(crate) fn mark_failed(&mut self) {
        self.loading = false;
    }

    /// Add an entry to activity logs with size limit
    pub fn add_to_activity_log(&mut self, entry: Activity) {
        if self.activity_logs.len() >= MAX_ACTIVITY_LOGS {
            self.activity_logs.pop_front();
        }
        self.activity_logs.push_back(entry);
    }

    /// Add an update to the processing queue
    pub fn add_update(&mut self, update: ViewUpdate) {
        self.pending_updates.push_back(update);
    }

    /// The table view of the current tab, if it has one.
    pub fn current_view(&self) -> Option<&TableView> {
        match self.tab {
            Tab::Overview => None,
            Tab::Teams => Some(&self.teams_view),
            Tab::Users => Some(&self.users_view),
            Tab::Events => Some(&self.events_view),
        }
    }

    pub fn current_view_mut(&mut self) -> Option<&mut TableView> {
        match self.tab {
            Tab::Overview => None,
            Tab::Teams => Some(&mut self.teams_view),
            Tab::Users => Some(&mut self.users_view),
            Tab::Events => Some(&mut self.events_view),
        }
    }
}
