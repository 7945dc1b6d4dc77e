//! Dashboard state update logic
//!
//! Applies queued view updates and handles table navigation

use super::state::{DashboardState, Mutation, Tab, ViewUpdate};

use crate::activity::{Activity, Source};
use crate::aggregation::summarize;
use crate::error_classifier::ErrorClassifier;
use crate::export::{self, ExportError};
use crate::fetch::Snapshot;
use crate::models::{Event, Role, Team, User, UserDirectory};
use crate::table::sort_by_role;

use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

impl DashboardState {
    /// Advance one tick and apply every queued update.
    pub fn update(&mut self) {
        self.tick += 1;

        while let Some(update) = self.pending_updates.pop_front() {
            self.process_update(update);
        }
        self.clamp_selection();
    }

    fn process_update(&mut self, update: ViewUpdate) {
        match update {
            ViewUpdate::Snapshot {
                generation,
                snapshot,
            } => {
                // A newer fetch has started since this one; its result wins.
                if !self.is_current(generation) {
                    return;
                }
                self.apply_snapshot(*snapshot);
            }
            ViewUpdate::FetchFailed { generation, error } => {
                if !self.is_current(generation) {
                    return;
                }
                self.mark_failed();
                let level = ErrorClassifier::new().classify_api_error(&error);
                self.add_to_activity_log(Activity::error(
                    Source::Dashboard,
                    format!("Failed to load dashboard: {}", error.user_message()),
                    level,
                ));
            }
            ViewUpdate::Confirmed(mutation) => {
                self.apply_mutation(&mutation);
                // Reconcile with the server in the background.
                self.request_refresh();
            }
            ViewUpdate::Activity(entry) => self.add_to_activity_log(entry),
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let Snapshot {
            events,
            teams,
            mut users,
            summary,
            failed,
        } = snapshot;
        sort_by_role(&mut users);

        for (event_id, error) in &failed {
            let name = events
                .iter()
                .find(|e| &e.id == event_id)
                .map(|e| e.name.as_str())
                .unwrap_or(event_id.as_str());
            let level = ErrorClassifier::new().classify_api_error(error);
            self.add_to_activity_log(Activity::error(
                Source::Teams,
                format!("Teams of {} could not be loaded: {}", name, error.user_message()),
                level,
            ));
        }

        self.add_to_activity_log(Activity::refresh(
            Source::Dashboard,
            format!(
                "Loaded {} events, {} teams, {} users",
                events.len(),
                teams.len(),
                users.len()
            ),
        ));

        self.events = events;
        self.teams = teams;
        self.users = users;
        self.summary = summary;
        self.mark_loaded();
    }

    /// Applies a confirmed change locally and recomputes the totals.
    pub fn apply_mutation(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::TeamVerification {
                team_id,
                is_verified,
            } => {
                if let Some(team) = self.teams.iter_mut().find(|t| &t.id == team_id) {
                    team.is_verified = *is_verified;
                }
                self.recompute_summary();
            }
            Mutation::RoleChanged { user_id, role } => {
                if let Some(user) = self.users.iter_mut().find(|u| &u.id == user_id) {
                    let (is_admin, is_super_admin) = role.flags();
                    user.is_admin = is_admin;
                    user.is_super_admin = is_super_admin;
                }
                sort_by_role(&mut self.users);
            }
        }
    }

    fn recompute_summary(&mut self) {
        let grouped: Vec<(Event, Vec<Team>)> = self
            .events
            .iter()
            .map(|event| {
                let teams = self
                    .teams
                    .iter()
                    .filter(|t| t.event_id.id() == event.id)
                    .cloned()
                    .collect();
                (event.clone(), teams)
            })
            .collect();
        let failed = self.summary.failed_events.clone();
        self.summary = summarize(&grouped, &failed, &self.featured_marker, self.users.len());
    }
}

// Navigation
impl DashboardState {
    pub fn next_tab(&mut self) {
        self.switch_tab(self.tab.next());
    }

    pub fn previous_tab(&mut self) {
        self.switch_tab(self.tab.previous());
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.selected = 0;
        self.search_mode = false;
    }

    /// Rows on the visible page and the page count of the current tab.
    pub fn page_shape(&self) -> (usize, usize) {
        match self.tab {
            Tab::Overview => (0, 1),
            Tab::Teams => {
                let page = self.teams_view.page(&self.teams);
                (page.rows.len(), page.total_pages)
            }
            Tab::Users => {
                let page = self.users_view.page(&self.users);
                (page.rows.len(), page.total_pages)
            }
            Tab::Events => {
                let page = self.events_view.page(&self.events);
                (page.rows.len(), page.total_pages)
            }
        }
    }

    fn clamp_selection(&mut self) {
        let (rows, _) = self.page_shape();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        let (rows, _) = self.page_shape();
        if self.selected + 1 < rows {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        let (_, total_pages) = self.page_shape();
        if let Some(view) = self.current_view_mut() {
            view.next_page(total_pages);
        }
        self.selected = 0;
    }

    pub fn previous_page(&mut self) {
        if let Some(view) = self.current_view_mut() {
            view.prev_page();
        }
        self.selected = 0;
    }

    pub fn push_search_char(&mut self, c: char) {
        if let Some(view) = self.current_view_mut() {
            let query = format!("{}{}", view.query(), c);
            view.set_query(query);
        }
        self.selected = 0;
    }

    pub fn pop_search_char(&mut self) {
        if let Some(view) = self.current_view_mut() {
            let mut query = view.query().to_string();
            query.pop();
            view.set_query(query);
        }
        self.selected = 0;
    }

    /// Steps the category filter: events on the teams tab, roles on the users tab.
    pub fn cycle_category(&mut self) {
        let options: Vec<Option<String>> = match self.tab {
            Tab::Teams => std::iter::once(None)
                .chain(self.events.iter().map(|e| Some(e.id.clone())))
                .collect(),
            Tab::Users => std::iter::once(None)
                .chain(Role::iter().map(|r| Some(r.key().to_string())))
                .collect(),
            Tab::Overview | Tab::Events => return,
        };
        let Some(view) = self.current_view_mut() else {
            return;
        };
        let current = view.category().map(str::to_string);
        let position = options.iter().position(|o| *o == current).unwrap_or(0);
        view.set_category(options[(position + 1) % options.len()].clone());
        self.selected = 0;
    }

    /// Human-readable label of the active category filter.
    pub fn category_label(&self) -> String {
        match (self.tab, self.current_view().and_then(|v| v.category())) {
            (Tab::Teams, Some(id)) => self
                .events
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| id.to_string()),
            (Tab::Users, Some(key)) => key
                .parse::<Role>()
                .map(|r| r.to_string())
                .unwrap_or_else(|_| key.to_string()),
            _ => "All".to_string(),
        }
    }

    pub fn selected_team(&self) -> Option<Team> {
        let page = self.teams_view.page(&self.teams);
        page.rows.get(self.selected).map(|t| (*t).clone())
    }

    pub fn selected_user(&self) -> Option<User> {
        let page = self.users_view.page(&self.users);
        page.rows.get(self.selected).map(|u| (*u).clone())
    }

    /// Exports the filtered rows of the current tab into `dir`.
    pub fn export_current(&self, dir: &Path) -> Result<(PathBuf, usize), ExportError> {
        let directory = UserDirectory::new(&self.users);
        let (path, written) = match self.tab {
            Tab::Teams => {
                let path = dir.join("teams.xlsx");
                let rows = self.teams_view.filter(&self.teams);
                let written = export::export(&rows, &directory, &path, None)?;
                (path, written)
            }
            Tab::Users => {
                let path = dir.join("users_export.xlsx");
                let rows = self.users_view.filter(&self.users);
                let written = export::export(&rows, &directory, &path, None)?;
                (path, written)
            }
            Tab::Events => {
                let path = dir.join("events.csv");
                let rows = self.events_view.filter(&self.events);
                let written = export::export(&rows, &directory, &path, None)?;
                (path, written)
            }
            Tab::Overview => return Err(ExportError::Empty),
        };
        Ok((path, written))
    }
}
