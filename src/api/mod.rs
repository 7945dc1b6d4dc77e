use crate::api::error::ApiError;
use crate::environment::Environment;
use crate::models::{Event, Role, Team, User};
use crate::validation::{EventForm, NewTeamForm};

pub(crate) mod client;
pub use client::ApiClient;
pub mod error;
pub mod schema;

#[cfg(test)]
use mockall::{automock, predicate::*};

/// Token and profile returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: String,
    pub user: User,
}

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AdminApi: Send + Sync {
    fn environment(&self) -> &Environment;

    /// Exchanges credentials for a bearer token and the caller's profile.
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, ApiError>;

    /// Checks that `token` is accepted by a protected route.
    async fn verify_token(&self, token: &str) -> Result<(), ApiError>;

    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    async fn update_user_role(&self, user_id: &str, role: Role) -> Result<(), ApiError>;

    async fn list_events(&self) -> Result<Vec<Event>, ApiError>;

    async fn create_event(&self, form: &EventForm) -> Result<(), ApiError>;

    async fn update_event(&self, slug: &str, form: &EventForm) -> Result<(), ApiError>;

    /// Marks the event as deleted without removing it.
    async fn delete_event(&self, slug: &str) -> Result<(), ApiError>;

    /// Lists the teams registered for one event.
    async fn event_teams(&self, event_id: &str) -> Result<Vec<Team>, ApiError>;

    async fn set_team_verification(
        &self,
        team_id: &str,
        event_id: &str,
        is_verified: bool,
    ) -> Result<(), ApiError>;

    /// Marks the team identified by its join code as verified.
    async fn verify_team(&self, team_code: &str) -> Result<(), ApiError>;

    async fn create_team(&self, form: &NewTeamForm) -> Result<(), ApiError>;

    async fn join_team(&self, user_id: &str, team_code: &str) -> Result<(), ApiError>;
}
