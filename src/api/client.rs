//! Event platform API client
//!
//! A JSON client for the event platform backend. Every request carries the
//! session's bearer token when one is present.

use crate::api::error::ApiError;
use crate::api::schema::{
    Envelope, EventTeamsRequest, EventsData, JoinTeamRequest, LoginData, LoginRequest,
    RoleUpdateRequest, SoftDeleteRequest, TeamsData, UpdateVerificationRequest, UsersData,
};
use crate::api::{AdminApi, LoginGrant};
use crate::consts::cli_consts::network;
use crate::environment::Environment;
use crate::models::{Event, Role, Team, User};
use crate::session::Session;
use crate::validation::{EventForm, NewTeamForm};
use log::debug;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

// Build timestamp in milliseconds since epoch
const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP", "Build timestamp not available");

// User-Agent string with CLI version
const USER_AGENT: &str = concat!("event-admin/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    environment: Environment,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(environment: Environment) -> Result<Self, ApiError> {
        Ok(Self {
            client: ClientBuilder::new()
                .connect_timeout(network::connect_timeout())
                .timeout(network::request_timeout())
                .build()?,
            environment,
            token: None,
        })
    }

    /// Attaches the session's bearer token to every subsequent request.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.token = Some(session.token.clone());
        self
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, endpoint: &str, token: Option<&str>) -> RequestBuilder {
        let url = self.build_url(endpoint);
        debug!("{} {}", method, url);
        let builder = self
            .client
            .request(method, &url)
            .header("User-Agent", USER_AGENT)
            .header("X-Build-Timestamp", BUILD_TIMESTAMP);
        match token.or(self.token.as_deref()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    /// Sends the request and unwraps the `{success, message, data}` envelope.
    async fn execute<T: DeserializeOwned>(
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request.send().await?;
        let response = Self::handle_response_status(response).await?;
        let bytes = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        if envelope.success == Some(false) {
            return Err(ApiError::Rejected {
                message: envelope.message.unwrap_or_default(),
            });
        }
        Ok(envelope)
    }

    async fn get_data<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let envelope = Self::execute(self.request(Method::GET, endpoint, None)).await?;
        envelope.data.ok_or_else(|| ApiError::MissingData {
            endpoint: endpoint.to_string(),
        })
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<Envelope<T>, ApiError> {
        Self::execute(self.request(method, endpoint, None).json(body)).await
    }

    async fn send_no_response<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send_json::<B, serde_json::Value>(method, endpoint, body)
            .await?;
        Ok(())
    }
}

/// Unwraps a team listing, failing unless every team of the event came through.
fn teams_of_event(envelope: Envelope<TeamsData>) -> Result<Vec<Team>, ApiError> {
    let endpoint = "event/teams";
    let teams = envelope
        .data
        .and_then(|d| d.teams)
        .ok_or_else(|| ApiError::MissingData {
            endpoint: endpoint.to_string(),
        })?;
    if teams.malformed {
        return Err(ApiError::MissingData {
            endpoint: endpoint.to_string(),
        });
    }
    if teams.discarded > 0 {
        return Err(ApiError::Malformed {
            endpoint: endpoint.to_string(),
            discarded: teams.discarded,
        });
    }
    Ok(teams.items)
}

#[async_trait::async_trait]
impl AdminApi for ApiClient {
    fn environment(&self) -> &Environment {
        &self.environment
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let envelope: Envelope<LoginData> = self
            .send_json(Method::POST, "login", &LoginRequest { email, password })
            .await?;
        let data = envelope.data.ok_or_else(|| ApiError::MissingData {
            endpoint: "login".to_string(),
        })?;
        Ok(LoginGrant {
            token: data.token.token,
            user: data.token.user_payload,
        })
    }

    async fn verify_token(&self, token: &str) -> Result<(), ApiError> {
        let envelope: Envelope<serde_json::Value> =
            Self::execute(self.request(Method::GET, "users", Some(token))).await?;
        match envelope.success {
            Some(true) => Ok(()),
            _ => Err(ApiError::Rejected {
                message: "Token verification failed.".to_string(),
            }),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let data: UsersData = self.get_data("users").await?;
        Ok(data.users.items)
    }

    async fn update_user_role(&self, user_id: &str, role: Role) -> Result<(), ApiError> {
        let (is_admin, is_super_admin) = role.flags();
        let endpoint = format!("users/{}", urlencoding::encode(user_id));
        self.send_no_response(
            Method::PUT,
            &endpoint,
            &RoleUpdateRequest {
                is_admin,
                is_super_admin,
            },
        )
        .await
    }

    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        let data: EventsData = self.get_data("events").await?;
        Ok(data.events.items)
    }

    async fn create_event(&self, form: &EventForm) -> Result<(), ApiError> {
        self.send_no_response(Method::POST, "events", form).await
    }

    async fn update_event(&self, slug: &str, form: &EventForm) -> Result<(), ApiError> {
        let endpoint = format!("events/{}", urlencoding::encode(slug));
        self.send_no_response(Method::PUT, &endpoint, form).await
    }

    async fn delete_event(&self, slug: &str) -> Result<(), ApiError> {
        let endpoint = format!("events/{}", urlencoding::encode(slug));
        self.send_no_response(Method::PUT, &endpoint, &SoftDeleteRequest { is_deleted: true })
            .await
    }

    async fn event_teams(&self, event_id: &str) -> Result<Vec<Team>, ApiError> {
        let envelope: Envelope<TeamsData> = self
            .send_json(Method::POST, "event/teams", &EventTeamsRequest { event_id })
            .await?;
        teams_of_event(envelope)
    }

    async fn set_team_verification(
        &self,
        team_id: &str,
        event_id: &str,
        is_verified: bool,
    ) -> Result<(), ApiError> {
        self.send_no_response(
            Method::POST,
            "event/teams",
            &UpdateVerificationRequest::new(team_id, event_id, is_verified),
        )
        .await
    }

    async fn verify_team(&self, team_code: &str) -> Result<(), ApiError> {
        let endpoint = format!("teams/verify/{}", urlencoding::encode(team_code));
        self.send_no_response(
            Method::PATCH,
            &endpoint,
            &serde_json::json!({ "isVerified": true }),
        )
        .await
    }

    async fn create_team(&self, form: &NewTeamForm) -> Result<(), ApiError> {
        self.send_no_response(Method::POST, "addTeam", form).await
    }

    async fn join_team(&self, user_id: &str, team_code: &str) -> Result<(), ApiError> {
        self.send_no_response(
            Method::POST,
            "joinTeam",
            &JoinTeamRequest { user_id, team_code },
        )
        .await
    }
}

#[cfg(test)]
/// These are ignored by default since they require a live backend to run.
mod live_backend_tests {
    use crate::api::AdminApi;
    use crate::environment::Environment;

    #[tokio::test]
    #[ignore] // This test requires a live backend instance.
    /// Should list events from the local backend.
    async fn test_list_events() {
        let client = super::ApiClient::new(Environment::Local).unwrap();
        match client.list_events().await {
            Ok(events) => println!("Got {} events", events.len()),
            Err(e) => panic!("Failed to list events: {}", e),
        }
    }
}
