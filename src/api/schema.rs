//! Per-endpoint request bodies and response envelopes.
//!
//! The backend wraps every payload as `{success, message, data}` with the data
//! nested differently per endpoint. Those shapes are parsed here and unwrapped
//! by the client so nested access never leaks into the rest of the crate.

use crate::models::{Event, Team, User};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Common response wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: TokenData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub token: String,
    pub user_payload: User,
}

#[derive(Debug, Deserialize)]
pub struct UsersData {
    #[serde(default)]
    pub users: LenientList<User>,
}

#[derive(Debug, Deserialize)]
pub struct EventsData {
    #[serde(default)]
    pub events: LenientList<Event>,
}

#[derive(Debug, Deserialize)]
pub struct TeamsData {
    /// Absent when the backend sent no list at all.
    pub teams: Option<LenientList<Team>>,
}

/// A list decoded entry by entry.
///
/// Entries that do not match the expected shape are dropped and counted; the
/// rest are kept. A value that is not an array yields no items and sets
/// `malformed`.
#[derive(Debug)]
pub struct LenientList<T> {
    pub items: Vec<T>,
    pub discarded: usize,
    pub malformed: bool,
}

impl<T> Default for LenientList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            discarded: 0,
            malformed: false,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for LenientList<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Array(entries) => entries,
            serde_json::Value::Null => return Ok(Self::default()),
            other => {
                warn!("Expected a list in API response, got {}", other);
                return Ok(Self {
                    malformed: true,
                    ..Self::default()
                });
            }
        };

        let mut list = Self::default();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value(entry) {
                Ok(item) => list.items.push(item),
                Err(e) => {
                    warn!("Discarding malformed entry {} in API response: {}", index, e);
                    list.discarded += 1;
                }
            }
        }
        Ok(list)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTeamsRequest<'a> {
    pub event_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVerificationRequest<'a> {
    pub team_id: &'a str,
    pub is_verified: bool,
    pub event_id: &'a str,
    pub action: &'static str,
}

impl<'a> UpdateVerificationRequest<'a> {
    pub fn new(team_id: &'a str, event_id: &'a str, is_verified: bool) -> Self {
        Self {
            team_id,
            is_verified,
            event_id,
            action: "updateVerification",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftDeleteRequest {
    pub is_deleted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdateRequest {
    pub is_admin: bool,
    pub is_super_admin: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTeamRequest<'a> {
    pub user_id: &'a str,
    pub team_code: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_envelope_unwraps_token_and_payload() {
        let body = r#"{
            "success": true,
            "data": {"token": {"token": "abc", "userPayload": {"_id": "u1", "name": "Root", "isAdmin": true}}}
        }"#;
        let envelope: Envelope<LoginData> = serde_json::from_str(body).unwrap();
        let token = envelope.data.unwrap().token;
        assert_eq!(token.token, "abc");
        assert!(token.user_payload.is_admin);
        assert!(!token.user_payload.is_super_admin);
    }

    #[test]
    fn one_bad_event_keeps_the_others() {
        let body = r#"{"success": true, "data": {"events": [
            {"_id": "e1", "name": "Entertainment Eve", "fees": 100},
            {"_id": "e2", "name": "B Quiz", "fees": 50, "description": null},
            {"_id": "e3", "name": "Hackathon", "fees": 200}
        ]}}"#;
        let envelope: Envelope<EventsData> = serde_json::from_str(body).unwrap();
        let events = envelope.data.unwrap().events;
        let ids: Vec<&str> = events.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3"]);
        assert_eq!(events.discarded, 1);
        assert!(!events.malformed);
    }

    #[test]
    fn partially_bad_team_list_is_counted() {
        let body = r#"{"success": true, "data": {"teams": [
            {"_id": "t1", "teamName": "Alpha", "isVerified": true},
            {"_id": "t2", "teamName": null, "isVerified": true}
        ]}}"#;
        let envelope: Envelope<TeamsData> = serde_json::from_str(body).unwrap();
        let teams = envelope.data.unwrap().teams.unwrap();
        assert_eq!(teams.items.len(), 1);
        assert_eq!(teams.items[0].id, "t1");
        assert_eq!(teams.discarded, 1);
    }

    #[test]
    fn non_list_and_missing_team_lists_are_flagged() {
        let body = r#"{"success": true, "data": {"teams": "oops"}}"#;
        let envelope: Envelope<TeamsData> = serde_json::from_str(body).unwrap();
        let teams = envelope.data.unwrap().teams.unwrap();
        assert!(teams.items.is_empty());
        assert!(teams.malformed);

        let body = r#"{"success": true, "data": {}}"#;
        let envelope: Envelope<TeamsData> = serde_json::from_str(body).unwrap();
        assert!(envelope.data.unwrap().teams.is_none());

        let body = r#"{"success": true, "data": {"teams": []}}"#;
        let envelope: Envelope<TeamsData> = serde_json::from_str(body).unwrap();
        let teams = envelope.data.unwrap().teams.unwrap();
        assert_eq!((teams.items.len(), teams.discarded, teams.malformed), (0, 0, false));
    }

    #[test]
    fn verification_request_carries_action() {
        let body = serde_json::to_value(UpdateVerificationRequest::new("t1", "e1", true)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "teamId": "t1",
                "isVerified": true,
                "eventId": "e1",
                "action": "updateVerification"
            })
        );
    }
}
