//! Entities served by the event platform API.
//!
//! These mirror the JSON documents returned by the backend. Every field that the
//! backend may omit carries a serde default so a sparse document still parses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prize slot of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prize {
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub amount: u64,
}

/// A frequently asked question shown on the event page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    #[serde(default)]
    pub ques: String,
    #[serde(default)]
    pub ans: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    /// Registration fee charged per team.
    #[serde(default)]
    pub fees: u64,
    #[serde(default)]
    pub min_team_size: u32,
    #[serde(default)]
    pub max_team_size: u32,
    #[serde(default)]
    pub registration_start_date: String,
    #[serde(default)]
    pub registration_end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub prize: Vec<Prize>,
    #[serde(default)]
    pub faq: Vec<Faq>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,
}

impl Event {
    /// Whether the event name contains `marker`, ignoring case.
    pub fn is_featured(&self, marker: &str) -> bool {
        self.name.to_lowercase().contains(&marker.to_lowercase())
    }
}

/// Reference to the owning event of a team.
///
/// Some endpoints return the bare identifier, others populate the event document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventRef {
    Id(String),
    Populated {
        #[serde(rename = "_id", default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        slug: String,
    },
}

impl Default for EventRef {
    fn default() -> Self {
        EventRef::Id(String::new())
    }
}

impl EventRef {
    pub fn id(&self) -> &str {
        match self {
            EventRef::Id(id) => id,
            EventRef::Populated { id, .. } => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            EventRef::Id(_) => None,
            EventRef::Populated { name, .. } => Some(name),
        }
    }
}

/// Reference to a team member: either a user id or a populated membership record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberRef {
    Id(String),
    Populated {
        #[serde(rename = "userId")]
        user: User,
    },
}

impl MemberRef {
    pub fn user_id(&self) -> &str {
        match self {
            MemberRef::Id(id) => id,
            MemberRef::Populated { user } => &user.id,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            MemberRef::Id(_) => None,
            MemberRef::Populated { user } => Some(user),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub event_id: EventRef,
    #[serde(default)]
    pub leader_id: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<MemberRef>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_registered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_transaction_id: Option<String>,
    #[serde(default)]
    pub team_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_super_admin: bool,
}

impl User {
    pub fn role(&self) -> Role {
        if self.is_super_admin {
            Role::SuperAdmin
        } else if self.is_admin {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Whether this user may sign in to the admin client at all.
    pub fn has_admin_access(&self) -> bool {
        self.is_admin || self.is_super_admin
    }
}

/// Lookup of users by id, used to resolve bare member references.
#[derive(Debug, Default)]
pub struct UserDirectory<'a> {
    by_id: HashMap<&'a str, &'a User>,
}

impl<'a> UserDirectory<'a> {
    pub fn new(users: &'a [User]) -> Self {
        Self {
            by_id: users.iter().map(|u| (u.id.as_str(), u)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a User> {
        self.by_id.get(id).copied()
    }

    /// The populated user of a membership, or the directory entry for a bare id.
    pub fn resolve<'s>(&'s self, member: &'s MemberRef) -> Option<&'s User> {
        member.user().or_else(|| self.get(member.user_id()))
    }
}

/// Access level derived from the two role flags.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    #[strum(serialize = "superadmin", to_string = "Super Admin")]
    SuperAdmin,
    #[strum(serialize = "admin", to_string = "Admin")]
    Admin,
    #[strum(serialize = "user", to_string = "User")]
    User,
}

impl Role {
    /// Sort priority: lower values list first.
    pub fn priority(self) -> u8 {
        match self {
            Role::SuperAdmin => 0,
            Role::Admin => 1,
            Role::User => 2,
        }
    }

    /// The `(isAdmin, isSuperAdmin)` flag pair the backend stores for this role.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Role::SuperAdmin => (true, true),
            Role::Admin => (true, false),
            Role::User => (false, false),
        }
    }

    /// Lowercase name accepted on the command line and used as a filter key.
    pub fn key(self) -> &'static str {
        match self {
            Role::SuperAdmin => "superadmin",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn next(self) -> Role {
        match self {
            Role::User => Role::Admin,
            Role::Admin => Role::SuperAdmin,
            Role::SuperAdmin => Role::User,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn event_parses_backend_document() {
        let json = r#"{
            "_id": "e1",
            "slug": "b-quiz",
            "name": "B Quiz",
            "fees": 50,
            "minTeamSize": 1,
            "maxTeamSize": 3,
            "registrationStartDate": "2025-01-01",
            "registrationEndDate": "2025-01-10",
            "isDeleted": false,
            "prize": [{"position": "1", "amount": 500}],
            "faq": [{"ques": "Where?", "ans": "Hall A"}]
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "e1");
        assert_eq!(event.fees, 50);
        assert_eq!(event.max_team_size, 3);
        assert_eq!(event.prize[0].amount, 500);
        assert!(event.event_date.is_none());
    }

    #[test]
    fn featured_marker_is_case_insensitive() {
        let event = Event {
            name: "ENTERTAINMENT EVE 2025".to_string(),
            ..Default::default()
        };
        assert!(event.is_featured("entertainment eve"));
        assert!(!event.is_featured("quiz"));
    }

    #[test]
    fn team_accepts_plain_and_populated_references() {
        let plain = r#"{"_id":"t1","eventId":"e1","teamName":"A","members":["u1","u2"],"teamCode":"X1"}"#;
        let team: Team = serde_json::from_str(plain).unwrap();
        assert_eq!(team.event_id.id(), "e1");
        assert_eq!(team.members[1].user_id(), "u2");
        assert!(!team.is_verified);

        let populated = r#"{
            "_id": "t2",
            "eventId": {"_id": "e2", "name": "Hackathon", "slug": "hack"},
            "members": [{"_id": "m1", "userId": {"_id": "u9", "name": "Asha", "email": "a@x.io", "phone": "1"}}],
            "isVerified": true
        }"#;
        let team: Team = serde_json::from_str(populated).unwrap();
        assert_eq!(team.event_id.id(), "e2");
        assert_eq!(team.event_id.name(), Some("Hackathon"));
        assert_eq!(team.members[0].user_id(), "u9");
        assert_eq!(team.members[0].user().unwrap().name, "Asha");
    }

    #[test]
    fn role_derivation_prefers_super_admin() {
        let user = User {
            is_admin: false,
            is_super_admin: true,
            ..Default::default()
        };
        assert_eq!(user.role(), Role::SuperAdmin);
        assert!(user.has_admin_access());
        assert!(!User::default().has_admin_access());
    }

    #[test]
    fn directory_resolves_bare_and_populated_members() {
        let users = vec![User {
            id: "u1".into(),
            name: "Kiran".into(),
            ..Default::default()
        }];
        let directory = UserDirectory::new(&users);
        let bare = MemberRef::Id("u1".into());
        let unknown = MemberRef::Id("u404".into());
        let populated = MemberRef::Populated {
            user: User {
                id: "u2".into(),
                name: "Meera".into(),
                ..Default::default()
            },
        };
        assert_eq!(directory.resolve(&bare).unwrap().name, "Kiran");
        assert_eq!(directory.resolve(&populated).unwrap().name, "Meera");
        assert!(directory.resolve(&unknown).is_none());
    }

    #[test]
    fn role_parses_cli_names() {
        assert_eq!(Role::from_str("superadmin").unwrap(), Role::SuperAdmin);
        assert_eq!(Role::from_str("Admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("user").unwrap(), Role::User);
        assert!(Role::from_str("owner").is_err());
        assert_eq!(Role::Admin.to_string(), "Admin");
        assert_eq!(Role::SuperAdmin.flags(), (true, true));
    }
}
