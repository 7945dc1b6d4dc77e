//! Form checks run before anything is submitted to the API.

use crate::models::{Event, Faq, Prize};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Body of `POST /events` and `PUT /events/:slug`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_event_schedule"))]
pub struct EventForm {
    #[validate(length(min = 1, message = "Event name is required."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[validate(range(min = 1, message = "Min Team Size must be at least 1."))]
    pub min_team_size: u32,
    pub max_team_size: u32,
    pub registration_start_date: String,
    pub registration_end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default)]
    pub fees: u64,
    #[serde(default)]
    pub prize: Vec<Prize>,
    #[serde(default)]
    pub faq: Vec<Faq>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl From<&Event> for EventForm {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            discount: event.discount.clone(),
            min_team_size: event.min_team_size,
            max_team_size: event.max_team_size,
            registration_start_date: event.registration_start_date.clone(),
            registration_end_date: event.registration_end_date.clone(),
            event_date: event.event_date.clone(),
            fees: event.fees,
            prize: event.prize.clone(),
            faq: event.faq.clone(),
            poster: event.poster.clone(),
            qrcode: event.qrcode.clone(),
            is_deleted: event.is_deleted,
        }
    }
}

/// Body of `POST /addTeam`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamForm {
    #[validate(length(min = 1, message = "Team name is required."))]
    pub team_name: String,
    #[validate(length(min = 1, message = "Please select an event."))]
    pub event_id: String,
    pub event_slug: String,
    #[validate(length(min = 1, message = "Please select a team leader."))]
    pub leader_id: String,
    pub is_verified: bool,
}

/// Input of the add-member dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct JoinTeamForm {
    #[validate(length(min = 1, message = "Please select a user to add."))]
    pub user_id: String,
    #[validate(length(min = 1, message = "Team code is required."))]
    pub team_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
#[validate(schema(function = "validate_login_fields"))]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_login_fields(form: &LoginForm) -> Result<(), ValidationError> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(failure("login_fields", "Please fill in both fields."));
    }
    Ok(())
}

fn validate_event_schedule(form: &EventForm) -> Result<(), ValidationError> {
    if form.min_team_size > form.max_team_size {
        return Err(failure(
            "team_size",
            "Max Team Size must be greater than or equal to Min Team Size.",
        ));
    }

    let (Some(start), Some(end)) = (
        parse_date(&form.registration_start_date),
        parse_date(&form.registration_end_date),
    ) else {
        return Err(failure(
            "registration_dates",
            "Registration Start and End must be valid dates.",
        ));
    };
    if end <= start {
        return Err(failure(
            "registration_window",
            "Registration End Date must be after the Start Date.",
        ));
    }

    if let Some(event_date) = form.event_date.as_deref().filter(|d| !d.trim().is_empty()) {
        match parse_date(event_date) {
            Some(date) if date > end => {}
            Some(_) => {
                return Err(failure(
                    "event_date",
                    "Event Date must be after the Registration End Date.",
                ));
            }
            None => return Err(failure("event_date", "Event Date must be a valid date.")),
        }
    }
    Ok(())
}

/// Parses the date formats the backend and the event form use.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Flattens validation failures into user-facing lines, in a stable order.
pub fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.to_string().cmp(&b.0.to_string()));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid value for {}.", field),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Runs validation and joins any failures into a single inline message.
pub fn check<T: Validate>(form: &T) -> Result<(), String> {
    form.validate().map_err(|e| messages(&e).join(" "))
}
