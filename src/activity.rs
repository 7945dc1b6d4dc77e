//! Activity log entries
//!
//! What the dashboard shows in its log panel and what headless mode prints.

use crate::logging::{LogLevel, should_log_with_env};
use chrono::Local;
use std::fmt::Display;

/// Area of the client an entry came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum Source {
    Session,
    Dashboard,
    Events,
    Teams,
    Users,
    Export,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub source: Source,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Activity {
    pub fn new(
        source: Source,
        msg: impl Into<String>,
        event_type: EventType,
        log_level: LogLevel,
    ) -> Self {
        Self {
            source,
            msg: msg.into(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    pub fn success(source: Source, msg: impl Into<String>) -> Self {
        Self::new(source, msg, EventType::Success, LogLevel::Info)
    }

    pub fn refresh(source: Source, msg: impl Into<String>) -> Self {
        Self::new(source, msg, EventType::Refresh, LogLevel::Debug)
    }

    pub fn error(source: Source, msg: impl Into<String>, log_level: LogLevel) -> Self {
        Self::new(source, msg, EventType::Error, log_level)
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.event_type, self.timestamp, self.source, self.msg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_always_displayed() {
        assert!(Activity::success(Source::Teams, "Team verified").should_display());
    }

    #[test]
    fn display_includes_source_and_message() {
        let entry = Activity::error(Source::Users, "Failed to update role", LogLevel::Warn);
        let text = entry.to_string();
        assert!(text.starts_with("Error ["));
        assert!(text.ends_with("Users: Failed to update role"));
    }
}
