//! Fetch coordination for the dashboard and the management commands.
//!
//! Independent collections are requested together. Team lists are requested
//! for every event at once; a failing event is reported by id while the rest
//! are still used.

use crate::aggregation::{DashboardSummary, summarize};
use crate::api::AdminApi;
use crate::api::error::ApiError;
use crate::models::{Event, EventRef, Team, User};
use futures::future::join_all;
use log::{debug, warn};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

/// Outcome of fetching the teams of many events.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Every requested event with its teams, in request order. Failed events carry no teams.
    pub events: Vec<(Event, Vec<Team>)>,
    /// Events whose team list could not be fetched.
    pub failed: Vec<(String, ApiError)>,
}

impl FetchReport {
    pub fn failed_ids(&self) -> Vec<String> {
        self.failed.iter().map(|(id, _)| id.clone()).collect()
    }

    /// All fetched teams, each annotated with its event.
    pub fn teams(&self) -> Vec<Team> {
        self.events
            .iter()
            .flat_map(|(_, teams)| teams.iter().cloned())
            .collect()
    }
}

/// Everything the dashboard shows, fetched in one pass.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// Non-deleted events in API order.
    pub events: Vec<Event>,
    pub teams: Vec<Team>,
    pub users: Vec<User>,
    pub summary: DashboardSummary,
    pub failed: Vec<(String, ApiError)>,
}

/// Runs `fut` unless `cancel` fires first.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}

/// Attaches the owning event's name and slug to teams that only carry its id.
fn annotate(event: &Event, mut teams: Vec<Team>) -> Vec<Team> {
    for team in &mut teams {
        if matches!(team.event_id, EventRef::Id(_)) {
            team.event_id = EventRef::Populated {
                id: event.id.clone(),
                name: event.name.clone(),
                slug: event.slug.clone(),
            };
        }
    }
    teams
}

/// Fetches the teams of every event concurrently.
pub async fn fetch_event_teams(
    api: &dyn AdminApi,
    events: Vec<Event>,
    cancel: &CancellationToken,
) -> Result<FetchReport, ApiError> {
    let requests = events.iter().map(|event| api.event_teams(&event.id));
    let results = cancellable(cancel, async { Ok::<_, ApiError>(join_all(requests).await) }).await?;

    let mut report = FetchReport::default();
    for (event, result) in events.into_iter().zip(results) {
        match result {
            Ok(teams) => {
                debug!("Fetched {} teams for event {}", teams.len(), event.name);
                let teams = annotate(&event, teams);
                report.events.push((event, teams));
            }
            Err(e) => {
                warn!("Failed to fetch teams for event {}: {}", event.id, e);
                report.failed.push((event.id.clone(), e));
                report.events.push((event, Vec::new()));
            }
        }
    }
    Ok(report)
}

/// Lists the non-deleted events.
pub async fn fetch_events(
    api: &dyn AdminApi,
    cancel: &CancellationToken,
) -> Result<Vec<Event>, ApiError> {
    let events = cancellable(cancel, api.list_events()).await?;
    Ok(events.into_iter().filter(|e| !e.is_deleted).collect())
}

/// Lists non-deleted events and the teams of each.
pub async fn fetch_all_teams(
    api: &dyn AdminApi,
    cancel: &CancellationToken,
) -> Result<FetchReport, ApiError> {
    let events = fetch_events(api, cancel).await?;
    fetch_event_teams(api, events, cancel).await
}

/// Fetches events, users and every event's teams, then aggregates them.
///
/// A failed event list fails the whole snapshot. A failed user list or team
/// list only leaves that part empty.
pub async fn load_snapshot(
    api: &dyn AdminApi,
    featured_marker: &str,
    cancel: &CancellationToken,
) -> Result<Snapshot, ApiError> {
    let (events, users) = cancellable(cancel, async {
        Ok::<_, ApiError>(tokio::join!(api.list_events(), api.list_users()))
    })
    .await?;

    let events: Vec<Event> = events?.into_iter().filter(|e| !e.is_deleted).collect();
    let users = users.unwrap_or_else(|e| {
        warn!("Failed to fetch users: {}", e);
        Vec::new()
    });

    let report = fetch_event_teams(api, events.clone(), cancel).await?;
    let summary = summarize(
        &report.events,
        &report.failed_ids(),
        featured_marker,
        users.len(),
    );

    Ok(Snapshot {
        teams: report.teams(),
        events,
        users,
        summary,
        failed: report.failed,
    })
}

/// Ticket handed to a fetch started on behalf of a view.
#[derive(Debug, Clone)]
pub struct ViewTicket {
    pub generation: u64,
    pub cancel: CancellationToken,
}

/// Tracks which fetch generation is current for a view.
///
/// Starting a new fetch cancels the previous one. Results carrying an older
/// generation are stale and must be dropped.
#[derive(Debug, Default)]
pub struct ViewLifetime {
    generation: AtomicU64,
    current: CancellationToken,
}

impl ViewLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> ViewTicket {
        self.current.cancel();
        self.current = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        ViewTicket {
            generation,
            cancel: self.current.clone(),
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Cancels whatever is in flight, for view changes and shutdown.
    pub fn end(&self) {
        self.current.cancel();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockAdminApi;

    fn event(id: &str, name: &str, fees: u64) -> Event {
        Event {
            id: id.into(),
            name: name.into(),
            slug: name.to_lowercase().replace(' ', "-"),
            fees,
            ..Default::default()
        }
    }

    fn verified_team(id: &str, event_id: &str) -> Team {
        Team {
            id: id.into(),
            event_id: EventRef::Id(event_id.into()),
            is_verified: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn one_failed_event_is_isolated() {
        let mut api = MockAdminApi::new();
        api.expect_event_teams().returning(|id| match id {
            "e2" => Err(ApiError::Http {
                status: 500,
                message: "boom".into(),
            }),
            other => Ok(vec![verified_team("t1", other), verified_team("t2", other)]),
        });

        let events = vec![
            event("e1", "Quiz", 10),
            event("e2", "Hack", 20),
            event("e3", "Debate", 30),
        ];
        let report = fetch_event_teams(&api, events, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.events.len(), 3);
        assert_eq!(report.failed_ids(), vec!["e2".to_string()]);
        assert_eq!(report.teams().len(), 4);
        assert!(report.events[1].1.is_empty());
    }

    #[tokio::test]
    async fn event_with_malformed_teams_is_reported_failed() {
        let mut api = MockAdminApi::new();
        api.expect_event_teams().returning(|id| match id {
            "e2" => Err(ApiError::Malformed {
                endpoint: "event/teams".into(),
                discarded: 1,
            }),
            "e3" => Err(ApiError::MissingData {
                endpoint: "event/teams".into(),
            }),
            other => Ok(vec![verified_team("t1", other)]),
        });

        let events = vec![
            event("e1", "Quiz", 10),
            event("e2", "Hack", 20),
            event("e3", "Debate", 30),
        ];
        let report = fetch_event_teams(&api, events, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            report.failed_ids(),
            vec!["e2".to_string(), "e3".to_string()]
        );
        assert_eq!(report.teams().len(), 1);

        let summary = summarize(&report.events, &report.failed_ids(), "quiz", 0);
        assert_eq!(summary.total_revenue, 10);
        assert_eq!(summary.failed_events.len(), 2);
    }

    #[tokio::test]
    async fn teams_are_annotated_with_event_name() {
        let mut api = MockAdminApi::new();
        api.expect_event_teams()
            .returning(|id| Ok(vec![verified_team("t1", id)]));

        let events = vec![event("e1", "Quiz Bowl", 10)];
        let report = fetch_event_teams(&api, events, &CancellationToken::new())
            .await
            .unwrap();
        let team = &report.teams()[0];
        assert_eq!(team.event_id.id(), "e1");
        assert_eq!(team.event_id.name(), Some("Quiz Bowl"));
    }

    #[tokio::test]
    async fn snapshot_aggregates_remaining_events() {
        let mut api = MockAdminApi::new();
        api.expect_list_events().returning(|| {
            let mut deleted = event("e0", "Old", 999);
            deleted.is_deleted = true;
            Ok(vec![
                deleted,
                event("e1", "Entertainment Eve", 100),
                event("e2", "B Quiz", 50),
                event("e3", "Robo Race", 70),
            ])
        });
        api.expect_list_users()
            .returning(|| Ok(vec![User::default(), User::default()]));
        api.expect_event_teams().returning(|id| match id {
            "e1" => Ok((0..3).map(|i| verified_team(&format!("a{i}"), id)).collect()),
            "e2" => Ok((0..2).map(|i| verified_team(&format!("b{i}"), id)).collect()),
            _ => Err(ApiError::Http {
                status: 503,
                message: String::new(),
            }),
        });

        let snapshot = load_snapshot(&api, "entertainment eve", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(snapshot.events.len(), 3);
        assert_eq!(snapshot.summary.total_events, 3);
        assert_eq!(snapshot.summary.featured_revenue, 300);
        assert_eq!(snapshot.summary.total_revenue, 400);
        assert_eq!(snapshot.summary.total_users, 2);
        assert_eq!(snapshot.summary.failed_events, vec!["e3".to_string()]);
        assert_eq!(snapshot.teams.len(), 5);
    }

    #[tokio::test]
    async fn failed_user_list_leaves_users_empty() {
        let mut api = MockAdminApi::new();
        api.expect_list_events().returning(|| Ok(vec![]));
        api.expect_list_users().returning(|| {
            Err(ApiError::Http {
                status: 403,
                message: String::new(),
            })
        });

        let snapshot = load_snapshot(&api, "x", &CancellationToken::new())
            .await
            .unwrap();
        assert!(snapshot.users.is_empty());
        assert_eq!(snapshot.summary, DashboardSummary::default());
    }

    #[tokio::test]
    async fn cancelled_fetch_resolves_to_cancelled() {
        let api = MockAdminApi::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = load_snapshot(&api, "x", &cancel).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut lifetime = ViewLifetime::new();
        let first = lifetime.begin();
        let second = lifetime.begin();

        assert!(first.cancel.is_cancelled());
        assert!(!lifetime.is_current(first.generation));
        assert!(lifetime.is_current(second.generation));

        lifetime.end();
        assert!(second.cancel.is_cancelled());
        assert!(!lifetime.is_current(second.generation));
    }
}
