//! Background work started from the dashboard
//!
//! Every task reports back through the update channel; nothing here touches
//! dashboard state directly.

use crate::activity::{Activity, Source};
use crate::api::AdminApi;
use crate::api::error::ApiError;
use crate::error_classifier::ErrorClassifier;
use crate::fetch::{ViewTicket, load_snapshot};
use crate::models::{Role, Team, User};
use crate::ui::dashboard::state::{Mutation, ViewUpdate};

use log::debug;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Handles shared by the tasks of one dashboard.
#[derive(Clone)]
pub struct TaskContext {
    pub api: Arc<dyn AdminApi>,
    pub sender: mpsc::Sender<ViewUpdate>,
    pub shutdown_sender: broadcast::Sender<()>,
}

impl TaskContext {
    pub fn new(
        api: Arc<dyn AdminApi>,
        sender: mpsc::Sender<ViewUpdate>,
        shutdown_sender: broadcast::Sender<()>,
    ) -> Self {
        Self {
            api,
            sender,
            shutdown_sender,
        }
    }

    fn failure(source: Source, title: &str, error: &ApiError) -> ViewUpdate {
        let level = ErrorClassifier::new().classify_api_error(error);
        ViewUpdate::Activity(Activity::error(
            source,
            format!("{}: {}", title, error.user_message()),
            level,
        ))
    }
}

/// Loads a dashboard snapshot for `ticket`.
///
/// A cancelled fetch sends nothing: whoever cancelled it has moved on.
pub fn spawn_refresh(
    api: Arc<dyn AdminApi>,
    featured_marker: String,
    ticket: ViewTicket,
    sender: mpsc::Sender<ViewUpdate>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let update = match load_snapshot(api.as_ref(), &featured_marker, &ticket.cancel).await {
            Ok(snapshot) => ViewUpdate::Snapshot {
                generation: ticket.generation,
                snapshot: Box::new(snapshot),
            },
            Err(ApiError::Cancelled) => {
                debug!("Refresh {} cancelled", ticket.generation);
                return;
            }
            Err(error) => ViewUpdate::FetchFailed {
                generation: ticket.generation,
                error,
            },
        };
        let _ = sender.send(update).await;
    })
}

/// Flips the verification flag of `team` on the server.
pub fn spawn_toggle_verification(ctx: &TaskContext, team: Team) -> JoinHandle<()> {
    let ctx = ctx.clone();
    let mut shutdown = ctx.shutdown_sender.subscribe();
    tokio::spawn(async move {
        let is_verified = !team.is_verified;
        let request =
            ctx.api
                .set_team_verification(&team.id, team.event_id.id(), is_verified);
        let result = tokio::select! {
            result = request => result,
            _ = shutdown.recv() => return,
        };

        let updates = match result {
            Ok(()) => vec![
                ViewUpdate::Confirmed(Mutation::TeamVerification {
                    team_id: team.id.clone(),
                    is_verified,
                }),
                ViewUpdate::Activity(Activity::success(
                    Source::Teams,
                    format!(
                        "Team {} {}",
                        team.team_name,
                        if is_verified { "verified" } else { "unverified" }
                    ),
                )),
            ],
            Err(e) => vec![TaskContext::failure(
                Source::Teams,
                "Failed to update verification status on the server",
                &e,
            )],
        };
        for update in updates {
            let _ = ctx.sender.send(update).await;
        }
    })
}

/// Moves `user` to the next role in the cycle.
pub fn spawn_change_role(ctx: &TaskContext, user: User) -> JoinHandle<()> {
    let ctx = ctx.clone();
    let mut shutdown = ctx.shutdown_sender.subscribe();
    tokio::spawn(async move {
        let role: Role = user.role().next();
        let result = tokio::select! {
            result = ctx.api.update_user_role(&user.id, role) => result,
            _ = shutdown.recv() => return,
        };

        let updates = match result {
            Ok(()) => vec![
                ViewUpdate::Confirmed(Mutation::RoleChanged {
                    user_id: user.id.clone(),
                    role,
                }),
                ViewUpdate::Activity(Activity::success(
                    Source::Users,
                    format!("User role updated successfully! {} is now {}", user.name, role),
                )),
            ],
            Err(e) => vec![TaskContext::failure(
                Source::Users,
                "Failed to update user role.",
                &e,
            )],
        };
        for update in updates {
            let _ = ctx.sender.send(update).await;
        }
    })
}
