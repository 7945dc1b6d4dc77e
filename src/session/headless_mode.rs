//! Headless mode execution

use super::{
    Session,
    messages::{print_session_exit_success, print_session_shutdown, print_session_starting},
};
use crate::activity::{Activity, Source};
use crate::aggregation::DashboardSummary;
use crate::api::AdminApi;
use crate::consts::cli_consts::REFRESH_INTERVAL_SECS;
use crate::error_classifier::ErrorClassifier;
use crate::fetch::{Snapshot, load_snapshot};
use crate::ui::dashboard::utils::format_rupees;
use std::error::Error;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Summary lines printed after every refresh.
pub fn summary_lines(summary: &DashboardSummary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Events: {} | Verified teams: {} | Users: {}",
            summary.total_events, summary.total_teams, summary.total_users
        ),
        format!(
            "Revenue: {} (featured {}, other {})",
            format_rupees(summary.total_revenue),
            format_rupees(summary.featured_revenue),
            format_rupees(summary.other_revenue())
        ),
    ];
    for event in &summary.other_events {
        lines.push(format!(
            "  {}: {} teams x {} = {}",
            event.name,
            event.team_count,
            format_rupees(event.unit_fee),
            format_rupees(event.total)
        ));
    }
    lines
}

fn report(snapshot: &Snapshot) {
    for (event_id, error) in &snapshot.failed {
        let level = ErrorClassifier::new().classify_api_error(error);
        let entry = Activity::error(
            Source::Teams,
            format!("Teams of event {} could not be loaded: {}", event_id, error.user_message()),
            level,
        );
        if entry.should_display() {
            println!("{}", entry);
        }
    }
    println!(
        "{}",
        Activity::refresh(Source::Dashboard, "Dashboard refreshed")
    );
    for line in summary_lines(&snapshot.summary) {
        println!("{}", line);
    }
}

/// Prints the dashboard to the console every refresh interval until Ctrl+C.
pub async fn run_headless_mode(
    session: &Session,
    api: &dyn AdminApi,
    featured_marker: &str,
    cancel: CancellationToken,
) -> Result<(), Box<dyn Error>> {
    print_session_starting("headless", &session.user.name);

    let mut interval = tokio::time::interval(Duration::from_secs(REFRESH_INTERVAL_SECS));
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                match load_snapshot(api, featured_marker, &cancel).await {
                    Ok(snapshot) => report(&snapshot),
                    Err(e) if cancel.is_cancelled() => {
                        log::debug!("Refresh interrupted: {}", e);
                        break;
                    }
                    Err(e) => {
                        let level = ErrorClassifier::new().classify_api_error(&e);
                        println!(
                            "{}",
                            Activity::error(
                                Source::Dashboard,
                                format!("Failed to load dashboard: {}", e.user_message()),
                                level,
                            )
                        );
                    }
                }
            }
        }
    }

    print_session_shutdown();
    print_session_exit_success();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::OtherEventRevenue;

    #[test]
    fn summary_lists_other_events() {
        let summary = DashboardSummary {
            total_events: 2,
            total_teams: 5,
            total_revenue: 400,
            featured_revenue: 300,
            other_events: vec![OtherEventRevenue {
                name: "B Quiz".into(),
                team_count: 2,
                unit_fee: 50,
                total: 100,
            }],
            total_users: 7,
            failed_events: vec![],
        };
        let lines = summary_lines(&summary);
        assert_eq!(lines[0], "Events: 2 | Verified teams: 5 | Users: 7");
        assert_eq!(lines[1], "Revenue: ₹400 (featured ₹300, other ₹100)");
        assert_eq!(lines[2], "  B Quiz: 2 teams x ₹50 = ₹100");
    }
}
