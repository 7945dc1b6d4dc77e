//! Dashboard totals computed from events and their teams.

use crate::models::{Event, Team};
use log::warn;

/// Revenue contributed by a single non-featured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherEventRevenue {
    pub name: String,
    pub team_count: usize,
    pub unit_fee: u64,
    pub total: u64,
}

/// Figures shown on the dashboard overview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Events that are not soft-deleted.
    pub total_events: usize,
    /// Verified teams across non-deleted events.
    pub total_teams: usize,
    pub total_revenue: u64,
    /// Share of `total_revenue` from events carrying the featured marker.
    pub featured_revenue: u64,
    /// One record per non-featured, non-deleted event in API order.
    pub other_events: Vec<OtherEventRevenue>,
    pub total_users: usize,
    /// Events whose team list could not be fetched. They add nothing to the totals.
    pub failed_events: Vec<String>,
}

impl DashboardSummary {
    /// Sum of the non-featured totals, clamped at `u64::MAX`.
    pub fn other_revenue(&self) -> u64 {
        self.other_events
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.total))
    }
}

/// Builds the dashboard summary.
///
/// `events` pairs every event with its fetched teams. Events listed in `failed`
/// still count towards `total_events` but contribute no teams or revenue.
///
/// Revenue that does not fit in a `u64` is clamped at `u64::MAX` with a warning.
/// `total_revenue` is always `featured_revenue + other_revenue()` under the same
/// clamping.
pub fn summarize(
    events: &[(Event, Vec<Team>)],
    failed: &[String],
    featured_marker: &str,
    total_users: usize,
) -> DashboardSummary {
    let mut summary = DashboardSummary {
        total_users,
        ..Default::default()
    };

    for (event, teams) in events.iter().filter(|(e, _)| !e.is_deleted) {
        summary.total_events += 1;

        let verified = if failed.contains(&event.id) {
            0
        } else {
            teams.iter().filter(|t| t.is_verified).count()
        };
        let total = event.fees.checked_mul(verified as u64).unwrap_or_else(|| {
            warn!(
                "Revenue of event {} overflows ({} teams at {}); clamping",
                event.id, verified, event.fees
            );
            u64::MAX
        });

        summary.total_teams += verified;

        if event.is_featured(featured_marker) {
            summary.featured_revenue = clamped_sum(summary.featured_revenue, total);
        } else {
            summary.other_events.push(OtherEventRevenue {
                name: event.name.clone(),
                team_count: verified,
                unit_fee: event.fees,
                total,
            });
        }
    }

    summary.total_revenue = clamped_sum(summary.featured_revenue, summary.other_revenue());
    summary.failed_events = failed.to_vec();
    summary
}

fn clamped_sum(a: u64, b: u64) -> u64 {
    a.checked_add(b).unwrap_or_else(|| {
        warn!("Revenue total overflows; clamping at {}", u64::MAX);
        u64::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "entertainment eve";

    fn event(id: &str, name: &str, fees: u64) -> Event {
        Event {
            id: id.to_string(),
            name: name.to_string(),
            fees,
            ..Default::default()
        }
    }

    fn teams(verified: usize, unverified: usize) -> Vec<Team> {
        let mut out = Vec::new();
        for i in 0..verified + unverified {
            out.push(Team {
                id: format!("t{i}"),
                is_verified: i < verified,
                ..Default::default()
            });
        }
        out
    }

    #[test]
    fn featured_and_other_buckets() {
        let input = vec![
            (event("e1", "Entertainment Eve", 100), teams(3, 1)),
            (event("e2", "B Quiz", 50), teams(2, 4)),
        ];
        let summary = summarize(&input, &[], MARKER, 7);

        assert_eq!(summary.total_events, 2);
        assert_eq!(summary.total_teams, 5);
        assert_eq!(summary.featured_revenue, 300);
        assert_eq!(
            summary.other_events,
            vec![OtherEventRevenue {
                name: "B Quiz".to_string(),
                team_count: 2,
                unit_fee: 50,
                total: 100,
            }]
        );
        assert_eq!(summary.total_revenue, 400);
        assert_eq!(summary.total_users, 7);
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let summary = summarize(&[], &[], MARKER, 0);
        assert_eq!(summary, DashboardSummary::default());
    }

    #[test]
    fn deleted_events_are_ignored() {
        let mut gone = event("e1", "Old Hackathon", 200);
        gone.is_deleted = true;
        let input = vec![(gone, teams(4, 0)), (event("e2", "Quiz", 10), teams(1, 0))];
        let summary = summarize(&input, &[], MARKER, 0);

        assert_eq!(summary.total_events, 1);
        assert_eq!(summary.total_teams, 1);
        assert_eq!(summary.total_revenue, 10);
        assert_eq!(summary.other_events.len(), 1);
    }

    #[test]
    fn zero_revenue_events_are_listed() {
        let input = vec![(event("e1", "Workshop", 0), teams(5, 0))];
        let summary = summarize(&input, &[], MARKER, 0);
        assert_eq!(summary.other_events[0].team_count, 5);
        assert_eq!(summary.other_events[0].total, 0);
    }

    #[test]
    fn failed_events_contribute_nothing() {
        let input = vec![
            (event("e1", "Quiz", 10), Vec::new()),
            (event("e2", "Debate", 20), teams(2, 0)),
        ];
        let failed = vec!["e1".to_string()];
        let summary = summarize(&input, &failed, MARKER, 0);

        assert_eq!(summary.total_events, 2);
        assert_eq!(summary.total_revenue, 40);
        assert_eq!(summary.failed_events, failed);
    }

    #[test]
    fn revenue_partition_holds() {
        let input = vec![
            (event("e1", "entertainment EVE night", 150), teams(2, 2)),
            (event("e2", "Quiz", 30), teams(4, 1)),
            (event("e3", "Hack", 75), teams(0, 3)),
            (event("e4", "Entertainment Eve Finals", 20), teams(1, 0)),
        ];
        let summary = summarize(&input, &[], MARKER, 0);

        assert_eq!(
            summary.total_revenue,
            summary.featured_revenue + summary.other_revenue()
        );
        assert_eq!(summary.featured_revenue, 320);
        assert!(summary
            .other_events
            .iter()
            .all(|e| !e.name.to_lowercase().contains(MARKER)));
        assert_eq!(summary.other_events.len(), 2);
    }

    #[test]
    fn overflowing_revenue_is_clamped_consistently() {
        let input = vec![
            (event("e1", "Entertainment Eve", u64::MAX / 2), teams(3, 0)),
            (event("e2", "Quiz", u64::MAX), teams(2, 0)),
            (event("e3", "Hack", 10), teams(1, 0)),
        ];
        let summary = summarize(&input, &[], MARKER, 0);

        assert_eq!(summary.featured_revenue, u64::MAX);
        assert_eq!(summary.other_events[0].total, u64::MAX);
        assert_eq!(summary.other_events[1].total, 10);
        assert_eq!(summary.other_revenue(), u64::MAX);
        assert_eq!(summary.total_revenue, u64::MAX);
        assert_eq!(summary.total_teams, 6);
    }
}
