//! Team listing, verification, creation and membership.

use super::{CmdResult, ExportArgs, TableArgs, api_failure, invalid_input, yes_no};
use crate::api::AdminApi;
use crate::cli_messages::{print_page_footer, print_table};
use crate::export;
use crate::fetch::{FetchReport, cancellable, fetch_all_teams, fetch_events};
use crate::models::{Event, Team, UserDirectory};
use crate::validation::{self, JoinTeamForm, NewTeamForm};
use crate::{print_cmd_error, print_cmd_success, print_cmd_warn};
use std::error::Error;
use tokio_util::sync::CancellationToken;

/// Looks an event up by id or slug.
pub fn resolve_event<'a>(events: &'a [Event], key: &str) -> Option<&'a Event> {
    events.iter().find(|e| e.id == key || e.slug == key)
}

/// Looks a team up by id or, ignoring case, by team code.
pub fn find_team<'a>(teams: &'a [Team], key: &str) -> Option<&'a Team> {
    teams.iter().find(|t| {
        t.id == key || (!t.team_code.is_empty() && t.team_code.eq_ignore_ascii_case(key))
    })
}

fn not_found(what: &str, key: &str) -> Box<dyn Error> {
    let message = format!("No {} matches '{}'.", what, key);
    print_cmd_error!(&message);
    Box::from(message)
}

async fn fetch_report(api: &dyn AdminApi, cancel: &CancellationToken) -> CmdResult<FetchReport> {
    let report = fetch_all_teams(api, cancel)
        .await
        .map_err(|e| api_failure("Failed to fetch teams.", e))?;
    for (event_id, error) in &report.failed {
        print_cmd_warn!(
            "Teams of one event could not be loaded.",
            "Event {}: {}",
            event_id,
            error.user_message()
        );
    }
    Ok(report)
}

fn event_filter(report: &FetchReport, event: Option<&str>) -> CmdResult<Option<String>> {
    let Some(key) = event else {
        return Ok(None);
    };
    let events: Vec<Event> = report.events.iter().map(|(e, _)| e.clone()).collect();
    resolve_event(&events, key)
        .map(|e| Some(e.id.clone()))
        .ok_or_else(|| not_found("event", key))
}

/// Prints one page of teams across all events.
pub async fn list(
    api: &dyn AdminApi,
    args: &TableArgs,
    event: Option<&str>,
    default_page_size: usize,
    cancel: &CancellationToken,
) -> CmdResult {
    let report = fetch_report(api, cancel).await?;
    let teams = report.teams();
    let view = args.view(default_page_size, event_filter(&report, event)?);
    let page = view.page(&teams);

    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|team| {
            vec![
                team.id.clone(),
                team.team_name.clone(),
                team.team_code.clone(),
                team.event_id.name().unwrap_or("N/A").to_string(),
                team.members.len().to_string(),
                yes_no(team.is_verified),
            ]
        })
        .collect();
    print_table(&["ID", "Team Name", "Code", "Event", "Members", "Verified"], &rows);
    print_page_footer(page.page, page.total_pages, page.total_matches);
    Ok(())
}

/// Writes every team matching the filters, with leader and member details.
pub async fn export(
    api: &dyn AdminApi,
    args: &ExportArgs,
    event: Option<&str>,
    cancel: &CancellationToken,
) -> CmdResult<usize> {
    let (report, users) = tokio::join!(
        fetch_report(api, cancel),
        cancellable(cancel, api.list_users())
    );
    let report = report?;
    let users = users.map_err(|e| api_failure("Failed to fetch users.", e))?;

    let teams = report.teams();
    let view = args.view(event_filter(&report, event)?);
    let rows = view.filter(&teams);
    let directory = UserDirectory::new(&users);
    let written =
        export::export(&rows, &directory, &args.output, args.format).map_err(|e| {
            print_cmd_error!("Export failed.", &e.to_string());
            e
        })?;
    print_cmd_success!(
        "Export complete.",
        "{} teams written to {}",
        written,
        args.output.display()
    );
    Ok(written)
}

/// Marks a team as verified by its code.
pub async fn verify(api: &dyn AdminApi, team_code: &str) -> CmdResult {
    if team_code.trim().is_empty() {
        return Err(invalid_input("Team code is required.".to_string()));
    }
    api.verify_team(team_code.trim())
        .await
        .map_err(|e| api_failure("Failed to verify team", e))?;
    print_cmd_success!("Team verified successfully", "Team code {}", team_code.trim());
    Ok(())
}

/// Sets the verification flag of a team found by id or code.
pub async fn set_verification(
    api: &dyn AdminApi,
    team: &str,
    is_verified: bool,
    cancel: &CancellationToken,
) -> CmdResult {
    let report = fetch_report(api, cancel).await?;
    let teams = report.teams();
    let team = find_team(&teams, team).ok_or_else(|| not_found("team", team))?;

    api.set_team_verification(&team.id, team.event_id.id(), is_verified)
        .await
        .map_err(|e| api_failure("Failed to update verification status on the server", e))?;
    print_cmd_success!(
        "Verification updated.",
        "Team verification status updated to {}",
        if is_verified { "verified" } else { "not verified" }
    );
    Ok(())
}

/// Creates a team for an event given by id or slug.
pub async fn create(
    api: &dyn AdminApi,
    mut form: NewTeamForm,
    cancel: &CancellationToken,
) -> CmdResult {
    validation::check(&form).map_err(invalid_input)?;

    let events = fetch_events(api, cancel)
        .await
        .map_err(|e| api_failure("Failed to fetch events.", e))?;
    let event = resolve_event(&events, &form.event_id)
        .ok_or_else(|| not_found("event", &form.event_id))?;
    form.event_id = event.id.clone();
    form.event_slug = event.slug.clone();

    api.create_team(&form)
        .await
        .map_err(|e| api_failure("Error creating team", e))?;
    print_cmd_success!(
        "Team created successfully!",
        "{} registered for {}",
        form.team_name,
        event.name
    );
    Ok(())
}

/// Adds a user to the team with the given code.
pub async fn add_member(api: &dyn AdminApi, form: JoinTeamForm) -> CmdResult {
    validation::check(&form).map_err(invalid_input)?;
    api.join_team(&form.user_id, &form.team_code)
        .await
        .map_err(|e| api_failure("Failed to add team member", e))?;
    print_cmd_success!(
        "Team member added successfully",
        "User {} joined team {}",
        form.user_id,
        form.team_code
    );
    Ok(())
}

/// Member rows of a team: name, email, phone and whether the member leads the team.
///
/// Members missing from the directory are shown by their raw id.
pub fn member_rows(team: &Team, directory: &UserDirectory<'_>) -> Vec<Vec<String>> {
    team.members
        .iter()
        .map(|member| {
            let leader = if member.user_id() == team.leader_id {
                "Leader"
            } else {
                ""
            };
            match directory.resolve(member) {
                Some(user) => vec![
                    user.name.clone(),
                    user.email.clone(),
                    user.phone.clone(),
                    leader.to_string(),
                ],
                None => vec![
                    member.user_id().to_string(),
                    String::new(),
                    String::new(),
                    leader.to_string(),
                ],
            }
        })
        .collect()
}

/// Prints the members of a team found by id or code.
pub async fn members(api: &dyn AdminApi, team: &str, cancel: &CancellationToken) -> CmdResult {
    let (report, users) = tokio::join!(
        fetch_report(api, cancel),
        cancellable(cancel, api.list_users())
    );
    let report = report?;
    let users = users.map_err(|e| api_failure("Failed to load user data", e))?;

    let teams = report.teams();
    let found = find_team(&teams, team).ok_or_else(|| not_found("team", team))?;
    let directory = UserDirectory::new(&users);

    println!(
        "{} ({}), {}, verified: {}\n",
        found.team_name,
        found.team_code,
        found.event_id.name().unwrap_or("N/A"),
        yes_no(found.is_verified)
    );
    print_table(&["Name", "Email", "Phone", "Role"], &member_rows(found, &directory));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockAdminApi;
    use crate::api::error::ApiError;
    use crate::models::{EventRef, MemberRef, User};
    use mockall::predicate::eq;

    fn events() -> Vec<Event> {
        vec![
            Event {
                id: "e1".into(),
                slug: "quiz".into(),
                name: "Quiz".into(),
                ..Default::default()
            },
            Event {
                id: "e2".into(),
                slug: "hack".into(),
                name: "Hackathon".into(),
                ..Default::default()
            },
        ]
    }

    fn team(id: &str, code: &str, event_id: &str) -> Team {
        Team {
            id: id.into(),
            team_code: code.into(),
            team_name: format!("Team {id}"),
            event_id: EventRef::Id(event_id.into()),
            ..Default::default()
        }
    }

    #[test]
    fn lookups_accept_ids_slugs_and_codes() {
        let events = events();
        assert_eq!(resolve_event(&events, "hack").unwrap().id, "e2");
        assert_eq!(resolve_event(&events, "e1").unwrap().slug, "quiz");
        assert!(resolve_event(&events, "chess").is_none());

        let teams = vec![team("t1", "AB12", "e1"), team("t2", "", "e2")];
        assert_eq!(find_team(&teams, "ab12").unwrap().id, "t1");
        assert_eq!(find_team(&teams, "t2").unwrap().id, "t2");
        assert!(find_team(&teams, "").is_none());
    }

    #[test]
    fn member_rows_flag_leader_and_fall_back_to_ids() {
        let users = vec![User {
            id: "u1".into(),
            name: "Asha".into(),
            email: "asha@fest.in".into(),
            phone: "111".into(),
            ..Default::default()
        }];
        let mut t = team("t1", "AB12", "e1");
        t.leader_id = "u1".into();
        t.members = vec![MemberRef::Id("u1".into()), MemberRef::Id("u9".into())];

        let rows = member_rows(&t, &UserDirectory::new(&users));
        assert_eq!(rows[0], vec!["Asha", "asha@fest.in", "111", "Leader"]);
        assert_eq!(rows[1], vec!["u9", "", "", ""]);
    }

    #[tokio::test]
    async fn set_verification_uses_owning_event() {
        let mut api = MockAdminApi::new();
        api.expect_list_events().returning(|| Ok(events()));
        api.expect_event_teams().returning(|id| match id {
            "e2" => Ok(vec![team("t7", "ZX90", "e2")]),
            _ => Ok(vec![]),
        });
        api.expect_set_team_verification()
            .with(eq("t7"), eq("e2"), eq(false))
            .times(1)
            .returning(|_, _, _| Ok(()));

        set_verification(&api, "zx90", false, &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_team_is_reported() {
        let mut api = MockAdminApi::new();
        api.expect_list_events().returning(|| Ok(events()));
        api.expect_event_teams().returning(|_| Ok(vec![]));
        api.expect_set_team_verification().never();

        let err = set_verification(&api, "nope", true, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No team matches 'nope'.");
    }

    #[tokio::test]
    async fn create_resolves_event_slug() {
        let mut api = MockAdminApi::new();
        api.expect_list_events().returning(|| Ok(events()));
        api.expect_create_team()
            .withf(|form| {
                form.event_id == "e2" && form.event_slug == "hack" && form.team_name == "Byte Me"
            })
            .times(1)
            .returning(|_| Ok(()));

        let form = NewTeamForm {
            team_name: "Byte Me".into(),
            event_id: "hack".into(),
            leader_id: "u1".into(),
            ..Default::default()
        };
        create(&api, form, &CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn create_without_leader_sends_nothing() {
        let mut api = MockAdminApi::new();
        api.expect_list_events().never();
        api.expect_create_team().never();

        let form = NewTeamForm {
            team_name: "Byte Me".into(),
            event_id: "hack".into(),
            ..Default::default()
        };
        let err = create(&api, form, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select a team leader.");
    }

    #[tokio::test]
    async fn add_member_requires_user() {
        let mut api = MockAdminApi::new();
        api.expect_join_team().never();

        let form = JoinTeamForm {
            user_id: String::new(),
            team_code: "AB12".into(),
        };
        assert!(add_member(&api, form).await.is_err());
    }

    #[tokio::test]
    async fn verify_by_code_reports_server_failure() {
        let mut api = MockAdminApi::new();
        api.expect_verify_team()
            .with(eq("AB12"))
            .returning(|_| {
                Err(ApiError::Rejected {
                    message: "Team not found".into(),
                })
            });

        assert!(verify(&api, " AB12 ").await.is_err());
    }
}
