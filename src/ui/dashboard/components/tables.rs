//! Table tabs
//!
//! Search bar, the paged table of the current tab, and its page indicator

use super::super::state::{DashboardState, Tab};
use super::super::utils::format_rupees;
use crate::models::{Event, Team, User, UserDirectory};
use crate::table::Page;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState};

const TEAM_HEADERS: [&str; 6] = ["Team", "Code", "Event", "Leader", "Members", "Verified"];
const USER_HEADERS: [&str; 5] = ["Name", "Email", "Phone", "College", "Role"];
const EVENT_HEADERS: [&str; 6] = ["Name", "Slug", "Fee", "Team Size", "Reg. Closes", "Event Date"];

pub fn team_cells(team: &Team, directory: &UserDirectory<'_>) -> Vec<String> {
    let leader = directory
        .get(&team.leader_id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "N/A".to_string());
    vec![
        team.team_name.clone(),
        team.team_code.clone(),
        team.event_id.name().unwrap_or(team.event_id.id()).to_string(),
        leader,
        team.members.len().to_string(),
        if team.is_verified { "Yes" } else { "No" }.to_string(),
    ]
}

pub fn user_cells(user: &User) -> Vec<String> {
    vec![
        user.name.clone(),
        user.email.clone(),
        user.phone.clone(),
        user.college.clone().unwrap_or_default(),
        user.role().to_string(),
    ]
}

pub fn event_cells(event: &Event) -> Vec<String> {
    vec![
        event.name.clone(),
        event.slug.clone(),
        format_rupees(event.fees),
        format!("{}-{}", event.min_team_size, event.max_team_size),
        event.registration_end_date.clone(),
        event.event_date.clone().unwrap_or_else(|| "N/A".to_string()),
    ]
}

fn widths(count: usize) -> Vec<Constraint> {
    vec![Constraint::Ratio(1, count as u32); count]
}

fn page_rows<T>(page: &Page<'_, T>, cells: impl Fn(&T) -> Vec<String>) -> Vec<Row<'static>> {
    page.rows.iter().map(|&item| Row::new(cells(item))).collect()
}

fn render_search_bar(f: &mut Frame, area: Rect, state: &DashboardState) {
    let query = state.current_view().map(|v| v.query()).unwrap_or_default();
    let cursor = if state.search_mode { "_" } else { "" };
    let border = if state.search_mode {
        Color::LightYellow
    } else {
        Color::DarkGray
    };

    let mut spans = vec![
        Span::styled("Search: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}{}", query, cursor),
            Style::default().fg(Color::White),
        ),
    ];
    if matches!(state.tab, Tab::Teams | Tab::Users) {
        spans.push(Span::styled(
            format!("   Filter: {}", state.category_label()),
            Style::default().fg(Color::LightBlue),
        ));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(bar, area);
}

pub fn render_table_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_search_bar(f, chunks[0], state);

    let directory = UserDirectory::new(&state.users);
    let (headers, rows, page, total_pages, total_matches) = match state.tab {
        Tab::Teams => {
            let page = state.teams_view.page(&state.teams);
            let rows = page_rows(&page, |t| team_cells(t, &directory));
            (&TEAM_HEADERS[..], rows, page.page, page.total_pages, page.total_matches)
        }
        Tab::Users => {
            let page = state.users_view.page(&state.users);
            let rows = page_rows(&page, user_cells);
            (&USER_HEADERS[..], rows, page.page, page.total_pages, page.total_matches)
        }
        Tab::Events => {
            let page = state.events_view.page(&state.events);
            let rows = page_rows(&page, event_cells);
            (&EVENT_HEADERS[..], rows, page.page, page.total_pages, page.total_matches)
        }
        Tab::Overview => return,
    };

    let empty = rows.is_empty();
    let table = Table::new(rows, widths(headers.len()))
        .header(
            Row::new(headers.iter().copied()).style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .block(
            Block::default()
                .title(state.tab.to_string().to_uppercase())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut table_state = TableState::default().with_selected(if empty {
        None
    } else {
        Some(state.selected)
    });
    f.render_stateful_widget(table, chunks[1], &mut table_state);

    let footer = if empty && state.is_loading() {
        "Loading...".to_string()
    } else if empty {
        "No matching records.".to_string()
    } else {
        format!(
            "Page {} of {} ({} matches)",
            page, total_pages, total_matches
        )
    };
    f.render_widget(
        Paragraph::new(footer).style(Style::default().fg(Color::Gray)),
        chunks[2],
    );
}
