//! Revenue panel
//!
//! Featured revenue, the per-event breakdown, and a bar chart of the other events

use super::super::state::DashboardState;
use super::super::utils::format_rupees;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, BorderType, Borders, Padding, Paragraph, Wrap,
};

const BAR_WIDTH: u16 = 9;

/// Title-cased form of the featured marker, e.g. "Entertainment Eve".
pub fn featured_label(marker: &str) -> String {
    marker
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn breakdown_lines(state: &DashboardState) -> Vec<Line<'static>> {
    let summary = &state.summary;
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} Revenue: ", featured_label(&state.featured_marker)),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                format_rupees(summary.featured_revenue),
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Other Events Revenue: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_rupees(summary.other_revenue()),
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];

    if summary.other_events.is_empty() {
        lines.push(Line::from(Span::styled(
            "No revenue data available.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for event in &summary.other_events {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", event.name), Style::default().fg(Color::White)),
            Span::styled(
                format!(
                    "{} teams x {} / team = {}",
                    event.team_count,
                    format_rupees(event.unit_fee),
                    format_rupees(event.total)
                ),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }

    if !summary.failed_events.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "Teams of {} event(s) failed to load; totals exclude them.",
                summary.failed_events.len()
            ),
            Style::default().fg(Color::LightRed),
        )));
    }
    lines
}

fn short_label(name: &str) -> String {
    name.chars().take(BAR_WIDTH as usize).collect()
}

pub fn render_revenue_panel(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let breakdown = Paragraph::new(breakdown_lines(state))
        .block(
            Block::default()
                .title("REVENUE")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan))
                .padding(Padding::uniform(1)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(breakdown, chunks[0]);

    let bars: Vec<Bar> = state
        .summary
        .other_events
        .iter()
        .map(|event| {
            Bar::default()
                .value(event.total)
                .label(Line::from(short_label(&event.name)))
                .text_value(format_rupees(event.total))
        })
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title("OTHER EVENTS")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::LightGreen))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(chart, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn featured_label_title_cases_marker() {
        assert_eq!(featured_label("entertainment eve"), "Entertainment Eve");
        assert_eq!(featured_label("  gala "), "Gala");
    }

    #[test]
    fn long_names_are_cut_to_bar_width() {
        assert_eq!(short_label("Robotics Challenge"), "Robotics ");
        assert_eq!(short_label("Quiz"), "Quiz");
    }
}
