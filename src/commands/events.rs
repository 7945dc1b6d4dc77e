//! Event listing, details, create/update from JSON files, soft delete and export.

use super::{CmdResult, ExportArgs, TableArgs, api_failure, invalid_input};
use crate::api::AdminApi;
use crate::cli_messages::{print_page_footer, print_table};
use crate::export::{self, Exportable};
use crate::fetch::fetch_events;
use crate::models::{Event, UserDirectory};
use crate::validation::{self, EventForm};
use crate::{print_cmd_error, print_cmd_success};
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;

fn load_json(path: &Path) -> CmdResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| {
        print_cmd_error!("Failed to read event file.", &e.to_string());
        e
    })?;
    serde_json::from_str(&text).map_err(|e| {
        print_cmd_error!("Event file is not valid JSON.", &e.to_string());
        e.into()
    })
}

fn parse_form(value: Value) -> CmdResult<EventForm> {
    serde_json::from_value(value).map_err(|e| {
        print_cmd_error!("Event file does not describe an event.", &e.to_string());
        e.into()
    })
}

/// Overlays the fields present in `patch` on top of the event's current values.
pub fn merge_form(event: &Event, patch: Value) -> CmdResult<EventForm> {
    let mut base = serde_json::to_value(EventForm::from(event))?;
    match (base.as_object_mut(), patch) {
        (Some(base), Value::Object(patch)) => {
            base.extend(patch);
        }
        _ => return Err(invalid_input("Event file must hold a JSON object.".to_string())),
    }
    parse_form(base)
}

async fn find_event(
    api: &dyn AdminApi,
    slug: &str,
    cancel: &CancellationToken,
) -> CmdResult<Event> {
    let events = fetch_events(api, cancel)
        .await
        .map_err(|e| api_failure("Failed to fetch events.", e))?;
    events
        .into_iter()
        .find(|e| e.slug == slug || e.id == slug)
        .ok_or_else(|| -> Box<dyn Error> {
            let message = format!("No event matches '{}'.", slug);
            print_cmd_error!(&message);
            Box::from(message)
        })
}

/// Prints one page of the non-deleted events.
pub async fn list(
    api: &dyn AdminApi,
    args: &TableArgs,
    default_page_size: usize,
    cancel: &CancellationToken,
) -> CmdResult {
    let events = fetch_events(api, cancel)
        .await
        .map_err(|e| api_failure("Failed to fetch events.", e))?;
    let view = args.view(default_page_size, None);
    let page = view.page(&events);

    let directory = UserDirectory::default();
    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|event| {
            let mut row = vec![event.slug.clone()];
            row.extend(event.row(&directory));
            row
        })
        .collect();
    let mut headers = vec!["Slug"];
    headers.extend(Event::headers());
    print_table(&headers, &rows);
    print_page_footer(page.page, page.total_pages, page.total_matches);
    Ok(())
}

/// Prints every field of one event, with its prizes and FAQ.
pub async fn show(api: &dyn AdminApi, slug: &str, cancel: &CancellationToken) -> CmdResult {
    let event = find_event(api, slug, cancel).await?;

    println!("{} ({})", event.name, event.slug);
    if !event.description.is_empty() {
        println!("\n{}\n", event.description);
    }
    let details = vec![
        vec!["Fees".to_string(), event.fees.to_string()],
        vec![
            "Team size".to_string(),
            format!("{} - {}", event.min_team_size, event.max_team_size),
        ],
        vec![
            "Registration".to_string(),
            format!(
                "{} to {}",
                event.registration_start_date, event.registration_end_date
            ),
        ],
        vec![
            "Event date".to_string(),
            event.event_date.clone().unwrap_or_else(|| "N/A".to_string()),
        ],
        vec![
            "Discount".to_string(),
            event.discount.clone().unwrap_or_else(|| "None".to_string()),
        ],
    ];
    print_table(&["Field", "Value"], &details);

    if !event.prize.is_empty() {
        println!();
        let prizes: Vec<Vec<String>> = event
            .prize
            .iter()
            .map(|p| vec![p.position.clone(), p.amount.to_string()])
            .collect();
        print_table(&["Position", "Amount"], &prizes);
    }
    for faq in &event.faq {
        println!("\nQ: {}\nA: {}", faq.ques, faq.ans);
    }
    Ok(())
}

/// Creates an event from a JSON file holding the event form.
pub async fn create(api: &dyn AdminApi, file: &Path) -> CmdResult {
    let form = parse_form(load_json(file)?)?;
    validation::check(&form).map_err(invalid_input)?;

    api.create_event(&form)
        .await
        .map_err(|e| api_failure("Failed to save event. Please check your input.", e))?;
    print_cmd_success!("Event created.", "{}", form.name);
    Ok(())
}

/// Updates an event. Fields missing from the file keep their current values.
pub async fn update(
    api: &dyn AdminApi,
    slug: &str,
    file: &Path,
    cancel: &CancellationToken,
) -> CmdResult {
    let patch = load_json(file)?;
    let event = find_event(api, slug, cancel).await?;
    let form = merge_form(&event, patch)?;
    validation::check(&form).map_err(invalid_input)?;

    api.update_event(&event.slug, &form)
        .await
        .map_err(|e| api_failure("Failed to save event. Please check your input.", e))?;
    print_cmd_success!("Event updated.", "{}", form.name);
    Ok(())
}

/// Soft-deletes an event; it stays in the backend but drops out of every view.
pub async fn delete(api: &dyn AdminApi, slug: &str) -> CmdResult {
    api.delete_event(slug)
        .await
        .map_err(|e| api_failure("Failed to delete event.", e))?;
    print_cmd_success!("Event deleted.", "{}", slug);
    Ok(())
}

/// Writes every non-deleted event matching the search to a file.
pub async fn export(
    api: &dyn AdminApi,
    args: &ExportArgs,
    cancel: &CancellationToken,
) -> CmdResult<usize> {
    let events = fetch_events(api, cancel)
        .await
        .map_err(|e| api_failure("Failed to fetch events.", e))?;
    let rows = args.view(None).filter(&events);
    let written = export::export(&rows, &UserDirectory::default(), &args.output, args.format)
        .map_err(|e| {
            print_cmd_error!("Export failed.", &e.to_string());
            e
        })?;
    print_cmd_success!(
        "Export complete.",
        "{} events written to {}",
        written,
        args.output.display()
    );
    Ok(written)
}
