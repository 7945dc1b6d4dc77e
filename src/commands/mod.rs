//! Non-interactive subcommands.
//!
//! Each command takes the API behind `&dyn AdminApi` so it can run against a
//! mock in tests. Failures are printed for the user and returned to `main`.

pub mod auth;
pub mod events;
pub mod teams;
pub mod users;

use crate::api::error::ApiError;
use crate::error_classifier::ErrorClassifier;
use crate::export::ExportFormat;
use crate::print_cmd_error;
use crate::table::TableView;
use std::error::Error;
use std::path::PathBuf;

pub type CmdResult<T = ()> = Result<T, Box<dyn Error>>;

/// Search and paging flags shared by the list commands.
#[derive(Debug, Clone, clap::Args)]
pub struct TableArgs {
    /// Case-insensitive text matched against the searchable columns
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page [default: from config, else 10]
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl TableArgs {
    pub fn view(&self, default_page_size: usize, category: Option<String>) -> TableView {
        let mut view = TableView::new(self.page_size.unwrap_or(default_page_size));
        view.set_query(self.search.clone().unwrap_or_default());
        view.set_category(category);
        view.set_page(self.page);
        view
    }
}

impl Default for TableArgs {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            page_size: None,
        }
    }
}

/// Flags shared by the export commands.
#[derive(Debug, Clone, clap::Args)]
pub struct ExportArgs {
    /// Destination file; `.csv` or `.xlsx`
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// Overrides the format implied by the file extension
    #[arg(long)]
    pub format: Option<ExportFormat>,

    /// Export only rows matching this text
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

impl ExportArgs {
    pub fn view(&self, category: Option<String>) -> TableView {
        let mut view = TableView::new(usize::MAX);
        view.set_query(self.search.clone().unwrap_or_default());
        view.set_category(category);
        view
    }
}

/// Prints an API failure in user-facing terms and logs it at its classified level.
pub(crate) fn api_failure(title: &str, error: ApiError) -> Box<dyn Error> {
    let level = ErrorClassifier::new().classify_api_error(&error);
    log::log!(log::Level::from(level), "{}: {}", title, error);
    print_cmd_error!(title, &error.user_message());
    error.into()
}

/// Prints a failed form check. Nothing is sent.
pub(crate) fn invalid_input(message: String) -> Box<dyn Error> {
    print_cmd_error!("Invalid input.", &message);
    Box::from(message)
}

pub(crate) fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}
