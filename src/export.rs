//! Spreadsheet and CSV export of table contents.
//!
//! Every table exports the rows that match its current search and filter,
//! regardless of which page is on screen.

use crate::models::{Event, Team, User, UserDirectory};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export.")]
    Empty,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported export format '{0}', expected .csv or .xlsx")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ExportFormat::from_str(ext).map_err(|_| ExportError::UnsupportedFormat(ext.to_string()))
    }
}

/// A record that flattens into one spreadsheet row.
pub trait Exportable {
    /// Worksheet name used for XLSX output.
    const SHEET: &'static str;

    fn headers() -> &'static [&'static str];

    fn row(&self, directory: &UserDirectory<'_>) -> Vec<String>;
}

impl Exportable for User {
    const SHEET: &'static str = "Users";

    fn headers() -> &'static [&'static str] {
        &["Name", "Email", "Phone", "Role"]
    }

    fn row(&self, _: &UserDirectory<'_>) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.role().to_string(),
        ]
    }
}

impl Exportable for Team {
    const SHEET: &'static str = "Teams";

    fn headers() -> &'static [&'static str] {
        &[
            "Team Name",
            "Event Name",
            "Leader Name",
            "Leader Email",
            "Leader Phone",
            "Members Names",
            "Members Phones",
            "Members Emails",
        ]
    }

    fn row(&self, directory: &UserDirectory<'_>) -> Vec<String> {
        let members: Vec<&User> = self
            .members
            .iter()
            .filter_map(|m| directory.resolve(m))
            .collect();
        let leader = members
            .iter()
            .copied()
            .find(|u| u.id == self.leader_id)
            .or_else(|| directory.get(&self.leader_id));
        let join = |field: fn(&User) -> &str| {
            members
                .iter()
                .map(|u| field(u))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let leader_field = |field: fn(&User) -> &str| {
            leader
                .map(field)
                .filter(|v| !v.is_empty())
                .unwrap_or("N/A")
                .to_string()
        };

        vec![
            self.team_name.clone(),
            self.event_id.name().unwrap_or("N/A").to_string(),
            leader_field(|u| u.name.as_str()),
            leader_field(|u| u.email.as_str()),
            leader_field(|u| u.phone.as_str()),
            join(|u| u.name.as_str()),
            join(|u| u.phone.as_str()),
            join(|u| u.email.as_str()),
        ]
    }
}

impl Exportable for Event {
    const SHEET: &'static str = "Events";

    fn headers() -> &'static [&'static str] {
        &[
            "Name",
            "Min Team Size",
            "Max Team Size",
            "Fees",
            "Registration Start",
            "Registration End",
            "Event Date",
        ]
    }

    fn row(&self, _: &UserDirectory<'_>) -> Vec<String> {
        vec![
            self.name.clone(),
            self.min_team_size.to_string(),
            self.max_team_size.to_string(),
            self.fees.to_string(),
            self.registration_start_date.clone(),
            self.registration_end_date.clone(),
            self.event_date
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
        ]
    }
}

/// Writes CSV with a header row. Fields are quoted when they need it.
pub fn write_csv<T: Exportable, W: io::Write>(
    writer: W,
    records: &[&T],
    directory: &UserDirectory<'_>,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(T::headers())?;
    for record in records {
        csv.write_record(record.row(directory))?;
    }
    csv.flush()?;
    Ok(())
}

/// Builds a workbook with a single sheet named after the record type.
pub fn build_workbook<T: Exportable>(
    records: &[&T],
    directory: &UserDirectory<'_>,
) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(T::SHEET)?;

    for (col, header) in T::headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, value) in record.row(directory).iter().enumerate() {
            sheet.write_string(row, col as u16, value)?;
        }
    }
    Ok(workbook)
}

/// Exports `records` to `path` and returns the number of rows written.
///
/// The format comes from `format` when given, otherwise from the file extension.
pub fn export<T: Exportable>(
    records: &[&T],
    directory: &UserDirectory<'_>,
    path: &Path,
    format: Option<ExportFormat>,
) -> Result<usize, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let format = match format {
        Some(format) => format,
        None => ExportFormat::from_path(path)?,
    };

    match format {
        ExportFormat::Csv => {
            let file = std::fs::File::create(path)?;
            write_csv(file, records, directory)?;
        }
        ExportFormat::Xlsx => {
            let mut workbook = build_workbook(records, directory)?;
            workbook.save(path)?;
        }
    }
    log::info!(
        "Exported {} {} rows to {}",
        records.len(),
        T::SHEET.to_lowercase(),
        path.display()
    );
    Ok(records.len())
}
