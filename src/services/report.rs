//! Report input and output.
//!
//! - Organizations are read from a CSV with `organization_name,type` headers
//! - Each organization gets its own CSV in the run's output directory
//! - When running under GitHub Actions, rows are also exported through `GITHUB_ENV`
//!
//! Every report has the same nine columns, in [`REPORT_COLUMNS`] order. An
//! organization always gets at least one row: its matches, a
//! `NO_MATCH_FOUND` placeholder, or an `ERROR` placeholder carrying the
//! failure message.

use crate::core::search::SearchOutcome;
use crate::models::{AccountMatch, OrganizationRecord, SearchQuery};
use chrono::NaiveDateTime;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::Validate;

/// Report columns, in file order
pub const REPORT_COLUMNS: [&str; 9] = [
    "search_term",
    "organization_type",
    "handle",
    "display_name",
    "description",
    "follower_count",
    "following_count",
    "posts_count",
    "search_date",
];

/// Errors that can occur reading or writing reports
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read the organizations to search for from a CSV file
pub fn read_organizations(path: &Path) -> Result<Vec<OrganizationRecord>, ReportError> {
    let file = std::fs::File::open(path).map_err(|e| ReportError::io(path, e))?;
    read_organizations_from(file)
}

/// Read organizations from any CSV source, skipping rows without a name
pub fn read_organizations_from<R: Read>(reader: R) -> Result<Vec<OrganizationRecord>, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut organizations = Vec::new();
    for (line, record) in reader.deserialize::<OrganizationRecord>().enumerate() {
        let record = record?;
        if let Err(e) = record.validate() {
            tracing::warn!("Skipping organization row {}: {}", line + 1, e);
            continue;
        }
        organizations.push(record);
    }

    Ok(organizations)
}

/// Name of a run's output directory, e.g. `uk_research_orgs_2024-11-20_09-30`
pub fn output_dir_name(prefix: &str, started_at: NaiveDateTime) -> String {
    format!("{}_{}", prefix, started_at.format("%Y-%m-%d_%H-%M"))
}

/// Report file name for an organization
pub fn report_file_name(org_name: &str) -> String {
    format!("{}.csv", org_name.replace(' ', "_"))
}

/// Rows to write for one organization's search
pub fn report_rows(query: &SearchQuery, outcome: &SearchOutcome) -> Vec<AccountMatch> {
    if !outcome.matches.is_empty() {
        return outcome.matches.clone();
    }

    match &outcome.error {
        Some(e) => vec![AccountMatch::failure(query, e.to_string(), outcome.search_date)],
        None => vec![AccountMatch::no_match(query, outcome.search_date)],
    }
}

/// Write an organization's report into `dir`, returning the file path
pub fn write_report(
    dir: &Path,
    org_name: &str,
    rows: &[AccountMatch],
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;

    let path = dir.join(report_file_name(org_name));
    let file = std::fs::File::create(&path).map_err(|e| ReportError::io(&path, e))?;
    write_rows(std::io::BufWriter::new(file), rows)?;

    Ok(path)
}

/// Write report rows as CSV, header included even when there are no rows
pub fn write_rows<W: Write>(writer: W, rows: &[AccountMatch]) -> Result<(), ReportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    if rows.is_empty() {
        csv_writer.write_record(REPORT_COLUMNS)?;
    }

    for row in rows {
        csv_writer.serialize(row)?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Environment file exported to later GitHub Actions steps
#[derive(Debug, Clone)]
pub struct GithubEnv {
    path: PathBuf,
}

impl GithubEnv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `$GITHUB_ENV` when set
    pub fn from_env() -> Option<Self> {
        std::env::var_os("GITHUB_ENV")
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `KEY=value`
    pub fn export_var(&self, key: &str, value: &str) -> Result<(), ReportError> {
        self.append(&[format!("{}={}", key, single_line(value))])
    }

    /// Export an organization's header, matched rows and row count
    pub fn export_report(&self, org_name: &str, matches: &[AccountMatch]) -> Result<(), ReportError> {
        let key = env_key(org_name);
        let mut lines = Vec::with_capacity(matches.len() + 2);

        lines.push(format!("CSV_{}_HEADER={}", key, REPORT_COLUMNS.join(",")));
        for (i, row) in matches.iter().enumerate() {
            lines.push(format!("CSV_{}_ROW_{}={}", key, i + 1, row_values(row).join(",")));
        }
        lines.push(format!("CSV_{}_ROW_COUNT={}", key, matches.len()));

        self.append(&lines)
    }

    fn append(&self, lines: &[String]) -> Result<(), ReportError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ReportError::io(&self.path, e))?;

        for line in lines {
            writeln!(file, "{}", line).map_err(|e| ReportError::io(&self.path, e))?;
        }

        Ok(())
    }
}

/// Variable-name fragment for an organization: `Museum of London` -> `MUSEUM_OF_LONDON`
pub fn env_key(org_name: &str) -> String {
    org_name.replace(' ', "_").to_uppercase()
}

fn row_values(row: &AccountMatch) -> Vec<String> {
    vec![
        single_line(&row.search_term),
        single_line(&row.organization_type),
        single_line(&row.handle),
        single_line(&row.display_name),
        single_line(row.description.as_deref().unwrap_or_default()),
        row.follower_count.to_string(),
        row.following_count.to_string(),
        row.posts_count.to_string(),
        row.search_date.format("%Y-%m-%d").to_string(),
    ]
}

// GITHUB_ENV is line-oriented
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
