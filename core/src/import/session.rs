// catalog_kit/src/import/session.rs

//! The import wizard as a state machine:
//! `SelectFile → ConfigureMapping → Preview → Result`.
//!
//! Transitions only go forward, except `previous_step` from Preview back to
//! ConfigureMapping. Every rejected transition leaves the session untouched.

use super::fields::SystemField;
use super::mapping::ColumnMapping;
use super::reader::{check_extension, CalamineParser, Sheet, SheetParser};
use super::record::{ImportOutcome, ImportRecord, ImportReport};
use super::rows::{build_rows, summarize, ImportRow, ImportSummary};
use crate::error::{CatalogError, CatalogResult};
use crate::filter::paginate;
use crate::source::ProductSource;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, instrument, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportStep {
  SelectFile,
  ConfigureMapping,
  Preview,
  Result,
}

impl fmt::Display for ImportStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ImportStep::SelectFile => "select file",
      ImportStep::ConfigureMapping => "configure mapping",
      ImportStep::Preview => "preview",
      ImportStep::Result => "result",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
  /// Upper bound for the bulk-import call. `None` waits forever.
  pub submit_timeout: Option<Duration>,
}

impl Default for ImportOptions {
  fn default() -> Self {
    Self {
      submit_timeout: Some(Duration::from_secs(300)),
    }
  }
}

/// Sends one batch, bounded by `timeout`.
pub async fn send_batch(
  source: &dyn ProductSource,
  records: &[ImportRecord],
  timeout: Option<Duration>,
) -> CatalogResult<ImportReport> {
  match timeout {
    Some(limit) => tokio::time::timeout(limit, source.bulk_import(records))
      .await
      .map_err(|_| CatalogError::Timeout {
        operation: "bulk import".to_string(),
        seconds: limit.as_secs(),
      })?,
    None => source.bulk_import(records).await,
  }
}

pub struct ImportSession {
  parser: Arc<dyn SheetParser>,
  options: ImportOptions,
  step: ImportStep,
  file_name: Option<String>,
  sheet: Sheet,
  mapping: ColumnMapping,
  rows: Vec<ImportRow>,
  /// Number of rows in flight; `Some` while a submission is pending.
  in_flight: Option<usize>,
  outcome: Option<ImportOutcome>,
  last_error: Option<String>,
}

impl Default for ImportSession {
  fn default() -> Self {
    Self::new(Arc::new(CalamineParser), ImportOptions::default())
  }
}

impl ImportSession {
  pub fn new(parser: Arc<dyn SheetParser>, options: ImportOptions) -> Self {
    Self {
      parser,
      options,
      step: ImportStep::SelectFile,
      file_name: None,
      sheet: Sheet::default(),
      mapping: ColumnMapping::default(),
      rows: Vec::new(),
      in_flight: None,
      outcome: None,
      last_error: None,
    }
  }

  pub fn step(&self) -> ImportStep {
    self.step
  }

  pub fn file_name(&self) -> Option<&str> {
    self.file_name.as_deref()
  }

  pub fn headers(&self) -> &[String] {
    &self.sheet.headers
  }

  pub fn mapping(&self) -> &ColumnMapping {
    &self.mapping
  }

  pub fn rows(&self) -> &[ImportRow] {
    &self.rows
  }

  pub fn summary(&self) -> ImportSummary {
    summarize(&self.rows)
  }

  pub fn outcome(&self) -> Option<&ImportOutcome> {
    self.outcome.as_ref()
  }

  pub fn last_error(&self) -> Option<&str> {
    self.last_error.as_deref()
  }

  pub fn is_submitting(&self) -> bool {
    self.in_flight.is_some()
  }

  fn invalid(&self, action: &str) -> CatalogError {
    CatalogError::InvalidTransition {
      step: self.step.to_string(),
      action: action.to_string(),
    }
  }

  fn expect_step(&self, expected: ImportStep, action: &str) -> CatalogResult<()> {
    if self.step != expected || self.in_flight.is_some() {
      return Err(self.invalid(action));
    }
    Ok(())
  }

  /// Parses `bytes` and moves to ConfigureMapping with an inferred mapping.
  #[instrument(name = "ImportSession::load_file", skip(self, bytes), fields(size = bytes.len()), err(Display))]
  pub fn load_file(&mut self, file_name: &str, bytes: &[u8]) -> CatalogResult<()> {
    self.expect_step(ImportStep::SelectFile, "load a file")?;
    check_extension(file_name)?;
    let sheet = self.parser.parse(file_name, bytes)?;
    if sheet.is_empty() {
      return Err(CatalogError::EmptyFile {
        file_name: file_name.to_string(),
      });
    }

    self.mapping = ColumnMapping::infer(&sheet.headers);
    event!(
      Level::INFO,
      rows = sheet.rows.len(),
      columns = sheet.headers.len(),
      complete = self.mapping.is_complete(),
      "Spreadsheet loaded."
    );
    self.sheet = sheet;
    self.file_name = Some(file_name.to_string());
    self.last_error = None;
    self.step = ImportStep::ConfigureMapping;
    Ok(())
  }

  pub async fn load_path(&mut self, path: impl AsRef<Path>) -> CatalogResult<()> {
    let path = path.as_ref();
    let file_name = path
      .file_name()
      .and_then(|n| n.to_str())
      .unwrap_or_default()
      .to_string();
    self.expect_step(ImportStep::SelectFile, "load a file")?;
    check_extension(&file_name)?;
    let bytes = tokio::fs::read(path).await.map_err(|e| CatalogError::Parse {
      file_name: file_name.clone(),
      source: anyhow::Error::new(e),
    })?;
    self.load_file(&file_name, &bytes)
  }

  pub fn set_mapping(&mut self, field: SystemField, column: Option<&str>) -> CatalogResult<()> {
    self.expect_step(ImportStep::ConfigureMapping, "change the mapping")?;
    self.mapping.set(field, column, &self.sheet.headers)
  }

  /// Builds and validates the rows, then moves to Preview.
  pub fn confirm_mapping(&mut self) -> CatalogResult<ImportSummary> {
    self.expect_step(ImportStep::ConfigureMapping, "confirm the mapping")?;
    let missing = self.mapping.missing_required();
    if !missing.is_empty() {
      return Err(CatalogError::MissingMapping {
        fields: missing.iter().map(|f| f.label().to_string()).collect(),
      });
    }
    self.rows = build_rows(&self.sheet, &self.mapping);
    let summary = self.summary();
    event!(Level::INFO, valid = summary.valid, invalid = summary.invalid, "Import rows validated.");
    self.step = ImportStep::Preview;
    Ok(summary)
  }

  /// Advances one step where that needs no I/O. From Preview use `submit_import`.
  pub fn next_step(&mut self) -> CatalogResult<ImportStep> {
    match self.step {
      ImportStep::ConfigureMapping => self.confirm_mapping().map(|_| self.step),
      _ => Err(self.invalid("advance")),
    }
  }

  /// Preview → ConfigureMapping. The mapping is kept; rows are rebuilt on the next confirm.
  pub fn previous_step(&mut self) -> CatalogResult<ImportStep> {
    self.expect_step(ImportStep::Preview, "go back")?;
    self.rows.clear();
    self.last_error = None;
    self.step = ImportStep::ConfigureMapping;
    Ok(self.step)
  }

  /// Display-only page of the validated rows.
  pub fn preview_page(&self, page: u32, page_size: u32) -> Vec<ImportRow> {
    paginate(&self.rows, page, page_size)
  }

  pub fn valid_records(&self) -> Vec<ImportRecord> {
    self.rows.iter().filter(|r| r.valid).map(ImportRow::to_record).collect()
  }

  /// First half of a submission: marks the session busy and hands out the batch.
  /// Callers holding the session behind a lock release it before awaiting the send.
  pub fn begin_submission(&mut self) -> CatalogResult<Vec<ImportRecord>> {
    self.expect_step(ImportStep::Preview, "submit")?;
    let records = self.valid_records();
    if records.is_empty() {
      let err = CatalogError::Validation("no hay filas válidas para importar".to_string());
      self.last_error = Some(err.to_string());
      return Err(err);
    }
    self.last_error = None;
    self.in_flight = Some(records.len());
    Ok(records)
  }

  /// Second half: records the source's answer. On failure the session stays in Preview.
  pub fn finish_submission(&mut self, result: CatalogResult<ImportReport>) -> CatalogResult<ImportOutcome> {
    let submitted = match self.in_flight.take() {
      Some(n) => n,
      None => return Err(self.invalid("finish a submission")),
    };
    match result {
      Ok(report) => {
        let outcome = ImportOutcome {
          report,
          submitted,
          skipped: self.summary().invalid,
        };
        event!(
          Level::INFO,
          imported = outcome.report.imported,
          failed = outcome.report.failed,
          duplicates = outcome.report.duplicates,
          skipped = outcome.skipped,
          "Bulk import finished."
        );
        self.outcome = Some(outcome.clone());
        self.step = ImportStep::Result;
        Ok(outcome)
      }
      Err(err) => {
        event!(Level::WARN, error = %err, "Bulk import failed.");
        self.last_error = Some(err.to_string());
        Err(err)
      }
    }
  }

  /// Gives up on a submission whose answer will never arrive.
  /// The session stays in Preview with an alert. Returns false if nothing was in flight.
  pub fn abandon_submission(&mut self) -> bool {
    match self.in_flight.take() {
      Some(submitted) => {
        event!(Level::WARN, submitted, "Bulk import abandoned before an answer arrived.");
        self.last_error = Some("el envío de la importación se interrumpió antes de recibir respuesta".to_string());
        true
      }
      None => false,
    }
  }

  /// Sends the valid rows as one batch. Invalid rows are counted as skipped.
  ///
  /// Dropping the returned future mid-send abandons the submission, so the
  /// session never stays busy.
  pub async fn submit_import(&mut self, source: &dyn ProductSource) -> CatalogResult<ImportOutcome> {
    let timeout = self.options.submit_timeout;
    let records = self.begin_submission()?;
    let mut pending = PendingSubmission {
      session: self,
      settled: false,
    };
    let result = send_batch(source, &records, timeout).await;
    pending.settled = true;
    pending.session.finish_submission(result)
  }

  /// Clears the alert; data and step are untouched.
  pub fn dismiss_error(&mut self) {
    self.last_error = None;
  }

  /// Back to an empty SelectFile, as if the wizard had been closed.
  pub fn reset(&mut self) {
    *self = Self::new(Arc::clone(&self.parser), self.options.clone());
  }
}

/// Holds a session while its batch is out.
struct PendingSubmission<'a> {
  session: &'a mut ImportSession,
  settled: bool,
}

impl Drop for PendingSubmission<'_> {
  fn drop(&mut self) {
    if !self.settled {
      self.session.abandon_submission();
    }
  }
}
