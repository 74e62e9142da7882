// catalog_kit/src/import/reader.rs

//! Spreadsheet reading. Only the first worksheet matters; the first row holds
//! the headers and every later non-blank row becomes a `SheetRow`.

use crate::error::{CatalogError, CatalogResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::{event, Level};

pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Rejects anything but `.xlsx`/`.xls`, case-insensitively.
pub fn check_extension(file_name: &str) -> CatalogResult<()> {
  let extension = Path::new(file_name)
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase);
  match extension {
    Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
    _ => Err(CatalogError::UnsupportedFile {
      file_name: file_name.to_string(),
      allowed: ACCEPTED_EXTENSIONS.iter().map(|e| format!(".{}", e)).collect::<Vec<_>>().join(", "),
    }),
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
  /// Row number as the spreadsheet shows it; the header is row 1.
  pub number: usize,
  /// One value per header, in header order.
  pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
  pub headers: Vec<String>,
  pub rows: Vec<SheetRow>,
}

impl Sheet {
  /// Builds a sheet from header names and string rows; blank rows are dropped.
  pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
  where
    H: IntoIterator,
    H::Item: Into<String>,
    R: IntoIterator<Item = C>,
    C: IntoIterator,
    C::Item: Into<String>,
  {
    let headers = unique_headers(headers.into_iter().map(Into::into).collect());
    let width = headers.len();
    let rows = rows
      .into_iter()
      .enumerate()
      .map(|(idx, cells)| {
        let mut values: Vec<String> = cells.into_iter().map(Into::into).collect();
        values.resize(width, String::new());
        SheetRow { number: idx + 2, values }
      })
      .filter(|row| row.values.iter().any(|v| !v.trim().is_empty()))
      .collect();
    Self { headers, rows }
  }

  pub fn value<'a>(&self, row: &'a SheetRow, column: &str) -> Option<&'a str> {
    let idx = self.headers.iter().position(|h| h == column)?;
    row.values.get(idx).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

/// Blank headers become "Columna N"; repeated ones get a " (2)", " (3)" suffix.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
  let mut seen = HashSet::new();
  raw
    .into_iter()
    .enumerate()
    .map(|(idx, header)| {
      let base = match header.trim() {
        "" => format!("Columna {}", idx + 1),
        trimmed => trimmed.to_string(),
      };
      let mut candidate = base.clone();
      let mut n = 2;
      while !seen.insert(candidate.clone()) {
        candidate = format!("{} ({})", base, n);
        n += 1;
      }
      candidate
    })
    .collect()
}

pub trait SheetParser: Send + Sync {
  fn parse(&self, file_name: &str, bytes: &[u8]) -> CatalogResult<Sheet>;
}

/// Reads xlsx/xls workbooks with calamine.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalamineParser;

fn render_float(value: f64) -> String {
  if value.fract() == 0.0 && value.abs() < 1e15 {
    format!("{}", value as i64)
  } else {
    value.to_string()
  }
}

fn render_cell(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.trim().to_string(),
    Data::Float(f) => render_float(*f),
    Data::Int(i) => i.to_string(),
    Data::Bool(b) => b.to_string(),
    other => other.to_string(),
  }
}

impl SheetParser for CalamineParser {
  fn parse(&self, file_name: &str, bytes: &[u8]) -> CatalogResult<Sheet> {
    let parse_error = |e: calamine::Error| CatalogError::Parse {
      file_name: file_name.to_string(),
      source: anyhow::Error::new(e),
    };
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(parse_error)?;
    let first = workbook.sheet_names().first().cloned().ok_or_else(|| CatalogError::EmptyFile {
      file_name: file_name.to_string(),
    })?;
    let range = workbook.worksheet_range(&first).map_err(parse_error)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
      Some(header_row) => header_row.iter().map(render_cell).collect(),
      None => Vec::new(),
    };
    let data: Vec<Vec<String>> = rows.map(|r| r.iter().map(render_cell).collect()).collect();
    let sheet = Sheet::from_rows(headers, data);
    event!(Level::DEBUG, %file_name, sheet = %first, columns = sheet.headers.len(), rows = sheet.rows.len(), "Worksheet read.");
    Ok(sheet)
  }
}
