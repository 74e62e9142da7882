// catalog_kit/src/import/mapping.rs

use super::fields::SystemField;
use crate::error::{CatalogError, CatalogResult};
use crate::model::normalize::fold_accent;
use serde::Serialize;
use std::collections::BTreeMap;

/// `SystemField → column header`. Unmapped fields are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnMapping {
  columns: BTreeMap<SystemField, String>,
}

/// Lowercase, accent-free, separators collapsed to single spaces.
pub(crate) fn fold_header(text: &str) -> String {
  let folded: String = text
    .chars()
    .map(fold_accent)
    .flat_map(char::to_lowercase)
    .map(|c| if matches!(c, '_' | '-' | '.' | '/') { ' ' } else { c })
    .collect();
  folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl ColumnMapping {
  /// Guesses a column for every field from the headers.
  ///
  /// Fields go in `SystemField::INFERENCE_ORDER`; for each field keywords are
  /// tried in order, and for each keyword the headers in order. A header
  /// claimed by one field is never offered to another.
  pub fn infer(headers: &[String]) -> Self {
    let folded: Vec<String> = headers.iter().map(|h| fold_header(h)).collect();
    let mut claimed = vec![false; headers.len()];
    let mut columns = BTreeMap::new();

    for field in SystemField::INFERENCE_ORDER {
      let hit = field.keywords().iter().find_map(|keyword| {
        folded
          .iter()
          .enumerate()
          .find(|(idx, header)| !claimed[*idx] && header.contains(keyword))
          .map(|(idx, _)| idx)
      });
      if let Some(idx) = hit {
        claimed[idx] = true;
        columns.insert(field, headers[idx].clone());
      }
    }
    Self { columns }
  }

  pub fn get(&self, field: SystemField) -> Option<&str> {
    self.columns.get(&field).map(String::as_str)
  }

  /// Maps `field` to `column`, which must be one of `headers`. `None` unmaps.
  pub fn set(&mut self, field: SystemField, column: Option<&str>, headers: &[String]) -> CatalogResult<()> {
    match column {
      Some(column) => {
        if !headers.iter().any(|h| h == column) {
          return Err(CatalogError::Validation(format!(
            "la columna '{}' no existe en el archivo",
            column
          )));
        }
        self.columns.insert(field, column.to_string());
      }
      None => {
        self.columns.remove(&field);
      }
    }
    Ok(())
  }

  pub fn missing_required(&self) -> Vec<SystemField> {
    SystemField::ALL
      .into_iter()
      .filter(|f| f.required() && !self.columns.contains_key(f))
      .collect()
  }

  pub fn is_complete(&self) -> bool {
    self.missing_required().is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (SystemField, &str)> {
    self.columns.iter().map(|(f, c)| (*f, c.as_str()))
  }
}
