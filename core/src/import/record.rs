// catalog_kit/src/import/record.rs

use serde::{Deserialize, Serialize};

/// One valid row as the bulk-import endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
  pub code: String,
  pub commercial_code: String,
  pub product_name: String,
  pub brand_name: String,
  pub category_name: String,
}

/// What the source says it did with a batch. Counters it leaves out are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportReport {
  #[serde(alias = "importados", alias = "created")]
  pub imported: usize,
  #[serde(alias = "fallidos", alias = "errorsCount")]
  pub failed: usize,
  #[serde(alias = "duplicados", alias = "skipped")]
  pub duplicates: usize,
  #[serde(alias = "marcasCreadas")]
  pub brands_created: usize,
  #[serde(alias = "categoriasCreadas")]
  pub categories_created: usize,
  pub errors: Vec<String>,
}

impl ImportReport {
  /// Accepted, but the source rejected or skipped some rows.
  pub fn has_exceptions(&self) -> bool {
    self.failed > 0 || self.duplicates > 0
  }
}

/// The report plus what the session did locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
  pub report: ImportReport,
  /// Rows sent to the source.
  pub submitted: usize,
  /// Invalid rows that never left the client.
  pub skipped: usize,
}
