// catalog_kit/src/import/rows.rs

use super::fields::SystemField;
use super::mapping::ColumnMapping;
use super::reader::Sheet;
use super::record::ImportRecord;
use serde::Serialize;

/// One spreadsheet row after mapping and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
  pub row_number: usize,
  pub code: String,
  pub commercial_code: String,
  pub product_name: String,
  pub brand_name: String,
  pub category_name: String,
  pub valid: bool,
  pub errors: Vec<String>,
}

impl ImportRow {
  fn field(&self, field: SystemField) -> &str {
    match field {
      SystemField::Code => &self.code,
      SystemField::CommercialCode => &self.commercial_code,
      SystemField::ProductName => &self.product_name,
      SystemField::Brand => &self.brand_name,
      SystemField::Category => &self.category_name,
    }
  }

  pub fn to_record(&self) -> ImportRecord {
    ImportRecord {
      code: self.code.clone(),
      commercial_code: self.commercial_code.clone(),
      product_name: self.product_name.clone(),
      brand_name: self.brand_name.clone(),
      category_name: self.category_name.clone(),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
  pub valid: usize,
  pub invalid: usize,
  pub total: usize,
}

/// Extracts and validates every row of `sheet` through `mapping`.
/// Rows are independent: one bad row never affects another.
pub fn build_rows(sheet: &Sheet, mapping: &ColumnMapping) -> Vec<ImportRow> {
  sheet
    .rows
    .iter()
    .map(|source| {
      let take = |field: SystemField| -> String {
        mapping
          .get(field)
          .and_then(|column| sheet.value(source, column))
          .map(|v| v.trim().to_string())
          .unwrap_or_default()
      };
      let code = take(SystemField::Code);
      let commercial_code = match take(SystemField::CommercialCode) {
        c if c.is_empty() => code.clone(),
        c => c,
      };
      let mut row = ImportRow {
        row_number: source.number,
        code,
        commercial_code,
        product_name: take(SystemField::ProductName),
        brand_name: take(SystemField::Brand),
        category_name: take(SystemField::Category),
        valid: false,
        errors: Vec::new(),
      };
      row.errors = SystemField::ALL
        .into_iter()
        .filter(|f| f.required() && row.field(*f).is_empty())
        .filter_map(SystemField::empty_error)
        .map(str::to_string)
        .collect();
      row.valid = row.errors.is_empty();
      row
    })
    .collect()
}

pub fn summarize(rows: &[ImportRow]) -> ImportSummary {
  let valid = rows.iter().filter(|r| r.valid).count();
  ImportSummary {
    valid,
    invalid: rows.len() - valid,
    total: rows.len(),
  }
}
