// catalog_kit/examples/bulk_import.rs

use catalog_kit::import::Sheet;
use catalog_kit::{
  CatalogError, CatalogResult, ImportOptions, ImportSession, InMemoryProductSource, SheetParser, SystemField,
};
use std::sync::Arc;
use tracing::info;

// A parser that ignores the bytes and returns a fixed sheet,
// so the example runs without a real workbook on disk.
struct DemoSheet;

impl SheetParser for DemoSheet {
  fn parse(&self, _file_name: &str, _bytes: &[u8]) -> CatalogResult<Sheet> {
    Ok(Sheet::from_rows(
      ["SKU", "Artículo", "Fabricante", "Rubro"],
      [
        ["F-100", "Filtro de aceite", "Bosch", "Motor"],
        ["F-101", "Filtro de aire", "Mann", "Motor"],
        ["", "Sin código", "Bosch", "Motor"],
        ["P-200", "Pastilla de freno", "Brembo", "Frenos"],
      ],
    ))
  }
}

#[tokio::main]
async fn main() -> Result<(), CatalogError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Bulk Import Example ---");

  let source = InMemoryProductSource::new();
  let mut session = ImportSession::new(Arc::new(DemoSheet), ImportOptions::default());

  // 1. Load: headers are read and columns inferred.
  session.load_file("lista_precios.xlsx", b"")?;
  for (field, column) in session.mapping().iter() {
    info!("{} <- {}", field.label(), column);
  }

  // 2. "Artículo" matches no keyword, so the product name is mapped by hand.
  if let Err(CatalogError::MissingMapping { fields }) = session.confirm_mapping() {
    info!(?fields, "Mapping incomplete");
  }
  session.set_mapping(SystemField::ProductName, Some("Artículo"))?;
  let summary = session.confirm_mapping()?;
  info!(valid = summary.valid, invalid = summary.invalid, "Preview ready");

  for row in session.rows().iter().filter(|r| !r.valid) {
    info!(row = row.row_number, errors = ?row.errors, "Row will be skipped");
  }

  // 3. Submit the valid rows as one batch.
  let outcome = session.submit_import(&source).await?;
  info!(
    imported = outcome.report.imported,
    brands_created = outcome.report.brands_created,
    categories_created = outcome.report.categories_created,
    skipped = outcome.skipped,
    "Import finished"
  );
  assert_eq!(outcome.report.imported, 3);
  assert_eq!(outcome.skipped, 1);

  Ok(())
}
