// tests/import_session_tests.rs

mod common;

use catalog_kit::import::{ImportOptions, ImportSession, ImportStep, SystemField};
use catalog_kit::{CatalogError, InMemoryProductSource, ProductSource};
use common::*;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

const HEADERS: &[&str] = &["Código", "Código Comercial", "Producto", "Marca", "Categoría"];

fn session(headers: &[&str], rows: &[&[&str]]) -> ImportSession {
  ImportSession::new(FixedSheetParser::new(headers, rows), ImportOptions::default())
}

fn previewed(rows: &[&[&str]]) -> ImportSession {
  let mut s = session(HEADERS, rows);
  s.load_file("productos.xlsx", b"").unwrap();
  s.confirm_mapping().unwrap();
  s
}

#[test]
fn headers_are_auto_mapped_by_keyword() {
  setup_tracing();
  let mut s = session(
    &["SKU", "Nombre Producto", "Marca", "Categoria"],
    &[&["A1", "Filtro", "Bosch", "Motor"]],
  );
  s.load_file("lista.xlsx", b"").unwrap();

  assert_eq!(s.step(), ImportStep::ConfigureMapping);
  let mapping = s.mapping();
  assert_eq!(mapping.get(SystemField::Code), Some("SKU"));
  assert_eq!(mapping.get(SystemField::ProductName), Some("Nombre Producto"));
  assert_eq!(mapping.get(SystemField::Brand), Some("Marca"));
  assert_eq!(mapping.get(SystemField::Category), Some("Categoria"));
  assert_eq!(mapping.get(SystemField::CommercialCode), None);
}

#[test]
fn other_extensions_are_rejected_without_state_change() {
  let mut s = session(HEADERS, &[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  let err = s.load_file("productos.csv", b"").unwrap_err();
  assert!(matches!(err, CatalogError::UnsupportedFile { .. }));
  assert!(err.is_input_error());
  assert_eq!(s.step(), ImportStep::SelectFile);
  assert!(s.file_name().is_none());
}

#[test]
fn unmapped_required_fields_block_confirmation() {
  let mut s = session(&["SKU", "Descripcion", "Fabricante X", "Rubro Y"], &[&["A1", "Filtro", "Bosch", "Motor"]]);
  s.load_file("productos.xls", b"").unwrap();
  s.set_mapping(SystemField::Brand, None).unwrap();
  s.set_mapping(SystemField::Category, None).unwrap();

  match s.confirm_mapping() {
    Err(CatalogError::MissingMapping { fields }) => assert_eq!(fields, vec!["Marca", "Categoría"]),
    other => panic!("expected MissingMapping, got {:?}", other.map(|_| ())),
  }
  assert_eq!(s.step(), ImportStep::ConfigureMapping);

  s.set_mapping(SystemField::Brand, Some("Fabricante X")).unwrap();
  s.set_mapping(SystemField::Category, Some("Rubro Y")).unwrap();
  assert!(s.set_mapping(SystemField::Category, Some("No existe")).is_err());
  let step = s.next_step().unwrap();
  assert_eq!(step, ImportStep::Preview);
  assert_eq!(s.summary().valid, 1);
}

#[test]
fn blank_commercial_code_resolves_to_code() {
  let s = previewed(&[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  let row = &s.rows()[0];
  assert!(row.valid);
  assert_eq!(row.commercial_code, "A1");
  assert_eq!(row.row_number, 2);
}

#[test]
fn missing_code_makes_the_row_invalid() {
  let s = previewed(&[&["", "", "X", "Y", "Z"]]);
  let row = &s.rows()[0];
  assert!(!row.valid);
  assert!(row.errors.contains(&"Código vacío".to_string()));
}

#[test]
fn going_back_keeps_the_mapping_and_drops_rows() {
  let mut s = previewed(&[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  assert_eq!(s.previous_step().unwrap(), ImportStep::ConfigureMapping);
  assert!(s.rows().is_empty());
  assert_eq!(s.mapping().get(SystemField::Code), Some("Código"));
  assert!(s.previous_step().is_err());
  s.confirm_mapping().unwrap();
  assert_eq!(s.rows().len(), 1);
}

#[test]
fn preview_pages_are_display_only() {
  let rows: Vec<Vec<String>> = (0..30)
    .map(|i| vec![format!("C{}", i), String::new(), "P".into(), "B".into(), "K".into()])
    .collect();
  let row_refs: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
  let slices: Vec<&[&str]> = row_refs.iter().map(Vec::as_slice).collect();
  let s = previewed(&slices);

  assert_eq!(s.preview_page(3, 10).len(), 10);
  assert!(s.preview_page(4, 10).is_empty());
  assert_eq!(s.valid_records().len(), 30);
}

#[tokio::test]
#[serial]
async fn only_valid_rows_are_submitted() {
  setup_tracing();
  let source = memory_source(ten_products());
  let mut s = previewed(&[
    &["A1", "", "Filtro", "Bosch", "Motor"],
    &["", "", "Sin código", "Bosch", "Motor"],
    &["A2", "COM-2", "Pastilla", "Brembo", "Frenos"],
    &["P-100", "", "Repetido", "NGK", "Motor"],
  ]);
  assert_eq!(s.summary().invalid, 1);

  let outcome = s.submit_import(source.as_ref()).await.unwrap();

  assert_eq!(s.step(), ImportStep::Result);
  assert_eq!(outcome.submitted, 3);
  assert_eq!(outcome.skipped, 1);
  assert_eq!(outcome.report.imported, 2);
  assert_eq!(outcome.report.duplicates, 1);
  assert_eq!(outcome.report.brands_created, 1);
  assert_eq!(outcome.report.categories_created, 0);
  assert!(outcome.report.has_exceptions());

  let batches = source.import_batches();
  assert_eq!(batches.len(), 1);
  assert!(batches[0].iter().all(|r| !r.code.is_empty()));
  assert_eq!(batches[0][0].commercial_code, "A1");
  assert_eq!(s.outcome(), Some(&outcome));
}

#[tokio::test]
#[serial]
async fn failed_submission_stays_in_preview() {
  setup_tracing();
  let source = memory_source(Vec::new());
  let mut s = previewed(&[&["A1", "", "Filtro", "Bosch", "Motor"]]);

  source.fail_next("backend unavailable");
  let err = s.submit_import(source.as_ref()).await.unwrap_err();
  assert!(err.is_transport_error());
  assert_eq!(s.step(), ImportStep::Preview);
  assert!(!s.is_submitting());
  assert!(s.last_error().is_some());

  s.dismiss_error();
  assert!(s.last_error().is_none());
  let outcome = s.submit_import(source.as_ref()).await.unwrap();
  assert_eq!(outcome.report.imported, 1);
}

#[tokio::test]
#[serial]
async fn nothing_is_sent_without_valid_rows() {
  let source = memory_source(Vec::new());
  let mut s = previewed(&[&["", "", "", "", ""], &["A1", "", "", "Bosch", "Motor"]]);

  let err = s.submit_import(source.as_ref()).await.unwrap_err();
  assert!(matches!(err, CatalogError::Validation(_)));
  assert!(source.import_batches().is_empty());
  assert_eq!(s.step(), ImportStep::Preview);
}

#[tokio::test]
#[serial]
async fn slow_submission_times_out() {
  setup_tracing();
  let gated = GatedSource::new(memory_source(Vec::new()));
  gated.delay_imports(Duration::from_secs(2));
  let parser = FixedSheetParser::new(HEADERS, &[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  let mut s = ImportSession::new(
    parser,
    ImportOptions {
      submit_timeout: Some(Duration::from_millis(50)),
    },
  );
  s.load_file("productos.xlsx", b"").unwrap();
  s.confirm_mapping().unwrap();

  let source: Arc<dyn ProductSource> = gated.clone();
  let err = s.submit_import(source.as_ref()).await.unwrap_err();
  assert!(matches!(err, CatalogError::Timeout { .. }));
  assert_eq!(s.step(), ImportStep::Preview);
}

#[tokio::test]
#[serial]
async fn dropped_submission_releases_the_session() {
  setup_tracing();
  let gated = GatedSource::new(memory_source(Vec::new()));
  gated.delay_imports(Duration::from_secs(5));
  let mut s = previewed(&[&["A1", "", "Filtro", "Bosch", "Motor"]]);

  let source: Arc<dyn ProductSource> = gated.clone();
  let cut_short = tokio::time::timeout(Duration::from_millis(20), s.submit_import(source.as_ref())).await;
  assert!(cut_short.is_err());

  assert!(!s.is_submitting());
  assert!(s.last_error().is_some());
  assert_eq!(s.step(), ImportStep::Preview);
  assert_eq!(s.previous_step().unwrap(), ImportStep::ConfigureMapping);
  s.confirm_mapping().unwrap();

  *gated.import_delay.lock() = None;
  let outcome = s.submit_import(source.as_ref()).await.unwrap();
  assert_eq!(outcome.report.imported, 1);
  assert_eq!(s.step(), ImportStep::Result);
}

#[tokio::test]
#[serial]
async fn failed_submission_can_be_reset() {
  let source = memory_source(Vec::new());
  let mut s = previewed(&[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  source.fail_next("backend unavailable");
  assert!(s.submit_import(source.as_ref()).await.is_err());

  s.reset();
  assert_eq!(s.step(), ImportStep::SelectFile);
  assert!(s.last_error().is_none());
  assert!(!s.is_submitting());
  s.load_file("productos.xlsx", b"").unwrap();
  assert_eq!(s.step(), ImportStep::ConfigureMapping);
}

#[tokio::test]
#[serial]
async fn answer_after_abandon_is_refused() {
  let source = memory_source(Vec::new());
  let mut s = previewed(&[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  let batch = s.begin_submission().unwrap();
  assert!(s.abandon_submission());
  assert!(!s.is_submitting());

  let late = source.bulk_import(&batch).await;
  assert!(matches!(
    s.finish_submission(late),
    Err(CatalogError::InvalidTransition { .. })
  ));
  assert_eq!(s.step(), ImportStep::Preview);
  assert!(s.outcome().is_none());

  let retry = s.begin_submission().unwrap();
  let outcome = s.finish_submission(source.bulk_import(&retry).await).unwrap();
  assert_eq!(outcome.submitted, 1);
}

#[tokio::test]
#[serial]
async fn second_submission_while_in_flight_is_rejected() {
  let mut s = previewed(&[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  let batch = s.begin_submission().unwrap();
  assert_eq!(batch.len(), 1);
  assert!(matches!(
    s.begin_submission(),
    Err(CatalogError::InvalidTransition { .. })
  ));
  assert!(s.previous_step().is_err());

  let source = InMemoryProductSource::new();
  let report = source.bulk_import(&batch).await;
  let outcome = s.finish_submission(report).unwrap();
  assert_eq!(outcome.report.imported, 1);
  assert_eq!(outcome.report.brands_created, 1);
  assert_eq!(outcome.report.categories_created, 1);
}

#[tokio::test]
#[serial]
async fn load_path_reads_from_disk() {
  let path = std::env::temp_dir().join("catalog_kit_load_path_test.xlsx");
  tokio::fs::write(&path, b"placeholder").await.unwrap();

  let mut s = session(HEADERS, &[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  s.load_path(&path).await.unwrap();
  assert_eq!(s.file_name(), Some("catalog_kit_load_path_test.xlsx"));
  assert_eq!(s.step(), ImportStep::ConfigureMapping);
  let _ = tokio::fs::remove_file(&path).await;

  let mut missing = session(HEADERS, &[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  let err = missing.load_path("/definitely/not/here.xlsx").await.unwrap_err();
  assert!(matches!(err, CatalogError::Parse { .. }));
  assert_eq!(missing.step(), ImportStep::SelectFile);
}

#[test]
fn reset_discards_everything() {
  let mut s = previewed(&[&["A1", "", "Filtro", "Bosch", "Motor"]]);
  s.reset();
  assert_eq!(s.step(), ImportStep::SelectFile);
  assert!(s.rows().is_empty());
  assert!(s.headers().is_empty());
  assert!(s.file_name().is_none());
}
