// catalog_kit/src/import/mod.rs

//! Bulk import: spreadsheet → column inference → mapping → row validation →
//! one batch to the product source → summary.

pub mod fields;
pub mod mapping;
pub mod reader;
pub mod record;
pub mod rows;
pub mod session;

pub use fields::SystemField;
pub use mapping::ColumnMapping;
pub use reader::{check_extension, CalamineParser, Sheet, SheetParser, SheetRow, ACCEPTED_EXTENSIONS};
pub use record::{ImportOutcome, ImportRecord, ImportReport};
pub use rows::{build_rows, summarize, ImportRow, ImportSummary};
pub use session::{send_batch, ImportOptions, ImportSession, ImportStep};
