// src/lib.rs

//! catalog_kit: the client-side core of a catalog admin application.
//!
//! It provides:
//!  - A hybrid pagination controller that filters locally when it can and
//!    delegates to the product source when a search term is present.
//!  - A result cache keyed by filter state, with epoch-based invalidation.
//!  - A single normalization boundary for heterogeneous backend payloads.
//!  - A bulk-import wizard: spreadsheet reading, column inference,
//!    row validation and batch submission.
//!  - Optimistic toggle/delete commands with snapshot rollback.
//!  - Injected auth and notification services.

pub mod commands;
pub mod error;
pub mod filter;
pub mod import;
pub mod model;
pub mod pagination;
pub mod services;
pub mod shared;
pub mod source;

// --- Re-exports for the Public API ---

pub use crate::error::{CatalogError, CatalogResult};
pub use crate::shared::Shared;

pub use crate::model::{Brand, Category, EntityId, Product, ProductDraft, ProductPage, SpecEntry, TaxonomyDraft};

pub use crate::filter::{filter_products, paginate, FilterCriteria, FilterState};

pub use crate::pagination::{CatalogController, CatalogView, ControllerOptions, FetchKey, FetchStatus, ResultCache, Strategy};

pub use crate::source::http::{HttpProductSource, HttpSourceConfig};
pub use crate::source::memory::InMemoryProductSource;
pub use crate::source::{ProductQuery, ProductSource};

pub use crate::import::{
  CalamineParser, ColumnMapping, ImportOptions, ImportOutcome, ImportRecord, ImportReport, ImportRow, ImportSession,
  ImportStep, ImportSummary, SheetParser, SystemField,
};

pub use crate::services::{
  AuthService, Credentials, CurrentUser, HttpAuthService, MemoryNotificationSink, NotificationLevel,
  NotificationSink, Role, StaticTokenAuth, TracingNotificationSink,
};

pub use crate::commands::{CatalogCommands, ProductCommand};

/*
    Typical wiring:
    1. Build one `Arc<dyn ProductSource>` (`HttpProductSource` against the backend),
       one `Arc<dyn AuthService>` and one `Arc<dyn NotificationSink>` per process.
    2. Give each list screen its own `CatalogController`; share a `ResultCache`
       (`CatalogController::with_cache`) so mutations invalidate every screen.
    3. Drive the filter mutators from the UI and call `load()` to get a `CatalogView`.
    4. Run mutations through `CatalogCommands`, which checks the user's role.
    5. For imports, keep one `ImportSession` per open wizard and call
       `load_file` → `set_mapping`/`confirm_mapping` → `submit_import`.
*/
