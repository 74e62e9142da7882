// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use catalog_kit::import::{ImportRecord, ImportReport, Sheet, SheetParser};
use catalog_kit::{
  Brand, CatalogController, CatalogResult, Category, ControllerOptions, CurrentUser, EntityId,
  InMemoryProductSource, MemoryNotificationSink, Product, ProductDraft, ProductPage, ProductQuery, ProductSource,
  Role, StaticTokenAuth, TaxonomyDraft,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{oneshot, Notify};
use tracing::Level;

// --- Fixtures ---
pub fn product(id: &str, category: &str, brand: &str) -> Product {
  Product {
    id: EntityId::from(id),
    name: format!("Producto {}", id),
    code: format!("P-{}", id),
    commercial_code: format!("C-{}", id),
    category_id: Some(EntityId::from(category)),
    brand_id: Some(EntityId::from(brand)),
    category_name: None,
    brand_name: None,
    images: Vec::new(),
    active: true,
    spec_sheet: Vec::new(),
  }
}

pub fn categories() -> Vec<Category> {
  vec![
    Category {
      id: EntityId::from("3"),
      name: "Motor".to_string(),
    },
    Category {
      id: EntityId::from("4"),
      name: "Frenos".to_string(),
    },
  ]
}

pub fn brands() -> Vec<Brand> {
  vec![
    Brand {
      id: EntityId::from("10"),
      name: "Bosch".to_string(),
    },
    Brand {
      id: EntityId::from("11"),
      name: "NGK".to_string(),
    },
  ]
}

/// Ten active products, four of them in category "3".
/// Ids 100..=109; brands alternate between "10" and "11".
pub fn ten_products() -> Vec<Product> {
  (0..10)
    .map(|i| {
      let category = if i < 4 { "3" } else { "4" };
      let brand = if i % 2 == 0 { "10" } else { "11" };
      product(&(100 + i).to_string(), category, brand)
    })
    .collect()
}

pub fn memory_source(products: Vec<Product>) -> Arc<InMemoryProductSource> {
  Arc::new(InMemoryProductSource::with_catalog(products, categories(), brands()))
}

pub fn controller_over(source: Arc<dyn ProductSource>) -> (CatalogController, Arc<MemoryNotificationSink>) {
  let notifier = Arc::new(MemoryNotificationSink::new());
  let controller = CatalogController::new(source, notifier.clone(), ControllerOptions::default());
  (controller, notifier)
}

pub fn admin_auth() -> Arc<StaticTokenAuth> {
  Arc::new(StaticTokenAuth::new(
    "test-token",
    CurrentUser {
      id: EntityId::from(1),
      name: "admin".to_string(),
      role: Role::Admin,
    },
  ))
}

pub fn vendor_auth() -> Arc<StaticTokenAuth> {
  Arc::new(StaticTokenAuth::new(
    "vendor-token",
    CurrentUser {
      id: EntityId::from(2),
      name: "vendedor".to_string(),
      role: Role::Vendor,
    },
  ))
}

// --- Spreadsheet stand-in ---
/// Returns the same sheet for any file, so tests never need real workbook bytes.
pub struct FixedSheetParser(pub Sheet);

impl FixedSheetParser {
  pub fn new(headers: &[&str], rows: &[&[&str]]) -> Arc<Self> {
    let rows: Vec<Vec<String>> = rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect();
    Arc::new(Self(Sheet::from_rows(headers.iter().copied(), rows)))
  }
}

impl SheetParser for FixedSheetParser {
  fn parse(&self, _file_name: &str, _bytes: &[u8]) -> CatalogResult<Sheet> {
    Ok(self.0.clone())
  }
}

// --- Gated source for ordering tests ---
/// Wraps an in-memory source. A listing call that finds a gate queued waits on it
/// before answering; `entered` is signalled as soon as such a call arrives.
pub struct GatedSource {
  pub inner: Arc<InMemoryProductSource>,
  gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
  pub entered: Notify,
  command_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
  pub command_entered: Notify,
  pub import_delay: Mutex<Option<std::time::Duration>>,
}

impl GatedSource {
  pub fn new(inner: Arc<InMemoryProductSource>) -> Arc<Self> {
    Arc::new(Self {
      inner,
      gates: Mutex::new(VecDeque::new()),
      entered: Notify::new(),
      command_gates: Mutex::new(VecDeque::new()),
      command_entered: Notify::new(),
      import_delay: Mutex::new(None),
    })
  }

  /// The next listing call blocks until the returned sender fires (or is dropped).
  pub fn hold_next(&self) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel();
    self.gates.lock().push_back(rx);
    tx
  }

  /// Same as `hold_next`, for the next delete or activation change.
  pub fn hold_next_command(&self) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel();
    self.command_gates.lock().push_back(rx);
    tx
  }

  async fn pass_command_gate(&self) {
    let gate = self.command_gates.lock().pop_front();
    if let Some(gate) = gate {
      self.command_entered.notify_one();
      let _ = gate.await;
    }
  }

  pub fn delay_imports(&self, delay: std::time::Duration) {
    *self.import_delay.lock() = Some(delay);
  }
}

#[async_trait]
impl ProductSource for GatedSource {
  async fn list_active_products(&self, query: &ProductQuery) -> CatalogResult<ProductPage> {
    let gate = self.gates.lock().pop_front();
    if let Some(gate) = gate {
      self.entered.notify_one();
      let _ = gate.await;
    }
    self.inner.list_active_products(query).await
  }

  async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
    self.inner.list_categories().await
  }

  async fn list_brands(&self) -> CatalogResult<Vec<Brand>> {
    self.inner.list_brands().await
  }

  async fn bulk_import(&self, rows: &[ImportRecord]) -> CatalogResult<ImportReport> {
    let delay = *self.import_delay.lock();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    self.inner.bulk_import(rows).await
  }

  async fn create_product(&self, draft: &ProductDraft) -> CatalogResult<Product> {
    self.inner.create_product(draft).await
  }

  async fn update_product(&self, id: &EntityId, draft: &ProductDraft) -> CatalogResult<Product> {
    self.inner.update_product(id, draft).await
  }

  async fn set_product_active(&self, id: &EntityId, active: bool) -> CatalogResult<()> {
    self.pass_command_gate().await;
    self.inner.set_product_active(id, active).await
  }

  async fn delete_product(&self, id: &EntityId) -> CatalogResult<()> {
    self.pass_command_gate().await;
    self.inner.delete_product(id).await
  }

  async fn create_category(&self, draft: &TaxonomyDraft) -> CatalogResult<Category> {
    self.inner.create_category(draft).await
  }

  async fn update_category(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Category> {
    self.inner.update_category(id, draft).await
  }

  async fn delete_category(&self, id: &EntityId) -> CatalogResult<()> {
    self.inner.delete_category(id).await
  }

  async fn create_brand(&self, draft: &TaxonomyDraft) -> CatalogResult<Brand> {
    self.inner.create_brand(draft).await
  }

  async fn update_brand(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Brand> {
    self.inner.update_brand(id, draft).await
  }

  async fn delete_brand(&self, id: &EntityId) -> CatalogResult<()> {
    self.inner.delete_brand(id).await
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
