// catalog_kit/src/source/memory.rs

//! An in-process product source with the backend's semantics: active-only
//! listing, accent-insensitive search, referential checks on taxonomy deletes
//! and brand/category auto-creation on bulk import.

use super::{ProductQuery, ProductSource};
use crate::error::{CatalogError, CatalogResult};
use crate::filter::{filter_products, paginate, FilterCriteria};
use crate::import::record::{ImportRecord, ImportReport};
use crate::model::normalize::fold_accent;
use crate::model::{Brand, Category, EntityId, Product, ProductDraft, ProductPage, TaxonomyDraft};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{event, Level};

#[derive(Debug, Default)]
struct Store {
  products: Vec<Product>,
  categories: Vec<Category>,
  brands: Vec<Brand>,
  next_id: i64,
}

impl Store {
  fn allocate_id(&mut self) -> EntityId {
    self.next_id += 1;
    EntityId::from(self.next_id)
  }

  fn product_mut(&mut self, id: &EntityId) -> CatalogResult<&mut Product> {
    self
      .products
      .iter_mut()
      .find(|p| &p.id == id)
      .ok_or_else(|| CatalogError::NotFound(format!("producto {}", id)))
  }
}

#[derive(Debug, Default)]
pub struct InMemoryProductSource {
  store: Mutex<Store>,
  failures: Mutex<VecDeque<String>>,
  list_calls: AtomicUsize,
  import_batches: Mutex<Vec<Vec<ImportRecord>>>,
}

fn fold(text: &str) -> String {
  text.chars().map(fold_accent).flat_map(char::to_lowercase).collect()
}

fn same_name(a: &str, b: &str) -> bool {
  fold(a.trim()) == fold(b.trim())
}

impl InMemoryProductSource {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_catalog(products: Vec<Product>, categories: Vec<Category>, brands: Vec<Brand>) -> Self {
    let next_id = products
      .iter()
      .map(|p| &p.id)
      .chain(categories.iter().map(|c| &c.id))
      .chain(brands.iter().map(|b| &b.id))
      .filter_map(|id| id.as_str().parse::<i64>().ok())
      .max()
      .unwrap_or(0);
    Self {
      store: Mutex::new(Store {
        products,
        categories,
        brands,
        next_id,
      }),
      ..Self::default()
    }
  }

  /// The next call (of any kind) fails with a transport error carrying `message`.
  pub fn fail_next(&self, message: impl Into<String>) {
    self.failures.lock().push_back(message.into());
  }

  /// How many times `list_active_products` reached the store.
  pub fn list_calls(&self) -> usize {
    self.list_calls.load(Ordering::SeqCst)
  }

  pub fn import_batches(&self) -> Vec<Vec<ImportRecord>> {
    self.import_batches.lock().clone()
  }

  pub fn products(&self) -> Vec<Product> {
    self.store.lock().products.clone()
  }

  fn take_failure(&self, operation: &str) -> CatalogResult<()> {
    match self.failures.lock().pop_front() {
      Some(message) => {
        event!(Level::DEBUG, %operation, %message, "Injected failure.");
        Err(CatalogError::Transport {
          source: anyhow::anyhow!(message),
        })
      }
      None => Ok(()),
    }
  }

  fn product_from_draft(id: EntityId, draft: &ProductDraft, store: &Store) -> Product {
    let category_name = draft
      .category_id
      .as_ref()
      .and_then(|id| store.categories.iter().find(|c| &c.id == id))
      .map(|c| c.name.clone());
    let brand_name = draft
      .brand_id
      .as_ref()
      .and_then(|id| store.brands.iter().find(|b| &b.id == id))
      .map(|b| b.name.clone());
    Product {
      id,
      name: draft.name.trim().to_string(),
      code: draft.code.trim().to_string(),
      commercial_code: draft.commercial_code.trim().to_string(),
      category_id: draft.category_id.clone(),
      brand_id: draft.brand_id.clone(),
      category_name,
      brand_name,
      images: draft.images.clone(),
      active: draft.active,
      spec_sheet: draft.spec_sheet.clone(),
    }
  }
}

fn matches_search(product: &Product, term: &str) -> bool {
  let term = fold(term);
  [&product.name, &product.code, &product.commercial_code]
    .iter()
    .any(|field| fold(field).contains(&term))
}

#[async_trait]
impl ProductSource for InMemoryProductSource {
  async fn list_active_products(&self, query: &ProductQuery) -> CatalogResult<ProductPage> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    self.take_failure("list active products")?;
    let store = self.store.lock();
    let active: Vec<Product> = store
      .products
      .iter()
      .filter(|p| p.active)
      .filter(|p| query.search.as_deref().map_or(true, |term| matches_search(p, term)))
      .cloned()
      .collect();
    let criteria = FilterCriteria {
      category_id: query.category_id.clone(),
      brand_ids: query.brand_ids.iter().cloned().collect(),
    };
    let matching = filter_products(&active, &criteria);
    Ok(ProductPage {
      total: matching.len(),
      items: paginate(&matching, query.page, query.page_size),
    })
  }

  async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
    self.take_failure("list categories")?;
    Ok(self.store.lock().categories.clone())
  }

  async fn list_brands(&self) -> CatalogResult<Vec<Brand>> {
    self.take_failure("list brands")?;
    Ok(self.store.lock().brands.clone())
  }

  async fn bulk_import(&self, rows: &[ImportRecord]) -> CatalogResult<ImportReport> {
    self.take_failure("bulk import")?;
    self.import_batches.lock().push(rows.to_vec());

    let mut report = ImportReport::default();
    let mut store = self.store.lock();
    for row in rows {
      if [&row.code, &row.product_name, &row.brand_name, &row.category_name]
        .iter()
        .any(|v| v.trim().is_empty())
      {
        report.failed += 1;
        report.errors.push(format!("Fila incompleta: {}", row.code));
        continue;
      }
      if store.products.iter().any(|p| same_name(&p.code, &row.code)) {
        report.duplicates += 1;
        report.errors.push(format!("Código duplicado: {}", row.code.trim()));
        continue;
      }

      let brand_id = match store.brands.iter().find(|b| same_name(&b.name, &row.brand_name)) {
        Some(brand) => brand.id.clone(),
        None => {
          let id = store.allocate_id();
          store.brands.push(Brand {
            id: id.clone(),
            name: row.brand_name.trim().to_string(),
          });
          report.brands_created += 1;
          id
        }
      };
      let category_id = match store.categories.iter().find(|c| same_name(&c.name, &row.category_name)) {
        Some(category) => category.id.clone(),
        None => {
          let id = store.allocate_id();
          store.categories.push(Category {
            id: id.clone(),
            name: row.category_name.trim().to_string(),
          });
          report.categories_created += 1;
          id
        }
      };

      let id = store.allocate_id();
      store.products.push(Product {
        id,
        name: row.product_name.trim().to_string(),
        code: row.code.trim().to_string(),
        commercial_code: row.commercial_code.trim().to_string(),
        category_id: Some(category_id),
        brand_id: Some(brand_id),
        category_name: Some(row.category_name.trim().to_string()),
        brand_name: Some(row.brand_name.trim().to_string()),
        images: Vec::new(),
        active: true,
        spec_sheet: Vec::new(),
      });
      report.imported += 1;
    }
    Ok(report)
  }

  async fn create_product(&self, draft: &ProductDraft) -> CatalogResult<Product> {
    self.take_failure("create product")?;
    let mut store = self.store.lock();
    if store.products.iter().any(|p| same_name(&p.code, &draft.code)) {
      return Err(CatalogError::Conflict(format!("ya existe un producto con código {}", draft.code.trim())));
    }
    let id = store.allocate_id();
    let product = Self::product_from_draft(id, draft, &store);
    store.products.push(product.clone());
    Ok(product)
  }

  async fn update_product(&self, id: &EntityId, draft: &ProductDraft) -> CatalogResult<Product> {
    self.take_failure("update product")?;
    let mut store = self.store.lock();
    let updated = Self::product_from_draft(id.clone(), draft, &store);
    let product = store.product_mut(id)?;
    *product = updated.clone();
    Ok(updated)
  }

  async fn set_product_active(&self, id: &EntityId, active: bool) -> CatalogResult<()> {
    self.take_failure("toggle product")?;
    self.store.lock().product_mut(id)?.active = active;
    Ok(())
  }

  async fn delete_product(&self, id: &EntityId) -> CatalogResult<()> {
    self.take_failure("delete product")?;
    let mut store = self.store.lock();
    let before = store.products.len();
    store.products.retain(|p| &p.id != id);
    if store.products.len() == before {
      return Err(CatalogError::NotFound(format!("producto {}", id)));
    }
    Ok(())
  }

  async fn create_category(&self, draft: &TaxonomyDraft) -> CatalogResult<Category> {
    self.take_failure("create category")?;
    let mut store = self.store.lock();
    let category = Category {
      id: store.allocate_id(),
      name: draft.name.trim().to_string(),
    };
    store.categories.push(category.clone());
    Ok(category)
  }

  async fn update_category(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Category> {
    self.take_failure("update category")?;
    let mut store = self.store.lock();
    let category = store
      .categories
      .iter_mut()
      .find(|c| &c.id == id)
      .ok_or_else(|| CatalogError::NotFound(format!("categoría {}", id)))?;
    category.name = draft.name.trim().to_string();
    Ok(category.clone())
  }

  async fn delete_category(&self, id: &EntityId) -> CatalogResult<()> {
    self.take_failure("delete category")?;
    let mut store = self.store.lock();
    if store.products.iter().any(|p| p.category_id.as_ref() == Some(id)) {
      return Err(CatalogError::Conflict(
        "No se puede eliminar la categoría porque tiene productos asociados".to_string(),
      ));
    }
    let before = store.categories.len();
    store.categories.retain(|c| &c.id != id);
    if store.categories.len() == before {
      return Err(CatalogError::NotFound(format!("categoría {}", id)));
    }
    Ok(())
  }

  async fn create_brand(&self, draft: &TaxonomyDraft) -> CatalogResult<Brand> {
    self.take_failure("create brand")?;
    let mut store = self.store.lock();
    let brand = Brand {
      id: store.allocate_id(),
      name: draft.name.trim().to_string(),
    };
    store.brands.push(brand.clone());
    Ok(brand)
  }

  async fn update_brand(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Brand> {
    self.take_failure("update brand")?;
    let mut store = self.store.lock();
    let brand = store
      .brands
      .iter_mut()
      .find(|b| &b.id == id)
      .ok_or_else(|| CatalogError::NotFound(format!("marca {}", id)))?;
    brand.name = draft.name.trim().to_string();
    Ok(brand.clone())
  }

  async fn delete_brand(&self, id: &EntityId) -> CatalogResult<()> {
    self.take_failure("delete brand")?;
    let mut store = self.store.lock();
    if store.products.iter().any(|p| p.brand_id.as_ref() == Some(id)) {
      return Err(CatalogError::Conflict(
        "No se puede eliminar la marca porque tiene productos asociados".to_string(),
      ));
    }
    let before = store.brands.len();
    store.brands.retain(|b| &b.id != id);
    if store.brands.len() == before {
      return Err(CatalogError::NotFound(format!("marca {}", id)));
    }
    Ok(())
  }
}
