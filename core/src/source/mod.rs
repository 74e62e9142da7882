// catalog_kit/src/source/mod.rs

//! The remote product source: the backend that owns products, taxonomies,
//! free-text search and bulk import.
//!
//! `ProductSource` is the seam the controller and the import pipeline talk to.
//! [`http::HttpProductSource`] is the production implementation;
//! [`memory::InMemoryProductSource`] keeps the same semantics in memory.

pub mod http;
pub mod memory;

use crate::error::CatalogResult;
use crate::filter::FilterState;
use crate::import::record::{ImportRecord, ImportReport};
use crate::model::{Brand, Category, EntityId, Product, ProductDraft, ProductPage, TaxonomyDraft};
use async_trait::async_trait;

/// Arguments of `listActiveProducts`. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
  pub page: u32,
  pub page_size: u32,
  pub search: Option<String>,
  pub category_id: Option<EntityId>,
  pub brand_ids: Vec<EntityId>,
}

impl ProductQuery {
  /// First page of everything, sized to hold the whole active collection.
  pub fn all(page_size: u32) -> Self {
    Self {
      page: 1,
      page_size: page_size.max(1),
      search: None,
      category_id: None,
      brand_ids: Vec::new(),
    }
  }

  /// Delegates every part of `filters` (search, category, brands, page) to the source.
  pub fn from_filters(filters: &FilterState) -> Self {
    Self {
      page: filters.page(),
      page_size: filters.page_size(),
      search: filters.search_term().map(str::to_string),
      category_id: filters.category_id().cloned(),
      brand_ids: filters.brand_ids().iter().cloned().collect(),
    }
  }
}

#[async_trait]
pub trait ProductSource: Send + Sync {
  async fn list_active_products(&self, query: &ProductQuery) -> CatalogResult<ProductPage>;

  async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

  async fn list_brands(&self) -> CatalogResult<Vec<Brand>>;

  /// Submits one batch. The source deduplicates and creates missing brands and
  /// categories on its own; the report only summarizes what it did.
  async fn bulk_import(&self, rows: &[ImportRecord]) -> CatalogResult<ImportReport>;

  async fn create_product(&self, draft: &ProductDraft) -> CatalogResult<Product>;

  async fn update_product(&self, id: &EntityId, draft: &ProductDraft) -> CatalogResult<Product>;

  async fn set_product_active(&self, id: &EntityId, active: bool) -> CatalogResult<()>;

  async fn delete_product(&self, id: &EntityId) -> CatalogResult<()>;

  async fn create_category(&self, draft: &TaxonomyDraft) -> CatalogResult<Category>;

  async fn update_category(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Category>;

  /// Fails with `Conflict` while products still reference the category.
  async fn delete_category(&self, id: &EntityId) -> CatalogResult<()>;

  async fn create_brand(&self, draft: &TaxonomyDraft) -> CatalogResult<Brand>;

  async fn update_brand(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Brand>;

  /// Fails with `Conflict` while products still reference the brand.
  async fn delete_brand(&self, id: &EntityId) -> CatalogResult<()>;
}
