// catalog_kit/src/commands.rs

//! Catalog mutations.
//!
//! Toggle-active and delete are optimistic: every cached page is patched
//! before the request goes out and restored from a snapshot if it fails.
//! Everything else validates first, calls the source, and invalidates the
//! cache wholesale on success.

use crate::error::CatalogResult;
use crate::model::{Brand, Category, EntityId, Product, ProductDraft, ProductPage, TaxonomyDraft};
use crate::pagination::CatalogController;
use crate::services::auth::{AuthService, CurrentUser};
use crate::services::notify::NotificationLevel;
use crate::source::ProductSource;
use std::sync::Arc;
use tracing::{event, instrument, Level};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductCommand {
  SetActive { id: EntityId, active: bool },
  Delete { id: EntityId },
}

impl ProductCommand {
  pub fn product_id(&self) -> &EntityId {
    match self {
      ProductCommand::SetActive { id, .. } | ProductCommand::Delete { id } => id,
    }
  }

  /// The tentative effect on one cached page of active products.
  /// Deactivated and deleted products leave the listing.
  pub fn apply(&self, page: &mut ProductPage) -> bool {
    let id = self.product_id();
    let Some(idx) = page.items.iter().position(|p| &p.id == id) else {
      return false;
    };
    match self {
      ProductCommand::SetActive { active: true, .. } => {
        page.items[idx].active = true;
      }
      ProductCommand::SetActive { active: false, .. } | ProductCommand::Delete { .. } => {
        page.items.remove(idx);
        page.total = page.total.saturating_sub(1);
      }
    }
    true
  }

  async fn send(&self, source: &dyn ProductSource) -> CatalogResult<()> {
    match self {
      ProductCommand::SetActive { id, active } => source.set_product_active(id, *active).await,
      ProductCommand::Delete { id } => source.delete_product(id).await,
    }
  }

  fn success_message(&self) -> &'static str {
    match self {
      ProductCommand::SetActive { active: true, .. } => "Producto activado",
      ProductCommand::SetActive { active: false, .. } => "Producto desactivado",
      ProductCommand::Delete { .. } => "Producto eliminado",
    }
  }

  fn failure_message(&self) -> &'static str {
    match self {
      ProductCommand::SetActive { .. } => "No se pudo cambiar el estado del producto",
      ProductCommand::Delete { .. } => "No se pudo eliminar el producto",
    }
  }
}

/// Mutations on behalf of the signed-in user. Only catalog managers get through.
#[derive(Clone)]
pub struct CatalogCommands {
  controller: CatalogController,
  auth: Arc<dyn AuthService>,
}

impl CatalogCommands {
  pub fn new(controller: CatalogController, auth: Arc<dyn AuthService>) -> Self {
    Self { controller, auth }
  }

  pub fn controller(&self) -> &CatalogController {
    &self.controller
  }

  fn notify(&self, level: NotificationLevel, message: &str) {
    self.controller.notifier().notify(level, message);
  }

  fn authorize(&self) -> CatalogResult<CurrentUser> {
    self.auth.require_catalog_manager().map_err(|err| {
      self.notify(NotificationLevel::Error, &err.to_string());
      err
    })
  }

  /// Snapshot, patch, send; restore on failure, invalidate on success.
  #[instrument(name = "CatalogCommands::run", skip(self), err(Display))]
  pub async fn run(&self, command: ProductCommand) -> CatalogResult<()> {
    self.authorize()?;
    let cache = self.controller.cache();
    let snapshot = cache.snapshot();
    let patched = cache.patch_pages(|page| command.apply(page));
    event!(Level::DEBUG, patched, "Optimistic change applied.");

    match command.send(self.controller.source().as_ref()).await {
      Ok(()) => {
        cache.invalidate_all();
        self.notify(NotificationLevel::Success, command.success_message());
        Ok(())
      }
      Err(err) => {
        let restored = cache.restore(snapshot);
        event!(Level::WARN, error = %err, restored, "Command failed; optimistic change rolled back.");
        self.notify(
          NotificationLevel::Error,
          &format!("{}: {}", command.failure_message(), err),
        );
        Err(err)
      }
    }
  }

  pub async fn set_product_active(&self, id: EntityId, active: bool) -> CatalogResult<()> {
    self.run(ProductCommand::SetActive { id, active }).await
  }

  pub async fn delete_product(&self, id: EntityId) -> CatalogResult<()> {
    self.run(ProductCommand::Delete { id }).await
  }

  /// Reports the outcome of a non-optimistic mutation and invalidates on success.
  fn settle<T>(&self, result: CatalogResult<T>, success: &str, failure: &str) -> CatalogResult<T> {
    match result {
      Ok(value) => {
        self.controller.invalidate();
        self.notify(NotificationLevel::Success, success);
        Ok(value)
      }
      Err(err) => {
        self.notify(NotificationLevel::Error, &format!("{}: {}", failure, err));
        Err(err)
      }
    }
  }

  #[instrument(name = "CatalogCommands::create_product", skip_all, err(Display))]
  pub async fn create_product(&self, draft: &ProductDraft) -> CatalogResult<Product> {
    self.authorize()?;
    draft.validate()?;
    let result = self.controller.source().create_product(draft).await;
    self.settle(result, "Producto creado", "No se pudo crear el producto")
  }

  #[instrument(name = "CatalogCommands::update_product", skip(self, draft), fields(product_id = %id), err(Display))]
  pub async fn update_product(&self, id: &EntityId, draft: &ProductDraft) -> CatalogResult<Product> {
    self.authorize()?;
    draft.validate()?;
    let result = self.controller.source().update_product(id, draft).await;
    self.settle(result, "Producto actualizado", "No se pudo actualizar el producto")
  }

  pub async fn create_category(&self, draft: &TaxonomyDraft) -> CatalogResult<Category> {
    self.authorize()?;
    draft.validate()?;
    let result = self.controller.source().create_category(draft).await;
    self.settle(result, "Categoría creada", "No se pudo crear la categoría")
  }

  pub async fn update_category(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Category> {
    self.authorize()?;
    draft.validate()?;
    let result = self.controller.source().update_category(id, draft).await;
    self.settle(result, "Categoría actualizada", "No se pudo actualizar la categoría")
  }

  /// A category still referenced by products is rejected by the source with `Conflict`.
  pub async fn delete_category(&self, id: &EntityId) -> CatalogResult<()> {
    self.authorize()?;
    let result = self.controller.source().delete_category(id).await;
    self.settle(result, "Categoría eliminada", "No se pudo eliminar la categoría")
  }

  pub async fn create_brand(&self, draft: &TaxonomyDraft) -> CatalogResult<Brand> {
    self.authorize()?;
    draft.validate()?;
    let result = self.controller.source().create_brand(draft).await;
    self.settle(result, "Marca creada", "No se pudo crear la marca")
  }

  pub async fn update_brand(&self, id: &EntityId, draft: &TaxonomyDraft) -> CatalogResult<Brand> {
    self.authorize()?;
    draft.validate()?;
    let result = self.controller.source().update_brand(id, draft).await;
    self.settle(result, "Marca actualizada", "No se pudo actualizar la marca")
  }

  pub async fn delete_brand(&self, id: &EntityId) -> CatalogResult<()> {
    self.authorize()?;
    let result = self.controller.source().delete_brand(id).await;
    self.settle(result, "Marca eliminada", "No se pudo eliminar la marca")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn page_with(ids: &[&str]) -> ProductPage {
    let items = ids
      .iter()
      .map(|id| Product {
        id: EntityId::from(*id),
        name: format!("Producto {}", id),
        code: id.to_string(),
        commercial_code: id.to_string(),
        category_id: None,
        brand_id: None,
        category_name: None,
        brand_name: None,
        images: Vec::new(),
        active: true,
        spec_sheet: Vec::new(),
      })
      .collect();
    ProductPage { items, total: 10 }
  }

  #[test]
  fn deactivating_removes_from_listing() {
    let mut page = page_with(&["1", "2"]);
    let changed = ProductCommand::SetActive {
      id: EntityId::from("2"),
      active: false,
    }
    .apply(&mut page);
    assert!(changed);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 9);
  }

  #[test]
  fn unknown_product_leaves_page_alone() {
    let mut page = page_with(&["1"]);
    assert!(!ProductCommand::Delete { id: EntityId::from("9") }.apply(&mut page));
    assert_eq!(page.total, 10);
  }
}
