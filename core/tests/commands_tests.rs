// tests/commands_tests.rs

mod common;

use catalog_kit::{
  CatalogCommands, CatalogError, EntityId, NotificationLevel, ProductDraft, ProductSource, TaxonomyDraft,
};
use catalog_kit::{FetchKey, FetchStatus};
use common::*;
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn deactivating_invalidates_and_notifies() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, notifier) = controller_over(source.clone());
  let commands = CatalogCommands::new(controller.clone(), admin_auth());

  assert_eq!(controller.load().await.total, 10);
  commands.set_product_active(EntityId::from("100"), false).await.unwrap();

  assert!(controller.cache().is_empty());
  let notes = notifier.drain();
  assert_eq!(notes.last().unwrap().level, NotificationLevel::Success);
  assert_eq!(notes.last().unwrap().message, "Producto desactivado");

  let view = controller.load().await;
  assert_eq!(view.total, 9);
  assert!(view.products.iter().all(|p| p.id.as_str() != "100"));
}

#[tokio::test]
#[serial]
async fn failed_delete_rolls_back_the_cache() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, notifier) = controller_over(source.clone());
  let commands = CatalogCommands::new(controller.clone(), admin_auth());
  controller.load().await;

  source.fail_next("offline");
  let err = commands.delete_product(EntityId::from("103")).await.unwrap_err();
  assert!(err.is_transport_error());

  let view = controller.view();
  assert_eq!(view.total, 10);
  assert!(view.products.iter().any(|p| p.id.as_str() == "103"));
  assert_eq!(source.list_calls(), 1);

  let notes = notifier.drain();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0].level, NotificationLevel::Error);
  assert!(notes[0].message.starts_with("No se pudo eliminar el producto"));
}

#[tokio::test]
#[serial]
async fn rollback_keeps_a_page_fetched_while_the_command_ran() {
  setup_tracing();
  let inner = memory_source(ten_products());
  let gated = GatedSource::new(inner.clone());
  let (controller, notifier) = controller_over(gated.clone() as Arc<dyn ProductSource>);
  let commands = CatalogCommands::new(controller.clone(), admin_auth());

  // The delete snapshots the cache while the first load is still in flight.
  let list_gate = gated.hold_next();
  let command_gate = gated.hold_next_command();
  let (_, deleted, _) = tokio::join!(
    controller.load(),
    commands.delete_product(EntityId::from("103")),
    async {
      gated.entered.notified().await;
      gated.command_entered.notified().await;
      let _ = list_gate.send(());
      while controller.cache().entry(&FetchKey::Catalog).and_then(|e| e.page).is_none() {
        tokio::task::yield_now().await;
      }
      inner.fail_next("offline");
      let _ = command_gate.send(());
    }
  );
  assert!(deleted.is_err());

  let entry = controller.cache().entry(&FetchKey::Catalog).unwrap();
  assert!(!entry.loading);
  let view = controller.load().await;
  assert!(matches!(view.status, FetchStatus::Success));
  assert_eq!(view.total, 10);
  assert!(view.products.iter().any(|p| p.id.as_str() == "103"));
  assert_eq!(inner.list_calls(), 1);
  assert_eq!(notifier.drain().last().unwrap().level, NotificationLevel::Error);
}

#[tokio::test]
#[serial]
async fn patch_is_visible_before_the_command_settles() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, _) = controller_over(source.clone());
  controller.load().await;

  let cache = controller.cache();
  let snapshot = cache.snapshot();
  cache.patch_pages(|page| {
    catalog_kit::ProductCommand::Delete {
      id: EntityId::from("100"),
    }
    .apply(page)
  });
  assert_eq!(controller.view().total, 9);
  assert!(cache.restore(snapshot));
  assert_eq!(controller.view().total, 10);
}

#[tokio::test]
#[serial]
async fn vendors_cannot_mutate() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, notifier) = controller_over(source.clone());
  let commands = CatalogCommands::new(controller, vendor_auth());

  let err = commands.delete_product(EntityId::from("100")).await.unwrap_err();
  assert!(matches!(err, CatalogError::Auth(_)));
  assert_eq!(source.products().len(), 10);
  assert_eq!(notifier.pending()[0].level, NotificationLevel::Error);
}

#[tokio::test]
#[serial]
async fn invalid_draft_never_reaches_the_source() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, _) = controller_over(source.clone());
  let commands = CatalogCommands::new(controller, admin_auth());

  let draft = ProductDraft {
    name: "  ".to_string(),
    code: "N-1".to_string(),
    ..Default::default()
  };
  let err = commands.create_product(&draft).await.unwrap_err();
  assert!(matches!(err, CatalogError::Validation(_)));
  assert_eq!(source.products().len(), 10);
}

#[tokio::test]
#[serial]
async fn create_and_update_product() {
  setup_tracing();
  let source = memory_source(Vec::new());
  let (controller, _) = controller_over(source.clone());
  let commands = CatalogCommands::new(controller.clone(), admin_auth());

  let draft = ProductDraft {
    name: "Amortiguador".to_string(),
    code: "AM-1".to_string(),
    category_id: Some(EntityId::from("4")),
    brand_id: Some(EntityId::from("10")),
    ..Default::default()
  };
  let created = commands.create_product(&draft).await.unwrap();
  assert_eq!(created.category_name.as_deref(), Some("Frenos"));

  let mut edit = ProductDraft::from(&created);
  edit.name = "Amortiguador trasero".to_string();
  let updated = commands.update_product(&created.id, &edit).await.unwrap();
  assert_eq!(updated.name, "Amortiguador trasero");

  let duplicate = commands.create_product(&draft).await.unwrap_err();
  assert!(matches!(duplicate, CatalogError::Conflict(_)));

  let view = controller.load().await;
  assert_eq!(view.total, 1);
}

#[tokio::test]
#[serial]
async fn referenced_taxonomies_cannot_be_deleted() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, notifier) = controller_over(source.clone());
  let commands = CatalogCommands::new(controller, admin_auth());

  let err = commands.delete_category(&EntityId::from("3")).await.unwrap_err();
  assert!(matches!(err, CatalogError::Conflict(_)));
  let err = commands.delete_brand(&EntityId::from("10")).await.unwrap_err();
  assert!(matches!(err, CatalogError::Conflict(_)));
  assert_eq!(notifier.drain().len(), 2);

  let category = commands.create_category(&TaxonomyDraft::new("Suspensión")).await.unwrap();
  let renamed = commands
    .update_category(&category.id, &TaxonomyDraft::new("Suspensión delantera"))
    .await
    .unwrap();
  assert_eq!(renamed.name, "Suspensión delantera");
  commands.delete_category(&category.id).await.unwrap();

  let brand = commands.create_brand(&TaxonomyDraft::new("Monroe")).await.unwrap();
  commands.update_brand(&brand.id, &TaxonomyDraft::new("Monroe SA")).await.unwrap();
  commands.delete_brand(&brand.id).await.unwrap();
  assert_eq!(source.list_brands().await.unwrap().len(), 2);

  assert!(commands.create_brand(&TaxonomyDraft::new(" ")).await.is_err());
}
