// catalog_kit/examples/hybrid_browse.rs

use catalog_kit::{
  Brand, CatalogController, Category, ControllerOptions, EntityId, InMemoryProductSource, Product, Strategy,
  TracingNotificationSink,
};
use std::sync::Arc;
use tracing::info;

fn product(i: i64) -> Product {
  Product {
    id: EntityId::from(i),
    name: format!("Bujía {}", i),
    code: format!("BJ-{}", i),
    commercial_code: format!("COM-{}", i),
    category_id: Some(EntityId::from(1 + i % 2)),
    brand_id: Some(EntityId::from(10 + i % 3)),
    category_name: None,
    brand_name: None,
    images: Vec::new(),
    active: true,
    spec_sheet: Vec::new(),
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Hybrid Browse Example ---");

  let categories = vec![
    Category {
      id: EntityId::from(1),
      name: "Encendido".to_string(),
    },
    Category {
      id: EntityId::from(2),
      name: "Motor".to_string(),
    },
  ];
  let brands = (10..13)
    .map(|i| Brand {
      id: EntityId::from(i),
      name: format!("Marca {}", i),
    })
    .collect();
  let source = Arc::new(InMemoryProductSource::with_catalog(
    (1..=40).map(product).collect(),
    categories,
    brands,
  ));

  let controller = CatalogController::new(
    source.clone(),
    Arc::new(TracingNotificationSink),
    ControllerOptions::default(),
  );

  // 1. No search term: the whole collection is fetched once.
  let view = controller.load().await;
  info!(total = view.total, pages = view.total_pages, "Initial load");
  assert_eq!(view.strategy, Strategy::Local);

  // 2. Category, brand and page changes are served from memory.
  controller.set_category(Some(EntityId::from(2)));
  controller.toggle_brand(EntityId::from(10));
  let view = controller.load().await;
  info!(total = view.total, calls = source.list_calls(), "Filtered locally");
  assert_eq!(source.list_calls(), 1);

  // 3. A search term switches to the remote strategy.
  controller.set_query("bujia 1");
  let view = controller.load().await;
  info!(total = view.total, strategy = ?view.strategy, calls = source.list_calls(), "Searched remotely");

  // 4. Clearing the term goes back to the cached collection.
  controller.set_query("");
  let view = controller.load().await;
  info!(total = view.total, calls = source.list_calls(), "Back to local");
  assert_eq!(source.list_calls(), 2);
}
