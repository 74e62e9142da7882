// tests/pagination_controller_tests.rs

mod common;

use catalog_kit::{CatalogError, EntityId, FetchStatus, ProductSource, Strategy};
use common::*;
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn local_category_filter_over_ten_products() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, _) = controller_over(source.clone());

  controller.set_category(Some(EntityId::from("3")));
  let view = controller.load().await;

  assert_eq!(view.strategy, Strategy::Local);
  assert!(matches!(view.status, FetchStatus::Success));
  assert_eq!(view.products.len(), 4);
  assert_eq!(view.total, 4);
  assert_eq!(view.total_pages, 1);
  assert!(view
    .products
    .iter()
    .all(|p| p.category_id == Some(EntityId::from("3"))));
}

#[tokio::test]
#[serial]
async fn local_strategy_fetches_the_collection_once() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, _) = controller_over(source.clone());

  controller.load().await;
  controller.set_category(Some(EntityId::from("4")));
  controller.load().await;
  controller.toggle_brand(EntityId::from("11"));
  let view = controller.load().await;
  controller.set_page(2);
  let second = controller.load().await;

  assert_eq!(source.list_calls(), 1);
  // Category "4" holds 104..=109; brand "11" keeps the odd ones.
  let ids: Vec<&str> = view.products.iter().map(|p| p.id.as_str()).collect();
  assert_eq!(ids, vec!["105", "107", "109"]);
  assert!(second.products.is_empty());
  assert_eq!(second.total, 3);
}

#[tokio::test]
#[serial]
async fn search_goes_remote_for_every_page() {
  setup_tracing();
  let products: Vec<_> = (0..25).map(|i| product(&(200 + i).to_string(), "3", "10")).collect();
  let source = memory_source(products);
  let (controller, _) = controller_over(source.clone());

  controller.set_query("producto 2");
  let first = controller.load().await;
  assert_eq!(first.strategy, Strategy::Remote);
  assert_eq!(first.total, 25);
  assert_eq!(first.total_pages, 3);
  assert_eq!(first.products.len(), 12);

  controller.set_page(3);
  let last = controller.load().await;
  assert_eq!(last.products.len(), 1);
  assert_eq!(source.list_calls(), 2);

  // Going back to a page already seen is served from cache.
  controller.set_page(1);
  controller.load().await;
  assert_eq!(source.list_calls(), 2);
}

#[tokio::test]
#[serial]
async fn search_is_accent_and_case_insensitive() {
  setup_tracing();
  let mut bujia = product("1", "3", "11");
  bujia.name = "Bujía Iridium".to_string();
  let source = memory_source(vec![bujia, product("2", "3", "10")]);
  let (controller, _) = controller_over(source);

  controller.set_query("  BUJIA ");
  let view = controller.load().await;
  assert_eq!(view.total, 1);
  assert_eq!(view.products[0].id, EntityId::from("1"));
}

#[tokio::test]
#[serial]
async fn switching_strategy_resets_the_page() {
  setup_tracing();
  let (controller, _) = controller_over(memory_source(ten_products()));

  controller.set_page(3);
  assert!(controller.set_query("filtro"));
  assert_eq!(controller.filters().page(), 1);
  assert_eq!(controller.strategy(), Strategy::Remote);

  controller.set_page(2);
  assert!(controller.set_query(""));
  assert_eq!(controller.filters().page(), 1);
  assert_eq!(controller.strategy(), Strategy::Local);

  controller.set_page(2);
  assert!(!controller.set_query(""));
  assert_eq!(controller.filters().page(), 2);
}

#[tokio::test]
#[serial]
async fn one_transport_failure_is_retried() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, _) = controller_over(source.clone());

  source.fail_next("connection reset");
  let view = controller.load().await;

  assert!(matches!(view.status, FetchStatus::Success));
  assert_eq!(view.total, 10);
  assert_eq!(source.list_calls(), 2);
}

#[tokio::test]
#[serial]
async fn errors_stay_until_refetch() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, _) = controller_over(source.clone());

  source.fail_next("down");
  source.fail_next("still down");
  let view = controller.load().await;
  assert!(view.is_error());
  assert!(matches!(view.error(), Some(CatalogError::Transport { .. })));
  assert_eq!(source.list_calls(), 2);

  // No silent refetch of an errored key.
  let again = controller.load().await;
  assert!(again.is_error());
  assert_eq!(source.list_calls(), 2);

  let recovered = controller.refetch().await;
  assert!(matches!(recovered.status, FetchStatus::Success));
  assert_eq!(recovered.total, 10);
}

#[tokio::test]
#[serial]
async fn stale_data_stays_visible_next_to_an_error() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, _) = controller_over(source.clone());
  controller.load().await;

  source.fail_next("down");
  source.fail_next("down");
  let view = controller.refetch().await;
  assert!(view.is_error());
  assert_eq!(view.total, 10);
  assert_eq!(view.products.len(), 10);

  controller.dismiss_error();
  let dismissed = controller.view();
  assert!(matches!(dismissed.status, FetchStatus::Success));
  assert_eq!(dismissed.total, 10);
}

#[tokio::test]
#[serial]
async fn view_never_fetches() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, _) = controller_over(source.clone());

  let view = controller.view();
  assert!(view.is_loading());
  assert!(view.products.is_empty());
  assert_eq!(view.total_pages, 1);
  assert_eq!(source.list_calls(), 0);
}

#[tokio::test]
#[serial]
async fn superseded_response_is_not_returned_as_current() {
  setup_tracing();
  let gated = GatedSource::new(memory_source(ten_products()));
  let (controller, _) = controller_over(gated.clone() as Arc<dyn ProductSource>);

  controller.set_query("Producto 101");
  let gate = gated.hold_next();
  let (view, _) = tokio::join!(controller.load(), async {
    gated.entered.notified().await;
    controller.set_query("Producto 102");
    let _ = gate.send(());
  });

  assert_eq!(view.filters.query(), "Producto 102");
  assert!(view.products.iter().all(|p| p.id.as_str() != "101"));

  let current = controller.load().await;
  let ids: Vec<&str> = current.products.iter().map(|p| p.id.as_str()).collect();
  assert_eq!(ids, vec!["102"]);
}

#[tokio::test]
#[serial]
async fn response_from_before_invalidation_is_discarded() {
  setup_tracing();
  let inner = memory_source(ten_products());
  let gated = GatedSource::new(inner.clone());
  let (controller, _) = controller_over(gated.clone() as Arc<dyn ProductSource>);

  let gate = gated.hold_next();
  let (view, _) = tokio::join!(controller.load(), async {
    gated.entered.notified().await;
    controller.invalidate();
    let _ = gate.send(());
  });

  assert!(view.is_loading());
  assert!(controller.cache().is_empty());

  let fresh = controller.load().await;
  assert_eq!(fresh.total, 10);
  assert_eq!(inner.list_calls(), 2);
}

#[tokio::test]
#[serial]
async fn invalidate_forces_a_new_fetch() {
  setup_tracing();
  let source = memory_source(ten_products());
  let (controller, _) = controller_over(source.clone());

  controller.load().await;
  controller.invalidate();
  controller.load().await;
  assert_eq!(source.list_calls(), 2);
}

#[tokio::test]
#[serial]
async fn taxonomies_come_straight_from_the_source() {
  setup_tracing();
  let (controller, _) = controller_over(memory_source(Vec::new()));
  let categories = controller.categories().await.unwrap();
  let brands = controller.brands().await.unwrap();
  assert_eq!(categories.len(), 2);
  assert_eq!(brands[0].name, "Bosch");
}
