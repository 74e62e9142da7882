// catalog_kit/src/pagination/controller.rs

//! The hybrid pagination controller.
//!
//! With an empty query the whole active collection is fetched once and
//! category, brand and page are applied locally. With a non-empty query every
//! change goes to the source. Either way the caller sees one `CatalogView`.

use super::cache::{CacheEntry, FetchKey, ResultCache};
use super::view::{total_pages, CatalogView, FetchStatus, Strategy};
use crate::error::CatalogResult;
use crate::filter::{filter_products, paginate, FilterState, DEFAULT_PAGE_SIZE};
use crate::model::{Brand, Category, EntityId, ProductPage};
use crate::services::notify::NotificationSink;
use crate::shared::Shared;
use crate::source::ProductSource;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[derive(Debug, Clone)]
pub struct ControllerOptions {
  pub page_size: u32,
  /// Page size used to pull the whole active collection in one request.
  pub bulk_page_size: u32,
  /// Extra attempts after a transport failure before settling into an error.
  pub fetch_retries: u32,
}

impl Default for ControllerOptions {
  fn default() -> Self {
    Self {
      page_size: DEFAULT_PAGE_SIZE,
      bulk_page_size: 10_000,
      fetch_retries: 1,
    }
  }
}

#[derive(Clone)]
pub struct CatalogController {
  source: Arc<dyn ProductSource>,
  notifier: Arc<dyn NotificationSink>,
  cache: Arc<ResultCache>,
  filters: Shared<FilterState>,
  options: ControllerOptions,
}

impl CatalogController {
  pub fn new(source: Arc<dyn ProductSource>, notifier: Arc<dyn NotificationSink>, options: ControllerOptions) -> Self {
    Self::with_cache(source, notifier, Arc::new(ResultCache::new()), options)
  }

  /// Shares `cache` with other controllers over the same source, so a
  /// mutation made through one invalidates what all of them show.
  pub fn with_cache(
    source: Arc<dyn ProductSource>,
    notifier: Arc<dyn NotificationSink>,
    cache: Arc<ResultCache>,
    options: ControllerOptions,
  ) -> Self {
    Self {
      source,
      notifier,
      cache,
      filters: Shared::new(FilterState::new(options.page_size)),
      options,
    }
  }

  pub fn source(&self) -> &Arc<dyn ProductSource> {
    &self.source
  }

  pub fn notifier(&self) -> &Arc<dyn NotificationSink> {
    &self.notifier
  }

  pub fn cache(&self) -> &Arc<ResultCache> {
    &self.cache
  }

  pub fn options(&self) -> &ControllerOptions {
    &self.options
  }

  pub fn filters(&self) -> FilterState {
    self.filters.snapshot()
  }

  pub fn strategy(&self) -> Strategy {
    strategy_for(&self.filters.read())
  }

  pub fn set_query(&self, query: impl Into<String>) -> bool {
    let query = query.into();
    self.filters.update(|f| f.set_query(query))
  }

  pub fn set_category(&self, category_id: Option<EntityId>) -> bool {
    self.filters.update(|f| f.set_category(category_id))
  }

  pub fn set_brands<I: IntoIterator<Item = EntityId>>(&self, brand_ids: I) -> bool {
    self.filters.update(|f| f.set_brands(brand_ids))
  }

  pub fn toggle_brand(&self, brand_id: EntityId) -> bool {
    self.filters.update(|f| f.toggle_brand(brand_id))
  }

  pub fn set_page(&self, page: u32) -> bool {
    self.filters.update(|f| f.set_page(page))
  }

  pub fn clear_all(&self) -> bool {
    self.filters.update(FilterState::clear_all)
  }

  /// The current view from cache alone. Never touches the network.
  pub fn view(&self) -> CatalogView {
    let filters = self.filters();
    let entry = self.cache.entry(&FetchKey::for_filters(&filters));
    build_view(filters, entry)
  }

  /// The current view, fetching first if nothing usable is cached.
  ///
  /// An errored key is returned as is; only `refetch` retries it. A key that
  /// is already loading is not requested twice.
  pub async fn load(&self) -> CatalogView {
    let key = FetchKey::for_filters(&self.filters.read());
    match self.cache.entry(&key) {
      Some(entry) if entry.page.is_some() || entry.error.is_some() || entry.loading => self.view(),
      _ => self.fetch(key).await,
    }
  }

  /// Clears the current error and fetches the current key again.
  pub async fn refetch(&self) -> CatalogView {
    let key = FetchKey::for_filters(&self.filters.read());
    self.cache.clear_error(&key);
    self.fetch(key).await
  }

  /// Closes the error alert. Stale data for the key stays visible.
  pub fn dismiss_error(&self) {
    let key = FetchKey::for_filters(&self.filters.read());
    self.cache.clear_error(&key);
  }

  /// Forgets every cached result; the next `load` fetches again.
  pub fn invalidate(&self) {
    self.cache.invalidate_all();
  }

  #[instrument(name = "CatalogController::fetch", skip(self), err(Display))]
  async fn fetch_page(&self, key: &FetchKey) -> CatalogResult<ProductPage> {
    let query = key.query(self.options.bulk_page_size);
    let mut attempt = 0;
    loop {
      match self.source.list_active_products(&query).await {
        Err(err) if err.is_transport_error() && attempt < self.options.fetch_retries => {
          attempt += 1;
          event!(Level::WARN, error = %err, attempt, "Fetch failed, retrying.");
        }
        result => return result,
      }
    }
  }

  async fn fetch(&self, key: FetchKey) -> CatalogView {
    let ticket = self.cache.begin(key.clone());
    let result = self.fetch_page(&key).await;
    if let Err(err) = &result {
      event!(Level::ERROR, error = %err, "Catalog fetch settled into error.");
    }
    ticket.complete(result);

    let current = FetchKey::for_filters(&self.filters.read());
    if current != key {
      event!(Level::DEBUG, "Filters changed while fetching; returning the current view.");
    }
    self.view()
  }

  #[instrument(name = "CatalogController::categories", skip(self), err(Display))]
  pub async fn categories(&self) -> CatalogResult<Vec<Category>> {
    self.source.list_categories().await
  }

  #[instrument(name = "CatalogController::brands", skip(self), err(Display))]
  pub async fn brands(&self) -> CatalogResult<Vec<Brand>> {
    self.source.list_brands().await
  }
}

fn strategy_for(filters: &FilterState) -> Strategy {
  match filters.search_term() {
    None => Strategy::Local,
    Some(_) => Strategy::Remote,
  }
}

fn build_view(filters: FilterState, entry: Option<CacheEntry>) -> CatalogView {
  let strategy = strategy_for(&filters);
  let entry = entry.unwrap_or_default();
  let status = match (&entry.error, entry.loading, &entry.page) {
    (Some(err), _, _) => FetchStatus::Error(Arc::clone(err)),
    (None, true, _) | (None, false, None) => FetchStatus::Loading,
    (None, false, Some(_)) => FetchStatus::Success,
  };

  let (products, total) = match (&entry.page, strategy) {
    (None, _) => (Vec::new(), 0),
    (Some(page), Strategy::Remote) => (page.items.clone(), page.total),
    (Some(page), Strategy::Local) => {
      let matching = filter_products(&page.items, &filters.criteria());
      let visible = paginate(&matching, filters.page(), filters.page_size());
      (visible, matching.len())
    }
  };

  CatalogView {
    products,
    total,
    total_pages: total_pages(total, filters.page_size()),
    status,
    strategy,
    filters,
  }
}
