// catalog_kit/src/pagination/cache.rs

//! Fetch results keyed by the filter tuple that produced them.
//!
//! Every `invalidate_all` bumps the epoch. A fetch remembers the epoch it
//! started in and its result is dropped if the epoch moved meanwhile, so a
//! response issued before a mutation can never repopulate the cache.

use crate::error::{CatalogError, CatalogResult};
use crate::filter::FilterState;
use crate::model::ProductPage;
use crate::source::ProductQuery;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

/// Identity of one fetch. The local strategy shares a single key for every
/// category/brand/page combination; the remote strategy keys on the full query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchKey {
  Catalog,
  Search(ProductQuery),
}

impl FetchKey {
  pub fn for_filters(filters: &FilterState) -> Self {
    match filters.search_term() {
      None => FetchKey::Catalog,
      Some(_) => FetchKey::Search(ProductQuery::from_filters(filters)),
    }
  }

  pub fn query(&self, bulk_page_size: u32) -> ProductQuery {
    match self {
      FetchKey::Catalog => ProductQuery::all(bulk_page_size),
      FetchKey::Search(query) => query.clone(),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
  /// Last successful result. Survives later failures as stale data.
  pub page: Option<ProductPage>,
  pub loading: bool,
  pub error: Option<Arc<CatalogError>>,
  /// Bumped every time a fetched page lands.
  pub revision: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
  entries: HashMap<FetchKey, CacheEntry>,
  epoch: u64,
}

/// The cached pages as they were before an optimistic change.
/// Loading and error flags are never part of it.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
  pages: HashMap<FetchKey, (u64, ProductPage)>,
  epoch: u64,
}

#[derive(Debug, Default)]
pub struct ResultCache {
  inner: Mutex<CacheInner>,
}

impl ResultCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn epoch(&self) -> u64 {
    self.inner.lock().epoch
  }

  pub fn entry(&self, key: &FetchKey) -> Option<CacheEntry> {
    self.inner.lock().entries.get(key).cloned()
  }

  pub fn len(&self) -> usize {
    self.inner.lock().entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Marks `key` as loading and returns the ticket its result must be handed to.
  /// Dropping the ticket without completing it clears the loading flag.
  pub fn begin(self: &Arc<Self>, key: FetchKey) -> FetchTicket {
    let epoch = {
      let mut inner = self.inner.lock();
      inner.entries.entry(key.clone()).or_default().loading = true;
      inner.epoch
    };
    FetchTicket {
      cache: Arc::clone(self),
      key,
      epoch,
      settled: false,
    }
  }

  fn settle(&self, key: &FetchKey, epoch: u64, result: Option<CatalogResult<ProductPage>>) -> bool {
    let mut inner = self.inner.lock();
    if inner.epoch != epoch {
      event!(Level::DEBUG, ?key, started = epoch, current = inner.epoch, "Discarding result from before an invalidation.");
      return false;
    }
    let entry = inner.entries.entry(key.clone()).or_default();
    entry.loading = false;
    match result {
      Some(Ok(page)) => {
        entry.page = Some(page);
        entry.error = None;
        entry.revision += 1;
      }
      Some(Err(err)) => entry.error = Some(Arc::new(err)),
      None => {}
    }
    true
  }

  /// Clears the error on `key`, keeping any stale data.
  pub fn clear_error(&self, key: &FetchKey) {
    if let Some(entry) = self.inner.lock().entries.get_mut(key) {
      entry.error = None;
    }
  }

  /// Drops every entry and starts a new epoch.
  pub fn invalidate_all(&self) {
    let mut inner = self.inner.lock();
    inner.entries.clear();
    inner.epoch += 1;
    event!(Level::DEBUG, epoch = inner.epoch, "Result cache invalidated.");
  }

  pub fn snapshot(&self) -> CacheSnapshot {
    let inner = self.inner.lock();
    let pages = inner
      .entries
      .iter()
      .filter_map(|(key, entry)| {
        let page = entry.page.clone()?;
        Some((key.clone(), (entry.revision, page)))
      })
      .collect();
    CacheSnapshot {
      pages,
      epoch: inner.epoch,
    }
  }

  /// Puts the snapshotted pages back, unless the cache was invalidated since.
  ///
  /// Only page contents are restored. A key whose page was replaced by a newer
  /// fetch in the meantime keeps the newer page; loading and error flags are
  /// left as they are now.
  pub fn restore(&self, snapshot: CacheSnapshot) -> bool {
    let mut inner = self.inner.lock();
    if inner.epoch != snapshot.epoch {
      return false;
    }
    for (key, (revision, page)) in snapshot.pages {
      match inner.entries.get_mut(&key) {
        Some(entry) if entry.revision == revision => entry.page = Some(page),
        _ => event!(Level::DEBUG, ?key, "Keeping a page fetched after the snapshot."),
      }
    }
    true
  }

  /// Applies `patch` to every cached page; returns how many pages it changed.
  pub fn patch_pages(&self, mut patch: impl FnMut(&mut ProductPage) -> bool) -> usize {
    let mut inner = self.inner.lock();
    inner
      .entries
      .values_mut()
      .filter_map(|entry| entry.page.as_mut())
      .map(|page| patch(page))
      .filter(|changed| *changed)
      .count()
  }
}

/// An outstanding fetch for one key.
#[must_use = "a ticket must be completed, or dropped to abandon the fetch"]
pub struct FetchTicket {
  cache: Arc<ResultCache>,
  key: FetchKey,
  epoch: u64,
  settled: bool,
}

impl FetchTicket {
  pub fn key(&self) -> &FetchKey {
    &self.key
  }

  /// Stores `result` under the ticket's key. Returns false if it was discarded.
  pub fn complete(mut self, result: CatalogResult<ProductPage>) -> bool {
    self.settled = true;
    self.cache.settle(&self.key, self.epoch, Some(result))
  }
}

impl Drop for FetchTicket {
  fn drop(&mut self) {
    if !self.settled {
      self.cache.settle(&self.key, self.epoch, None);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{EntityId, Product};

  fn page(ids: &[&str]) -> ProductPage {
    ProductPage {
      items: ids
        .iter()
        .map(|id| Product {
          id: EntityId::from(*id),
          name: format!("p{}", id),
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
        .collect(),
      total: ids.len(),
    }
  }

  #[test]
  fn result_from_before_invalidation_is_discarded() {
    let cache = Arc::new(ResultCache::new());
    let ticket = cache.begin(FetchKey::Catalog);
    cache.invalidate_all();
    assert!(!ticket.complete(Ok(page(&["1"]))));
    assert!(cache.entry(&FetchKey::Catalog).is_none());
  }

  #[test]
  fn dropped_ticket_clears_loading() {
    let cache = Arc::new(ResultCache::new());
    let ticket = cache.begin(FetchKey::Catalog);
    assert!(cache.entry(&FetchKey::Catalog).unwrap().loading);
    drop(ticket);
    assert!(!cache.entry(&FetchKey::Catalog).unwrap().loading);
  }

  #[test]
  fn error_keeps_stale_page() {
    let cache = Arc::new(ResultCache::new());
    cache.begin(FetchKey::Catalog).complete(Ok(page(&["1", "2"])));
    cache
      .begin(FetchKey::Catalog)
      .complete(Err(CatalogError::Internal("boom".into())));
    let entry = cache.entry(&FetchKey::Catalog).unwrap();
    assert_eq!(entry.page.unwrap().total, 2);
    assert!(entry.error.is_some());
    cache.clear_error(&FetchKey::Catalog);
    assert!(cache.entry(&FetchKey::Catalog).unwrap().error.is_none());
  }

  #[test]
  fn restore_is_skipped_after_invalidation() {
    let cache = Arc::new(ResultCache::new());
    cache.begin(FetchKey::Catalog).complete(Ok(page(&["1"])));
    let snapshot = cache.snapshot();
    let changed = cache.patch_pages(|p| {
      p.items.clear();
      true
    });
    assert_eq!(changed, 1);
    assert!(cache.restore(snapshot.clone()));
    assert_eq!(cache.entry(&FetchKey::Catalog).unwrap().page.unwrap().items.len(), 1);
    cache.invalidate_all();
    assert!(!cache.restore(snapshot));
  }

  #[test]
  fn restore_never_resurrects_loading_or_older_pages() {
    let cache = Arc::new(ResultCache::new());
    let key = FetchKey::Search(ProductQuery::all(5));

    // Catalog is mid-fetch and the search key has a page when the snapshot is taken.
    let pending = cache.begin(FetchKey::Catalog);
    cache.begin(key.clone()).complete(Ok(page(&["1"])));
    let snapshot = cache.snapshot();
    cache.patch_pages(|p| {
      p.items.clear();
      true
    });

    // Both keys settle with fresh pages before the rollback.
    assert!(pending.complete(Ok(page(&["1", "2", "3"]))));
    cache.begin(key.clone()).complete(Ok(page(&["1", "2"])));

    assert!(cache.restore(snapshot));
    let catalog = cache.entry(&FetchKey::Catalog).unwrap();
    assert!(!catalog.loading);
    assert_eq!(catalog.page.unwrap().items.len(), 3);
    assert_eq!(cache.entry(&key).unwrap().page.unwrap().items.len(), 2);
  }
}
