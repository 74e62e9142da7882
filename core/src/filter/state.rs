// catalog_kit/src/filter/state.rs

//! Filter state behind the product list, plus its mutators.
//!
//! Invariant: any mutator that changes the query, the category or the brand set
//! puts the list back on page 1. A mutator that leaves the value as it was does not
//! touch the page.

use crate::model::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// The part of the filter state the local engine narrows by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
  pub category_id: Option<EntityId>,
  pub brand_ids: BTreeSet<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
  query: String,
  category_id: Option<EntityId>,
  brand_ids: BTreeSet<EntityId>,
  page: u32,
  page_size: u32,
}

impl Default for FilterState {
  fn default() -> Self {
    Self::new(DEFAULT_PAGE_SIZE)
  }
}

impl FilterState {
  pub fn new(page_size: u32) -> Self {
    Self {
      query: String::new(),
      category_id: None,
      brand_ids: BTreeSet::new(),
      page: 1,
      page_size: page_size.max(1),
    }
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  pub fn category_id(&self) -> Option<&EntityId> {
    self.category_id.as_ref()
  }

  pub fn brand_ids(&self) -> &BTreeSet<EntityId> {
    &self.brand_ids
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  /// The trimmed query, or `None` when it is blank.
  pub fn search_term(&self) -> Option<&str> {
    let trimmed = self.query.trim();
    if trimmed.is_empty() {
      None
    } else {
      Some(trimmed)
    }
  }

  pub fn has_active_filters(&self) -> bool {
    self.search_term().is_some() || self.category_id.is_some() || !self.brand_ids.is_empty()
  }

  pub fn criteria(&self) -> FilterCriteria {
    FilterCriteria {
      category_id: self.category_id.clone(),
      brand_ids: self.brand_ids.clone(),
    }
  }

  /// Returns whether the state changed.
  pub fn set_query(&mut self, query: impl Into<String>) -> bool {
    let query = query.into();
    if query == self.query {
      return false;
    }
    self.query = query;
    self.page = 1;
    true
  }

  /// `None` selects every category.
  pub fn set_category(&mut self, category_id: Option<EntityId>) -> bool {
    let category_id = category_id.filter(|id| !id.is_empty());
    if category_id == self.category_id {
      return false;
    }
    self.category_id = category_id;
    self.page = 1;
    true
  }

  /// Replaces the selected brands. Duplicates collapse; an empty set disables the brand filter.
  pub fn set_brands<I>(&mut self, brand_ids: I) -> bool
  where
    I: IntoIterator<Item = EntityId>,
  {
    let brand_ids: BTreeSet<EntityId> = brand_ids.into_iter().filter(|id| !id.is_empty()).collect();
    if brand_ids == self.brand_ids {
      return false;
    }
    self.brand_ids = brand_ids;
    self.page = 1;
    true
  }

  /// Adds the brand if absent, removes it otherwise.
  pub fn toggle_brand(&mut self, brand_id: EntityId) -> bool {
    if brand_id.is_empty() {
      return false;
    }
    if !self.brand_ids.remove(&brand_id) {
      self.brand_ids.insert(brand_id);
    }
    self.page = 1;
    true
  }

  /// Pages are 1-based; 0 is treated as 1.
  pub fn set_page(&mut self, page: u32) -> bool {
    let page = page.max(1);
    if page == self.page {
      return false;
    }
    self.page = page;
    true
  }

  pub fn clear_all(&mut self) -> bool {
    let changed = self.has_active_filters() || !self.query.is_empty() || self.page != 1;
    self.query.clear();
    self.category_id = None;
    self.brand_ids.clear();
    self.page = 1;
    changed
  }
}
