// catalog_kit/src/pagination/view.rs

use crate::error::CatalogError;
use crate::filter::FilterState;
use crate::model::Product;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Where filtering and pagination happen for the current filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
  /// Whole active collection fetched once; category, brand and page applied in memory.
  Local,
  /// Every part of the filter state is sent to the source.
  Remote,
}

#[derive(Debug, Clone)]
pub enum FetchStatus {
  Loading,
  Error(Arc<CatalogError>),
  Success,
}

impl Serialize for FetchStatus {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("FetchStatus", 2)?;
    match self {
      FetchStatus::Loading => {
        state.serialize_field("state", "loading")?;
        state.serialize_field("message", &Option::<String>::None)?;
      }
      FetchStatus::Error(err) => {
        state.serialize_field("state", "error")?;
        state.serialize_field("message", &Some(err.to_string()))?;
      }
      FetchStatus::Success => {
        state.serialize_field("state", "success")?;
        state.serialize_field("message", &Option::<String>::None)?;
      }
    }
    state.end()
  }
}

/// One rendered page of the catalog. While loading or after an error,
/// `products` holds whatever the same filters produced last time (possibly nothing).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
  pub products: Vec<Product>,
  pub total: usize,
  pub total_pages: u32,
  pub status: FetchStatus,
  pub strategy: Strategy,
  pub filters: FilterState,
}

impl CatalogView {
  pub fn is_loading(&self) -> bool {
    matches!(self.status, FetchStatus::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self.status, FetchStatus::Error(_))
  }

  pub fn error(&self) -> Option<&CatalogError> {
    match &self.status {
      FetchStatus::Error(err) => Some(err.as_ref()),
      _ => None,
    }
  }

  pub fn page(&self) -> u32 {
    self.filters.page()
  }
}

/// `max(1, ceil(total / page_size))`.
pub fn total_pages(total: usize, page_size: u32) -> u32 {
  let size = page_size.max(1) as usize;
  let pages = (total + size - 1) / size;
  pages.max(1) as u32
}
