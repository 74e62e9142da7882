// catalog_kit/src/filter/engine.rs

//! Pure narrowing of an already-fetched product collection.

use super::state::FilterCriteria;
use crate::model::Product;

/// Whether `product` passes the category and brand filters (AND).
/// A missing category or an empty brand set is a pass-through.
pub fn matches(product: &Product, criteria: &FilterCriteria) -> bool {
  if let Some(category_id) = &criteria.category_id {
    if !product.in_category(category_id) {
      return false;
    }
  }
  if !criteria.brand_ids.is_empty() {
    match &product.brand_id {
      Some(brand_id) if criteria.brand_ids.contains(brand_id) => {}
      _ => return false,
    }
  }
  true
}

/// Keeps the products that match `criteria`, in their original order.
/// The input is never modified, so results can be memoized on `(products, criteria)`.
pub fn filter_products(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
  products.iter().filter(|p| matches(p, criteria)).cloned().collect()
}

/// The 1-based `page` of `items`. Pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], page: u32, page_size: u32) -> Vec<T> {
  let page_size = page_size.max(1) as usize;
  let start = (page.max(1) as usize - 1).saturating_mul(page_size);
  if start >= items.len() {
    return Vec::new();
  }
  let end = (start + page_size).min(items.len());
  items[start..end].to_vec()
}
