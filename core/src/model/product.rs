// catalog_kit/src/model/product.rs

use super::id::EntityId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Upper bound on image references per product.
pub const MAX_PRODUCT_IMAGES: usize = 4;

/// One line of a product's spec sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecEntry {
  pub label: String,
  pub value: String,
}

impl SpecEntry {
  pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      value: value.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: EntityId,
  pub name: String,
  pub code: String,
  pub commercial_code: String,
  pub category_id: Option<EntityId>,
  pub brand_id: Option<EntityId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub brand_name: Option<String>,
  #[serde(default)]
  pub images: Vec<String>,
  pub active: bool,
  #[serde(default)]
  pub spec_sheet: Vec<SpecEntry>,
}

impl Product {
  pub fn in_category(&self, category_id: &EntityId) -> bool {
    self.category_id.as_ref() == Some(category_id)
  }
}

/// Create/update payload coming from the admin product form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
  #[validate(custom = "not_blank")]
  pub name: String,
  #[validate(custom = "not_blank")]
  pub code: String,
  #[serde(default)]
  pub commercial_code: String,
  #[serde(default)]
  pub category_id: Option<EntityId>,
  #[serde(default)]
  pub brand_id: Option<EntityId>,
  #[serde(default)]
  #[validate(length(max = 4, message = "a product holds at most 4 images"))]
  pub images: Vec<String>,
  #[serde(default = "default_active")]
  pub active: bool,
  #[serde(default)]
  #[validate(custom = "spec_labels_present")]
  pub spec_sheet: Vec<SpecEntry>,
}

fn default_active() -> bool {
  true
}

impl Default for ProductDraft {
  fn default() -> Self {
    Self {
      name: String::new(),
      code: String::new(),
      commercial_code: String::new(),
      category_id: None,
      brand_id: None,
      images: Vec::new(),
      active: true,
      spec_sheet: Vec::new(),
    }
  }
}

impl From<&Product> for ProductDraft {
  fn from(product: &Product) -> Self {
    Self {
      name: product.name.clone(),
      code: product.code.clone(),
      commercial_code: product.commercial_code.clone(),
      category_id: product.category_id.clone(),
      brand_id: product.brand_id.clone(),
      images: product.images.clone(),
      active: product.active,
      spec_sheet: product.spec_sheet.clone(),
    }
  }
}

/// One page of products together with the total for the filter that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
  pub items: Vec<Product>,
  pub total: usize,
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    let mut err = ValidationError::new("blank");
    err.message = Some(Cow::from("must not be empty"));
    return Err(err);
  }
  Ok(())
}

fn spec_labels_present(entries: &[SpecEntry]) -> Result<(), ValidationError> {
  if entries.iter().any(|e| e.label.trim().is_empty()) {
    let mut err = ValidationError::new("spec_label");
    err.message = Some(Cow::from("every spec sheet entry needs a label"));
    return Err(err);
  }
  Ok(())
}
