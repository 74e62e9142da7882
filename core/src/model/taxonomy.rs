// catalog_kit/src/model/taxonomy.rs

//! Categories and brands: an id plus a display name, referenced by products.

use super::id::EntityId;
use super::product::not_blank;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id: EntityId,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
  pub id: EntityId,
  pub name: String,
}

/// Create/update payload shared by the category and brand forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaxonomyDraft {
  #[validate(custom = "not_blank")]
  pub name: String,
}

impl TaxonomyDraft {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }
}
