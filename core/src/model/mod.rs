// catalog_kit/src/model/mod.rs

//! Canonical catalog entities and the normalization boundary that produces them.

pub mod id;
pub mod normalize;
pub mod product;
pub mod taxonomy;

pub use id::EntityId;
pub use product::{Product, ProductDraft, ProductPage, SpecEntry, MAX_PRODUCT_IMAGES};
pub use taxonomy::{Brand, Category, TaxonomyDraft};
