// catalog_kit/src/filter/mod.rs
pub mod engine;
pub mod state;

pub use engine::{filter_products, matches, paginate};
pub use state::{FilterCriteria, FilterState, DEFAULT_PAGE_SIZE};
