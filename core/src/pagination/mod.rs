// catalog_kit/src/pagination/mod.rs
pub mod cache;
pub mod controller;
pub mod view;

pub use cache::{CacheEntry, CacheSnapshot, FetchKey, FetchTicket, ResultCache};
pub use controller::{CatalogController, ControllerOptions};
pub use view::{total_pages, CatalogView, FetchStatus, Strategy};
