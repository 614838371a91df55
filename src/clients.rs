pub mod catalog;
pub mod jikan;

pub use catalog::{CatalogItem, CatalogSource, MediaType, UNKNOWN_POPULARITY};
pub use jikan::{JikanClient, JikanConfig};
