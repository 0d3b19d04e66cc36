//! Catalog reference data: wire entities and the client seam.

mod client;
mod itunes;
mod types;

pub use client::{CatalogClient, CatalogError};
pub use itunes::ItunesCatalog;
pub use types::{AlbumEntry, Genre};
