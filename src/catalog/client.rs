//! Client seam for catalog fetches.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{AlbumEntry, Genre};

/// Errors produced by a single catalog fetch attempt.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure or undecodable response body.
    #[error("catalog request failed: {source}")]
    Http {
        #[source]
        source: reqwest::Error,
    },

    /// Catalog answered with a non-success HTTP status.
    #[error("catalog returned status {status}")]
    Status { status: u16 },

    /// Body decoded as JSON but did not have the expected shape.
    #[error("unexpected catalog payload: {0}")]
    Payload(String),
}

/// Asynchronous source of catalog reference data.
///
/// Consumers treat any error as "this attempt produced nothing" and keep
/// whatever they published last; no retry policy lives behind this seam.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the full genre list, in catalog order.
    async fn fetch_genres(&self) -> Result<Vec<Genre>, CatalogError>;

    /// Fetch the top-albums chart for one genre.
    async fn fetch_top_albums(&self, genre_id: u64) -> Result<Vec<AlbumEntry>, CatalogError>;
}
