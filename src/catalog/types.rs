//! Catalog wire entities.

use serde::{Deserialize, Serialize};

/// A music genre from the catalog's genre tree.
///
/// Immutable once fetched; identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub title: String,
}

/// One entry of a top-albums chart, as returned by the feed.
///
/// Fields beyond `name`/`artist`/`artwork_url` are carried through
/// untouched for display layers that want them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumEntry {
    pub name: String,
    pub artist: String,
    pub artwork_url: String,
    pub link: Option<String>,
    pub release_date: Option<String>,
}
