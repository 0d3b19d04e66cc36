//! Display-ready projections of catalog entities.

use crate::catalog::AlbumEntry;

/// One row of a rendered album chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumListItem {
    pub title: String,
    pub artist: String,
    pub artwork_url: String,
}

/// Project raw chart entries into display rows.
pub fn album_list_items(entries: &[AlbumEntry]) -> Vec<AlbumListItem> {
    entries
        .iter()
        .map(|entry| AlbumListItem {
            title: entry.name.clone(),
            artist: entry.artist.clone(),
            artwork_url: entry.artwork_url.clone(),
        })
        .collect()
}
