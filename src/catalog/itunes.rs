//! Apple catalog (iTunes) client.
//!
//! Two public endpoints: the genre tree service and the per-genre
//! top-albums RSS feed in its JSON rendering. Neither shape is formally
//! documented, so decoding goes through `serde_json::Value` and tolerates
//! missing optional fields.

use std::sync::OnceLock;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::client::{CatalogClient, CatalogError};
use super::types::{AlbumEntry, Genre};

/// Root node of the music subtree in the genre service.
const MUSIC_GENRE_ROOT: u64 = 34;

/// Shared HTTP client for all catalog requests.
fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .user_agent(concat!("topcharts/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("HTTP client construction failed")
    })
}

/// Catalog client backed by the public iTunes endpoints.
pub struct ItunesCatalog {
    storefront: String,
    limit: usize,
}

impl ItunesCatalog {
    pub fn new(storefront: impl Into<String>, limit: usize) -> Self {
        Self {
            storefront: storefront.into(),
            limit,
        }
    }

    fn genres_url(&self) -> String {
        format!(
            "https://itunes.apple.com/WebObjects/MZStoreServices.woa/ws/genres?id={MUSIC_GENRE_ROOT}"
        )
    }

    fn top_albums_url(&self, genre_id: u64) -> String {
        format!(
            "https://itunes.apple.com/{}/rss/topalbums/limit={}/genre={}/json",
            self.storefront, self.limit, genre_id
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, CatalogError> {
        debug!(url, "catalog request");
        let response = http_client()
            .get(url)
            .send()
            .await
            .map_err(|source| CatalogError::Http { source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }
        response
            .json()
            .await
            .map_err(|source| CatalogError::Http { source })
    }
}

impl Default for ItunesCatalog {
    fn default() -> Self {
        Self::new("us", 20)
    }
}

#[async_trait]
impl CatalogClient for ItunesCatalog {
    async fn fetch_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let payload = self.get_json(&self.genres_url()).await?;
        parse_genres(&payload)
    }

    async fn fetch_top_albums(&self, genre_id: u64) -> Result<Vec<AlbumEntry>, CatalogError> {
        let payload = self.get_json(&self.top_albums_url(genre_id)).await?;
        parse_albums(&payload)
    }
}

/// Extract the music subgenres from the genre-tree payload.
///
/// Nodes with non-numeric ids or without a name are skipped rather than
/// failing the whole fetch.
fn parse_genres(payload: &Value) -> Result<Vec<Genre>, CatalogError> {
    let subgenres = payload
        .get(MUSIC_GENRE_ROOT.to_string())
        .and_then(|music| music.get("subgenres"))
        .and_then(Value::as_object)
        .ok_or_else(|| CatalogError::Payload("genre tree has no music subgenres".into()))?;

    let mut genres = Vec::with_capacity(subgenres.len());
    for (id, node) in subgenres {
        let (Ok(id), Some(title)) = (id.parse::<u64>(), node.get("name").and_then(Value::as_str))
        else {
            continue;
        };
        genres.push(Genre {
            id,
            title: title.to_string(),
        });
    }
    Ok(genres)
}

fn parse_albums(payload: &Value) -> Result<Vec<AlbumEntry>, CatalogError> {
    let feed = payload
        .get("feed")
        .ok_or_else(|| CatalogError::Payload("top-albums payload has no feed".into()))?;

    // A single-entry feed serializes `entry` as an object, not an array.
    let entries: Vec<&Value> = match feed.get("entry") {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(entry @ Value::Object(_)) => vec![entry],
        _ => Vec::new(),
    };

    Ok(entries.into_iter().filter_map(parse_entry).collect())
}

fn parse_entry(entry: &Value) -> Option<AlbumEntry> {
    let name = label(entry.get("im:name"))?;
    let artist = label(entry.get("im:artist"))?;
    // The feed lists artwork in ascending resolution; take the largest.
    let artwork_url = entry
        .get("im:image")
        .and_then(Value::as_array)
        .and_then(|images| images.last())
        .and_then(|image| image.get("label"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let link = entry
        .get("link")
        .and_then(|link| link.get("attributes"))
        .and_then(|attributes| attributes.get("href"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let release_date = label(entry.get("im:releaseDate"));

    Some(AlbumEntry {
        name,
        artist,
        artwork_url,
        link,
        release_date,
    })
}

fn label(node: Option<&Value>) -> Option<String> {
    node?.get("label")?.as_str().map(str::to_string)
}
