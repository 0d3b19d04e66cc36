//! Reactive chart store.
//!
//! Canonical state (genre map, album entries, selected genre) lives
//! behind one mutex; commands mutate it or spawn fetch chains; derived
//! read models are published through `watch` channels, so late
//! subscribers always observe the latest value.
//!
//! Each chain carries a generation id. A command bumps its chain's
//! generation under the state lock; a completing fetch commits only if
//! its captured generation is still current, otherwise the result is
//! discarded. That "latest wins" check is the only cancellation
//! primitive.

mod persist;
mod status;

pub use status::LoadStatus;

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::{AlbumEntry, CatalogClient, Genre};
use crate::prefs::PreferenceStore;
use crate::view::{album_list_items, AlbumListItem};
use persist::PREFS_KEY;

/// Command intake and read-model surface for the top-albums charts.
///
/// Cheap to clone; all clones share state. Commands are fire-and-forget
/// and never fail synchronously; their effects are observed through the
/// read models. Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct ChartStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    catalog: Arc<dyn CatalogClient>,
    prefs: Arc<dyn PreferenceStore>,
    state: Mutex<CatalogState>,
    channels: Channels,
}

/// Canonical state. Collections are replaced wholesale on fetch commit,
/// never merged.
struct CatalogState {
    genre_map: BTreeMap<u64, Genre>,
    album_entries: Vec<AlbumEntry>,
    selected_genre_id: Option<u64>,
    genre_generation: u64,
    album_generation: u64,
}

struct Channels {
    genres: watch::Sender<Vec<Genre>>,
    current_genre: watch::Sender<Option<Genre>>,
    album_items: watch::Sender<Vec<AlbumListItem>>,
    genre_status: watch::Sender<LoadStatus>,
    album_status: watch::Sender<LoadStatus>,
}

impl ChartStore {
    /// Build a store, seeding the genre selection from the preference
    /// record. Malformed or absent records seed no selection.
    pub fn new(catalog: Arc<dyn CatalogClient>, prefs: Arc<dyn PreferenceStore>) -> Self {
        let selected_genre_id = prefs
            .read(PREFS_KEY)
            .and_then(|record| persist::decode_selected(&record));
        if let Some(genre_id) = selected_genre_id {
            info!(genre_id, "restored persisted genre selection");
        }

        Self {
            inner: Arc::new(StoreInner {
                catalog,
                prefs,
                state: Mutex::new(CatalogState {
                    genre_map: BTreeMap::new(),
                    album_entries: Vec::new(),
                    selected_genre_id,
                    genre_generation: 0,
                    album_generation: 0,
                }),
                channels: Channels {
                    genres: watch::channel(Vec::new()).0,
                    current_genre: watch::channel(None).0,
                    album_items: watch::channel(Vec::new()).0,
                    genre_status: watch::channel(LoadStatus::Idle).0,
                    album_status: watch::channel(LoadStatus::Idle).0,
                },
            }),
        }
    }

    /// Refresh the genre list. Supersedes any in-flight genre fetch.
    ///
    /// On success the store resolves a genre to show (the current
    /// selection if there is one, else the first fetched genre) and
    /// cascades into an album load for it, so a genre list is never
    /// published without a corresponding album chart.
    pub fn request_genre_load(&self) {
        let generation = {
            let mut state = self.inner.state.lock();
            state.genre_generation += 1;
            self.inner
                .channels
                .genre_status
                .send_replace(LoadStatus::Loading);
            state.genre_generation
        };
        let store = self.clone();
        tokio::spawn(async move { store.run_genre_chain(generation).await });
    }

    /// Load the album chart for `genre_id`, selecting it at the same
    /// time. The selection (and its persistence) happens synchronously,
    /// before the fetch starts; the chart arrives later.
    ///
    /// `genre_id` is not validated against the genre map; genres need
    /// not be loaded first.
    pub fn request_album_load(&self, genre_id: u64) {
        let generation = {
            let mut state = self.inner.state.lock();
            self.set_selected(&mut state, genre_id);
            state.album_generation += 1;
            self.inner
                .channels
                .album_status
                .send_replace(LoadStatus::Loading);
            state.album_generation
        };
        let store = self.clone();
        tokio::spawn(async move { store.run_album_chain(generation, genre_id).await });
    }

    /// Change the selection without fetching anything. For out-of-band
    /// selection changes; `request_album_load` is the combined
    /// select-and-load operation.
    pub fn select_genre(&self, genre_id: u64) {
        let mut state = self.inner.state.lock();
        self.set_selected(&mut state, genre_id);
    }

    /// Genre list sorted by title ascending; ties keep id order.
    pub fn genres(&self) -> watch::Receiver<Vec<Genre>> {
        self.inner.channels.genres.subscribe()
    }

    /// The selected genre, resolved against the genre map. `None` until
    /// both a selection and a map containing it exist.
    pub fn current_genre(&self) -> watch::Receiver<Option<Genre>> {
        self.inner.channels.current_genre.subscribe()
    }

    /// Display rows for the most recently committed album chart.
    pub fn album_list_items(&self) -> watch::Receiver<Vec<AlbumListItem>> {
        self.inner.channels.album_items.subscribe()
    }

    pub fn genre_status(&self) -> watch::Receiver<LoadStatus> {
        self.inner.channels.genre_status.subscribe()
    }

    pub fn album_status(&self) -> watch::Receiver<LoadStatus> {
        self.inner.channels.album_status.subscribe()
    }

    async fn run_genre_chain(self, generation: u64) {
        let genres = match self.inner.catalog.fetch_genres().await {
            Ok(genres) => genres,
            Err(err) => {
                let state = self.inner.state.lock();
                if state.genre_generation == generation {
                    warn!(%err, "genre fetch failed, keeping previous genre list");
                    self.inner
                        .channels
                        .genre_status
                        .send_replace(LoadStatus::Failed {
                            message: err.to_string(),
                        });
                } else {
                    debug!(generation, "superseded genre fetch failed, ignoring");
                }
                return;
            }
        };

        let resolved = {
            let mut state = self.inner.state.lock();
            if state.genre_generation != generation {
                debug!(generation, "discarding superseded genre result");
                return;
            }
            state.genre_map = genres.iter().map(|g| (g.id, g.clone())).collect();
            self.inner
                .channels
                .genres
                .send_replace(title_sorted(&state.genre_map));
            self.inner
                .channels
                .current_genre
                .send_replace(resolve_current(&state));
            self.inner
                .channels
                .genre_status
                .send_replace(LoadStatus::Ready);
            // Fallback uses fetch order, not the sorted read model.
            state
                .selected_genre_id
                .or_else(|| genres.first().map(|g| g.id))
        };

        if let Some(genre_id) = resolved {
            self.request_album_load(genre_id);
        }
    }

    async fn run_album_chain(self, generation: u64, genre_id: u64) {
        match self.inner.catalog.fetch_top_albums(genre_id).await {
            Ok(entries) => {
                let mut state = self.inner.state.lock();
                if state.album_generation != generation {
                    debug!(genre_id, "discarding superseded album result");
                    return;
                }
                state.album_entries = entries;
                self.inner
                    .channels
                    .album_items
                    .send_replace(album_list_items(&state.album_entries));
                self.inner
                    .channels
                    .album_status
                    .send_replace(LoadStatus::Ready);
            }
            Err(err) => {
                let state = self.inner.state.lock();
                if state.album_generation == generation {
                    warn!(genre_id, %err, "album fetch failed, keeping previous chart");
                    self.inner
                        .channels
                        .album_status
                        .send_replace(LoadStatus::Failed {
                            message: err.to_string(),
                        });
                } else {
                    debug!(genre_id, "superseded album fetch failed, ignoring");
                }
            }
        }
    }

    /// Commit a selection: canonical state, `current_genre` read model,
    /// and the preference record, in that order. Runs under the state
    /// lock so selection updates serialize with chain commits.
    fn set_selected(&self, state: &mut CatalogState, genre_id: u64) {
        state.selected_genre_id = Some(genre_id);
        self.inner
            .channels
            .current_genre
            .send_replace(resolve_current(state));
        let record = self.inner.prefs.read(PREFS_KEY);
        let record = persist::merge_selected(record.as_deref(), Some(genre_id));
        self.inner.prefs.write(PREFS_KEY, &record);
    }
}

fn title_sorted(genre_map: &BTreeMap<u64, Genre>) -> Vec<Genre> {
    let mut genres: Vec<Genre> = genre_map.values().cloned().collect();
    // Stable sort: equal titles keep the map's ascending-id order.
    genres.sort_by(|a, b| a.title.cmp(&b.title));
    genres
}

fn resolve_current(state: &CatalogState) -> Option<Genre> {
    state
        .selected_genre_id
        .and_then(|id| state.genre_map.get(&id).cloned())
}
