//! Scripted catalog client and helpers for store tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{watch, Notify};
use tokio::time::timeout;

use topcharts::catalog::{AlbumEntry, CatalogClient, CatalogError, Genre};

/// Manually opened latch holding a scripted response in flight.
pub struct Gate {
    opened: Mutex<bool>,
    notify: Notify,
}

impl Gate {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            opened: Mutex::new(false),
            notify: Notify::new(),
        })
    }

    pub fn open(&self) {
        *self.opened.lock() = true;
        self.notify.notify_waiters();
    }

    async fn wait(&self) {
        loop {
            // Subscribe before checking the flag so an open() between the
            // check and the await cannot be missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if *self.opened.lock() {
                return;
            }
            notified.await;
        }
    }
}

struct Scripted<T> {
    result: Result<T, String>,
    gate: Option<Arc<Gate>>,
}

#[derive(Default)]
struct Script {
    genre_responses: VecDeque<Scripted<Vec<Genre>>>,
    album_responses: HashMap<u64, VecDeque<Scripted<Vec<AlbumEntry>>>>,
    genre_calls: usize,
    album_calls: Vec<u64>,
}

/// Catalog client driven by a per-test script.
///
/// Genre responses are consumed in call order; album responses are keyed
/// by genre id so concurrent fetches stay unambiguous. Gated responses
/// block until their gate opens, which lets tests invert completion
/// order.
#[derive(Default)]
pub struct MockCatalog {
    script: Mutex<Script>,
}

impl MockCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stage_genres(&self, genres: Vec<Genre>) {
        self.script.lock().genre_responses.push_back(Scripted {
            result: Ok(genres),
            gate: None,
        });
    }

    pub fn stage_genres_gated(&self, genres: Vec<Genre>) -> Arc<Gate> {
        let gate = Gate::new();
        self.script.lock().genre_responses.push_back(Scripted {
            result: Ok(genres),
            gate: Some(gate.clone()),
        });
        gate
    }

    pub fn stage_genres_error(&self, message: &str) {
        self.script.lock().genre_responses.push_back(Scripted {
            result: Err(message.to_string()),
            gate: None,
        });
    }

    pub fn stage_albums(&self, genre_id: u64, entries: Vec<AlbumEntry>) {
        self.script
            .lock()
            .album_responses
            .entry(genre_id)
            .or_default()
            .push_back(Scripted {
                result: Ok(entries),
                gate: None,
            });
    }

    pub fn stage_albums_gated(&self, genre_id: u64, entries: Vec<AlbumEntry>) -> Arc<Gate> {
        let gate = Gate::new();
        self.script
            .lock()
            .album_responses
            .entry(genre_id)
            .or_default()
            .push_back(Scripted {
                result: Ok(entries),
                gate: Some(gate.clone()),
            });
        gate
    }

    pub fn stage_albums_error(&self, genre_id: u64, message: &str) {
        self.script
            .lock()
            .album_responses
            .entry(genre_id)
            .or_default()
            .push_back(Scripted {
                result: Err(message.to_string()),
                gate: None,
            });
    }

    pub fn stage_albums_error_gated(&self, genre_id: u64, message: &str) -> Arc<Gate> {
        let gate = Gate::new();
        self.script
            .lock()
            .album_responses
            .entry(genre_id)
            .or_default()
            .push_back(Scripted {
                result: Err(message.to_string()),
                gate: Some(gate.clone()),
            });
        gate
    }

    pub fn genre_calls(&self) -> usize {
        self.script.lock().genre_calls
    }

    pub fn album_calls(&self) -> Vec<u64> {
        self.script.lock().album_calls.clone()
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn fetch_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let scripted = {
            let mut script = self.script.lock();
            script.genre_calls += 1;
            script.genre_responses.pop_front()
        };
        resolve(scripted, "genre").await
    }

    async fn fetch_top_albums(&self, genre_id: u64) -> Result<Vec<AlbumEntry>, CatalogError> {
        let scripted = {
            let mut script = self.script.lock();
            script.album_calls.push(genre_id);
            script
                .album_responses
                .get_mut(&genre_id)
                .and_then(VecDeque::pop_front)
        };
        resolve(scripted, "album").await
    }
}

async fn resolve<T>(scripted: Option<Scripted<T>>, kind: &str) -> Result<T, CatalogError> {
    let Some(scripted) = scripted else {
        return Err(CatalogError::Payload(format!("unscripted {kind} fetch")));
    };
    if let Some(gate) = &scripted.gate {
        gate.wait().await;
    }
    scripted.result.map_err(CatalogError::Payload)
}

pub fn genre(id: u64, title: &str) -> Genre {
    Genre {
        id,
        title: title.to_string(),
    }
}

pub fn album(name: &str, artist: &str) -> AlbumEntry {
    AlbumEntry {
        name: name.to_string(),
        artist: artist.to_string(),
        artwork_url: format!("{name}.jpg"),
        link: None,
        release_date: None,
    }
}

/// Await a read model until `pred` holds, with a hard timeout.
pub async fn recv_until<T, F>(rx: &mut watch::Receiver<T>, mut pred: F) -> T
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    loop {
        let current = rx.borrow_and_update().clone();
        if pred(&current) {
            return current;
        }
        timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("read model did not settle in time")
            .expect("store dropped");
    }
}

/// Let spawned chains run to completion on the current-thread runtime.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
