//! Reply cache: background fetches keyed by id, with timeout and size cap.
//!
//! Each key owns a `watch` channel carrying its [`Status`]. A fetch task
//! stores the body and then publishes the settled status, so a waiter that
//! observes `Finished` always finds the body in place.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::fetcher::Fetcher;
use crate::status::Status;

struct Entry {
    status: watch::Sender<Status>,
    body: Option<String>,
    /// Fetch attempt allowed to settle this entry.
    generation: u64,
}

impl Entry {
    fn in_progress(generation: u64) -> Self {
        Self {
            status: watch::Sender::new(Status::InProgress),
            body: None,
            generation,
        }
    }
}

struct Shared<F> {
    fetcher: F,
    entries: DashMap<i64, Entry>,
    generations: AtomicU64,
    fetch_timeout_ms: AtomicU64,
    max_body_size: usize,
}

/// Cache of fetched payloads.
///
/// Fetches run on the tokio runtime that was current when the cache was
/// created. Failed entries are refetched on the next prefetch.
pub struct ReplyCache<F: Fetcher> {
    shared: Arc<Shared<F>>,
    runtime: Handle,
}

impl<F: Fetcher> ReplyCache<F> {
    /// Create a cache on the current tokio runtime.
    pub fn new(fetcher: F, config: FetchConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| FetchError::Runtime {
            message: e.to_string(),
        })?;
        Self::with_runtime(fetcher, config, runtime)
    }

    /// Create a cache that spawns its fetches on `runtime`.
    pub fn with_runtime(fetcher: F, config: FetchConfig, runtime: Handle) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                fetcher,
                entries: DashMap::new(),
                generations: AtomicU64::new(0),
                fetch_timeout_ms: AtomicU64::new(config.fetch_timeout_ms),
                max_body_size: config.max_body_size,
            }),
            runtime,
        })
    }

    /// Current fetch timeout in milliseconds.
    #[must_use]
    pub fn fetch_timeout_ms(&self) -> u64 {
        self.shared.fetch_timeout_ms.load(Ordering::Relaxed)
    }

    /// Change the timeout applied to fetches started from now on.
    pub fn set_fetch_timeout_ms(&self, ms: u64) {
        self.shared.fetch_timeout_ms.store(ms, Ordering::Relaxed);
    }

    /// Largest accepted payload in bytes.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.shared.max_body_size
    }

    /// Start fetching `id` unless it is already running or cached.
    ///
    /// Returns whether a fetch for `id` is running or has finished.
    pub fn prefetch(&self, id: i64) -> bool {
        let generation = self.shared.generations.fetch_add(1, Ordering::Relaxed);
        match self.shared.entries.entry(id) {
            MapEntry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if !matches!(*entry.status.borrow(), Status::Error(_)) {
                    return true;
                }
                tracing::debug!(id, "retrying failed fetch");
                entry.body = None;
                entry.generation = generation;
                entry.status.send_replace(Status::InProgress);
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::in_progress(generation));
            }
        }
        self.runtime
            .spawn(run_fetch(Arc::clone(&self.shared), id, generation));
        true
    }

    /// Status of `id`.
    #[must_use]
    pub fn status(&self, id: i64) -> Status {
        self.shared
            .entries
            .get(&id)
            .map(|entry| entry.status.borrow().clone())
            .unwrap_or_default()
    }

    /// Cached body of `id`, without waiting.
    #[must_use]
    pub fn cached(&self, id: i64) -> Option<String> {
        self.shared.entries.get(&id).and_then(|entry| entry.body.clone())
    }

    /// Body of `id`, fetching it first if needed and waiting for the result.
    pub async fn get(&self, id: i64) -> Option<String> {
        self.prefetch(id);
        let mut status = self.shared.entries.get(&id)?.status.subscribe();
        let finished = match status.wait_for(Status::is_settled).await {
            Ok(settled) => *settled == Status::Finished,
            Err(_) => false,
        };
        if finished {
            self.cached(id)
        } else {
            None
        }
    }

    /// Wait until `id` settles or `limit` elapses, returning its status.
    pub async fn wait(&self, id: i64, limit: Duration) -> Status {
        let Some(mut status) = self.shared.entries.get(&id).map(|e| e.status.subscribe()) else {
            return Status::NotStarted;
        };
        match tokio::time::timeout(limit, status.wait_for(Status::is_settled)).await {
            Ok(Ok(settled)) => settled.clone(),
            _ => self.status(id),
        }
    }

    /// Drop the entry for `id`, returning whether one existed.
    pub fn evict(&self, id: i64) -> bool {
        self.shared.entries.remove(&id).is_some()
    }

    /// Number of tracked entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.entries.len()
    }

    /// Whether no entries are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.entries.is_empty()
    }
}

impl<F: Fetcher> std::fmt::Debug for ReplyCache<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyCache")
            .field("entries", &self.shared.entries.len())
            .field("fetch_timeout_ms", &self.fetch_timeout_ms())
            .field("max_body_size", &self.shared.max_body_size)
            .finish_non_exhaustive()
    }
}

async fn run_fetch<F: Fetcher>(shared: Arc<Shared<F>>, id: i64, generation: u64) {
    let timeout_ms = shared.fetch_timeout_ms.load(Ordering::Relaxed);
    let limit = shared.max_body_size;
    let outcome = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        shared.fetcher.fetch(id, limit),
    )
    .await
    .unwrap_or(Err(FetchError::Timeout { timeout_ms }))
    .and_then(|payload| {
        // Fetchers are asked to stop at the limit; not all of them do.
        if payload.len() > limit {
            return Err(FetchError::TooLarge {
                size: payload.len(),
                limit,
            });
        }
        Ok(String::from_utf8_lossy(&payload).into_owned())
    });

    // The entry may have been evicted, or evicted and refetched, meanwhile.
    let Some(mut entry) = shared.entries.get_mut(&id) else {
        return;
    };
    if entry.generation != generation {
        tracing::debug!(id, "discarding outcome of a superseded fetch");
        return;
    }
    match outcome {
        Ok(body) => {
            tracing::debug!(id, bytes = body.len(), "fetch finished");
            entry.body = Some(body);
            entry.status.send_replace(Status::Finished);
        }
        Err(error) => {
            tracing::warn!(id, %error, "fetch failed");
            entry.body = None;
            entry.status.send_replace(Status::Error(error.to_string()));
        }
    }
}
