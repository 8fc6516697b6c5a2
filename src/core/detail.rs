//! Detail view controller
//!
//! Loads the full detail of the selected title, tracks the user's rating
//! for it, and turns a rated detail into a watch-list entry.

use crate::core::catalog::CatalogClient;
use crate::error::{PopcornError, Result};
use crate::storage::watchlist::WatchlistStore;
use crate::types::{MAX_RATING, MovieDetail, WatchedEntry};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const NETWORK_MESSAGE: &str = "Something went wrong while loading the movie detail";
const NOT_FOUND_MESSAGE: &str = "can't find the movie";

/// Where the detail fetch stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailStatus {
    #[default]
    Empty,
    Loading,
    Ready(MovieDetail),
    Errored(String),
}

/// Snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailState {
    /// Id of the open title, None when the view is closed
    pub selection: Option<String>,
    pub status: DetailStatus,
    /// 0 until the user rates
    pub user_rating: u8,
    /// Rating changes since this title was selected
    pub rating_change_count: u32,
}

impl DetailState {
    pub fn detail(&self) -> Option<&MovieDetail> {
        match &self.status {
            DetailStatus::Ready(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == DetailStatus::Loading
    }

    /// Window title while a detail is shown; None means "use the default"
    pub fn current_title(&self) -> Option<String> {
        self.detail().map(|d| format!("Movie | {}", d.title))
    }

    /// The add action is offered once the loaded title has been rated
    pub fn can_add(&self) -> bool {
        self.detail().is_some() && self.user_rating > 0
    }
}

/// Minutes from the leading integer of a runtime text, e.g. "148 min"
pub fn parse_runtime(text: &str) -> Result<u32> {
    text.split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| PopcornError::Parse(format!("runtime {:?}", text)))
}

/// Build the watch-list entry for a rated detail
fn build_entry(detail: &MovieDetail, user_rating: u8, rating_change_count: u32) -> Result<WatchedEntry> {
    let runtime = parse_runtime(&detail.runtime_text)?;
    let imdb_rating = detail
        .imdb_rating
        .ok_or_else(|| PopcornError::Parse(format!("IMDb rating of {}", detail.title)))?;

    Ok(WatchedEntry {
        id: detail.id.clone(),
        title: detail.title.clone(),
        poster_url: detail.poster_url.clone(),
        imdb_rating,
        runtime,
        user_rating,
        rating_change_count,
        added_at: Utc::now().timestamp(),
    })
}

struct Inner {
    client: Arc<dyn CatalogClient>,
    /// Token of the request allowed to write state. Held while writing.
    inflight: Mutex<Option<CancellationToken>>,
    state: watch::Sender<DetailState>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, token: &CancellationToken, outcome: Result<MovieDetail>) {
        let _inflight = self.lock();
        if token.is_cancelled() {
            debug!("dropping superseded detail response");
            return;
        }

        let status = match outcome {
            Ok(detail) => DetailStatus::Ready(detail),
            Err(e) if e.is_cancelled() => return,
            Err(PopcornError::NotFound(reason)) => {
                debug!(%reason, "detail not found");
                DetailStatus::Errored(NOT_FOUND_MESSAGE.into())
            }
            Err(e) => {
                warn!(error = %e, "detail fetch failed");
                DetailStatus::Errored(NETWORK_MESSAGE.into())
            }
        };
        self.state.send_modify(|s| s.status = status);
    }
}

/// Detail controller. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct DetailController {
    inner: Arc<Inner>,
}

impl DetailController {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            inner: Arc::new(Inner {
                client,
                inflight: Mutex::new(None),
                state,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> DetailState {
        self.inner.state.borrow().clone()
    }

    /// Open a title and start loading it. Returns the fetch task, or None
    /// if the title is already open.
    pub fn select(&self, id: &str) -> Option<JoinHandle<()>> {
        let mut inflight = self.inner.lock();
        let already_open = self.inner.state.borrow().selection.as_deref() == Some(id);
        if already_open {
            return None;
        }

        if let Some(previous) = inflight.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        *inflight = Some(token.clone());
        self.inner.state.send_replace(DetailState {
            selection: Some(id.to_string()),
            status: DetailStatus::Loading,
            ..DetailState::default()
        });
        drop(inflight);

        debug!(id, "loading detail");
        let inner = Arc::clone(&self.inner);
        let id = id.to_string();
        Some(tokio::spawn(async move {
            let outcome = inner.client.detail(&id, &token).await;
            inner.resolve(&token, outcome);
        }))
    }

    /// Clicking the open title again closes it
    pub fn toggle(&self, id: &str) -> Option<JoinHandle<()>> {
        let already_open = self.inner.state.borrow().selection.as_deref() == Some(id);
        if already_open {
            self.close();
            None
        } else {
            self.select(id)
        }
    }

    /// Close the view and discard any in-flight request
    pub fn close(&self) {
        let mut inflight = self.inner.lock();
        if let Some(token) = inflight.take() {
            token.cancel();
        }
        self.inner.state.send_if_modified(|s| {
            if *s == DetailState::default() {
                return false;
            }
            *s = DetailState::default();
            true
        });
    }

    /// Record a user rating for the loaded title
    pub fn rate(&self, rating: u8) -> Result<()> {
        if rating == 0 || rating > MAX_RATING {
            return Err(PopcornError::InvalidRating { got: rating, max: MAX_RATING });
        }

        let _inflight = self.inner.lock();
        let mut result = Ok(());
        self.inner.state.send_if_modified(|s| {
            if s.detail().is_none() {
                result = Err(PopcornError::NoDetail);
                return false;
            }
            if s.user_rating == rating {
                return false;
            }
            s.user_rating = rating;
            s.rating_change_count += 1;
            true
        });
        result
    }

    /// Rating already stored for the open title, if it is on the list
    pub fn watched_rating(&self, store: &WatchlistStore) -> Option<u8> {
        let selection = self.inner.state.borrow().selection.clone()?;
        store.get(&selection).map(|e| e.user_rating)
    }

    /// Add the rated title to the watch-list and close the view.
    ///
    /// Returns the new entry, or None if the title was already listed.
    /// On a failed write the view stays open so the user can retry.
    pub async fn add_to_watchlist(&self, store: &mut WatchlistStore) -> Result<Option<WatchedEntry>> {
        let state = self.snapshot();
        let detail = state.detail().ok_or(PopcornError::NoDetail)?;
        if state.user_rating == 0 {
            return Err(PopcornError::NotRated);
        }

        let entry = build_entry(detail, state.user_rating, state.rating_change_count)?;
        let added = store.add(entry.clone()).await?;
        self.close();
        if !added {
            return Ok(None);
        }
        debug!(id = %entry.id, rating = entry.user_rating, "added to watch-list");
        Ok(Some(entry))
    }
}
