//! Search controller
//!
//! Owns the query. Every change cancels the request behind the previous
//! query before starting a new one, so only the newest request can ever
//! write results.

use crate::core::catalog::CatalogClient;
use crate::core::detail::DetailController;
use crate::error::{PopcornError, Result};
use crate::types::SearchResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const NETWORK_MESSAGE: &str = "Something went wrong with fetching movies";
const NOT_FOUND_MESSAGE: &str = "Movie not found";

/// Where the search stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchStatus {
    /// Nothing typed yet
    #[default]
    Idle,
    Loading,
    Ready(Vec<SearchResult>),
    Errored(String),
}

/// Snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub query: String,
    pub status: SearchStatus,
}

impl SearchState {
    pub fn results(&self) -> &[SearchResult] {
        match &self.status {
            SearchStatus::Ready(results) => results,
            _ => &[],
        }
    }

    pub fn num_results(&self) -> usize {
        self.results().len()
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }
}

struct Inner {
    client: Arc<dyn CatalogClient>,
    detail: DetailController,
    /// Token of the request allowed to write state. Held while writing.
    inflight: Mutex<Option<CancellationToken>>,
    state: watch::Sender<SearchState>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, token: &CancellationToken, outcome: Result<Vec<SearchResult>>) {
        let _inflight = self.lock();
        if token.is_cancelled() {
            debug!("dropping superseded search response");
            return;
        }

        let status = match outcome {
            Ok(results) => {
                debug!(count = results.len(), "search resolved");
                SearchStatus::Ready(results)
            }
            Err(e) if e.is_cancelled() => return,
            Err(PopcornError::NotFound(reason)) => {
                debug!(%reason, "no search results");
                SearchStatus::Errored(NOT_FOUND_MESSAGE.into())
            }
            Err(e) => {
                warn!(error = %e, "search failed");
                SearchStatus::Errored(NETWORK_MESSAGE.into())
            }
        };
        self.state.send_modify(|s| s.status = status);
    }
}

/// Search controller. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SearchController {
    inner: Arc<Inner>,
}

impl SearchController {
    /// `detail` is closed whenever the query changes
    pub fn new(client: Arc<dyn CatalogClient>, detail: DetailController) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(Inner {
                client,
                detail,
                inflight: Mutex::new(None),
                state,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn query(&self) -> String {
        self.inner.state.borrow().query.clone()
    }

    /// Change the query. Returns the fetch task when a request was issued.
    pub fn set_query(&self, query: &str) -> Option<JoinHandle<()>> {
        let mut inflight = self.inner.lock();
        let unchanged = self.inner.state.borrow().query == query;
        if unchanged {
            return None;
        }

        if let Some(previous) = inflight.take() {
            debug!("cancelling previous search");
            previous.cancel();
        }
        self.inner.detail.close();

        if query.is_empty() {
            self.inner.state.send_replace(SearchState {
                query: String::new(),
                status: SearchStatus::Ready(Vec::new()),
            });
            return None;
        }

        let token = CancellationToken::new();
        *inflight = Some(token.clone());
        self.inner.state.send_replace(SearchState {
            query: query.to_string(),
            status: SearchStatus::Loading,
        });
        drop(inflight);

        let inner = Arc::clone(&self.inner);
        let query = query.to_string();
        Some(tokio::spawn(async move {
            let outcome = inner.client.search(&query, &token).await;
            inner.resolve(&token, outcome);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::fake::{FakeCatalog, detail, result};

    fn controllers() -> (Arc<FakeCatalog>, SearchController, DetailController) {
        let fake = Arc::new(FakeCatalog::default());
        let detail = DetailController::new(fake.clone());
        let search = SearchController::new(fake.clone(), detail.clone());
        (fake, search, detail)
    }

    #[tokio::test]
    async fn test_matrix_returns_two_results() {
        let (fake, search, _) = controllers();
        let reply = fake.expect_search("matrix");

        let task = search.set_query("matrix").unwrap();
        assert!(search.snapshot().is_loading());

        reply
            .send(Ok(vec![
                result("tt0133093", "The Matrix"),
                result("tt0234215", "The Matrix Reloaded"),
            ]))
            .unwrap();
        task.await.unwrap();

        let state = search.snapshot();
        assert_eq!(state.query, "matrix");
        assert_eq!(state.num_results(), 2);
        assert_eq!(state.results()[0].id, "tt0133093");
    }

    #[tokio::test]
    async fn test_empty_query_skips_request() {
        let (fake, search, _) = controllers();
        let reply = fake.expect_search("m");
        let task = search.set_query("m").unwrap();

        assert!(search.set_query("").is_none());
        assert_eq!(search.snapshot().status, SearchStatus::Ready(Vec::new()));

        reply.send(Ok(vec![result("tt1", "M")])).unwrap();
        task.await.unwrap();
        assert_eq!(search.snapshot().status, SearchStatus::Ready(Vec::new()));
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_older_response_cannot_overwrite_newer() {
        let (fake, search, _) = controllers();
        let first = fake.expect_search("mat");
        let second = fake.expect_search("matrix");

        let first_task = search.set_query("mat").unwrap();
        let second_task = search.set_query("matrix").unwrap();

        second
            .send(Ok(vec![result("tt0133093", "The Matrix"), result("tt0234215", "Reloaded")]))
            .unwrap();
        second_task.await.unwrap();

        first.send(Ok(vec![result("tt9", "Matador")])).unwrap();
        first_task.await.unwrap();

        let state = search.snapshot();
        assert_eq!(state.query, "matrix");
        assert_eq!(state.num_results(), 2);
    }

    #[tokio::test]
    async fn test_superseded_error_is_not_shown() {
        let (fake, search, _) = controllers();
        let first = fake.expect_search("a");
        let second = fake.expect_search("ab");
        let first_task = search.set_query("a").unwrap();
        let second_task = search.set_query("ab").unwrap();

        first.send(Err(PopcornError::Network("HTTP 500".into()))).unwrap();
        first_task.await.unwrap();
        assert!(search.snapshot().is_loading());

        second.send(Ok(vec![result("tt1", "Abba")])).unwrap();
        second_task.await.unwrap();
        assert_eq!(search.snapshot().num_results(), 1);
    }

    #[tokio::test]
    async fn test_every_outcome_leaves_loading() {
        let outcomes: Vec<(Result<Vec<SearchResult>>, SearchStatus)> = vec![
            (Ok(vec![]), SearchStatus::Ready(vec![])),
            (
                Err(PopcornError::NotFound("Movie not found!".into())),
                SearchStatus::Errored(NOT_FOUND_MESSAGE.into()),
            ),
            (
                Err(PopcornError::Network("HTTP 502".into())),
                SearchStatus::Errored(NETWORK_MESSAGE.into()),
            ),
        ];

        for (outcome, expected) in outcomes {
            let (fake, search, _) = controllers();
            let reply = fake.expect_search("q");
            let task = search.set_query("q").unwrap();
            reply.send(outcome).unwrap();
            task.await.unwrap();
            assert_eq!(search.snapshot().status, expected);
        }
    }

    #[tokio::test]
    async fn test_cancelled_outcome_is_absorbed() {
        let (fake, search, _) = controllers();
        let first = fake.expect_search("x");
        let second = fake.expect_search("xy");
        let first_task = search.set_query("x").unwrap();
        let second_task = search.set_query("xy").unwrap();

        first.send(Err(PopcornError::Cancelled)).unwrap();
        first_task.await.unwrap();
        second.send(Err(PopcornError::NotFound("Movie not found!".into()))).unwrap();
        second_task.await.unwrap();

        assert_eq!(search.snapshot().status, SearchStatus::Errored(NOT_FOUND_MESSAGE.into()));
    }

    #[tokio::test]
    async fn test_same_query_is_noop() {
        let (fake, search, _) = controllers();
        let reply = fake.expect_search("dune");
        let task = search.set_query("dune").unwrap();
        assert!(search.set_query("dune").is_none());

        reply.send(Ok(vec![result("tt1", "Dune")])).unwrap();
        task.await.unwrap();
        assert_eq!(fake.calls(), 1);
        assert_eq!(search.snapshot().num_results(), 1);
    }

    #[tokio::test]
    async fn test_query_change_closes_detail() {
        let (fake, search, detail_ctrl) = controllers();
        let reply = fake.expect_detail("tt1");
        let task = detail_ctrl.select("tt1").unwrap();
        reply.send(Ok(detail("tt1", "Dune", "155 min", Some(8.0)))).unwrap();
        task.await.unwrap();
        assert!(detail_ctrl.snapshot().detail().is_some());

        let _search_reply = fake.expect_search("alien");
        let _task = search.set_query("alien");
        assert_eq!(detail_ctrl.snapshot().selection, None);
    }

    #[tokio::test]
    async fn test_subscribers_see_final_state() {
        let (fake, search, _) = controllers();
        let mut rx = search.subscribe();
        let reply = fake.expect_search("heat");
        let _task = search.set_query("heat");

        reply.send(Ok(vec![result("tt0113277", "Heat")])).unwrap();
        let state = rx
            .wait_for(|s| !s.is_loading() && s.query == "heat")
            .await
            .unwrap()
            .clone();
        assert_eq!(state.num_results(), 1);
    }
}
