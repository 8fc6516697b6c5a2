//! Movie catalog client (OMDb)

use crate::error::{PopcornError, Result};
use crate::types::{Config, MovieDetail, SearchResult};
use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const USER_AGENT: &str = concat!("popcorn/", env!("CARGO_PKG_VERSION"));

/// Read-only access to the movie catalog.
///
/// Every call takes the token of the controller that issued it. Once the
/// token fires the call resolves to [`PopcornError::Cancelled`].
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search titles by free text
    async fn search(&self, query: &str, token: &CancellationToken) -> Result<Vec<SearchResult>>;

    /// Fetch full detail of one title
    async fn detail(&self, id: &str, token: &CancellationToken) -> Result<MovieDetail>;
}

/// Search result as returned by OMDb
#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

/// Title detail as returned by OMDb
#[derive(Debug, Deserialize)]
struct OmdbDetail {
    #[serde(rename = "imdbID")]
    id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "Genre", default)]
    genre: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

/// OMDb writes "N/A" for every missing field
fn non_empty(value: String) -> String {
    if value == "N/A" { String::new() } else { value }
}

/// Build search URL
fn build_search_url(base_url: &str, api_key: &str, query: &str) -> String {
    format!(
        "{}?apikey={}&s={}",
        base_url,
        urlencoding::encode(api_key),
        urlencoding::encode(query)
    )
}

/// Build detail URL
fn build_detail_url(base_url: &str, api_key: &str, id: &str) -> String {
    format!(
        "{}?apikey={}&i={}",
        base_url,
        urlencoding::encode(api_key),
        urlencoding::encode(id)
    )
}

/// Turn `"Response": "False"` into NotFound, keeping the API's reason
fn check_response(data: &serde_json::Value, fallback: &str) -> Result<()> {
    let response = data.get("Response").and_then(|r| r.as_str()).unwrap_or("True");
    if response.eq_ignore_ascii_case("false") {
        let reason = data
            .get("Error")
            .and_then(|e| e.as_str())
            .unwrap_or(fallback)
            .to_string();
        return Err(PopcornError::NotFound(reason));
    }
    Ok(())
}

/// Parse search results out of an OMDb search body
fn parse_search_response(data: serde_json::Value) -> Result<Vec<SearchResult>> {
    check_response(&data, "Movie not found!")?;

    let Some(items) = data.get("Search") else {
        return Ok(Vec::new());
    };

    let items: Vec<OmdbSearchItem> = serde_json::from_value(items.clone())
        .map_err(|e| PopcornError::Network(format!("Malformed search response: {}", e)))?;

    Ok(items
        .into_iter()
        .map(|item| SearchResult {
            id: item.id,
            title: item.title,
            year: item.year,
            poster_url: non_empty(item.poster),
        })
        .collect())
}

/// Parse a title detail out of an OMDb lookup body
fn parse_detail_response(data: serde_json::Value) -> Result<MovieDetail> {
    check_response(&data, "Incorrect IMDb ID.")?;

    let d: OmdbDetail = serde_json::from_value(data)
        .map_err(|e| PopcornError::Network(format!("Malformed detail response: {}", e)))?;

    Ok(MovieDetail {
        imdb_rating: d.imdb_rating.parse().ok(),
        id: d.id,
        title: d.title,
        year: d.year,
        released: non_empty(d.released),
        runtime_text: non_empty(d.runtime),
        genre: non_empty(d.genre),
        plot: non_empty(d.plot),
        actors: non_empty(d.actors),
        director: non_empty(d.director),
        poster_url: non_empty(d.poster),
    })
}

/// HTTP client for the OMDb API
pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PopcornError::InvalidConfig(
                "no OMDb API key; set api_key in the config file or POPCORN_API_KEY".into(),
            ));
        }

        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    /// GET a catalog URL, racing the request against the token
    async fn fetch_json(&self, url: &str, token: &CancellationToken) -> Result<serde_json::Value> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(PopcornError::Cancelled),
            result = self.fetch_json_inner(url) => result,
        }
    }

    async fn fetch_json_inner(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PopcornError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PopcornError::Network(format!("HTTP {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| PopcornError::Network(format!("Invalid JSON body: {}", e)))
    }
}

#[async_trait]
impl CatalogClient for OmdbClient {
    async fn search(&self, query: &str, token: &CancellationToken) -> Result<Vec<SearchResult>> {
        debug!(query, "searching catalog");
        let url = build_search_url(&self.base_url, &self.api_key, query);
        let data = self.fetch_json(&url, token).await?;
        parse_search_response(data)
    }

    async fn detail(&self, id: &str, token: &CancellationToken) -> Result<MovieDetail> {
        debug!(id, "fetching detail");
        let url = build_detail_url(&self.base_url, &self.api_key, id);
        let data = self.fetch_json(&url, token).await?;
        parse_detail_response(data)
    }
}
