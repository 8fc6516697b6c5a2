//! Type definitions for popcorn
//!
//! Source of truth for all data structures.

use serde::{Deserialize, Serialize};

/// Window title shown when no movie is open
pub const APP_TITLE: &str = "usePopcorn";

/// Highest rating the user can give
pub const MAX_RATING: u8 = 10;

// ============================================
// Catalog Types
// ============================================

/// A movie result from a catalog search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Catalog identifier, e.g. "tt0133093"
    pub id: String,
    pub title: String,
    pub year: String,
    /// Empty when the catalog has no poster
    pub poster_url: String,
}

/// Full detail of a single catalog title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    /// e.g. "31 Mar 1999"
    pub released: String,
    /// e.g. "136 min"
    pub runtime_text: String,
    pub genre: String,
    /// None when the catalog reports "N/A"
    pub imdb_rating: Option<f64>,
    pub plot: String,
    pub actors: String,
    pub director: String,
    pub poster_url: String,
}

// ============================================
// Watch-list Types
// ============================================

/// A movie the user watched and rated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedEntry {
    pub id: String,
    pub title: String,
    pub poster_url: String,
    pub imdb_rating: f64,
    /// Minutes
    pub runtime: u32,
    /// 1..=MAX_RATING
    pub user_rating: u8,
    /// How many times the rating was changed before adding
    pub rating_change_count: u32,
    /// Unix timestamp when added
    #[serde(default)]
    pub added_at: i64,
}

// ============================================
// Config Types
// ============================================

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OMDb API key
    pub api_key: String,
    /// Catalog base URL (default: "https://www.omdbapi.com/")
    pub base_url: String,
    /// How many search results the terminal shows (default: 10)
    pub max_results_shown: usize,
    /// Editor command (default: "nvim")
    pub editor: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.omdbapi.com/".into(),
            max_results_shown: 10,
            editor: "nvim".into(),
        }
    }
}

// ============================================
// Selector Types
// ============================================

/// Item displayed in selector menu
#[derive(Debug, Clone)]
pub struct MenuItem<T> {
    /// Display text
    pub label: String,
    /// Underlying value
    pub value: T,
}

// ============================================
// State Machine Types
// ============================================

/// Terminal front-end state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Initial menu selection
    Init,
    /// Enter a query and pick a result
    Search,
    /// Look at the selected movie, rate it
    Detail,
    /// Browse the watch-list
    Watched,
    /// Exit application
    Exit,
}
