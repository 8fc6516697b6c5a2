//! Storage modules: config, watch-list, summary

pub mod config;
pub mod summary;
pub mod watchlist;
