//! popcorn library
//!
//! Search/detail pipeline and watch-list store behind the popcorn CLI.

pub mod core;
pub mod error;
pub mod storage;
pub mod types;
pub mod ui;
pub mod utils;
