//! Core pipeline: catalog client, search and detail controllers, key bindings

pub mod catalog;
pub mod detail;
pub mod keys;
pub mod search;
