//! Terminal presentation: menus, focus tracking, rendering

pub mod dialoguer_selector;
pub mod focus;
pub mod render;
