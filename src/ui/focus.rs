//! Focus tracking for the terminal front-end

use crate::core::keys::FocusManager;
use std::sync::atomic::{AtomicBool, Ordering};

/// The search prompt is the only focusable input in the terminal
#[derive(Debug, Default)]
pub struct TerminalFocus {
    search: AtomicBool,
}

impl TerminalFocus {
    /// Called when the search prompt closes
    pub fn blur(&self) {
        self.search.store(false, Ordering::SeqCst);
    }
}

impl FocusManager for TerminalFocus {
    fn search_focused(&self) -> bool {
        self.search.load(Ordering::SeqCst)
    }

    fn focus_search(&self) {
        self.search.store(true, Ordering::SeqCst);
    }
}
