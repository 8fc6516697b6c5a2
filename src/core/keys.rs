//! Global key bindings
//!
//! The presentation layer forwards key presses to a [`KeyBindingDispatcher`].
//! Bindings are installed as a set and live exactly as long as the
//! returned [`KeyBindings`] guard.

use crate::core::detail::DetailController;
use crate::core::search::SearchController;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Keys with a global meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Jump to the search input and start over
    Enter,
    /// Close the open movie
    Escape,
}

/// Input focus, as owned by the presentation layer
pub trait FocusManager: Send + Sync {
    fn search_focused(&self) -> bool;
    fn focus_search(&self);
}

struct Binding {
    id: u64,
    focus: Arc<dyn FocusManager>,
    search: SearchController,
    detail: DetailController,
}

impl Binding {
    fn handle(&self, key: Key) -> bool {
        match key {
            Key::Enter => {
                // Don't wipe a query the user is typing
                if self.focus.search_focused() {
                    return false;
                }
                self.focus.focus_search();
                let _ = self.search.set_query("");
                true
            }
            Key::Escape => {
                self.detail.close();
                true
            }
        }
    }
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    bindings: Mutex<Vec<Arc<Binding>>>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Binding>>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Routes key presses to the installed bindings
#[derive(Clone, Default)]
pub struct KeyBindingDispatcher {
    registry: Arc<Registry>,
}

impl KeyBindingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the Enter/Escape bindings. They stay active until the
    /// returned guard is dropped.
    #[must_use = "bindings are removed when the guard is dropped"]
    pub fn install(
        &self,
        focus: Arc<dyn FocusManager>,
        search: SearchController,
        detail: DetailController,
    ) -> KeyBindings {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.lock().push(Arc::new(Binding {
            id,
            focus,
            search,
            detail,
        }));
        debug!(id, "key bindings installed");

        KeyBindings {
            id,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Deliver a key press. Returns whether any binding acted on it.
    pub fn dispatch(&self, key: Key) -> bool {
        // Run handlers outside the lock so they may touch the dispatcher
        let bindings: Vec<Arc<Binding>> = self.registry.lock().clone();
        bindings
            .iter()
            .fold(false, |handled, binding| binding.handle(key) || handled)
    }

    pub fn installed(&self) -> usize {
        self.registry.lock().len()
    }
}

/// Guard for one installed binding set
pub struct KeyBindings {
    id: u64,
    registry: Arc<Registry>,
}

impl Drop for KeyBindings {
    fn drop(&mut self) {
        self.registry.lock().retain(|b| b.id != self.id);
        debug!(id = self.id, "key bindings removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::fake::{FakeCatalog, detail};
    use std::panic::AssertUnwindSafe;
    use std::sync::atomic::AtomicBool;

    #[derive(Default)]
    struct Focus {
        focused: AtomicBool,
        focus_calls: AtomicU64,
    }

    impl FocusManager for Focus {
        fn search_focused(&self) -> bool {
            self.focused.load(Ordering::SeqCst)
        }

        fn focus_search(&self) {
            self.focus_calls.fetch_add(1, Ordering::SeqCst);
            self.focused.store(true, Ordering::SeqCst);
        }
    }

    struct Fixture {
        fake: Arc<FakeCatalog>,
        focus: Arc<Focus>,
        search: SearchController,
        detail: DetailController,
        keys: KeyBindingDispatcher,
    }

    fn fixture() -> Fixture {
        let fake = Arc::new(FakeCatalog::default());
        let detail = DetailController::new(fake.clone());
        let search = SearchController::new(fake.clone(), detail.clone());
        Fixture {
            fake,
            focus: Arc::new(Focus::default()),
            search,
            detail,
            keys: KeyBindingDispatcher::new(),
        }
    }

    impl Fixture {
        fn install(&self) -> KeyBindings {
            self.keys
                .install(self.focus.clone(), self.search.clone(), self.detail.clone())
        }

        async fn open(&self, id: &str) {
            let reply = self.fake.expect_detail(id);
            let task = self.detail.select(id).unwrap();
            reply.send(Ok(detail(id, "Alien", "117 min", Some(8.5)))).unwrap();
            task.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_enter_focuses_and_clears_query() {
        let fx = fixture();
        let _bindings = fx.install();
        let reply = fx.fake.expect_search("alien");
        let task = fx.search.set_query("alien").unwrap();
        reply.send(Ok(vec![])).unwrap();
        task.await.unwrap();

        assert!(fx.keys.dispatch(Key::Enter));
        assert!(fx.focus.search_focused());
        assert_eq!(fx.search.query(), "");
    }

    #[tokio::test]
    async fn test_enter_while_typing_does_nothing() {
        let fx = fixture();
        let _bindings = fx.install();
        fx.focus.focused.store(true, Ordering::SeqCst);
        let _reply = fx.fake.expect_search("ali");
        let _task = fx.search.set_query("ali");

        assert!(!fx.keys.dispatch(Key::Enter));
        assert_eq!(fx.search.query(), "ali");
        assert_eq!(fx.focus.focus_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_escape_closes_detail_regardless_of_focus() {
        let fx = fixture();
        let _bindings = fx.install();
        fx.open("tt0078748").await;
        fx.focus.focused.store(true, Ordering::SeqCst);

        assert!(fx.keys.dispatch(Key::Escape));
        assert_eq!(fx.detail.snapshot().selection, None);
    }

    #[tokio::test]
    async fn test_dropped_guard_is_inert() {
        let fx = fixture();
        let bindings = fx.install();
        assert_eq!(fx.keys.installed(), 1);
        drop(bindings);
        assert_eq!(fx.keys.installed(), 0);

        fx.open("tt0078748").await;
        assert!(!fx.keys.dispatch(Key::Escape));
        assert!(!fx.keys.dispatch(Key::Enter));
        assert!(fx.detail.snapshot().detail().is_some());
        assert_eq!(fx.focus.focus_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_guards_release_only_their_own_bindings() {
        let fx = fixture();
        let outer = fx.install();
        {
            let _inner = fx.install();
            assert_eq!(fx.keys.installed(), 2);
        }
        assert_eq!(fx.keys.installed(), 1);
        drop(outer);
        assert_eq!(fx.keys.installed(), 0);
    }

    #[test]
    fn test_guard_released_on_unwind() {
        let keys = KeyBindingDispatcher::new();
        let registry = keys.clone();
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(move || {
            let fake = Arc::new(FakeCatalog::default());
            let detail = DetailController::new(fake.clone());
            let search = SearchController::new(fake, detail.clone());
            let _bindings = keys.install(Arc::new(Focus::default()), search, detail);
            panic!("view failed to render");
        }));

        assert!(outcome.is_err());
        assert_eq!(registry.installed(), 0);
    }
}
