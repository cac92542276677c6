use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::model::Registry;

/// Lock-free holder for the current registry tree.
///
/// Readers take a snapshot and keep it for as long as they need; `reload`
/// publishes a whole new tree without disturbing them.
#[derive(Debug)]
pub struct SharedRegistry<R = Registry> {
    current: ArcSwap<R>,
}

impl<R> SharedRegistry<R> {
    pub fn new(registry: R) -> Self {
        Self {
            current: ArcSwap::from_pointee(registry),
        }
    }

    pub fn snapshot(&self) -> Arc<R> {
        self.current.load_full()
    }

    /// Replace the tree, returning the previous one.
    pub fn reload(&self, registry: R) -> Arc<R> {
        self.current.swap(Arc::new(registry))
    }
}

impl<R: Default> Default for SharedRegistry<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}
