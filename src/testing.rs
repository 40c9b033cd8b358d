//! Helpers for exercising wrappers and fallbacks in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::context::RequestScope;
use crate::guard::Operation;

/// An [`Operation`] that counts how often it ran. Clones share the count.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Operation for Counter {
    fn call(&self, _scope: &mut dyn RequestScope) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
