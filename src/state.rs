use std::sync::Arc;

use crate::store::Store;

/// Shared state handed to every handler: the injected store capability.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}
