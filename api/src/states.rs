use crate::store::PostStore;
use std::sync::Arc;

/// State shared by every request.
///
/// Built once in `main` and handed to the router. Cloning only bumps the
/// `Arc`, so every handler sees the same store.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostStore>,
}

impl AppState {
    pub fn new(posts: impl PostStore + 'static) -> Self {
        Self {
            posts: Arc::new(posts),
        }
    }
}
