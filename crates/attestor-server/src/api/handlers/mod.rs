//! API request handlers

pub mod content;
pub mod users;

use std::sync::Arc;

use crate::pipeline::DEFAULT_RECENT_LIMIT;
use crate::storage::AttestationStore;

pub use content::{create_content, get_attesters, list_content, CreateContentRequest};
pub use users::{create_user, CreateUserRequest};

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Attestation store, shared by every request
    pub store: Arc<dyn AttestationStore>,
    /// Maximum rows returned by the recent listing
    pub recent_limit: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn AttestationStore>) -> Self {
        Self {
            store,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }
}
