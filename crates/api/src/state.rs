//! Application state shared across handlers.

use std::collections::HashMap;
use std::sync::Arc;

use studio::StudioContext;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database, speech provider and audio storage.
    pub ctx: StudioContext,
    /// Bearer token to user id.
    tokens: Arc<HashMap<String, String>>,
}

impl AppState {
    pub fn new(ctx: StudioContext, tokens: HashMap<String, String>) -> Self {
        Self {
            ctx,
            tokens: Arc::new(tokens),
        }
    }

    /// User id a bearer token belongs to.
    pub fn user_for_token(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }
}
