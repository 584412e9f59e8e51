//! Authenticated caller identity.

use serde::Serialize;

/// The authenticated user an operation acts for.
///
/// Learning modules and screenshots are scoped to the principal that created
/// them; every operation on them takes one explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Principal {
    user_id: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
