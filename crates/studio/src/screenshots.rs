//! Per-principal inbox for browser screenshots.

use database::{screenshot, Database, Screenshot};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::principal::Principal;

/// A capture posted by the browser extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewScreenshot {
    pub image_base64: String,
    pub source_url: Option<String>,
}

pub struct ScreenshotInbox<'a> {
    db: &'a Database,
}

impl<'a> ScreenshotInbox<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn enqueue(
        &self,
        principal: &Principal,
        capture: &NewScreenshot,
    ) -> Result<Screenshot> {
        let queued = screenshot::enqueue(
            self.db.pool(),
            principal.user_id(),
            &capture.image_base64,
            capture.source_url.as_deref(),
        )
        .await?;
        info!(screenshot_id = %queued.id, owner = %principal.user_id(), "Screenshot queued");
        Ok(queued)
    }

    /// Oldest pending capture, removed from the inbox. Each is delivered once.
    pub async fn take_next(&self, principal: &Principal) -> Result<Option<Screenshot>> {
        Ok(screenshot::take_next(self.db.pool(), principal.user_id()).await?)
    }

    pub async fn pending(&self, principal: &Principal) -> Result<i64> {
        Ok(screenshot::pending_count(self.db.pool(), principal.user_id()).await?)
    }
}
