//! Audio file storage under a public directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::{Result, StudioError};

/// Stores episode audio as flat files under a root directory and maps them
/// to public URLs under a prefix.
#[derive(Debug, Clone)]
pub struct AudioStore {
    root: PathBuf,
    public_prefix: String,
}

impl AudioStore {
    /// Create a store writing under `root`, served at `public_prefix`.
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        let prefix = public_prefix.into();
        Self {
            root: root.into(),
            public_prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// URL path files are served under, without a trailing slash.
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Public URL of a stored file.
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{}", self.public_prefix, filename)
    }

    /// Filename for a URL produced by [`AudioStore::url_for`].
    pub fn filename_from_url<'u>(&self, url: &'u str) -> Option<&'u str> {
        let name = url
            .strip_prefix(&self.public_prefix)?
            .strip_prefix('/')?;
        is_plain_filename(name).then_some(name)
    }

    /// Write a file atomically: a temp file in the same directory, then rename.
    pub async fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(filename)?;
        fs::create_dir_all(&self.root).await?;

        let temp = self
            .root
            .join(format!(".{}.{}.tmp", filename, uuid::Uuid::new_v4()));
        if let Err(e) = fs::write(&temp, bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        info!(file = %path.display(), bytes = bytes.len(), "Stored audio");
        Ok(path)
    }

    /// Read a stored file. A missing file is `NotFound`.
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.path_for(filename)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StudioError::NotFound(format!(
                "audio file {} is missing",
                filename
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored file. Already absent counts as success.
    pub async fn remove(&self, filename: &str) -> Result<()> {
        let path = self.path_for(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(file = %path.display(), "Removed audio");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the file behind a public URL, if the URL belongs to this store.
    pub async fn remove_url(&self, url: &str) -> Result<()> {
        match self.filename_from_url(url) {
            Some(filename) => self.remove(filename).await,
            None => {
                tracing::warn!("Audio URL {} is outside the store, not removing", url);
                Ok(())
            }
        }
    }

    fn path_for(&self, filename: &str) -> Result<PathBuf> {
        if !is_plain_filename(filename) {
            return Err(StudioError::InvalidInput(format!(
                "invalid audio filename: {:?}",
                filename
            )));
        }
        Ok(self.root.join(filename))
    }
}

/// A single path component that cannot escape the root.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && name != ".."
}
