//! Filesystem artifact store for proof uploads.
//!
//! Stored names are produced by [`stored_filename`] and validated again on
//! every read, so nothing containing a path separator or a traversal
//! component ever reaches the filesystem layer.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::{ArtifactStore, CoreError, Result};
use crate::domain::UserId;

/// Accepted proof media extensions (lowercase).
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "mp4", "mov", "avi", "webm"];

/// Check a declared extension against the accepted media set.
pub fn extension_allowed(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Extract the lowercase extension of an original filename, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Reduce an original filename to a safe component: only ASCII
/// alphanumerics, `.`, `-` and `_` survive; everything else becomes `_`.
/// Leading dots are stripped so the result can never be a dotfile or a
/// traversal component.
pub fn sanitize_filename(original: &str) -> String {
    let cleaned: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Build a collision-resistant stored name: owner id + submission epoch +
/// sanitized original name.
pub fn stored_filename(owner: &UserId, epoch_secs: i64, original: &str) -> String {
    format!("{}_{}_{}", owner, epoch_secs, sanitize_filename(original))
}

/// Validate a stored name before it is joined to the root directory.
fn checked_name(name: &str) -> Result<&str> {
    let safe = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
        && !name.starts_with('.');
    if safe {
        Ok(name)
    } else {
        Err(CoreError::Validation(format!("invalid artifact name: {name:?}")))
    }
}

/// Artifact store rooted at a local directory.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Create the store, creating the root directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, stored_name: &str) -> Result<PathBuf> {
        Ok(self.root.join(checked_name(stored_name)?))
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn save(&self, stored_name: &str, bytes: &[u8]) -> Result<String> {
        let path = self.path_for(stored_name)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(stored_name.to_string())
    }

    async fn open(&self, stored_name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(stored_name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CoreError::NotFound("artifact"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, stored_name: &str) -> Result<()> {
        let path = self.path_for(stored_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Idempotent remove: a missing artifact is fine.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(artifact = stored_name, error = %e, "failed to remove artifact");
                Err(e.into())
            }
        }
    }
}
