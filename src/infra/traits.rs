//! Trait seams for the external collaborators.
//!
//! The core requires only narrow contracts from these: the artifact store
//! persists and removes opaque byte blobs by stored filename, and the
//! certificate renderer turns an approved report into a printable
//! document. Remove is idempotent; layout belongs to the renderer.

use async_trait::async_trait;

use super::Result;
use crate::domain::ComplianceReport;

/// Stores uploaded proof artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `bytes` under `stored_name` and return the stored name.
    async fn save(&self, stored_name: &str, bytes: &[u8]) -> Result<String>;

    /// Read an artifact back for serving. `NotFound` if absent.
    async fn open(&self, stored_name: &str) -> Result<Vec<u8>>;

    /// Remove an artifact. Removing a nonexistent name is not an error.
    async fn remove(&self, stored_name: &str) -> Result<()>;
}

/// A rendered certificate document.
#[derive(Debug, Clone)]
pub struct CertificateDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Renders a certificate for an approved compliance report.
pub trait CertificateRenderer: Send + Sync {
    fn render(&self, report: &ComplianceReport) -> Result<CertificateDocument>;
}
