//! Infrastructure layer for Verdantia
//!
//! Contains the error taxonomy, collaborator traits, and implementations:
//! - PostgreSQL ledgers (users/points, reports, uploads, vouchers)
//! - Filesystem artifact store
//! - Certificate renderer

mod artifacts;
mod certificate;
mod error;
pub mod postgres;
mod traits;

pub use artifacts::{
    extension_allowed, extension_of, sanitize_filename, stored_filename, FsArtifactStore,
    ALLOWED_EXTENSIONS,
};
pub use certificate::HtmlCertificateRenderer;
pub use error::{CoreError, Result};
pub use postgres::{PgProofLedger, PgReportLedger, PgUserStore, PgVoucherLedger};
pub use traits::{ArtifactStore, CertificateDocument, CertificateRenderer};
