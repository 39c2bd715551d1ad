//! Core domain types for Verdantia
//!
//! Pure data and pure functions only: identifiers, ledger records, the
//! compliance evaluator, the voucher catalog, and the species
//! recommendation table. Nothing in this module touches the database.

mod evaluate;
mod recommend;
mod report;
mod types;
mod upload;
mod user;
mod voucher;

pub use evaluate::{evaluate, ComplianceResult};
pub use recommend::{climate_band, recommend, ClimateBand, Recommendation};
pub use report::{ComplianceReport, ReportDraft, ReportStatus};
pub use types::{Role, UserId};
pub use upload::{ProofUpload, UploadStatus, UPLOAD_REWARD_POINTS};
pub use user::{LeaderboardRow, User};
pub use voucher::{redemption_code, VoucherCatalog, VoucherOffer, VoucherRedemption};
