//! Proof-of-activity upload record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Points credited to the owner when an upload is approved.
pub const UPLOAD_REWARD_POINTS: i64 = 50;

/// Upload lifecycle status. The only permitted transition is
/// `Pending -> Approved`; approval also stamps `points_awarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    Pending,
    Approved,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "Pending",
            UploadStatus::Approved => "Approved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(UploadStatus::Pending),
            "Approved" => Some(UploadStatus::Approved),
            _ => None,
        }
    }
}

/// A persisted proof upload. `points_awarded` stays 0 until approval and
/// records the exact amount to reverse if the upload is later deleted.
#[derive(Debug, Clone, Serialize)]
pub struct ProofUpload {
    pub id: Uuid,
    pub owner_id: UserId,
    pub filename: String,
    pub status: UploadStatus,
    pub points_awarded: i64,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}
