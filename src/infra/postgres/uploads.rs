//! PostgreSQL proof ledger.
//!
//! Upload approval couples a status flip with a points credit across two
//! rows. Both run inside one Postgres transaction (the strongest
//! primitive the store offers), so a crash can never leave an approved
//! upload without its credit or a credit without its approval. The flip
//! is conditional on the row still being pending, which makes approval
//! once-only: a second approval matches nothing and awards nothing.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::domain::{ProofUpload, UploadStatus, UserId, UPLOAD_REWARD_POINTS};
use crate::infra::postgres::users::{guarded_adjust_on, reverse_award_on};
use crate::infra::{CoreError, Result};

pub struct PgProofLedger {
    pool: PgPool,
}

type UploadRow = (
    Uuid,
    Uuid,
    String,
    String,
    i64,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

fn row_to_upload(
    (id, owner_id, filename, status, points_awarded, created_at, approved_at): UploadRow,
) -> Result<ProofUpload> {
    let status = UploadStatus::parse(&status)
        .ok_or_else(|| CoreError::Internal(format!("unknown upload status {status:?}")))?;
    Ok(ProofUpload {
        id,
        owner_id: UserId::from_uuid(owner_id),
        filename,
        status,
        points_awarded,
        created_at,
        approved_at,
    })
}

const UPLOAD_COLUMNS: &str =
    "id, owner_id, filename, status, points_awarded, created_at, approved_at";

impl PgProofLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a freshly stored artifact as a pending upload.
    pub async fn submit(&self, owner: &UserId, stored_filename: &str) -> Result<ProofUpload> {
        let sql = format!(
            r#"
            INSERT INTO uploads (id, owner_id, filename, status, points_awarded)
            VALUES ($1, $2, $3, 'Pending', 0)
            RETURNING {UPLOAD_COLUMNS}
            "#
        );
        let row: UploadRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(owner.as_uuid())
            .bind(stored_filename)
            .fetch_one(&self.pool)
            .await?;

        row_to_upload(row)
    }

    /// All uploads for an owner, newest first.
    pub async fn list_mine(&self, owner: &UserId) -> Result<Vec<ProofUpload>> {
        let sql = format!(
            "SELECT {UPLOAD_COLUMNS} FROM uploads WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let rows: Vec<UploadRow> = sqlx::query_as(&sql)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_upload).collect()
    }

    /// All pending uploads across owners, oldest first (review order).
    pub async fn list_pending(&self) -> Result<Vec<ProofUpload>> {
        let sql = format!(
            "SELECT {UPLOAD_COLUMNS} FROM uploads WHERE status = 'Pending' ORDER BY created_at ASC"
        );
        let rows: Vec<UploadRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(row_to_upload).collect()
    }

    /// Approve an upload and credit the fixed reward to its owner.
    ///
    /// Once-only: an already-approved upload is returned unchanged and no
    /// second credit is issued.
    pub async fn approve(&self, id: Uuid) -> Result<ProofUpload> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE uploads
            SET status = 'Approved', points_awarded = $2, approved_at = NOW()
            WHERE id = $1 AND status = 'Pending'
            RETURNING {UPLOAD_COLUMNS}
            "#
        );
        let flipped: Option<UploadRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(UPLOAD_REWARD_POINTS)
            .fetch_optional(&mut *tx)
            .await?;

        match flipped {
            Some(row) => {
                let upload = row_to_upload(row)?;
                guarded_adjust_on(&mut *tx, &upload.owner_id, UPLOAD_REWARD_POINTS).await?;
                tx.commit().await?;
                Ok(upload)
            }
            None => {
                // Either the upload does not exist or it was already
                // approved; in the latter case return it as-is.
                tx.rollback().await?;
                let sql = format!("SELECT {UPLOAD_COLUMNS} FROM uploads WHERE id = $1");
                let existing: Option<UploadRow> = sqlx::query_as(&sql)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
                existing.map(row_to_upload).transpose()?.ok_or(CoreError::NotFound("upload"))
            }
        }
    }

    /// Delete an upload owned by the caller, reversing a previous award
    /// in the same transaction. Returns the stored filename so the caller
    /// can remove the artifact afterwards (removal failure must not undo
    /// the deletion).
    pub async fn delete(&self, owner: &UserId, id: Uuid) -> Result<String> {
        let mut tx = self.pool.begin().await?;

        let removed: Option<(String, String, i64)> = sqlx::query_as(
            r#"
            DELETE FROM uploads
            WHERE id = $1 AND owner_id = $2
            RETURNING filename, status, points_awarded
            "#,
        )
        .bind(id)
        .bind(owner.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((filename, status, points_awarded)) = removed else {
            tx.rollback().await?;
            return Err(CoreError::NotFound("upload"));
        };

        if status == "Approved" && points_awarded > 0 {
            reverse_award_on(&mut *tx, owner, points_awarded).await?;
        }

        tx.commit().await?;
        Ok(filename)
    }
}
