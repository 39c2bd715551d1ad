//! PostgreSQL report ledger.
//!
//! The duplicate-pending guard is not an application-level existence
//! check: the partial unique index on `(owner_id, project_name) WHERE
//! status = 'Pending'` makes the insert itself the check, so at most one
//! pending report per owner and project can exist even when two
//! submissions race.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::domain::{
    evaluate, ComplianceReport, ComplianceResult, ReportDraft, ReportStatus, UserId,
};
use crate::infra::{CoreError, Result};

pub struct PgReportLedger {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    owner_id: Uuid,
    owner_username: String,
    project_name: String,
    species_choice: String,
    area_sqm: f64,
    trees_planned: i64,
    green_area_sqm: Option<f64>,
    lat: f64,
    lon: f64,
    status: String,
    required_trees: i64,
    delta_trees: i64,
    compliant: bool,
    created_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
}

impl ReportRow {
    fn into_report(self) -> Result<ComplianceReport> {
        let status = ReportStatus::parse(&self.status)
            .ok_or_else(|| CoreError::Internal(format!("unknown report status {:?}", self.status)))?;
        Ok(ComplianceReport {
            id: self.id,
            owner_id: UserId::from_uuid(self.owner_id),
            owner_username: self.owner_username,
            project_name: self.project_name,
            species_choice: self.species_choice,
            area_sqm: self.area_sqm,
            trees_planned: self.trees_planned,
            green_area_sqm: self.green_area_sqm,
            lat: self.lat,
            lon: self.lon,
            status,
            result: ComplianceResult {
                required_trees: self.required_trees,
                delta_trees: self.delta_trees,
                compliant: self.compliant,
            },
            created_at: self.created_at,
            approved_at: self.approved_at,
        })
    }
}

const REPORT_COLUMNS: &str = "id, owner_id, owner_username, project_name, species_choice, \
     area_sqm, trees_planned, green_area_sqm, lat, lon, status, \
     required_trees, delta_trees, compliant, created_at, approved_at";

impl PgReportLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit a new report. The verdict is computed here; a racing
    /// duplicate pending submission loses at the unique index and
    /// surfaces as `Conflict` with nothing mutated.
    pub async fn submit(
        &self,
        owner: &UserId,
        owner_username: &str,
        draft: ReportDraft,
    ) -> Result<ComplianceReport> {
        let result = evaluate(draft.area_sqm, draft.trees_planned, draft.green_area_sqm);

        let sql = format!(
            r#"
            INSERT INTO reports
                (id, owner_id, owner_username, project_name, species_choice,
                 area_sqm, trees_planned, green_area_sqm, lat, lon, status,
                 required_trees, delta_trees, compliant)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'Pending', $11, $12, $13)
            RETURNING {REPORT_COLUMNS}
            "#
        );

        let row: ReportRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(owner.as_uuid())
            .bind(owner_username)
            .bind(&draft.project_name)
            .bind(&draft.species_choice)
            .bind(draft.area_sqm)
            .bind(draft.trees_planned)
            .bind(draft.green_area_sqm)
            .bind(draft.lat)
            .bind(draft.lon)
            .bind(result.required_trees)
            .bind(result.delta_trees)
            .bind(result.compliant)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                CoreError::conflict_on_unique(
                    e,
                    "a pending report for this project already exists; delete it or wait for approval",
                )
            })?;

        row.into_report()
    }

    /// All reports for an owner, newest first.
    pub async fn list_mine(&self, owner: &UserId) -> Result<Vec<ComplianceReport>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let rows: Vec<ReportRow> = sqlx::query_as(&sql)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ReportRow::into_report).collect()
    }

    /// All pending reports across owners, oldest first (review order).
    pub async fn list_pending(&self) -> Result<Vec<ComplianceReport>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE status = 'Pending' ORDER BY created_at ASC"
        );
        let rows: Vec<ReportRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(ReportRow::into_report).collect()
    }

    /// Fetch a report by id regardless of owner (used for certificates,
    /// where the API layer enforces owner-or-authority access).
    pub async fn get(&self, id: Uuid) -> Result<ComplianceReport> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");
        let row: Option<ReportRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(CoreError::NotFound("report"))?.into_report()
    }

    /// Delete a pending report owned by the caller.
    ///
    /// The delete matches id, owner and pending status in one statement.
    /// When it misses, a follow-up owned-row lookup distinguishes the two
    /// rejections: an approved report the caller owns is "not eligible",
    /// everything else (wrong id or wrong owner) is uniformly not-found.
    pub async fn delete(&self, owner: &UserId, id: Uuid) -> Result<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM reports
            WHERE id = $1 AND owner_id = $2 AND status = 'Pending'
            "#,
        )
        .bind(id)
        .bind(owner.as_uuid())
        .execute(&self.pool)
        .await?;

        if deleted.rows_affected() > 0 {
            return Ok(());
        }

        let owned: Option<(String,)> =
            sqlx::query_as("SELECT status FROM reports WHERE id = $1 AND owner_id = $2")
                .bind(id)
                .bind(owner.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        match owned {
            Some(_) => Err(CoreError::Forbidden(
                "only pending reports can be deleted".to_string(),
            )),
            None => Err(CoreError::NotFound("report")),
        }
    }

    /// Approve a report. Re-approving an already-approved report
    /// re-stamps the approval timestamp, which is accepted as harmless.
    pub async fn approve(&self, id: Uuid) -> Result<ComplianceReport> {
        let sql = format!(
            r#"
            UPDATE reports
            SET status = 'Approved', approved_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let row: Option<ReportRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(CoreError::NotFound("report"))?.into_report()
    }
}
