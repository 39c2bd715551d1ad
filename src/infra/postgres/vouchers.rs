//! PostgreSQL voucher ledger.
//!
//! A redemption record exists only as the side effect of a successful
//! guarded debit: the debit and the insert share one transaction, so
//! concurrent redemptions that would jointly overdraw the balance
//! serialize at the points row and exactly one of them commits.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::domain::{redemption_code, UserId, VoucherOffer, VoucherRedemption};
use crate::infra::postgres::users::guarded_adjust_on;
use crate::infra::Result;

pub struct PgVoucherLedger {
    pool: PgPool,
}

type RedemptionRow = (Uuid, Uuid, String, String, i64, String, String, DateTime<Utc>);

fn row_to_redemption(
    (id, owner_id, voucher_id, brand, value, code, status, created_at): RedemptionRow,
) -> VoucherRedemption {
    VoucherRedemption {
        id,
        owner_id: UserId::from_uuid(owner_id),
        voucher_id,
        brand,
        value,
        code,
        status,
        created_at,
    }
}

const REDEMPTION_COLUMNS: &str =
    "id, owner_id, voucher_id, brand, value, code, status, created_at";

impl PgVoucherLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomically debit the offer's value and issue a redemption.
    ///
    /// The catalog lookup happens at the API layer; this method trusts
    /// `offer` to be the server-side truth. A rejected debit surfaces as
    /// `InsufficientBalance` with nothing persisted.
    pub async fn redeem(
        &self,
        owner: &UserId,
        voucher_id: &str,
        offer: &VoucherOffer,
    ) -> Result<VoucherRedemption> {
        let mut tx = self.pool.begin().await?;

        guarded_adjust_on(&mut *tx, owner, -offer.value).await?;

        let sql = format!(
            r#"
            INSERT INTO voucher_redemptions
                (id, owner_id, voucher_id, brand, value, code, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'Issued')
            RETURNING {REDEMPTION_COLUMNS}
            "#
        );
        let row: RedemptionRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(owner.as_uuid())
            .bind(voucher_id)
            .bind(&offer.brand)
            .bind(offer.value)
            .bind(redemption_code(voucher_id))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row_to_redemption(row))
    }

    /// All redemptions for an owner, newest first.
    pub async fn list_mine(&self, owner: &UserId) -> Result<Vec<VoucherRedemption>> {
        let sql = format!(
            "SELECT {REDEMPTION_COLUMNS} FROM voucher_redemptions \
             WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let rows: Vec<RedemptionRow> = sqlx::query_as(&sql)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(row_to_redemption).collect())
    }
}
