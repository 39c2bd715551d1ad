//! PostgreSQL user store: accounts, the points account, and the
//! leaderboard view.
//!
//! `users.points` is the only field in the system subject to concurrent
//! contention. Every mutation of it in this module is a single
//! conditional UPDATE, never a read-then-write pair, so concurrent
//! credits and debits serialize at the row and the balance can never go
//! negative (a `CHECK` constraint backstops this).

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::domain::{LeaderboardRow, Role, User, UserId};
use crate::infra::{CoreError, Result};

/// Guarded increment/decrement of a user's points balance, runnable on a
/// pool or inside a transaction.
///
/// A debit (`delta < 0`) applies only when the current balance covers it;
/// otherwise nothing is mutated and `InsufficientBalance` is returned. A
/// credit always applies.
pub async fn guarded_adjust_on<'e, E>(executor: E, owner: &UserId, delta: i64) -> Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE users
        SET points = points + $2
        WHERE id = $1 AND points + $2 >= 0
        "#,
    )
    .bind(owner.as_uuid())
    .bind(delta)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        if delta < 0 {
            return Err(CoreError::InsufficientBalance);
        }
        return Err(CoreError::NotFound("user"));
    }

    Ok(())
}

/// Reverse a previously awarded amount, flooring the balance at zero.
///
/// Used only by upload deletion: the reversal amount is exact, so the
/// floor can only engage if the balance was externally reduced below the
/// award in the interim, which is an accepted economy edge case.
pub(crate) async fn reverse_award_on<'e, E>(executor: E, owner: &UserId, amount: i64) -> Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE users
        SET points = GREATEST(points - $2, 0)
        WHERE id = $1
        "#,
    )
    .bind(owner.as_uuid())
    .bind(amount)
    .execute(executor)
    .await?;

    Ok(())
}

/// PostgreSQL-backed user store.
pub struct PgUserStore {
    pool: PgPool,
}

type UserRow = (Uuid, String, String, String, i64, DateTime<Utc>);

fn row_to_user((id, username, password_hash, role, points, created_at): UserRow) -> User {
    User {
        id: UserId::from_uuid(id),
        username,
        password_hash,
        role: Role::parse_or_participant(&role),
        points,
        created_at,
    }
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an account. A duplicate username surfaces as `Conflict`
    /// straight from the unique constraint.
    pub async fn create(&self, username: &str, password_hash: &str, role: Role) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CoreError::Validation("username is required".to_string()));
        }

        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, username, password_hash, role, points)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING id, username, password_hash, role, points, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CoreError::conflict_on_unique(e, "username already exists"))?;

        Ok(row_to_user(row))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, role, points, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    pub async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, role, points, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    /// Guarded adjust against the pool (see [`guarded_adjust_on`]).
    pub async fn guarded_adjust(&self, owner: &UserId, delta: i64) -> Result<()> {
        guarded_adjust_on(&self.pool, owner, delta).await
    }

    /// Top `n` non-authority accounts by points.
    ///
    /// Ties break by earliest registration, then id, so the ordering is
    /// explicit and stable rather than storage-dependent.
    pub async fn leaderboard(&self, n: i64) -> Result<Vec<LeaderboardRow>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT username, points
            FROM users
            WHERE role <> 'authority'
            ORDER BY points DESC, created_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(n)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(username, points)| LeaderboardRow { username, points })
            .collect())
    }
}
