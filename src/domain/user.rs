//! User account record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Role, UserId};

/// A registered account. `points` is the single source of truth for the
/// spendable balance and is only ever mutated through the guarded adjust
/// statements in the user store.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

/// One row of the public leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub username: String,
    pub points: i64,
}
