//! Verdantia: afforestation compliance reporting with a points-and-voucher
//! rewards economy.
//!
//! Participants submit compliance reports (evaluated against the one-tree-
//! per-80-sqm rule) and upload planting proof; authorities review both.
//! Approved proof credits a fixed points reward, and points buy vouchers
//! from a fixed catalog. Every points mutation is a guarded single-row
//! update, so balances never go negative under concurrency.

pub mod api;
pub mod auth;
pub mod domain;
pub mod infra;
pub mod migrations;
pub mod server;

pub use domain::{evaluate, ComplianceResult};
pub use infra::{CoreError, Result};
