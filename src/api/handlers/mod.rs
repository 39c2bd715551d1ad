//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod community;
pub mod reports;
pub mod uploads;
pub mod vouchers;
