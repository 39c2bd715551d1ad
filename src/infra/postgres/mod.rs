//! PostgreSQL implementations of the ledgers.

mod reports;
mod uploads;
mod users;
mod vouchers;

pub use reports::PgReportLedger;
pub use uploads::PgProofLedger;
pub use users::{guarded_adjust_on, PgUserStore};
pub use vouchers::PgVoucherLedger;
