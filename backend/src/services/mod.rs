//! Business logic services for the stock replenishment service

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};

pub mod items;
pub mod ledger;
pub mod notification;
pub mod replenishment;
pub mod stock;

pub use items::{ItemRepository, PgItemRepository};
pub use ledger::{LedgerSource, PgLedgerSource};
pub use notification::{MailNotificationSink, NotificationSink};
pub use replenishment::{run_replenishment, ReplenishmentService, RunSummary};
pub use stock::{PgStockSource, StockSource};

/// Decimal places kept when writing computed quantities
const STORED_SCALE: u32 = 6;

pub(crate) fn decimal_to_f64(value: Decimal) -> AppResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| AppError::Internal(format!("quantity {} is not representable", value)))
}

pub(crate) fn f64_to_decimal(value: f64) -> AppResult<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(STORED_SCALE))
        .ok_or_else(|| AppError::Internal(format!("quantity {} is not representable", value)))
}
