//! Stock ledger queries: monthly outward movements per item

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::YearMonth;
use sqlx::PgPool;

use super::decimal_to_f64;
use crate::error::{AppError, AppResult};

/// Source of historical outward stock movements
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Magnitude of the item's outward movements during one calendar month.
    /// Returns 0 when the item has no qualifying movements.
    async fn monthly_outflow(&self, item_code: &str, month: YearMonth) -> AppResult<f64>;
}

/// Ledger source reading the `stock_ledger_entries` table
#[derive(Clone)]
pub struct PgLedgerSource {
    db: PgPool,
    reconciliation_voucher_type: String,
}

impl PgLedgerSource {
    /// Create a new PgLedgerSource instance
    pub fn new(db: PgPool, reconciliation_voucher_type: impl Into<String>) -> Self {
        Self {
            db,
            reconciliation_voucher_type: reconciliation_voucher_type.into(),
        }
    }
}

#[async_trait]
impl LedgerSource for PgLedgerSource {
    async fn monthly_outflow(&self, item_code: &str, month: YearMonth) -> AppResult<f64> {
        let (start, end) = month.date_range().ok_or_else(|| AppError::Validation {
            field: "month".to_string(),
            message: format!("{} is not a valid calendar month", month),
        })?;

        // Voucher types containing the reconciliation type (literal match) and
        // disabled items are excluded
        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(sle.actual_qty)
            FROM stock_ledger_entries sle
            JOIN items i ON i.item_code = sle.item_code
            WHERE sle.item_code = $1
              AND sle.posting_date >= $2
              AND sle.posting_date < $3
              AND sle.actual_qty < 0
              AND ($4 = '' OR position($4 in sle.voucher_type) = 0)
              AND i.disabled = false
            "#,
        )
        .bind(item_code)
        .bind(start)
        .bind(end)
        .bind(&self.reconciliation_voucher_type)
        .fetch_one(&self.db)
        .await?
        .unwrap_or(Decimal::ZERO);

        // Outflow is stored negative; report it as positive demand
        decimal_to_f64(-total)
    }
}
