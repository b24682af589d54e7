//! Warehouse stock levels

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::decimal_to_f64;
use crate::error::AppResult;

/// Source of current on-hand quantities
#[async_trait]
pub trait StockSource: Send + Sync {
    /// Highest on-hand quantity of the item across active warehouses, never below 0
    async fn max_stock(&self, item_code: &str) -> AppResult<f64>;
}

/// Stock source reading `bins` joined with active `warehouses`
#[derive(Clone)]
pub struct PgStockSource {
    db: PgPool,
    retired_location_marker: Option<String>,
}

impl PgStockSource {
    /// Create a new PgStockSource instance
    pub fn new(db: PgPool, retired_location_marker: Option<String>) -> Self {
        Self {
            db,
            retired_location_marker: retired_location_marker.filter(|m| !m.is_empty()),
        }
    }
}

#[async_trait]
impl StockSource for PgStockSource {
    async fn max_stock(&self, item_code: &str) -> AppResult<f64> {
        let highest = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT MAX(b.actual_qty)
            FROM bins b
            JOIN warehouses w ON w.name = b.warehouse
            WHERE b.item_code = $1
              AND w.is_archived = false
              AND ($2::text IS NULL OR position($2 in w.name) = 0)
            "#,
        )
        .bind(item_code)
        .bind(&self.retired_location_marker)
        .fetch_one(&self.db)
        .await?
        .unwrap_or(Decimal::ZERO);

        Ok(decimal_to_f64(highest)?.max(0.0))
    }
}
