//! Item records: active stock items and persisted reorder figures

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{Item, ReorderDecision};
use sqlx::{FromRow, PgPool};

use super::{decimal_to_f64, f64_to_decimal};
use crate::error::{AppError, AppResult};

/// Read and update access to stock items
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Stock items that are not disabled, ordered by item code
    async fn list_active_items(&self) -> AppResult<Vec<Item>>;

    /// Store safety stock, reorder point and reorder flag of a decision
    async fn save_decision(&self, decision: &ReorderDecision) -> AppResult<()>;
}

/// Row for item queries
#[derive(Debug, FromRow)]
struct ItemRow {
    item_code: String,
    item_name: String,
    item_group: String,
    safety_stock: Decimal,
    reorder_level: Decimal,
    reorder: bool,
}

impl TryFrom<ItemRow> for Item {
    type Error = AppError;

    fn try_from(row: ItemRow) -> AppResult<Self> {
        Ok(Item {
            item_code: row.item_code,
            item_name: row.item_name,
            category: row.item_group,
            safety_stock: decimal_to_f64(row.safety_stock)?,
            reorder_point: decimal_to_f64(row.reorder_level)?,
            reorder: row.reorder,
        })
    }
}

/// Item repository backed by the `items` table
#[derive(Clone)]
pub struct PgItemRepository {
    db: PgPool,
}

impl PgItemRepository {
    /// Create a new PgItemRepository instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn list_active_items(&self) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT item_code, item_name, item_group, safety_stock, reorder_level, reorder
            FROM items
            WHERE is_stock_item = true AND disabled = false
            ORDER BY item_code
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    async fn save_decision(&self, decision: &ReorderDecision) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET safety_stock = $2, reorder_level = $3, reorder = $4, updated_at = NOW()
            WHERE item_code = $1
            "#,
        )
        .bind(&decision.item_code)
        .bind(f64_to_decimal(decision.safety_stock)?)
        .bind(f64_to_decimal(decision.reorder_point)?)
        .bind(decision.should_reorder)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item {}", decision.item_code)));
        }

        Ok(())
    }
}
