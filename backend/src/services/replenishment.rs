//! Replenishment run: evaluates every active item, persists the figures and
//! reports flagged items in one batch.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    FlaggedItem, Item, MonthlyOutflow, OutflowWindow, PolicyTable, ReorderDecision,
    ReorderStrategy, WindowMode, YearMonth,
};
use uuid::Uuid;

use super::{
    ItemRepository, LedgerSource, MailNotificationSink, NotificationSink, PgItemRepository,
    PgLedgerSource, PgStockSource, StockSource,
};
use crate::error::{AppError, AppResult};
use crate::AppState;

/// Outcome of one replenishment run
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub strategy: ReorderStrategy,
    pub window_start: YearMonth,
    pub window_end: YearMonth,
    pub items_evaluated: usize,
    pub items_flagged: usize,
    pub items_skipped: usize,
    pub notified: bool,
}

/// Replenishment service wiring the calculator to its data sources
#[derive(Clone)]
pub struct ReplenishmentService {
    items: Arc<dyn ItemRepository>,
    ledger: Arc<dyn LedgerSource>,
    stock: Arc<dyn StockSource>,
    notifier: Arc<dyn NotificationSink>,
    policies: Arc<PolicyTable>,
    strategy: ReorderStrategy,
    window_mode: WindowMode,
}

impl ReplenishmentService {
    /// Create a service with the default policy table, composite strategy
    /// and previous-year window
    pub fn new(
        items: Arc<dyn ItemRepository>,
        ledger: Arc<dyn LedgerSource>,
        stock: Arc<dyn StockSource>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            items,
            ledger,
            stock,
            notifier,
            policies: Arc::new(PolicyTable::default()),
            strategy: ReorderStrategy::default(),
            window_mode: WindowMode::default(),
        }
    }

    /// Create a service backed by PostgreSQL and the mail API
    pub fn from_state(state: &AppState) -> AppResult<Self> {
        let settings = &state.config.replenishment;
        Ok(Self::new(
            Arc::new(PgItemRepository::new(state.db.clone())),
            Arc::new(PgLedgerSource::new(
                state.db.clone(),
                settings.reconciliation_voucher_type.clone(),
            )),
            Arc::new(PgStockSource::new(
                state.db.clone(),
                settings.retired_location_marker.clone(),
            )),
            Arc::new(MailNotificationSink::new(&state.config.mail)?),
        )
        .with_policies(settings.policy_table()?)
        .with_strategy(settings.strategy()?)
        .with_window_mode(settings.window))
    }

    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = Arc::new(policies);
        self
    }

    pub fn with_strategy(mut self, strategy: ReorderStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_window_mode(mut self, window_mode: WindowMode) -> Self {
        self.window_mode = window_mode;
        self
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Evaluate every active item as of `today`.
    ///
    /// Items whose data violates a calculator precondition are skipped.
    /// Persistence and notification failures abort the run.
    pub async fn run(&self, today: NaiveDate) -> AppResult<RunSummary> {
        let run_id = Uuid::new_v4();
        let window = OutflowWindow::for_mode(self.window_mode, today);

        tracing::info!(
            "Replenishment run {} started: strategy {}, window {}..{}",
            run_id,
            self.strategy,
            window.first(),
            window.last()
        );

        let items = self.items.list_active_items().await?;
        let mut flagged = Vec::new();
        let mut evaluated = 0;
        let mut skipped = 0;

        for item in &items {
            let decision = match self.evaluate_item(item, &window).await {
                Ok(decision) => decision,
                Err(AppError::InvalidInput(reason)) => {
                    tracing::warn!("Skipping item {}: {}", item.item_code, reason);
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            tracing::debug!(
                "Item {} / stock {} / safety stock {:.2} / reorder point {:.2} / reorder {}",
                decision.item_code,
                decision.current_stock,
                decision.safety_stock,
                decision.reorder_point,
                decision.should_reorder
            );

            self.items.save_decision(&decision).await?;
            evaluated += 1;

            if decision.should_reorder {
                flagged.push(FlaggedItem::from_decision(item, &decision));
            }
        }

        let notified = if flagged.is_empty() {
            tracing::info!("No items need reordering. No report sent.");
            false
        } else {
            self.notifier.notify(&flagged).await?;
            true
        };

        let summary = RunSummary {
            run_id,
            strategy: self.strategy,
            window_start: window.first(),
            window_end: window.last(),
            items_evaluated: evaluated,
            items_flagged: flagged.len(),
            items_skipped: skipped,
            notified,
        };

        tracing::info!(
            "Replenishment run {} finished: {} evaluated, {} flagged, {} skipped",
            run_id,
            summary.items_evaluated,
            summary.items_flagged,
            summary.items_skipped
        );

        Ok(summary)
    }

    /// Outward movements of one item for each month of the window
    pub async fn monthly_outflows(
        &self,
        item_code: &str,
        window: &OutflowWindow,
    ) -> AppResult<Vec<MonthlyOutflow>> {
        let mut outflows = Vec::with_capacity(window.len());
        for month in window.months() {
            outflows.push(MonthlyOutflow {
                year: month.year,
                month: month.month,
                quantity: self.ledger.monthly_outflow(item_code, *month).await?,
            });
        }
        Ok(outflows)
    }

    /// Compute the decision for one item over the given window
    pub async fn evaluate_item(
        &self,
        item: &Item,
        window: &OutflowWindow,
    ) -> AppResult<ReorderDecision> {
        let outflows: Vec<f64> = self
            .monthly_outflows(&item.item_code, window)
            .await?
            .iter()
            .map(|outflow| outflow.quantity)
            .collect();

        let policy = self.policies.lookup(&item.category);
        let current_stock = self.stock.max_stock(&item.item_code).await?;

        Ok(self
            .strategy
            .evaluate(&item.item_code, &outflows, policy, current_stock)?)
    }
}

/// Run replenishment against the application's database, one run at a time
pub async fn run_replenishment(state: &AppState) -> AppResult<RunSummary> {
    let _guard = state.run_lock.lock().await;
    let service = ReplenishmentService::from_state(state)?;
    service.run(chrono::Utc::now().date_naive()).await
}
