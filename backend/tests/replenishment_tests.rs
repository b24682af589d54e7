//! Replenishment run tests
//!
//! Tests for the run orchestration including:
//! - Reorder flagging and batch notification
//! - Category policy fallback
//! - Skipping items with invalid history
//! - Error propagation from persistence and delivery

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use proptest::prelude::*;
use replenishment_backend::services::{
    ItemRepository, LedgerSource, NotificationSink, ReplenishmentService, StockSource,
};
use replenishment_backend::{AppError, AppResult};
use shared::{
    CategoryPolicy, FlaggedItem, Item, PolicyTable, ReorderDecision, ReorderStrategy, WindowMode,
    YearMonth,
};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeItems {
    items: Vec<Item>,
    saved: Mutex<Vec<ReorderDecision>>,
}

#[async_trait]
impl ItemRepository for FakeItems {
    async fn list_active_items(&self) -> AppResult<Vec<Item>> {
        Ok(self.items.clone())
    }

    async fn save_decision(&self, decision: &ReorderDecision) -> AppResult<()> {
        self.saved.lock().unwrap().push(decision.clone());
        Ok(())
    }
}

/// Monthly outflows per item, indexed by position in the window
#[derive(Default)]
struct FakeLedger {
    outflows: HashMap<String, Vec<f64>>,
    calls: Mutex<Vec<YearMonth>>,
    fail: bool,
}

#[async_trait]
impl LedgerSource for FakeLedger {
    async fn monthly_outflow(&self, item_code: &str, month: YearMonth) -> AppResult<f64> {
        if self.fail {
            return Err(AppError::Internal("ledger unavailable".to_string()));
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(month);
        let index = (calls.len() - 1) % 12;
        Ok(self
            .outflows
            .get(item_code)
            .and_then(|values| values.get(index).copied())
            .unwrap_or(0.0))
    }
}

#[derive(Default)]
struct FakeStock {
    levels: HashMap<String, f64>,
}

#[async_trait]
impl StockSource for FakeStock {
    async fn max_stock(&self, item_code: &str) -> AppResult<f64> {
        Ok(self.levels.get(item_code).copied().unwrap_or(0.0))
    }
}

#[derive(Default)]
struct RecordingSink {
    batches: Mutex<Vec<Vec<FlaggedItem>>>,
    fail: bool,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, items: &[FlaggedItem]) -> AppResult<()> {
        self.batches.lock().unwrap().push(items.to_vec());
        if self.fail {
            return Err(AppError::MailDelivery("503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

fn item(code: &str, category: &str) -> Item {
    Item {
        item_code: code.to_string(),
        item_name: format!("{} name", code),
        category: category.to_string(),
        safety_stock: 0.0,
        reorder_point: 0.0,
        reorder: false,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn policies() -> PolicyTable {
    PolicyTable::default()
        .with_policy("Glass", CategoryPolicy::new(90.0, 20.0))
        .with_policy("Cables", CategoryPolicy::new(15.0, 5.0))
}

struct Fixture {
    items: Arc<FakeItems>,
    ledger: Arc<FakeLedger>,
    sink: Arc<RecordingSink>,
    service: ReplenishmentService,
}

fn fixture(
    items: Vec<Item>,
    outflows: Vec<(&str, Vec<f64>)>,
    stock: Vec<(&str, f64)>,
    sink: RecordingSink,
) -> Fixture {
    let items = Arc::new(FakeItems {
        items,
        ..Default::default()
    });
    let ledger = Arc::new(FakeLedger {
        outflows: outflows
            .into_iter()
            .map(|(code, values)| (code.to_string(), values))
            .collect(),
        ..Default::default()
    });
    let stock = Arc::new(FakeStock {
        levels: stock
            .into_iter()
            .map(|(code, qty)| (code.to_string(), qty))
            .collect(),
    });
    let sink = Arc::new(sink);

    let service = ReplenishmentService::new(
        items.clone(),
        ledger.clone(),
        stock,
        sink.clone(),
    )
    .with_policies(policies());

    Fixture {
        items,
        ledger,
        sink,
        service,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Constant demand of 1/day with a 90 ± 20 day lead time
    #[tokio::test]
    async fn test_run_flags_item_below_reorder_point() {
        let f = fixture(
            vec![item("SPL.3013", "Glass"), item("CBL.0001", "Cables")],
            vec![("SPL.3013", vec![30.0; 12]), ("CBL.0001", vec![30.0; 12])],
            vec![("SPL.3013", 100.0), ("CBL.0001", 500.0)],
            RecordingSink::default(),
        );

        let summary = f.service.run(today()).await.unwrap();

        assert_eq!(summary.items_evaluated, 2);
        assert_eq!(summary.items_flagged, 1);
        assert_eq!(summary.items_skipped, 0);
        assert!(summary.notified);

        let batches = f.sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        let flagged = &batches[0][0];
        assert_eq!(flagged.item_code, "SPL.3013");
        assert_eq!(flagged.category, "Glass");
        assert_eq!(flagged.current_stock, 100.0);
        assert!((flagged.safety_stock - 32.8).abs() < 1e-9);
        assert!((flagged.reorder_point - 122.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_every_evaluated_item_is_persisted() {
        let f = fixture(
            vec![item("A", "Glass"), item("B", "Cables")],
            vec![("A", vec![30.0; 12]), ("B", vec![30.0; 12])],
            vec![("A", 100.0), ("B", 500.0)],
            RecordingSink::default(),
        );

        f.service.run(today()).await.unwrap();

        let saved = f.items.saved.lock().unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().any(|d| d.item_code == "A" && d.should_reorder));
        assert!(saved.iter().any(|d| d.item_code == "B" && !d.should_reorder));
    }

    #[tokio::test]
    async fn test_no_report_when_nothing_flagged() {
        let f = fixture(
            vec![item("A", "Glass")],
            vec![("A", vec![0.0; 12])],
            vec![("A", 0.0)],
            RecordingSink::default(),
        );

        let summary = f.service.run(today()).await.unwrap();

        assert_eq!(summary.items_flagged, 0);
        assert!(!summary.notified);
        assert!(f.sink.batches.lock().unwrap().is_empty());

        let saved = f.items.saved.lock().unwrap();
        assert_eq!(saved[0].safety_stock, 0.0);
        assert_eq!(saved[0].reorder_point, 0.0);
    }

    #[tokio::test]
    async fn test_unknown_category_uses_default_policy() {
        let f = fixture(
            vec![item("A", "Unlisted")],
            vec![("A", vec![30.0; 12])],
            vec![("A", 0.0)],
            RecordingSink::default(),
        );

        f.service.run(today()).await.unwrap();

        // SS = 1.64 * sqrt(1 * 6²) = 9.84, ROP = 9.84 + 1 * 30
        let saved = f.items.saved.lock().unwrap();
        assert!((saved[0].safety_stock - 9.84).abs() < 1e-9);
        assert!((saved[0].reorder_point - 39.84).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_reads_previous_calendar_year() {
        let f = fixture(
            vec![item("A", "Glass")],
            vec![("A", vec![30.0; 12])],
            vec![("A", 0.0)],
            RecordingSink::default(),
        );

        let summary = f.service.run(today()).await.unwrap();

        let calls = f.ledger.calls.lock().unwrap();
        let expected: Vec<YearMonth> = (1..=12).map(|m| YearMonth::new(2023, m)).collect();
        assert_eq!(*calls, expected);
        assert_eq!(summary.window_start, YearMonth::new(2023, 1));
        assert_eq!(summary.window_end, YearMonth::new(2023, 12));
    }

    #[tokio::test]
    async fn test_trailing_window() {
        let f = fixture(
            vec![item("A", "Glass")],
            vec![("A", vec![30.0; 12])],
            vec![("A", 0.0)],
            RecordingSink::default(),
        );
        let service = f.service.clone().with_window_mode(WindowMode::Trailing);

        let summary = service.run(today()).await.unwrap();

        assert_eq!(summary.window_start, YearMonth::new(2023, 6));
        assert_eq!(summary.window_end, YearMonth::new(2024, 5));
    }

    #[tokio::test]
    async fn test_invalid_history_is_skipped() {
        let mut bad = vec![10.0; 12];
        bad[4] = -3.0;
        let f = fixture(
            vec![item("BAD", "Glass"), item("GOOD", "Glass")],
            vec![("BAD", bad), ("GOOD", vec![30.0; 12])],
            vec![("BAD", 0.0), ("GOOD", 0.0)],
            RecordingSink::default(),
        );

        let summary = f.service.run(today()).await.unwrap();

        assert_eq!(summary.items_skipped, 1);
        assert_eq!(summary.items_evaluated, 1);
        let saved = f.items.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].item_code, "GOOD");
    }

    #[tokio::test]
    async fn test_delivery_failure_propagates() {
        let f = fixture(
            vec![item("A", "Glass")],
            vec![("A", vec![30.0; 12])],
            vec![("A", 0.0)],
            RecordingSink {
                fail: true,
                ..Default::default()
            },
        );

        let result = f.service.run(today()).await;

        assert!(matches!(result, Err(AppError::MailDelivery(_))));
        // Figures are written before the report is sent
        assert_eq!(f.items.saved.lock().unwrap().len(), 1);
        assert_eq!(f.sink.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ledger_failure_propagates() {
        let items = Arc::new(FakeItems {
            items: vec![item("A", "Glass")],
            ..Default::default()
        });
        let service = ReplenishmentService::new(
            items.clone(),
            Arc::new(FakeLedger {
                fail: true,
                ..Default::default()
            }),
            Arc::new(FakeStock::default()),
            Arc::new(RecordingSink::default()),
        );

        let result = service.run(today()).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(items.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flat_percentage_strategy() {
        let f = fixture(
            vec![item("A", "Glass"), item("B", "Glass")],
            vec![("A", vec![30.0; 12]), ("B", vec![30.0; 12])],
            vec![("A", 37.0), ("B", 38.0)],
            RecordingSink::default(),
        );
        let service = f
            .service
            .clone()
            .with_strategy(ReorderStrategy::FlatPercentage { buffer_factor: 1.25 });

        let summary = service.run(today()).await.unwrap();

        assert_eq!(summary.items_flagged, 1);
        let saved = f.items.saved.lock().unwrap();
        assert!(saved.iter().all(|d| d.safety_stock == 38.0 && d.reorder_point == 38.0));
        assert!(saved.iter().any(|d| d.item_code == "A" && d.should_reorder));
    }

    #[tokio::test]
    async fn test_empty_item_list() {
        let f = fixture(vec![], vec![], vec![], RecordingSink::default());

        let summary = f.service.run(today()).await.unwrap();

        assert_eq!(summary.items_evaluated, 0);
        assert!(!summary.notified);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn outflow_strategy() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0f64..10_000.0, 12)
    }

    fn policy_strategy() -> impl Strategy<Value = CategoryPolicy> {
        (0.0f64..180.0, 0.0f64..60.0).prop_map(|(lt, sd)| CategoryPolicy::new(lt, sd))
    }

    proptest! {
        /// Safety stock and reorder point are never negative
        #[test]
        fn prop_figures_non_negative(
            outflows in outflow_strategy(),
            policy in policy_strategy(),
            stock in 0.0f64..10_000.0
        ) {
            let decision = ReorderStrategy::default()
                .evaluate("A", &outflows, policy, stock)
                .unwrap();
            prop_assert!(decision.safety_stock >= 0.0);
            prop_assert!(decision.reorder_point >= 0.0);
        }

        /// Computed safety stock is either zero or at least one unit
        #[test]
        fn prop_safety_stock_clamped_below_one(
            outflows in outflow_strategy(),
            policy in policy_strategy()
        ) {
            let decision = ReorderStrategy::default()
                .evaluate("A", &outflows, policy, 0.0)
                .unwrap();
            prop_assert!(decision.safety_stock == 0.0 || decision.safety_stock >= 1.0);
        }

        /// Reorder flag is exactly `current_stock < reorder_point`
        #[test]
        fn prop_reorder_iff_below_point(
            outflows in outflow_strategy(),
            policy in policy_strategy(),
            stock in 0.0f64..10_000.0
        ) {
            let decision = ReorderStrategy::default()
                .evaluate("A", &outflows, policy, stock)
                .unwrap();
            prop_assert_eq!(decision.should_reorder, stock < decision.reorder_point);
        }

        /// Constant demand: SS = Z * σLT * sqrt(v / 30) before clamping
        #[test]
        fn prop_constant_demand_formula(
            v in 1.0f64..5_000.0,
            policy in policy_strategy()
        ) {
            let decision = ReorderStrategy::default()
                .evaluate("A", &[v; 12], policy, 0.0)
                .unwrap();
            let raw = 1.64 * policy.lead_time_std_dev_days * (v / 30.0).sqrt();
            let expected = if raw < 1.0 { 0.0 } else { raw };
            prop_assert!((decision.safety_stock - expected).abs() < 1e-6);
            prop_assert!((decision.reorder_point - (raw + v / 30.0 * policy.lead_time_days)).abs() < 1e-6);
        }

        /// Flat model: SS = ceil(1.25 * average monthly outflow)
        #[test]
        fn prop_flat_percentage_formula(
            outflows in outflow_strategy(),
            stock in 0.0f64..10_000.0
        ) {
            let decision = ReorderStrategy::FlatPercentage { buffer_factor: 1.25 }
                .evaluate("A", &outflows, CategoryPolicy::default(), stock)
                .unwrap();
            let average = shared::mean(&outflows).unwrap();
            prop_assert_eq!(decision.safety_stock, (average * 1.25).ceil());
            prop_assert_eq!(decision.should_reorder, stock < decision.safety_stock);
        }

        /// A run reports exactly the items whose stock is below their reorder point
        #[test]
        fn prop_run_reports_flagged_items(
            entries in prop::collection::vec((outflow_strategy(), 0.0f64..2_000.0), 1..8)
        ) {
            let items: Vec<Item> = (0..entries.len())
                .map(|i| item(&format!("IT-{}", i), "Glass"))
                .collect();
            let codes: Vec<String> = items.iter().map(|i| i.item_code.clone()).collect();
            let f = fixture(
                items,
                codes.iter().zip(&entries).map(|(c, (o, _))| (c.as_str(), o.clone())).collect(),
                codes.iter().zip(&entries).map(|(c, (_, s))| (c.as_str(), *s)).collect(),
                RecordingSink::default(),
            );

            let summary = tokio_test::block_on(f.service.run(today())).unwrap();

            let expected: Vec<String> = f.items.saved.lock().unwrap()
                .iter()
                .filter(|d| d.should_reorder)
                .map(|d| d.item_code.clone())
                .collect();
            prop_assert_eq!(summary.items_flagged, expected.len());
            prop_assert_eq!(summary.notified, !expected.is_empty());

            let batches = f.sink.batches.lock().unwrap();
            if expected.is_empty() {
                prop_assert!(batches.is_empty());
            } else {
                prop_assert_eq!(batches.len(), 1);
                let reported: Vec<String> = batches[0].iter().map(|i| i.item_code.clone()).collect();
                prop_assert_eq!(reported, expected);
            }
        }
    }
}
