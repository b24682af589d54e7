//! Stock item and reorder decision models

use serde::{Deserialize, Serialize};

/// A stock item taking part in replenishment runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Item code (e.g., "SPL.3013")
    pub item_code: String,
    pub item_name: String,
    /// Item group used to resolve the lead-time policy
    pub category: String,
    pub safety_stock: f64,
    pub reorder_point: f64,
    /// Set when the last run found stock below the reorder point
    pub reorder: bool,
}

/// Outward movement of one item over one calendar month
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MonthlyOutflow {
    pub year: i32,
    pub month: u32,
    /// Positive demand figure (sign-flipped sum of negative movements)
    pub quantity: f64,
}

/// Result of evaluating one item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReorderDecision {
    pub item_code: String,
    pub current_stock: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub should_reorder: bool,
}

/// Row of the reorder report sent to the operations recipient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlaggedItem {
    pub item_code: String,
    pub item_name: String,
    pub category: String,
    pub current_stock: f64,
    pub reorder_point: f64,
    pub safety_stock: f64,
}

impl FlaggedItem {
    /// Build a report row from an item and the decision computed for it
    pub fn from_decision(item: &Item, decision: &ReorderDecision) -> Self {
        Self {
            item_code: item.item_code.clone(),
            item_name: item.item_name.clone(),
            category: item.category.clone(),
            current_stock: decision.current_stock,
            reorder_point: decision.reorder_point,
            safety_stock: decision.safety_stock,
        }
    }
}
