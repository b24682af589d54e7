//! HTTP handlers for replenishment endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use shared::{CategoryPolicy, ReorderStrategy, WindowMode};

use crate::error::AppResult;
use crate::services::{run_replenishment, RunSummary};
use crate::AppState;

/// Effective calculation settings
#[derive(Debug, Serialize)]
pub struct PolicyOverview {
    pub strategy: ReorderStrategy,
    pub window: WindowMode,
    pub default_policy: CategoryPolicy,
    pub categories: Vec<CategoryPolicyView>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPolicyView {
    pub category: String,
    #[serde(flatten)]
    pub policy: CategoryPolicy,
}

/// Run replenishment now and return its summary
pub async fn run_now(State(state): State<AppState>) -> AppResult<Json<RunSummary>> {
    let summary = run_replenishment(&state).await?;
    Ok(Json(summary))
}

/// Get the strategy and category lead-time table in effect
pub async fn get_policies(State(state): State<AppState>) -> AppResult<Json<PolicyOverview>> {
    let settings = &state.config.replenishment;
    let table = settings.policy_table()?;

    let categories = table
        .categories()
        .map(|category| CategoryPolicyView {
            category: category.to_string(),
            policy: table.lookup(category),
        })
        .collect();

    Ok(Json(PolicyOverview {
        strategy: settings.strategy()?,
        window: settings.window,
        default_policy: table.default_policy(),
        categories,
    }))
}
