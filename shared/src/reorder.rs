//! Safety stock and reorder point calculation
//!
//! Two models are available:
//! - `Composite`: combines demand variability and lead-time variability
//!   (`SS = Z * sqrt(d * σLT² + (LT * σd)²)`, `ROP = SS + d * LT`)
//! - `FlatPercentage`: a fixed buffer on top of the average monthly outflow,
//!   ignoring lead time entirely
//!
//! Monthly outflows are converted to daily demand with a 30-day month.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CategoryPolicy, ReorderDecision};
use crate::validation::validate_quantity;

/// Days per month used to turn monthly outflow into daily demand
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Z-score for a 95% one-sided service level
pub const DEFAULT_Z_SCORE: f64 = 1.64;

/// Buffer applied to average monthly outflow by the flat model
pub const DEFAULT_BUFFER_FACTOR: f64 = 1.25;

/// Computed safety stock below this value is treated as zero
const SAFETY_STOCK_FLOOR: f64 = 1.0;

/// Calculator precondition failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReorderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Arithmetic mean. Requires at least one value.
///
/// Summation is done in decimal so a constant series yields its own value.
pub fn mean(values: &[f64]) -> Result<f64, ReorderError> {
    to_f64(exact_mean(&to_decimals(values)?)?)
}

/// Bessel-corrected sample standard deviation. Requires at least two values.
///
/// Deviations are computed in decimal, so a constant series has a
/// deviation of exactly zero.
pub fn sample_std_dev(values: &[f64]) -> Result<f64, ReorderError> {
    if values.len() < 2 {
        return Err(ReorderError::InvalidInput(format!(
            "sample standard deviation requires at least two values, got {}",
            values.len()
        )));
    }
    let values = to_decimals(values)?;
    let avg = exact_mean(&values)?;
    let sum_sq = values.iter().try_fold(Decimal::ZERO, |acc, v| {
        v.checked_sub(avg)
            .and_then(|d| d.checked_mul(d))
            .and_then(|sq| acc.checked_add(sq))
            .ok_or_else(out_of_range)
    })?;
    let variance = sum_sq
        .checked_div(Decimal::from(values.len() - 1))
        .ok_or_else(out_of_range)?;
    Ok(to_f64(variance)?.sqrt())
}

fn to_decimals(values: &[f64]) -> Result<Vec<Decimal>, ReorderError> {
    values
        .iter()
        .map(|v| {
            Decimal::from_f64(*v).ok_or_else(|| {
                ReorderError::InvalidInput(format!("{} is not a representable quantity", v))
            })
        })
        .collect()
}

fn exact_mean(values: &[Decimal]) -> Result<Decimal, ReorderError> {
    if values.is_empty() {
        return Err(ReorderError::InvalidInput(
            "mean requires at least one value".to_string(),
        ));
    }
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(out_of_range)?;
    sum.checked_div(Decimal::from(values.len()))
        .ok_or_else(out_of_range)
}

fn to_f64(value: Decimal) -> Result<f64, ReorderError> {
    value.normalize().to_f64().ok_or_else(out_of_range)
}

fn out_of_range() -> ReorderError {
    ReorderError::InvalidInput("quantities are too large to aggregate".to_string())
}

/// Daily demand statistics derived from monthly outflows
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct DemandProfile {
    pub avg_daily_demand: f64,
    pub std_dev_daily_demand: f64,
}

impl DemandProfile {
    /// Build the profile from monthly outflow magnitudes
    pub fn from_monthly(monthly_outflows: &[f64]) -> Result<Self, ReorderError> {
        validate_outflows(monthly_outflows)?;
        Ok(Self {
            avg_daily_demand: mean(monthly_outflows)? / DAYS_PER_MONTH,
            std_dev_daily_demand: sample_std_dev(monthly_outflows)? / DAYS_PER_MONTH,
        })
    }
}

/// Reorder model selected for a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ReorderStrategy {
    /// Lead-time and demand variability model
    Composite { z_score: f64 },
    /// Legacy model: `ceil(buffer * average monthly outflow)`
    FlatPercentage { buffer_factor: f64 },
}

impl Default for ReorderStrategy {
    fn default() -> Self {
        ReorderStrategy::Composite {
            z_score: DEFAULT_Z_SCORE,
        }
    }
}

impl std::fmt::Display for ReorderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReorderStrategy::Composite { z_score } => write!(f, "composite (z={})", z_score),
            ReorderStrategy::FlatPercentage { buffer_factor } => {
                write!(f, "flat_percentage (buffer={})", buffer_factor)
            }
        }
    }
}

impl ReorderStrategy {
    /// Check the strategy parameters themselves
    pub fn validate(&self) -> Result<(), ReorderError> {
        let (name, value) = match self {
            ReorderStrategy::Composite { z_score } => ("z_score", *z_score),
            ReorderStrategy::FlatPercentage { buffer_factor } => ("buffer_factor", *buffer_factor),
        };
        if !value.is_finite() || value <= 0.0 {
            return Err(ReorderError::InvalidInput(format!(
                "{} must be a positive number, got {}",
                name, value
            )));
        }
        Ok(())
    }

    /// Compute safety stock and reorder point for one item and decide
    /// whether its current stock calls for a reorder.
    pub fn evaluate(
        &self,
        item_code: &str,
        monthly_outflows: &[f64],
        policy: CategoryPolicy,
        current_stock: f64,
    ) -> Result<ReorderDecision, ReorderError> {
        self.validate()?;
        validate_quantity(current_stock).map_err(|e| {
            ReorderError::InvalidInput(format!("current stock {}: {}", current_stock, e))
        })?;

        let (safety_stock, reorder_point) = match *self {
            ReorderStrategy::Composite { z_score } => {
                composite(monthly_outflows, policy, z_score)?
            }
            ReorderStrategy::FlatPercentage { buffer_factor } => {
                let safety_stock = flat_percentage(monthly_outflows, buffer_factor)?;
                (safety_stock, safety_stock)
            }
        };

        Ok(ReorderDecision {
            item_code: item_code.to_string(),
            current_stock,
            safety_stock,
            reorder_point,
            should_reorder: current_stock < reorder_point,
        })
    }
}

fn validate_outflows(monthly_outflows: &[f64]) -> Result<(), ReorderError> {
    for outflow in monthly_outflows {
        validate_quantity(*outflow).map_err(|e| {
            ReorderError::InvalidInput(format!("monthly outflow {}: {}", outflow, e))
        })?;
    }
    Ok(())
}

/// Returns `(safety_stock, reorder_point)`
fn composite(
    monthly_outflows: &[f64],
    policy: CategoryPolicy,
    z_score: f64,
) -> Result<(f64, f64), ReorderError> {
    policy.validate()?;
    let demand = DemandProfile::from_monthly(monthly_outflows)?;

    let lead_time = policy.lead_time_days;
    let lead_time_sd = policy.lead_time_std_dev_days;

    let mut safety_stock = z_score
        * (demand.avg_daily_demand * lead_time_sd.powi(2)
            + (lead_time * demand.std_dev_daily_demand).powi(2))
        .sqrt();
    let reorder_point = safety_stock + demand.avg_daily_demand * lead_time;

    // reorder point keeps the unclamped safety stock
    if safety_stock < SAFETY_STOCK_FLOOR {
        safety_stock = 0.0;
    }

    Ok((safety_stock, reorder_point))
}

fn flat_percentage(monthly_outflows: &[f64], buffer_factor: f64) -> Result<f64, ReorderError> {
    validate_outflows(monthly_outflows)?;
    let average = mean(monthly_outflows)?;
    Ok((average * buffer_factor).ceil())
}
