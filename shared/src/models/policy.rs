//! Category lead-time policies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reorder::ReorderError;

/// Lead time used when an item's category has no explicit policy
pub const DEFAULT_LEAD_TIME_DAYS: f64 = 30.0;

/// Lead-time deviation used when an item's category has no explicit policy
pub const DEFAULT_LEAD_TIME_STD_DEV_DAYS: f64 = 6.0;

/// Replenishment lead time of a category, in days
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CategoryPolicy {
    pub lead_time_days: f64,
    pub lead_time_std_dev_days: f64,
}

impl CategoryPolicy {
    pub fn new(lead_time_days: f64, lead_time_std_dev_days: f64) -> Self {
        Self {
            lead_time_days,
            lead_time_std_dev_days,
        }
    }

    /// Reject negative or non-finite lead times
    pub fn validate(&self) -> Result<(), ReorderError> {
        if !self.lead_time_days.is_finite() || self.lead_time_days < 0.0 {
            return Err(ReorderError::InvalidInput(format!(
                "lead time must be a non-negative number of days, got {}",
                self.lead_time_days
            )));
        }
        if !self.lead_time_std_dev_days.is_finite() || self.lead_time_std_dev_days < 0.0 {
            return Err(ReorderError::InvalidInput(format!(
                "lead time deviation must be a non-negative number of days, got {}",
                self.lead_time_std_dev_days
            )));
        }
        Ok(())
    }
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_TIME_DAYS, DEFAULT_LEAD_TIME_STD_DEV_DAYS)
    }
}

/// Immutable mapping from item category to lead-time policy
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct PolicyTable {
    default: CategoryPolicy,
    policies: BTreeMap<String, CategoryPolicy>,
}

impl PolicyTable {
    /// Create an empty table that resolves every category to `default`
    pub fn new(default: CategoryPolicy) -> Self {
        Self {
            default,
            policies: BTreeMap::new(),
        }
    }

    /// Add or replace the policy of a category
    pub fn with_policy(mut self, category: impl Into<String>, policy: CategoryPolicy) -> Self {
        self.policies.insert(category.into(), policy);
        self
    }

    /// Resolve the policy of a category, falling back to the default
    pub fn lookup(&self, category: &str) -> CategoryPolicy {
        self.policies.get(category).copied().unwrap_or(self.default)
    }

    pub fn default_policy(&self) -> CategoryPolicy {
        self.default
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Validate the default and every category policy
    pub fn validate(&self) -> Result<(), ReorderError> {
        self.default.validate()?;
        for (category, policy) in &self.policies {
            policy.validate().map_err(|e| {
                ReorderError::InvalidInput(format!("category '{}': {}", category, e))
            })?;
        }
        Ok(())
    }
}
