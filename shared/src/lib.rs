//! Shared domain types and calculations for the stock replenishment service
//!
//! This crate contains no I/O. It holds the item and policy models, the
//! outflow window, the reorder calculator and the report renderer used by
//! the backend.

pub mod models;
pub mod reorder;
pub mod report;
pub mod validation;
pub mod window;

pub use models::*;
pub use reorder::*;
pub use report::*;
pub use validation::*;
pub use window::*;
