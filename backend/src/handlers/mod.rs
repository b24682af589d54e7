//! HTTP handlers for the stock replenishment service

pub mod replenishment;

pub use replenishment::{get_policies, run_now};
