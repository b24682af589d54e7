//! Stock Replenishment Service
//!
//! Computes safety stock and reorder points from stock ledger history,
//! flags items that need replenishment and mails a report of them.

use std::sync::Arc;

use tokio::sync::Mutex;

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod scheduler;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

/// Application state shared across handlers and the scheduler
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    /// Held for the duration of a replenishment run
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}
