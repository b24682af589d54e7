//! Domain models for the stock replenishment service

mod item;
mod policy;

pub use item::*;
pub use policy::*;
