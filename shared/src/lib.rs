//! Shared domain logic for the coffee shop management system
//!
//! Unit conversion, recipe costing, the stock and finance ledgers and
//! report bucketing live here, free of any I/O, so that the backend and the
//! WASM client apply exactly the same rules.

pub mod costing;
pub mod error;
pub mod ledger;
pub mod models;
pub mod reporting;
pub mod stock;
pub mod types;
pub mod units;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use models::*;
pub use types::*;
pub use units::{Unit, UnitFamily};
