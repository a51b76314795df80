//! HTTP handlers

pub mod auth;
pub mod category;
pub mod finance;
pub mod health;
pub mod ingredient;
pub mod product;
pub mod reporting;
pub mod sale;
pub mod stock;

pub use auth::*;
pub use category::*;
pub use finance::*;
pub use health::*;
pub use ingredient::*;
pub use product::*;
pub use reporting::*;
pub use sale::*;
pub use stock::*;
