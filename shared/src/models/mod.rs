//! Domain models for the coffee shop

mod finance;
mod ingredient;
mod product;
mod sale;
mod user;

pub use finance::*;
pub use ingredient::*;
pub use product::*;
pub use sale::*;
pub use user::*;
