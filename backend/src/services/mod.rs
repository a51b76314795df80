//! Business logic services for the coffee shop

pub mod auth;
pub mod category;
pub mod finance;
pub mod ingredient;
pub mod product;
pub mod reporting;
pub mod sale;
pub mod stock;

pub use auth::AuthService;
pub use category::CategoryService;
pub use finance::FinanceService;
pub use ingredient::IngredientService;
pub use product::ProductService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use stock::StockService;
