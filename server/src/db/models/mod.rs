//! Database Models

// Serde helpers
pub mod serde_helpers;

// Shared value types
pub mod common;

// Lifecycle enumerations
pub mod status;

// Catalog
pub mod category;
pub mod product;

// Accounts
pub mod user;

// Orders
pub mod order;

// Derived statistics
pub mod statistic;

// System
pub mod error_log;

// Re-exports
pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use common::{Address, LocalizedText};
pub use error_log::ErrorLog;
pub use order::{Order, OrderLine};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use statistic::{GeneralStatistic, PeriodStat, ProductStatistic, ProductView, entry_for};
pub use status::{
    OrderStatus, PaymentMethod, PaymentStatus, ShippingMethod, ShippingStatus, StatusLabel,
};
pub use user::{Cart, CartLine, User};
