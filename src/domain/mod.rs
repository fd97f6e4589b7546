//! Marketplace rules that do not need a database: roles, the order status
//! machine, catalog and inventory rules, pricing and messaging policy.

pub mod catalog;
pub mod messaging;
pub mod order;
pub mod pricing;
pub mod role;

pub use catalog::{BulkAction, OFFICIAL_TAG, ProductStatus};
pub use order::{OrderLine, OrderStatus};
pub use pricing::{Earnings, OrderTotals, PricingRules};
pub use role::Role;
