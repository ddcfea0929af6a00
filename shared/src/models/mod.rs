//! Data models
//!
//! Shared between the service and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGINT / BIGSERIAL).

pub mod guest;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod restaurant;
pub mod staff;
pub mod table;

// Re-exports
pub use guest::*;
pub use inventory::*;
pub use menu::*;
pub use order::*;
pub use restaurant::*;
pub use staff::*;
pub use table::*;
