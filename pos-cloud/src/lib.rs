//! pos-cloud: multi-tenant restaurant point-of-sale backend
//!
//! - Order lifecycle (place/merge, status, finalize) and the kitchen view
//! - Per-restaurant real-time rooms for kitchen displays and waiter tablets
//! - Floor, menu, staff, inventory and guest-facing CRUD behind a REST API

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod email;
pub mod error;
pub mod live;
pub mod orders;
pub mod state;
pub mod util;
