//! Shared types for the POS service
//!
//! Error types, API models and small utilities used by the server and its
//! tests.

pub mod error;
pub mod models;
pub mod tenant;
pub mod util;
