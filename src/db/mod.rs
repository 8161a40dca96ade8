//! Database layer
//!
//! SQLite access for the Escriba blog API, built on sqlx.
//! The layer is organized as:
//! - `pool`: connection pool creation
//! - `migrations`: code-embedded schema migrations
//! - `repositories`: trait-based data access for each entity

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
