//! Corona site aggregation store.
//!
//! This crate provides:
//! - Read access to the `country` and `covid19` tables of the SQLite database
//! - The one-time migration that adds and fills the running-total columns
//! - Daily, accumulated, world-wide and incidence series for page generation
//! - A SQLite version check

pub mod checks;
pub mod error;
pub mod migration;
pub mod schema;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

pub use checks::{sqlite_check, Status};
pub use error::{Result, StoreError};
pub use migration::{
    plan_migration, CumulativePolicy, DerivedColumn, MigrationReport, MigrationStep, SchemaState,
};
pub use store::Store;
