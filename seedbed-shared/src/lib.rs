//! # Seedbed Shared Library
//!
//! This crate contains the fixture logic used by the `taskdb` and `cats`
//! command-line tools.
//!
//! ## Module Organization
//!
//! - `error`: Closed error taxonomy shared by both backends
//! - `db`: PostgreSQL connection provider and schema initializer
//! - `models`: Status, user and task rows
//! - `seed`: Synthetic data generator and seeding transaction
//! - `docstore`: Cat document collection, its backends and the record mutator

pub mod db;
pub mod docstore;
pub mod error;
pub mod models;
pub mod seed;

pub use error::{StoreError, StoreResult};

/// Current version of the Seedbed shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
