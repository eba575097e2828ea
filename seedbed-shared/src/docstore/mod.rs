//! Cat document collection
//!
//! - `cat`: document types and the `CatCollection` contract
//! - `client`: Redis connection provider and its configuration
//! - `redis_collection`: production backend, one Lua script per atomic operation
//! - `memory`: in-process backend for tests and dry runs
//! - `mutator`: logged CRUD helpers and the scripted step runner

pub mod cat;
pub mod client;
pub mod memory;
pub mod mutator;
pub mod redis_collection;

pub use cat::{
    CatCollection, CatDocument, CatId, DeleteOutcome, NewCat, ReadAllOutcome, UpdateCounts,
    UpdateOutcome,
};
pub use client::{DocStoreClient, DocStoreConfig};
pub use memory::MemoryCatCollection;
pub use mutator::{load_script, CatMutator, ScriptReport, Step};
pub use redis_collection::RedisCatCollection;
