/// Cat documents and the collection contract
///
/// A cat is a free-form document `{name, age, features}`. `name` is a natural
/// key: lookups use it, but nothing prevents two cats from sharing one. When
/// several documents match, single-document operations act on the one
/// inserted first.
///
/// `features` behaves as a set of strings that remembers insertion order:
/// duplicates are dropped on insert, and adding an existing feature is a
/// no-op.
///
/// # Matched vs. modified
///
/// Updates report two counts. `matched` says whether a document satisfied
/// the name filter; `modified` says whether its stored value actually changed.
/// Setting an age to its current value matches without modifying.
///
/// ```
/// use seedbed_shared::docstore::{UpdateCounts, UpdateOutcome};
///
/// assert_eq!(UpdateCounts { matched: 0, modified: 0 }.outcome(), UpdateOutcome::NotFound);
/// assert_eq!(UpdateCounts { matched: 1, modified: 0 }.outcome(), UpdateOutcome::Unchanged);
/// assert_eq!(UpdateCounts { matched: 1, modified: 1 }.outcome(), UpdateOutcome::Changed);
/// ```

use crate::error::StoreResult;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Generated document identifier (UUID v4, hyphenated)
pub type CatId = String;

/// Input for inserting a cat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCat {
    /// Natural key, not unique
    pub name: String,

    /// Age in years
    pub age: i64,

    /// Distinguishing features
    #[serde(default)]
    pub features: Vec<String>,
}

impl NewCat {
    /// Creates a cat, dropping duplicate features (first occurrence wins)
    pub fn new<I, S>(name: impl Into<String>, age: i64, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            age,
            features: dedup_features(features.into_iter().map(Into::into)),
        }
    }

    /// Returns a copy with duplicate features removed
    ///
    /// Backends call this before storing, so documents deserialized from
    /// scripts get set semantics too.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.clone(),
            age: self.age,
            features: dedup_features(self.features.iter().cloned()),
        }
    }
}

/// A stored cat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatDocument {
    /// Generated identifier
    pub id: CatId,

    /// Natural key, not unique
    pub name: String,

    /// Age in years
    pub age: i64,

    /// Distinguishing features, without duplicates
    pub features: Vec<String>,
}

impl fmt::Display for CatDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{id: {}, name: {}, age: {}, features: [{}]}}",
            self.id,
            self.name,
            self.age,
            self.features.join(", ")
        )
    }
}

/// Raw result of an update: how many documents matched, how many changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateCounts {
    /// Documents that satisfied the filter (0 or 1)
    pub matched: u64,

    /// Documents whose stored value changed (0 or 1)
    pub modified: u64,
}

impl UpdateCounts {
    /// Interprets the counts
    pub fn outcome(&self) -> UpdateOutcome {
        match (self.matched, self.modified) {
            (0, _) => UpdateOutcome::NotFound,
            (_, 0) => UpdateOutcome::Unchanged,
            _ => UpdateOutcome::Changed,
        }
    }
}

/// Outcome of an update addressed by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// No document has this name
    NotFound,

    /// A document matched but already held the requested value
    Unchanged,

    /// A document matched and its value changed
    Changed,
}

/// Outcome of a delete addressed by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// One document was removed
    Deleted,

    /// No document has this name
    NotFound,
}

impl From<bool> for DeleteOutcome {
    fn from(deleted: bool) -> Self {
        if deleted {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        }
    }
}

/// Outcome of reading the whole collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadAllOutcome {
    /// The collection holds no documents
    Empty,

    /// This many documents were read
    Found(usize),
}

/// Storage backend for cat documents
///
/// Implementations must make every single-document operation atomic: the
/// document matched is the document written.
#[async_trait]
pub trait CatCollection: Send + Sync {
    /// Backend name for logs (e.g. "redis", "memory")
    fn backend(&self) -> &str;

    /// Inserts a document and returns its generated id
    async fn insert(&self, cat: NewCat) -> StoreResult<CatId>;

    /// Streams every document in insertion order
    ///
    /// The stream is lazy: backends may fetch documents in pages as the
    /// caller polls.
    fn find_all(&self) -> BoxStream<'_, StoreResult<CatDocument>>;

    /// Returns the first document inserted with this name, if any
    async fn find_one_by_name(&self, name: &str) -> StoreResult<Option<CatDocument>>;

    /// Sets `age` on the first document with this name
    async fn set_age(&self, name: &str, age: i64) -> StoreResult<UpdateCounts>;

    /// Adds `feature` to the first document with this name unless present
    async fn add_feature(&self, name: &str, feature: &str) -> StoreResult<UpdateCounts>;

    /// Removes the first document with this name; true if one was removed
    async fn delete_one_by_name(&self, name: &str) -> StoreResult<bool>;

    /// Removes every document and returns how many were removed
    async fn delete_all(&self) -> StoreResult<u64>;
}

/// Keeps the first occurrence of each feature
fn dedup_features(features: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    features.filter(|f| seen.insert(f.clone())).collect()
}
