/// In-process cat collection
///
/// Keeps documents in insertion order behind a mutex, which makes every
/// operation atomic. Used by tests and by `cats --dry-run`.

use super::cat::{CatCollection, CatDocument, CatId, NewCat, UpdateCounts};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Cat collection held in memory
#[derive(Debug, Default)]
pub struct MemoryCatCollection {
    docs: Mutex<Vec<CatDocument>>,
}

impl MemoryCatCollection {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.docs.lock().await.len()
    }

    /// Whether the collection holds no documents
    pub async fn is_empty(&self) -> bool {
        self.docs.lock().await.is_empty()
    }
}

#[async_trait]
impl CatCollection for MemoryCatCollection {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn insert(&self, cat: NewCat) -> StoreResult<CatId> {
        let cat = cat.normalized();
        let id = Uuid::new_v4().to_string();

        self.docs.lock().await.push(CatDocument {
            id: id.clone(),
            name: cat.name,
            age: cat.age,
            features: cat.features,
        });

        Ok(id)
    }

    fn find_all(&self) -> BoxStream<'_, StoreResult<CatDocument>> {
        stream::once(async move { self.docs.lock().await.clone() })
            .map(|docs| stream::iter(docs.into_iter().map(Ok::<_, StoreError>)))
            .flatten()
            .boxed()
    }

    async fn find_one_by_name(&self, name: &str) -> StoreResult<Option<CatDocument>> {
        let docs = self.docs.lock().await;
        Ok(docs.iter().find(|d| d.name == name).cloned())
    }

    async fn set_age(&self, name: &str, age: i64) -> StoreResult<UpdateCounts> {
        let mut docs = self.docs.lock().await;

        let Some(doc) = docs.iter_mut().find(|d| d.name == name) else {
            return Ok(UpdateCounts::default());
        };

        if doc.age == age {
            return Ok(UpdateCounts {
                matched: 1,
                modified: 0,
            });
        }

        doc.age = age;
        Ok(UpdateCounts {
            matched: 1,
            modified: 1,
        })
    }

    async fn add_feature(&self, name: &str, feature: &str) -> StoreResult<UpdateCounts> {
        let mut docs = self.docs.lock().await;

        let Some(doc) = docs.iter_mut().find(|d| d.name == name) else {
            return Ok(UpdateCounts::default());
        };

        if doc.features.iter().any(|f| f == feature) {
            return Ok(UpdateCounts {
                matched: 1,
                modified: 0,
            });
        }

        doc.features.push(feature.to_string());
        Ok(UpdateCounts {
            matched: 1,
            modified: 1,
        })
    }

    async fn delete_one_by_name(&self, name: &str) -> StoreResult<bool> {
        let mut docs = self.docs.lock().await;

        match docs.iter().position(|d| d.name == name) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut docs = self.docs.lock().await;
        let deleted = docs.len() as u64;
        docs.clear();
        Ok(deleted)
    }
}
