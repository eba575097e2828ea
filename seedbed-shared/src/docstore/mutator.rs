/// Logged CRUD helpers over a cat collection
///
/// Every helper reports its outcome through `tracing` and returns it typed.
/// Failures are logged in two tiers before being returned: backend-level
/// failures as "Error ...", everything else as "Unexpected error ...".
///
/// Scripts are JSON arrays of steps executed in order. A failed step is
/// logged and the script moves on, whatever the failure. The Redis
/// connection manager reconnects on its own, so a step after a dropped
/// connection may still succeed.
///
/// ```json
/// [
///   {"op": "create", "name": "barsik", "age": 3, "features": ["rudy"]},
///   {"op": "set_age", "name": "barsik", "age": 4},
///   {"op": "read_all"}
/// ]
/// ```

use super::cat::{
    CatCollection, CatDocument, CatId, DeleteOutcome, NewCat, ReadAllOutcome, UpdateOutcome,
};
use crate::error::{StoreError, StoreResult};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// One scripted operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Insert a cat
    Create {
        name: String,
        age: i64,
        #[serde(default)]
        features: Vec<String>,
    },

    /// Print every cat
    ReadAll,

    /// Print the first cat with this name
    Read { name: String },

    /// Set the age of the first cat with this name
    SetAge { name: String, age: i64 },

    /// Add a feature to the first cat with this name
    AddFeature { name: String, feature: String },

    /// Delete the first cat with this name
    Delete { name: String },

    /// Delete every cat
    DeleteAll,
}

/// Summary of a scripted run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptReport {
    /// Steps attempted
    pub steps_run: usize,

    /// Steps that failed or matched nothing
    pub steps_failed: usize,
}

impl ScriptReport {
    /// Whether every step ran without failing
    pub fn is_success(&self) -> bool {
        self.steps_failed == 0
    }
}

/// Reads a JSON step list from disk
///
/// # Errors
///
/// `StoreError::PreconditionFailed` if the file is missing or unreadable,
/// `StoreError::OperationRejected` if it is not a valid step list.
pub async fn load_script(path: impl AsRef<Path>) -> StoreResult<Vec<Step>> {
    let path = path.as_ref();

    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        StoreError::PreconditionFailed(format!("Cannot read script {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&text).map_err(|e| {
        StoreError::OperationRejected(format!("Invalid script {}: {}", path.display(), e))
    })
}

/// CRUD helpers with outcome logging
pub struct CatMutator<C> {
    collection: C,
}

impl<C: CatCollection> CatMutator<C> {
    /// Wraps a collection
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    /// Gets the wrapped collection
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Consumes the mutator, returning the collection
    pub fn into_inner(self) -> C {
        self.collection
    }

    /// Inserts a cat and reports its generated id
    pub async fn create_cat(&self, cat: NewCat) -> StoreResult<CatId> {
        let name = cat.name.clone();

        let id = self
            .collection
            .insert(cat)
            .await
            .inspect_err(|e| report_error("creating cat", e))?;

        info!(%id, %name, "Created cat");
        Ok(id)
    }

    /// Logs every cat in insertion order
    pub async fn read_all_cats(&self) -> StoreResult<ReadAllOutcome> {
        let mut docs = self.collection.find_all();
        let mut count = 0;

        while let Some(doc) = docs
            .try_next()
            .await
            .inspect_err(|e| report_error("reading cats", e))?
        {
            info!("{}", doc);
            count += 1;
        }

        if count == 0 {
            info!("Collection is empty");
            Ok(ReadAllOutcome::Empty)
        } else {
            info!(count, "Read all cats");
            Ok(ReadAllOutcome::Found(count))
        }
    }

    /// Logs the first cat with this name, if any
    pub async fn read_cat_by_name(&self, name: &str) -> StoreResult<Option<CatDocument>> {
        let doc = self
            .collection
            .find_one_by_name(name)
            .await
            .inspect_err(|e| report_error("reading cat", e))?;

        match &doc {
            Some(doc) => info!("{}", doc),
            None => info!(%name, "No cat with this name"),
        }

        Ok(doc)
    }

    /// Sets the age of the first cat with this name
    pub async fn update_cat_age(&self, name: &str, age: i64) -> StoreResult<UpdateOutcome> {
        let outcome = self
            .collection
            .set_age(name, age)
            .await
            .inspect_err(|e| report_error("updating cat age", e))?
            .outcome();

        match outcome {
            UpdateOutcome::Changed => info!(%name, age, "Updated cat age"),
            UpdateOutcome::Unchanged => info!(%name, age, "Cat already has this age"),
            UpdateOutcome::NotFound => info!(%name, "No cat with this name"),
        }

        Ok(outcome)
    }

    /// Adds a feature to the first cat with this name
    pub async fn add_feature_to_cat(&self, name: &str, feature: &str) -> StoreResult<UpdateOutcome> {
        let outcome = self
            .collection
            .add_feature(name, feature)
            .await
            .inspect_err(|e| report_error("adding feature", e))?
            .outcome();

        match outcome {
            UpdateOutcome::Changed => info!(%name, %feature, "Added feature"),
            UpdateOutcome::Unchanged => info!(%name, %feature, "Cat already has this feature"),
            UpdateOutcome::NotFound => info!(%name, "No cat with this name"),
        }

        Ok(outcome)
    }

    /// Deletes the first cat with this name
    pub async fn delete_cat_by_name(&self, name: &str) -> StoreResult<DeleteOutcome> {
        let outcome: DeleteOutcome = self
            .collection
            .delete_one_by_name(name)
            .await
            .inspect_err(|e| report_error("deleting cat", e))?
            .into();

        match outcome {
            DeleteOutcome::Deleted => info!(%name, "Deleted cat"),
            DeleteOutcome::NotFound => info!(%name, "No cat with this name"),
        }

        Ok(outcome)
    }

    /// Deletes every cat and reports how many were removed
    pub async fn delete_all_cats(&self) -> StoreResult<u64> {
        let deleted = self
            .collection
            .delete_all()
            .await
            .inspect_err(|e| report_error("deleting all cats", e))?;

        info!(deleted, "Deleted all cats");
        Ok(deleted)
    }

    /// Runs steps in order, continuing past failed steps
    pub async fn run(&self, steps: &[Step]) -> ScriptReport {
        let mut report = ScriptReport::default();

        info!(
            steps = steps.len(),
            backend = self.collection.backend(),
            "Running script"
        );

        for (index, step) in steps.iter().enumerate() {
            report.steps_run += 1;

            if let Err(e) = self.execute(step).await {
                report.steps_failed += 1;
                debug!(step = index + 1, error = %e, "Step failed, continuing");
            }
        }

        if report.is_success() {
            info!(steps = report.steps_run, "Script finished");
        } else {
            warn!(
                steps = report.steps_run,
                failed = report.steps_failed,
                "Script finished with failures"
            );
        }

        report
    }

    /// Executes one step; a name that matched nothing counts as a failure
    pub async fn execute(&self, step: &Step) -> StoreResult<()> {
        match step {
            Step::Create {
                name,
                age,
                features,
            } => {
                self.create_cat(NewCat::new(name.clone(), *age, features.iter().cloned()))
                    .await?;
            }
            Step::ReadAll => {
                self.read_all_cats().await?;
            }
            Step::Read { name } => {
                self.read_cat_by_name(name).await?;
            }
            Step::SetAge { name, age } => {
                let outcome = self.update_cat_age(name, *age).await?;
                require_match(outcome == UpdateOutcome::NotFound, "set_age", name)?;
            }
            Step::AddFeature { name, feature } => {
                let outcome = self.add_feature_to_cat(name, feature).await?;
                require_match(outcome == UpdateOutcome::NotFound, "add_feature", name)?;
            }
            Step::Delete { name } => {
                let outcome = self.delete_cat_by_name(name).await?;
                require_match(outcome == DeleteOutcome::NotFound, "delete", name)?;
            }
            Step::DeleteAll => {
                self.delete_all_cats().await?;
            }
        }

        Ok(())
    }
}

fn require_match(missing: bool, op: &str, name: &str) -> StoreResult<()> {
    if !missing {
        return Ok(());
    }

    let err = StoreError::NotFound(format!("cat '{}'", name));
    warn!(op, error = %err, "Step matched nothing");
    Err(err)
}

fn report_error(operation: &str, err: &StoreError) {
    if err.is_operational() || err.is_connection() {
        error!(error = %err, "Error {}", operation);
    } else {
        error!(error = %err, "Unexpected error {}", operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstore::cat::UpdateCounts;
    use crate::docstore::MemoryCatCollection;
    use async_trait::async_trait;
    use futures::stream::BoxStream;
    use std::io::Write;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Delegates to memory, but rejects cats named "broken" and drops the
    /// connection on the first insert after `drop_connection` is set
    struct Faulty {
        inner: MemoryCatCollection,
        drop_connection: AtomicBool,
    }

    #[async_trait]
    impl CatCollection for Faulty {
        fn backend(&self) -> &str {
            "faulty"
        }

        async fn insert(&self, cat: NewCat) -> StoreResult<CatId> {
            if self.drop_connection.swap(false, Ordering::SeqCst) {
                return Err(StoreError::Connection("connection reset".into()));
            }

            match cat.name.as_str() {
                "broken" => Err(StoreError::OperationRejected("bad document".into())),
                _ => self.inner.insert(cat).await,
            }
        }

        fn find_all(&self) -> BoxStream<'_, StoreResult<CatDocument>> {
            self.inner.find_all()
        }

        async fn find_one_by_name(&self, name: &str) -> StoreResult<Option<CatDocument>> {
            self.inner.find_one_by_name(name).await
        }

        async fn set_age(&self, name: &str, age: i64) -> StoreResult<UpdateCounts> {
            self.inner.set_age(name, age).await
        }

        async fn add_feature(&self, name: &str, feature: &str) -> StoreResult<UpdateCounts> {
            self.inner.add_feature(name, feature).await
        }

        async fn delete_one_by_name(&self, name: &str) -> StoreResult<bool> {
            self.inner.delete_one_by_name(name).await
        }

        async fn delete_all(&self) -> StoreResult<u64> {
            self.inner.delete_all().await
        }
    }

    fn faulty() -> CatMutator<Faulty> {
        CatMutator::new(Faulty {
            inner: MemoryCatCollection::new(),
            drop_connection: AtomicBool::new(false),
        })
    }

    fn create(name: &str) -> Step {
        Step::Create {
            name: name.to_string(),
            age: 1,
            features: vec![],
        }
    }

    #[test]
    fn test_step_deserialize() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[
                {"op": "create", "name": "barsik", "age": 3},
                {"op": "add_feature", "name": "barsik", "feature": "rudy"},
                {"op": "read_all"},
                {"op": "delete_all"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                Step::Create {
                    name: "barsik".to_string(),
                    age: 3,
                    features: vec![],
                },
                Step::AddFeature {
                    name: "barsik".to_string(),
                    feature: "rudy".to_string(),
                },
                Step::ReadAll,
                Step::DeleteAll,
            ]
        );
    }

    #[test]
    fn test_unknown_op_rejected() {
        let result = serde_json::from_str::<Vec<Step>>(r#"[{"op": "explode"}]"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failed_step_does_not_stop_script() {
        let mutator = faulty();
        let steps = vec![create("murzik"), create("broken"), create("pushok")];

        let report = mutator.run(&steps).await;

        assert_eq!(report.steps_run, 3);
        assert_eq!(report.steps_failed, 1);
        assert!(!report.is_success());
        assert!(mutator.collection().inner.find_one_by_name("pushok").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unmatched_name_counts_as_failure() {
        let mutator = faulty();
        let steps = vec![
            Step::SetAge {
                name: "sonia".to_string(),
                age: 2,
            },
            Step::Delete {
                name: "sonia".to_string(),
            },
            Step::Read {
                name: "sonia".to_string(),
            },
        ];

        let report = mutator.run(&steps).await;

        // A read that finds nothing is a normal outcome
        assert_eq!(report.steps_run, 3);
        assert_eq!(report.steps_failed, 2);
    }

    #[tokio::test]
    async fn test_dropped_connection_does_not_stop_script() {
        let mutator = faulty();
        mutator
            .collection()
            .drop_connection
            .store(true, Ordering::SeqCst);
        let steps = vec![create("barsik"), create("murzik"), create("pushok")];

        let report = mutator.run(&steps).await;

        assert_eq!(report.steps_run, 3);
        assert_eq!(report.steps_failed, 1);
        assert_eq!(mutator.collection().inner.len().await, 2);
        assert!(mutator
            .collection()
            .inner
            .find_one_by_name("barsik")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_read_all_outcomes() {
        let mutator = CatMutator::new(MemoryCatCollection::new());
        assert_eq!(mutator.read_all_cats().await.unwrap(), ReadAllOutcome::Empty);

        mutator
            .create_cat(NewCat::new("barsik", 3, ["rudy"]))
            .await
            .unwrap();
        assert_eq!(
            mutator.read_all_cats().await.unwrap(),
            ReadAllOutcome::Found(1)
        );
    }

    #[tokio::test]
    async fn test_load_script_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[{{"op": "create", "name": "barsik", "age": 3, "features": ["rudy"]}}]"#
        )
        .unwrap();

        let steps = load_script(file.path()).await.unwrap();
        assert_eq!(steps.len(), 1);
    }

    #[tokio::test]
    async fn test_load_script_errors() {
        let missing = load_script("/nonexistent/script.json").await;
        assert!(matches!(missing, Err(StoreError::PreconditionFailed(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        let invalid = load_script(file.path()).await;
        assert!(matches!(invalid, Err(StoreError::OperationRejected(_))));
    }
}
