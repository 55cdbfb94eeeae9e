//! Thread-safe handle to a [`Collection`].
//!
//! Mutations hold the write lock across their whole validate, locate and
//! write sequence, so two upserts of the same ID can never land in different
//! partitions. Readers share the read lock and never observe a half-applied
//! upsert.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::collection::{Collection, Partition};
use crate::error::Result;
use crate::knn::Neighbor;
use crate::model::{Metadata, PartitionName, Record, VectorId};
use crate::snapshot::CollectionSnapshot;
use crate::summary::CollectionSummary;

/// A cloneable, `Send + Sync` handle over one collection.
///
/// Reads return owned copies, since the lock is released before returning.
#[derive(Debug, Clone)]
pub struct SharedCollection {
    inner: Arc<RwLock<Collection>>,
}

impl SharedCollection {
    #[must_use]
    pub fn new(collection: Collection) -> Self {
        Self {
            inner: Arc::new(RwLock::new(collection)),
        }
    }

    /// See [`Collection::upsert`].
    pub fn upsert(
        &self,
        id: impl Into<VectorId>,
        vector: Vec<f32>,
        metadata: Metadata,
        partition: Option<&str>,
    ) -> Result<PartitionName> {
        self.inner.write().upsert(id, vector, metadata, partition)
    }

    /// See [`Collection::remove`].
    pub fn remove(&self, id: &str) -> Option<(PartitionName, Record)> {
        self.inner.write().remove(id)
    }

    /// See [`Collection::get`].
    #[must_use]
    pub fn get(&self, id: &str) -> Option<(PartitionName, Record)> {
        self.inner
            .read()
            .get(id)
            .map(|(partition, record)| (partition.clone(), record.clone()))
    }

    /// A copy of one partition as it was when the read lock was held.
    pub fn get_partition(&self, name: &str) -> Result<Partition> {
        self.inner.read().get_partition(name).cloned()
    }

    /// See [`Collection::search`].
    pub fn search(&self, partition: &str, query: &[f32], top_k: usize) -> Result<Vec<Neighbor>> {
        self.inner.read().search(partition, query, top_k)
    }

    #[must_use]
    pub fn summary(&self) -> CollectionSummary {
        self.inner.read().summary()
    }

    #[must_use]
    pub fn snapshot(&self) -> CollectionSnapshot {
        self.inner.read().snapshot()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Run `f` against the collection under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Collection) -> R) -> R {
        f(&self.inner.read())
    }

    /// Unwrap the collection if this is the last handle.
    pub fn try_into_inner(self) -> std::result::Result<Collection, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<Collection> for SharedCollection {
    fn from(collection: Collection) -> Self {
        Self::new(collection)
    }
}
