//! Serializable image of a collection.
//!
//! A snapshot lists, per partition and in order, every `(id, vector,
//! metadata)` entry. Restoring one keeps each record in the partition it was
//! captured from; the placement hash is never consulted.

use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::error::Result;
use crate::model::{Metadata, Record, VectorId};

/// One stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub id: VectorId,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// One partition and its records in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSnapshot {
    pub name: String,
    #[serde(default)]
    pub records: Vec<RecordEntry>,
}

/// A complete, self-describing image of a [`Collection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub name: String,
    pub dim: usize,
    pub partitions: Vec<PartitionSnapshot>,
}

impl CollectionSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of records across all partitions.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.partitions.iter().map(|p| p.records.len()).sum()
    }
}

impl Collection {
    /// Capture the full state of the collection.
    #[must_use]
    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            name: self.name().to_string(),
            dim: self.dim(),
            partitions: self
                .partitions()
                .map(|partition| PartitionSnapshot {
                    name: partition.name().to_string(),
                    records: partition
                        .iter()
                        .map(|(id, record)| RecordEntry {
                            id: id.clone(),
                            vector: record.vector.clone(),
                            metadata: record.metadata.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a collection from a snapshot.
    ///
    /// Applies the same validation as construction and upsert, and also
    /// rejects an ID that appears more than once anywhere in the snapshot.
    pub fn from_snapshot(snapshot: CollectionSnapshot) -> Result<Self> {
        log::debug!(
            "Restoring collection '{}' from snapshot ({} records)",
            snapshot.name,
            snapshot.record_count()
        );
        let partitions = snapshot
            .partitions
            .into_iter()
            .map(|p| {
                let records = p
                    .records
                    .into_iter()
                    .map(|entry| (entry.id, Record::new(entry.vector, entry.metadata)))
                    .collect();
                (p.name, records)
            })
            .collect();
        Self::from_parts(snapshot.name, snapshot.dim, partitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Collection {
        let mut collection =
            Collection::with_partitions("products", 2, ["fruits", "juices"]).unwrap();
        let mut metadata = Metadata::new();
        metadata.insert("name".to_string(), json!("Red apple"));
        collection
            .upsert("p1", vec![0.9, 0.1], metadata, Some("fruits"))
            .unwrap();
        // Placed explicitly against whatever the hash would pick.
        collection
            .upsert("p3", vec![0.0, 1.0], Metadata::new(), Some("juices"))
            .unwrap();
        collection
            .upsert("p5", vec![0.5, 0.5], Metadata::new(), Some("juices"))
            .unwrap();
        collection
    }

    #[test]
    fn test_snapshot_shape() {
        let snapshot = sample().snapshot();
        assert_eq!(snapshot.name, "products");
        assert_eq!(snapshot.dim, 2);
        assert_eq!(snapshot.partitions.len(), 2);
        assert_eq!(snapshot.partitions[1].name, "juices");
        let ids: Vec<&str> = snapshot.partitions[1]
            .records
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["p3", "p5"]);
        assert_eq!(snapshot.record_count(), 3);
    }

    #[test]
    fn test_restore_keeps_membership() {
        let original = sample();
        let json = original.snapshot().to_json().unwrap();
        let restored = Collection::from_snapshot(CollectionSnapshot::from_json(&json).unwrap())
            .unwrap();

        assert_eq!(restored.summary(), original.summary());
        for id in ["p1", "p3", "p5"] {
            assert_eq!(restored.get(id), original.get(id));
        }
        assert_eq!(restored.snapshot(), original.snapshot());
    }

    #[test]
    fn test_restore_rejects_duplicate_ids() {
        let mut snapshot = sample().snapshot();
        let dup = snapshot.partitions[0].records[0].clone();
        snapshot.partitions[1].records.push(dup);

        let err = Collection::from_snapshot(snapshot).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_restore_rejects_bad_dimension() {
        let mut snapshot = sample().snapshot();
        snapshot.partitions[0].records[0].vector.push(1.0);

        let err = Collection::from_snapshot(snapshot).unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_restore_rejects_duplicate_partitions() {
        let mut snapshot = sample().snapshot();
        snapshot.partitions[1].name = "fruits".to_string();

        assert!(Collection::from_snapshot(snapshot)
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            CollectionSnapshot::from_json("{not json"),
            Err(crate::Error::Serialization(_))
        ));
    }
}
