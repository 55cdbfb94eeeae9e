//! The partitioned vector collection.
//!
//! A [`Collection`] owns an ordered, fixed set of [`Partition`]s, and each
//! partition owns its records. A vector ID is present in at most one
//! partition. Once inserted, an ID stays in its partition for as long as it
//! exists; [`Collection::upsert`] on an existing ID updates it in place.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::config::CollectionConfig;
use crate::distance::first_non_finite;
use crate::error::{Error, Result};
use crate::knn::{self, Neighbor};
use crate::model::{Metadata, PartitionName, Record, VectorId};
use crate::placement;
use crate::summary::CollectionSummary;

/// Number of generated partitions when none are named.
pub const DEFAULT_NUM_PARTITIONS: usize = 2;

/// Prefix of generated partition names (`partition_0`, `partition_1`, ...).
pub const DEFAULT_PARTITION_PREFIX: &str = "partition_";

/// A named, disjoint subset of a collection's records.
///
/// Records are kept in insertion order. Updating a record keeps its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    name: PartitionName,
    records: IndexMap<VectorId, Record>,
}

impl Partition {
    fn new(name: PartitionName) -> Self {
        Self {
            name,
            records: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &PartitionName {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&VectorId, &Record)> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &VectorId> {
        self.records.keys()
    }
}

/// An in-memory collection of fixed-dimension vectors spread across named
/// partitions.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    dim: usize,
    partitions: Vec<Partition>,

    /// Which partition (by position) owns each ID.
    locations: HashMap<VectorId, usize>,
}

impl Collection {
    /// Create an empty collection.
    ///
    /// When `partition_names` is given it is used verbatim and in order.
    /// Otherwise `default_num_partitions` (or [`DEFAULT_NUM_PARTITIONS`])
    /// partitions named `partition_0`, `partition_1`, ... are generated.
    ///
    /// Fails with [`Error::Configuration`] when `dim` is zero, the partition
    /// set is empty, or a partition name is empty or repeated.
    pub fn new(
        name: impl Into<String>,
        dim: usize,
        partition_names: Option<Vec<String>>,
        default_num_partitions: Option<usize>,
    ) -> Result<Self> {
        let name = name.into();
        if dim == 0 {
            return Err(Error::Configuration(
                "vector dimension must be a positive integer".to_string(),
            ));
        }

        let names = match partition_names {
            Some(names) => names,
            None => default_partition_names(
                default_num_partitions.unwrap_or(DEFAULT_NUM_PARTITIONS),
            ),
        };
        let partitions = build_partitions(names)?;

        log::debug!(
            "Created collection '{}' (dim {}) with partitions [{}]",
            name,
            dim,
            partitions
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            name,
            dim,
            partitions,
            locations: HashMap::new(),
        })
    }

    /// Create a collection with explicitly named partitions.
    pub fn with_partitions<I, S>(
        name: impl Into<String>,
        dim: usize,
        partition_names: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = partition_names.into_iter().map(Into::into).collect();
        Self::new(name, dim, Some(names), None)
    }

    /// Create a collection with `count` generated partitions.
    pub fn with_default_partitions(
        name: impl Into<String>,
        dim: usize,
        count: usize,
    ) -> Result<Self> {
        Self::new(name, dim, None, Some(count))
    }

    /// Create a collection from a loaded [`CollectionConfig`].
    pub fn from_config(config: &CollectionConfig) -> Result<Self> {
        Self::new(
            config.name.clone(),
            config.dim,
            config.partition_names.clone(),
            Some(config.default_num_partitions),
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Partition names in construction order.
    pub fn partition_names(&self) -> impl Iterator<Item = &PartitionName> {
        self.partitions.iter().map(|p| &p.name)
    }

    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Partitions in construction order.
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter()
    }

    /// Total number of records across all partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    /// Insert a new record or update an existing one.
    ///
    /// An existing ID is updated in the partition that already holds it and
    /// `partition` is ignored. A new ID goes to `partition` when given (which
    /// must exist), otherwise to the partition chosen by
    /// [`placement::partition_index`].
    ///
    /// Returns the name of the partition the record now lives in. All
    /// validation happens before anything is modified.
    pub fn upsert(
        &mut self,
        id: impl Into<VectorId>,
        vector: Vec<f32>,
        metadata: Metadata,
        partition: Option<&str>,
    ) -> Result<PartitionName> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::EmptyVectorId);
        }
        self.validate_vector(&vector)?;

        if let Some(&slot) = self.locations.get(id.as_str()) {
            let owner = &mut self.partitions[slot];
            if let Some(requested) = partition {
                if requested != owner.name.as_str() {
                    log::debug!(
                        "Ignoring partition '{}' for existing '{}'; it stays in '{}'",
                        requested,
                        id,
                        owner.name
                    );
                }
            }
            log::info!("Updated '{}' in partition '{}'", id, owner.name);
            owner.records.insert(id, Record::new(vector, metadata));
            return Ok(owner.name.clone());
        }

        let slot = match partition {
            Some(name) => self.position_of(name)?,
            None => {
                let slot = placement::partition_index(id.as_str(), self.partitions.len())
                    .unwrap_or(0);
                log::debug!(
                    "Auto-selected partition '{}' for '{}'",
                    self.partitions[slot].name,
                    id
                );
                slot
            }
        };

        let target = &mut self.partitions[slot];
        log::info!("Inserted '{}' into '{}'", id, target.name);
        target.records.insert(id.clone(), Record::new(vector, metadata));
        self.locations.insert(id, slot);
        Ok(target.name.clone())
    }

    /// Find a record and the partition that owns it.
    ///
    /// Returns `None` when the ID is absent.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<(&PartitionName, &Record)> {
        let &slot = self.locations.get(id)?;
        let partition = &self.partitions[slot];
        partition.records.get(id).map(|record| (&partition.name, record))
    }

    /// Read view of one partition.
    pub fn get_partition(&self, name: &str) -> Result<&Partition> {
        let slot = self.position_of(name)?;
        Ok(&self.partitions[slot])
    }

    /// Exact k-nearest-neighbour search within one partition.
    ///
    /// Scans every record in `partition` and returns up to `top_k` hits
    /// ordered by ascending Euclidean distance. Equal distances keep the
    /// partition's insertion order.
    pub fn search(&self, partition: &str, query: &[f32], top_k: usize) -> Result<Vec<Neighbor>> {
        self.validate_vector(query)?;
        let target = self.get_partition(partition)?;

        Ok(knn::k_nearest(
            target.records.iter().map(|(id, record)| (id, record.vector.as_slice())),
            query,
            top_k,
        ))
    }

    /// Record counts per partition, plus the total.
    #[must_use]
    pub fn summary(&self) -> CollectionSummary {
        CollectionSummary::new(
            self.name.clone(),
            self.partitions
                .iter()
                .map(|p| (p.name.clone(), p.len()))
                .collect(),
        )
    }

    /// Delete a record, returning the partition it was in and its contents.
    ///
    /// Returns `None` when the ID is absent. The remaining records of the
    /// partition keep their relative order.
    pub fn remove(&mut self, id: &str) -> Option<(PartitionName, Record)> {
        let slot = self.locations.remove(id)?;
        let partition = &mut self.partitions[slot];
        let record = partition.records.shift_remove(id)?;
        log::info!("Removed '{}' from '{}'", id, partition.name);
        Some((partition.name.clone(), record))
    }

    fn validate_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        if let Some((index, value)) = first_non_finite(vector) {
            return Err(Error::InvalidValue { index, value });
        }
        Ok(())
    }

    fn position_of(&self, name: &str) -> Result<usize> {
        self.partitions
            .iter()
            .position(|p| p.name.as_str() == name)
            .ok_or_else(|| Error::PartitionNotFound {
                name: name.to_string(),
                available: self
                    .partitions
                    .iter()
                    .map(|p| p.name.to_string())
                    .collect(),
            })
    }
}

// Snapshot support
impl Collection {
    /// Rebuild a collection from partitions whose membership is already known.
    ///
    /// Used when restoring a snapshot: records stay where they were recorded,
    /// placement is not recomputed.
    pub(crate) fn from_parts(
        name: String,
        dim: usize,
        partitions: Vec<(String, Vec<(VectorId, Record)>)>,
    ) -> Result<Self> {
        let mut collection = Self::new(
            name,
            dim,
            Some(partitions.iter().map(|(name, _)| name.clone()).collect()),
            None,
        )?;

        for (slot, (_, records)) in partitions.into_iter().enumerate() {
            for (id, record) in records {
                if id.is_empty() {
                    return Err(Error::EmptyVectorId);
                }
                collection.validate_vector(&record.vector)?;
                if collection.locations.contains_key(id.as_str()) {
                    return Err(Error::Configuration(format!(
                        "vector id '{}' appears more than once",
                        id
                    )));
                }
                collection.partitions[slot].records.insert(id.clone(), record);
                collection.locations.insert(id, slot);
            }
        }

        Ok(collection)
    }
}

fn default_partition_names(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{}{}", DEFAULT_PARTITION_PREFIX, i))
        .collect()
}

fn build_partitions(names: Vec<String>) -> Result<Vec<Partition>> {
    if names.is_empty() {
        return Err(Error::Configuration(
            "a collection needs at least one partition".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(names.len());
    let mut partitions = Vec::with_capacity(names.len());
    for name in names {
        if name.is_empty() {
            return Err(Error::Configuration(
                "partition names must not be empty".to_string(),
            ));
        }
        if !seen.insert(name.clone()) {
            return Err(Error::Configuration(format!(
                "duplicate partition name '{}'",
                name
            )));
        }
        partitions.push(Partition::new(PartitionName::new(name)));
    }
    Ok(partitions)
}
