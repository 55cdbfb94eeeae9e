use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::PartitionName;

/// Per-partition record counts for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub name: String,

    /// `(partition, record count)` in partition order.
    pub partitions: Vec<(PartitionName, usize)>,

    /// Sum of all partition counts.
    pub total: usize,
}

impl CollectionSummary {
    #[must_use]
    pub fn new(name: impl Into<String>, partitions: Vec<(PartitionName, usize)>) -> Self {
        let total = partitions.iter().map(|(_, count)| count).sum();
        Self {
            name: name.into(),
            partitions,
            total,
        }
    }

    /// Record count of one partition, or `None` if there is no such partition.
    #[must_use]
    pub fn count(&self, partition: &str) -> Option<usize> {
        self.partitions
            .iter()
            .find(|(name, _)| name.as_str() == partition)
            .map(|&(_, count)| count)
    }
}

impl fmt::Display for CollectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Collection Summary: '{}' ===", self.name)?;
        for (name, count) in &self.partitions {
            writeln!(f, "  {}: {} vectors", name, count)?;
        }
        write!(f, "  TOTAL: {} vectors", self.total)
    }
}
