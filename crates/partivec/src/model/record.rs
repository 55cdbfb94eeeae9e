use serde::{Deserialize, Serialize};

/// Arbitrary metadata attached to a record.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A stored vector and its metadata.
///
/// Each record is owned by exactly one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub vector: Vec<f32>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl Record {
    #[must_use]
    pub fn new(vector: Vec<f32>, metadata: Metadata) -> Self {
        Self { vector, metadata }
    }

    /// Number of components in the stored vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Look up a single metadata value.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }
}
