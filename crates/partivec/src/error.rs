use thiserror::Error;

/// Errors produced by collection operations.
///
/// Looking up an absent vector ID is not an error; see
/// [`Collection::get`](crate::Collection::get).
#[derive(Debug, Error)]
pub enum Error {
    /// A stored or query vector does not match the collection dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The caller named a partition the collection does not have.
    #[error("partition '{name}' does not exist (available: {})", .available.join(", "))]
    PartitionNotFound { name: String, available: Vec<String> },

    /// Invalid construction arguments. No collection is built.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("vector id must not be empty")]
    EmptyVectorId,

    /// A vector component is NaN or infinite.
    #[error("invalid value at index {index}: {value}")]
    InvalidValue { index: usize, value: f32 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Returns `true` for [`Error::DimensionMismatch`].
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }

    /// Returns `true` for [`Error::PartitionNotFound`].
    pub fn is_partition_not_found(&self) -> bool {
        matches!(self, Self::PartitionNotFound { .. })
    }

    /// Returns `true` for [`Error::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
