//! Partitioned in-memory vector collection.
//!
//! A [`Collection`] holds fixed-dimension `f32` vectors with JSON metadata,
//! spread across a set of named partitions that is fixed at construction.
//! Every vector ID lives in exactly one partition. New IDs are routed either
//! to an explicitly named partition or by a stable FNV-1a hash of the ID, and
//! an ID never migrates once inserted. Search is exact brute-force Euclidean
//! k-nearest-neighbour within a single partition.
//!
//! # Example
//!
//! ```
//! use partivec::{Collection, Metadata};
//!
//! let mut products = Collection::with_partitions("products", 4, ["fruits", "juices"])?;
//! products.upsert("p1", vec![0.9, 0.1, 0.0, 0.0], Metadata::new(), Some("fruits"))?;
//! products.upsert("p2", vec![0.85, 0.15, 0.0, 0.0], Metadata::new(), Some("fruits"))?;
//!
//! let hits = products.search("fruits", &[0.88, 0.12, 0.0, 0.0], 2)?;
//! assert_eq!(hits[0].id.as_str(), "p1");
//! # Ok::<(), partivec::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod collection;
pub mod config;
mod distance;
pub mod error;
pub mod knn;
pub mod model;
pub mod placement;
pub mod shared;
pub mod snapshot;
pub mod summary;

pub use collection::{Collection, Partition};
pub use config::CollectionConfig;
pub use error::{Error, Result};
pub use knn::Neighbor;
pub use model::{Metadata, PartitionName, Record, VectorId};
pub use shared::SharedCollection;
pub use snapshot::{CollectionSnapshot, PartitionSnapshot, RecordEntry};
pub use summary::CollectionSummary;
