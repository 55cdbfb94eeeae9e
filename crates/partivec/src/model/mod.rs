pub mod ids;
pub mod record;

pub use ids::{PartitionName, VectorId};
pub use record::{Metadata, Record};
