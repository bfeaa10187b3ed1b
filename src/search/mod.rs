//! Parallel key-space search: partitioning, workers, and the single
//! aggregation point that merges their results.

pub mod aggregator;
pub mod coordinator;
pub mod partition;
pub mod progress;
pub mod substrate;
pub mod worker;

pub use self::aggregator::{ScoredCandidate, TopKSet};
pub use self::coordinator::{
    ProgressCallback, SearchCoordinator, SearchRequest, SessionState, Silent,
};
pub use self::progress::SearchProgress;
pub use self::substrate::{ExecutionSubstrate, RayonSubstrate};
