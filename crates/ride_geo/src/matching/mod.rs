//! Batch matching of ride requests to nearby drivers.
//!
//! Candidates come from the driver index; assignment is a greedy pass by
//! descending score, not an optimal bipartite matching.

pub mod batch;
pub mod greedy;
pub mod types;

pub use batch::BatchMatcher;
pub use greedy::greedy_assign;
pub use types::{MatchCandidate, MatchResult, RideRequest};
