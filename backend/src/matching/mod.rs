pub mod engine;
pub mod graph;
pub mod store;

pub use engine::{CohortOutcome, CohortPool, EngineConfig, MatchEngine, MatchingError, PassReport};
pub use graph::{Candidate, Edge};
pub use store::{MatchStore, UserStore};
