pub mod matches;
pub mod users;

pub use matches::{DateProposal, Match, ProposalError};
pub use users::{Gender, MatchingPreference, Traits, User, UserState};
