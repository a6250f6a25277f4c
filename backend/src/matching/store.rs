use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Gender, Match, User, UserState};

/// Read/write access to the user collection, as needed by the matchmaker.
///
/// Implementations are injected into [`super::MatchEngine`] at construction;
/// nothing in the matching core reaches a database directly.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Every `Idle` user whose own gender and desired partner gender equal
    /// the two inputs exactly. No ordering guarantee.
    async fn list_idle_by_gender_pair(&self, gender: Gender, desired: Gender)
        -> Result<Vec<User>>;

    async fn set_user_state(&self, user_id: Uuid, state: UserState) -> Result<()>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;
}

/// Read/write access to the match collection.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn insert_match(&self, record: &Match) -> Result<()>;

    async fn find_active_matches(&self) -> Result<Vec<Match>>;

    /// The active match a user is part of, if any
    async fn find_match_for_user(&self, user_id: Uuid) -> Result<Option<Match>>;

    /// Flip `active` off. The match row itself is never deleted.
    async fn deactivate_match(&self, match_id: Uuid) -> Result<()>;

    /// Validate and append a date proposal, returning the updated match.
    /// Validation failures surface as [`crate::models::ProposalError`].
    async fn append_proposal(
        &self,
        match_id: Uuid,
        made_by: u8,
        at: DateTime<Utc>,
        location: String,
    ) -> Result<Match>;

    /// Agree on the proposal at `index`, returning the updated match.
    async fn accept_proposal(&self, match_id: Uuid, index: usize) -> Result<Match>;
}
