use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::constants::PROPOSAL_WINDOW_DAYS;

/// A date proposed by one side of a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateProposal {
    /// 1 or 2, the side of the match that proposed it
    pub made_by: u8,
    /// Time of the meeting
    pub at: DateTime<Utc>,
    /// Location of the meeting
    pub location: String,
    /// True once the other side agrees. Only one proposal per match can be agreed
    pub agreed: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProposalError {
    #[error("proposed date must be in the future")]
    DateInPast,
    #[error("proposed date must be within {PROPOSAL_WINDOW_DAYS} days")]
    DateTooFar,
    #[error("location must not be empty")]
    EmptyLocation,
    #[error("proposer must be side 1 or 2 of the match")]
    InvalidProposer,
    #[error("no proposal at index {0}")]
    UnknownProposal(usize),
    #[error("a proposal has already been agreed on for this match")]
    AlreadyAgreed,
}

/// A committed pairing of two users
///
/// Matches are never deleted; the expiry sweep and explicit unmatching only
/// flip `active` off, keeping the history around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    /// Append-only list of proposed dates
    pub proposals: Vec<DateProposal>,
}

impl Match {
    pub fn new(user_a: Uuid, user_b: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_a,
            user_b,
            created_at,
            active: true,
            proposals: Vec::new(),
        }
    }

    /// Which side of the match a user is on, if any
    pub fn side_of(&self, user_id: Uuid) -> Option<u8> {
        if user_id == self.user_a {
            Some(1)
        } else if user_id == self.user_b {
            Some(2)
        } else {
            None
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.side_of(user_id).is_some()
    }

    /// Whether the match has outlived `ttl` as of `now`
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }

    /// Validate and append a proposal. Proposals always start un-agreed.
    pub fn append_proposal(
        &mut self,
        now: DateTime<Utc>,
        made_by: u8,
        at: DateTime<Utc>,
        location: String,
    ) -> Result<(), ProposalError> {
        if made_by != 1 && made_by != 2 {
            return Err(ProposalError::InvalidProposer);
        }
        if location.trim().is_empty() {
            return Err(ProposalError::EmptyLocation);
        }
        if at <= now {
            return Err(ProposalError::DateInPast);
        }
        if at - now > Duration::days(PROPOSAL_WINDOW_DAYS) {
            return Err(ProposalError::DateTooFar);
        }
        self.proposals.push(DateProposal {
            made_by,
            at,
            location,
            agreed: false,
        });
        Ok(())
    }

    /// Agree on the proposal at `index`. At most one proposal per match can
    /// ever be agreed on.
    pub fn accept_proposal(&mut self, index: usize) -> Result<(), ProposalError> {
        if self.proposals.iter().any(|p| p.agreed) {
            return Err(ProposalError::AlreadyAgreed);
        }
        let proposal = self
            .proposals
            .get_mut(index)
            .ok_or(ProposalError::UnknownProposal(index))?;
        proposal.agreed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_match() -> Match {
        Match::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_proposal_must_be_in_future() {
        let mut m = test_match();
        let now = Utc::now();
        let result = m.append_proposal(now, 1, now - Duration::hours(1), "Cafe".into());
        assert_eq!(result, Err(ProposalError::DateInPast));
    }

    #[test]
    fn test_proposal_within_window() {
        let mut m = test_match();
        let now = Utc::now();
        let result = m.append_proposal(now, 1, now + Duration::days(15), "Cafe".into());
        assert_eq!(result, Err(ProposalError::DateTooFar));

        let result = m.append_proposal(now, 2, now + Duration::days(13), "Cafe".into());
        assert!(result.is_ok());
        assert_eq!(m.proposals.len(), 1);
        assert!(!m.proposals[0].agreed);
    }

    #[test]
    fn test_only_one_proposal_agreed() {
        let mut m = test_match();
        let now = Utc::now();
        m.append_proposal(now, 1, now + Duration::days(2), "Cafe".into())
            .unwrap();
        m.append_proposal(now, 2, now + Duration::days(3), "Park".into())
            .unwrap();

        m.accept_proposal(0).unwrap();
        assert_eq!(m.accept_proposal(1), Err(ProposalError::AlreadyAgreed));
        assert!(m.proposals[0].agreed);
        assert!(!m.proposals[1].agreed);
    }

    #[test]
    fn test_accept_unknown_index() {
        let mut m = test_match();
        assert_eq!(m.accept_proposal(0), Err(ProposalError::UnknownProposal(0)));
    }

    #[test]
    fn test_staleness_boundary() {
        let now = Utc::now();
        let ttl = Duration::hours(36);
        let mut m = test_match();

        m.created_at = now - Duration::hours(40);
        assert!(m.is_stale(now, ttl));

        m.created_at = now - Duration::hours(36);
        assert!(!m.is_stale(now, ttl));

        m.created_at = now - Duration::hours(10);
        assert!(!m.is_stale(now, ttl));
    }
}
