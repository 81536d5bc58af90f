//! DAO proposal voting

use thiserror::Error;

use crate::error::{AppError, ErrorCode};
use crate::models::{Proposal, ProposalCreate, ProposalStatus, VoteChoice, VoteTally};

#[derive(Debug, Error, PartialEq)]
pub enum VoteError {
    #[error("proposal is closed")]
    Closed,

    #[error("proposal title must not be empty")]
    EmptyTitle,

    #[error("proposal must end in the future")]
    EndsInPast,
}

impl From<VoteError> for AppError {
    fn from(err: VoteError) -> Self {
        let code = match err {
            VoteError::Closed => ErrorCode::ProposalClosed,
            VoteError::EmptyTitle | VoteError::EndsInPast => ErrorCode::ProposalInvalid,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// Whether votes are still accepted at `now`
pub fn is_open(proposal: &Proposal, now: i64) -> bool {
    proposal.status == ProposalStatus::Active && now < proposal.ends_at
}

/// Check a create payload
pub fn validate_proposal(create: &ProposalCreate, now: i64) -> Result<(), VoteError> {
    if create.title.trim().is_empty() {
        return Err(VoteError::EmptyTitle);
    }
    if create.ends_at <= now {
        return Err(VoteError::EndsInPast);
    }
    Ok(())
}

/// Record or change a vote. Returns the previous choice, if any.
pub fn cast_vote(
    proposal: &mut Proposal,
    user_id: i64,
    choice: VoteChoice,
    now: i64,
) -> Result<Option<VoteChoice>, VoteError> {
    if !is_open(proposal, now) {
        return Err(VoteError::Closed);
    }
    Ok(proposal.votes.insert(user_id, choice))
}

/// Count votes per choice
pub fn tally(proposal: &Proposal) -> VoteTally {
    proposal
        .votes
        .values()
        .fold(VoteTally::default(), |mut acc, choice| {
            match choice {
                VoteChoice::For => acc.votes_for += 1,
                VoteChoice::Against => acc.against += 1,
                VoteChoice::Abstain => acc.abstain += 1,
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn proposal(ends_at: i64) -> Proposal {
        Proposal {
            id: 1,
            author_id: 2,
            title: "Reduce escrow fee to 1%".into(),
            description: String::new(),
            options: None,
            votes: BTreeMap::new(),
            status: ProposalStatus::Active,
            ends_at,
            created_at: 0,
        }
    }

    #[test]
    fn vote_can_be_changed_while_open() {
        let mut p = proposal(100);
        assert_eq!(cast_vote(&mut p, 5, VoteChoice::For, 10), Ok(None));
        assert_eq!(
            cast_vote(&mut p, 5, VoteChoice::Against, 20),
            Ok(Some(VoteChoice::For))
        );
        cast_vote(&mut p, 6, VoteChoice::Abstain, 30).unwrap();
        cast_vote(&mut p, 7, VoteChoice::Against, 30).unwrap();

        let t = tally(&p);
        assert_eq!((t.votes_for, t.against, t.abstain), (0, 2, 1));
        assert_eq!(t.total(), 3);
    }

    #[test]
    fn closed_or_expired_rejects() {
        let mut p = proposal(100);
        assert_eq!(cast_vote(&mut p, 5, VoteChoice::For, 100), Err(VoteError::Closed));

        let mut closed = proposal(1_000);
        closed.status = ProposalStatus::Closed;
        assert_eq!(cast_vote(&mut closed, 5, VoteChoice::For, 10), Err(VoteError::Closed));
        assert!(closed.votes.is_empty());

        let err: AppError = VoteError::Closed.into();
        assert_eq!(err.code, ErrorCode::ProposalClosed);
    }

    #[test]
    fn create_validation() {
        let create = ProposalCreate {
            title: " ".into(),
            description: String::new(),
            options: None,
            ends_at: 50,
        };
        assert_eq!(validate_proposal(&create, 10), Err(VoteError::EmptyTitle));
        let create = ProposalCreate {
            title: "List new category".into(),
            ..create
        };
        assert_eq!(validate_proposal(&create, 60), Err(VoteError::EndsInPast));
        assert_eq!(validate_proposal(&create, 10), Ok(()));
    }
}
