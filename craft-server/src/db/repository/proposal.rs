//! Proposal Repository (DAO voting)

use crate::db::Storage;
use crate::db::storage::PROPOSALS_TABLE;
use shared::error::{AppError, ErrorCode};
use shared::governance;
use shared::models::{Proposal, ProposalCreate, ProposalStatus, ProposalView, VoteChoice};
use shared::util::snowflake_id;

use super::{RepoResult, found};

#[derive(Clone)]
pub struct ProposalRepository {
    storage: Storage,
}

/// Attach the tally; a proposal past its end date reads as closed
fn view(mut proposal: Proposal, now: i64) -> ProposalView {
    if proposal.status == ProposalStatus::Active && now >= proposal.ends_at {
        proposal.status = ProposalStatus::Closed;
    }
    let tally = governance::tally(&proposal);
    ProposalView { proposal, tally }
}

impl ProposalRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// All proposals, newest first
    pub fn list(&self, now: i64) -> RepoResult<Vec<ProposalView>> {
        let mut proposals: Vec<Proposal> = self.storage.list(PROPOSALS_TABLE)?;
        proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(proposals.into_iter().map(|p| view(p, now)).collect())
    }

    pub fn get(&self, id: i64, now: i64) -> RepoResult<ProposalView> {
        let proposal = found(
            self.storage.get(PROPOSALS_TABLE, id)?,
            ErrorCode::ProposalNotFound,
        )?;
        Ok(view(proposal, now))
    }

    pub fn create(&self, author_id: i64, payload: ProposalCreate, now: i64) -> RepoResult<ProposalView> {
        governance::validate_proposal(&payload, now).map_err(AppError::from)?;

        let options = payload
            .options
            .map(|opts| {
                opts.into_iter()
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|opts| !opts.is_empty());

        let proposal = Proposal {
            id: snowflake_id(),
            author_id,
            title: payload.title.trim().to_string(),
            description: payload.description,
            options,
            votes: Default::default(),
            status: ProposalStatus::Active,
            ends_at: payload.ends_at,
            created_at: now,
        };

        let txn = self.storage.begin_write()?;
        self.storage.put(&txn, PROPOSALS_TABLE, proposal.id, &proposal)?;
        txn.commit()?;

        tracing::info!(proposal_id = proposal.id, author_id, "Proposal created");
        Ok(view(proposal, now))
    }

    /// One vote per user; voting again replaces the earlier choice
    pub fn vote(&self, id: i64, user_id: i64, choice: VoteChoice, now: i64) -> RepoResult<ProposalView> {
        let txn = self.storage.begin_write()?;
        let mut proposal = found(
            self.storage.get_txn::<Proposal>(&txn, PROPOSALS_TABLE, id)?,
            ErrorCode::ProposalNotFound,
        )?;
        let previous = governance::cast_vote(&mut proposal, user_id, choice, now).map_err(AppError::from)?;
        self.storage.put(&txn, PROPOSALS_TABLE, id, &proposal)?;
        txn.commit()?;

        tracing::debug!(proposal_id = id, user_id, ?choice, ?previous, "Vote recorded");
        Ok(view(proposal, now))
    }

    /// Stop voting before the end date
    pub fn close(&self, id: i64, now: i64) -> RepoResult<ProposalView> {
        let txn = self.storage.begin_write()?;
        let mut proposal = found(
            self.storage.get_txn::<Proposal>(&txn, PROPOSALS_TABLE, id)?,
            ErrorCode::ProposalNotFound,
        )?;
        if proposal.status == ProposalStatus::Closed {
            return Err(AppError::new(ErrorCode::ProposalClosed).into());
        }
        proposal.status = ProposalStatus::Closed;
        self.storage.put(&txn, PROPOSALS_TABLE, id, &proposal)?;
        txn.commit()?;

        tracing::info!(proposal_id = id, "Proposal closed");
        Ok(view(proposal, now))
    }
}
