//! DAO Proposal Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    For,
    Against,
    Abstain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Voter id → choice; JSON object keys are strings
    #[serde(default)]
    pub votes: BTreeMap<i64, VoteChoice>,
    #[serde(default)]
    pub status: ProposalStatus,
    pub ends_at: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub options: Option<Vec<String>>,
    pub ends_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastVote {
    pub choice: VoteChoice,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    #[serde(rename = "for")]
    pub votes_for: u32,
    pub against: u32,
    pub abstain: u32,
}

impl VoteTally {
    pub fn total(&self) -> u32 {
        self.votes_for + self.against + self.abstain
    }
}

/// Proposal with its current tally, as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    pub proposal: Proposal,
    pub tally: VoteTally,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn votes_keyed_by_user_id() {
        let json = r#"{"id":1,"authorId":2,"title":"Lower fees","votes":{"5":"for","9":"abstain"},"endsAt":100,"createdAt":0}"#;
        let proposal: Proposal = serde_json::from_str(json).unwrap();
        assert_eq!(proposal.votes[&5], VoteChoice::For);
        assert_eq!(proposal.status, ProposalStatus::Active);

        let back = serde_json::to_value(&proposal).unwrap();
        assert_eq!(back["votes"]["9"], "abstain");
    }
}
