use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Item, ProposalId, ProposalOutcome, ProposalStatus, Zone};
use super::gate::{GateDecision, SubmissionBlocker};
use super::proposal_set::ProposalSet;
use super::scoring::ScoreResult;

static PROPOSAL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_proposal_id() -> ProposalId {
    let id = PROPOSAL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProposalId(format!("swap-{id:06}"))
}

/// Zone contents and score captured at submission time. Later zone edits never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalSnapshot {
    pub proposal_id: ProposalId,
    pub offer: Vec<Item>,
    pub request: Vec<Item>,
    pub score: ScoreResult,
    pub submitted_at: DateTime<Utc>,
}

/// Calls accepted by the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Submit,
    Resolve,
    Acknowledge,
    Modify,
    Cancel,
    Dismiss,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            LifecycleAction::Submit => "submit",
            LifecycleAction::Resolve => "resolve",
            LifecycleAction::Acknowledge => "acknowledge",
            LifecycleAction::Modify => "modify",
            LifecycleAction::Cancel => "cancel",
            LifecycleAction::Dismiss => "dismiss",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejected lifecycle call. State is unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {action} a proposal that is {from}")]
    InvalidTransition {
        action: LifecycleAction,
        from: ProposalStatus,
    },
    #[error("submission not allowed: {0}")]
    SubmissionNotAllowed(SubmissionBlocker),
    #[error("response for proposal {received} does not match pending proposal {expected}")]
    StaleResponse {
        expected: ProposalId,
        received: ProposalId,
    },
}

/// Status machine for a proposal: draft, pending, then accepted or rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalLifecycle {
    status: ProposalStatus,
    submission: Option<ProposalSnapshot>,
}

impl Default for ProposalLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalLifecycle {
    pub fn new() -> Self {
        Self {
            status: ProposalStatus::Draft,
            submission: None,
        }
    }

    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    pub fn submission(&self) -> Option<&ProposalSnapshot> {
        self.submission.as_ref()
    }

    /// `draft -> pending`. The gate decision must be open for the current zones.
    pub fn submit(
        &mut self,
        proposal: &ProposalSet,
        score: &ScoreResult,
        decision: GateDecision,
    ) -> Result<ProposalSnapshot, LifecycleError> {
        self.require(LifecycleAction::Submit, ProposalStatus::Draft)?;
        if let GateDecision::Blocked(blocker) = decision {
            return Err(LifecycleError::SubmissionNotAllowed(blocker));
        }

        let snapshot = ProposalSnapshot {
            proposal_id: next_proposal_id(),
            offer: proposal.zone(Zone::Offer).to_vec(),
            request: proposal.zone(Zone::Request).to_vec(),
            score: score.clone(),
            submitted_at: Utc::now(),
        };

        self.status = ProposalStatus::Pending;
        self.submission = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// `pending -> accepted | rejected`, for the proposal currently awaiting a response.
    pub fn resolve(
        &mut self,
        proposal_id: &ProposalId,
        outcome: ProposalOutcome,
    ) -> Result<ProposalStatus, LifecycleError> {
        self.require(LifecycleAction::Resolve, ProposalStatus::Pending)?;
        if let Some(pending) = &self.submission {
            if &pending.proposal_id != proposal_id {
                return Err(LifecycleError::StaleResponse {
                    expected: pending.proposal_id.clone(),
                    received: proposal_id.clone(),
                });
            }
        }

        self.status = outcome.status();
        Ok(self.status)
    }

    /// `accepted -> draft`, handing back the accepted proposal for the follow-on phase.
    pub fn acknowledge(&mut self) -> Result<Option<ProposalSnapshot>, LifecycleError> {
        self.require(LifecycleAction::Acknowledge, ProposalStatus::Accepted)?;
        self.status = ProposalStatus::Draft;
        Ok(self.submission.take())
    }

    /// `rejected -> draft`, clearing only the request zone so it can be revised.
    pub fn modify(
        &mut self,
        proposal: &mut ProposalSet,
    ) -> Result<Option<ProposalSnapshot>, LifecycleError> {
        self.require(LifecycleAction::Modify, ProposalStatus::Rejected)?;
        proposal.clear_zone(Zone::Request);
        self.status = ProposalStatus::Draft;
        Ok(self.submission.take())
    }

    /// `* -> draft` with both zones emptied. Returns the discarded submission, if any.
    ///
    /// A decision already in flight for the discarded proposal is not retracted; it will
    /// be refused as stale or as an invalid transition when it arrives.
    pub fn cancel(&mut self, proposal: &mut ProposalSet) -> Option<ProposalSnapshot> {
        proposal.reset();
        self.status = ProposalStatus::Draft;
        self.submission.take()
    }

    /// `* -> draft` leaving the zones untouched.
    pub fn dismiss(&mut self) -> Option<ProposalSnapshot> {
        self.status = ProposalStatus::Draft;
        self.submission.take()
    }

    fn require(
        &self,
        action: LifecycleAction,
        expected: ProposalStatus,
    ) -> Result<(), LifecycleError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                action,
                from: self.status,
            })
        }
    }
}
