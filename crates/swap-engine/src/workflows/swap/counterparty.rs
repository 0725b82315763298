use tokio::sync::oneshot;

use super::domain::{ProposalId, ProposalOutcome};
use super::lifecycle::ProposalSnapshot;

/// Outbound hook delivering a submitted proposal to the other party.
///
/// Implementations hand back a [`ResponseTicket`] that completes whenever the decision
/// arrives. Timing and transport belong entirely to the implementation.
pub trait CounterpartyChannel: Send + Sync {
    fn deliver(&self, snapshot: &ProposalSnapshot) -> Result<ResponseTicket, DispatchError>;

    /// Called when a delivered proposal is cancelled, dismissed or closed before a
    /// decision arrived. Transports holding a [`ResponseSender`] should drop it here.
    fn withdraw(&self, _proposal_id: &ProposalId) {}
}

/// Pending counterparty decision for one proposal.
#[derive(Debug)]
pub struct ResponseTicket {
    proposal_id: ProposalId,
    receiver: oneshot::Receiver<ProposalOutcome>,
}

/// Sending half of a [`ResponseTicket`], held by whoever receives the decision.
#[derive(Debug)]
pub struct ResponseSender {
    proposal_id: ProposalId,
    sender: oneshot::Sender<ProposalOutcome>,
}

impl ResponseTicket {
    pub fn channel(proposal_id: ProposalId) -> (ResponseTicket, ResponseSender) {
        let (sender, receiver) = oneshot::channel();
        (
            ResponseTicket {
                proposal_id: proposal_id.clone(),
                receiver,
            },
            ResponseSender {
                proposal_id,
                sender,
            },
        )
    }

    pub fn proposal_id(&self) -> &ProposalId {
        &self.proposal_id
    }

    /// Waits, without a deadline, for the counterparty decision.
    pub async fn outcome(self) -> Result<ProposalOutcome, DispatchError> {
        let proposal_id = self.proposal_id;
        self.receiver
            .await
            .map_err(|_| DispatchError::ChannelClosed(proposal_id))
    }
}

impl ResponseSender {
    pub fn proposal_id(&self) -> &ProposalId {
        &self.proposal_id
    }

    pub fn send(self, outcome: ProposalOutcome) -> Result<(), DispatchError> {
        let proposal_id = self.proposal_id;
        self.sender
            .send(outcome)
            .map_err(|_| DispatchError::ChannelClosed(proposal_id))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("counterparty transport unavailable: {0}")]
    Transport(String),
    #[error("response channel for proposal {0} closed before a decision arrived")]
    ChannelClosed(ProposalId),
}
