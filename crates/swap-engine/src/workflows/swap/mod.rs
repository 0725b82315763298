//! Swap proposal engine.
//!
//! Two parties build a barter proposal by placing catalog items into an offer zone and a
//! request zone. Each change recomputes a compatibility score with feedback; the
//! submission gate decides whether the draft may be sent, and the lifecycle tracks the
//! sent proposal until the counterparty accepts or rejects it.

pub mod banner;
pub mod counterparty;
pub mod domain;
pub mod gate;
pub mod lifecycle;
pub mod proposal_set;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod store;

#[cfg(test)]
mod tests;

pub use banner::{BannerAction, BannerTone, ProposalBanner};
pub use counterparty::{CounterpartyChannel, DispatchError, ResponseSender, ResponseTicket};
pub use domain::{
    FeedbackItem, FeedbackPolarity, Item, ItemId, OwnerId, ProposalId, ProposalOutcome,
    ProposalStatus, SessionId, Zone,
};
pub use gate::{GateDecision, SubmissionBlocker, SubmissionGate, DEFAULT_MINIMUM_SUBMIT_SCORE};
pub use lifecycle::{LifecycleAction, LifecycleError, ProposalLifecycle, ProposalSnapshot};
pub use proposal_set::{ProposalSet, ZoneSummary};
pub use router::swap_router;
pub use scoring::{CompatibilityScorer, ScoreBand, ScoreResult, ScoringAlgorithm};
pub use service::{SwapProposalService, SwapServiceError};
pub use session::{ProposalDraft, SessionView, SwapSession};
pub use store::{SessionStore, StoreError};
