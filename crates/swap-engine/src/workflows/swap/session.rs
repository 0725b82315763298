use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::banner::ProposalBanner;
use super::domain::{
    FeedbackItem, Item, ItemId, ProposalId, ProposalOutcome, ProposalStatus, SessionId, Zone,
};
use super::gate::{GateDecision, SubmissionGate};
use super::lifecycle::{LifecycleError, ProposalLifecycle, ProposalSnapshot};
use super::proposal_set::{ProposalSet, ZoneSummary};
use super::scoring::{CompatibilityScorer, ScoreBand, ScoreResult, ScoringAlgorithm};
use crate::config::ProposalConfig;

/// One party's proposal workspace: zones, score, gate and lifecycle under a single owner.
///
/// Every zone mutation recomputes the score before returning, so [`SwapSession::score`]
/// always matches the zones it is read alongside.
#[derive(Debug, Clone)]
pub struct SwapSession {
    id: SessionId,
    proposal: ProposalSet,
    scorer: CompatibilityScorer,
    gate: SubmissionGate,
    lifecycle: ProposalLifecycle,
    score: ScoreResult,
}

impl SwapSession {
    pub fn new(id: SessionId, config: ProposalConfig) -> Self {
        Self::with_parts(
            id,
            CompatibilityScorer::new(config.scoring),
            SubmissionGate::new(config.minimum_submit_score),
        )
    }

    pub fn with_parts(id: SessionId, scorer: CompatibilityScorer, gate: SubmissionGate) -> Self {
        let proposal = ProposalSet::new();
        let score = scorer.score(&proposal);
        Self {
            id,
            proposal,
            scorer,
            gate,
            lifecycle: ProposalLifecycle::new(),
            score,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn proposal(&self) -> &ProposalSet {
        &self.proposal
    }

    pub fn score(&self) -> &ScoreResult {
        &self.score
    }

    pub fn algorithm(&self) -> ScoringAlgorithm {
        self.scorer.algorithm()
    }

    pub fn status(&self) -> ProposalStatus {
        self.lifecycle.status()
    }

    pub fn submission(&self) -> Option<&ProposalSnapshot> {
        self.lifecycle.submission()
    }

    pub fn gate_decision(&self) -> GateDecision {
        self.gate.evaluate(&self.proposal, &self.score)
    }

    pub fn can_submit(&self) -> bool {
        self.gate_decision().is_open()
    }

    pub fn banner(&self) -> Option<ProposalBanner> {
        ProposalBanner::for_status(self.status())
    }

    pub fn add(&mut self, zone: Zone, item: Item) -> bool {
        let item_id = item.id.clone();
        let changed = self.proposal.add(zone, item);
        self.rescore();
        debug!(session = %self.id, zone = zone.label(), item = %item_id, changed, score = self.score.score, "zone item added");
        changed
    }

    pub fn remove(&mut self, zone: Zone, item_id: &ItemId) -> bool {
        let changed = self.proposal.remove(zone, item_id);
        self.rescore();
        debug!(session = %self.id, zone = zone.label(), item = %item_id, changed, score = self.score.score, "zone item removed");
        changed
    }

    pub fn add_to_offer(&mut self, item: Item) -> bool {
        self.add(Zone::Offer, item)
    }

    pub fn add_to_request(&mut self, item: Item) -> bool {
        self.add(Zone::Request, item)
    }

    pub fn remove_from_offer(&mut self, item_id: &ItemId) -> bool {
        self.remove(Zone::Offer, item_id)
    }

    pub fn remove_from_request(&mut self, item_id: &ItemId) -> bool {
        self.remove(Zone::Request, item_id)
    }

    pub fn reset(&mut self) {
        self.proposal.reset();
        self.rescore();
        debug!(session = %self.id, "zones reset");
    }

    pub fn submit(&mut self) -> Result<ProposalSnapshot, LifecycleError> {
        let decision = self.gate_decision();
        let snapshot = self
            .lifecycle
            .submit(&self.proposal, &self.score, decision)?;
        info!(
            session = %self.id,
            proposal = %snapshot.proposal_id,
            score = snapshot.score.score,
            "swap proposal submitted"
        );
        Ok(snapshot)
    }

    pub fn resolve(
        &mut self,
        proposal_id: &ProposalId,
        outcome: ProposalOutcome,
    ) -> Result<ProposalStatus, LifecycleError> {
        let status = self.lifecycle.resolve(proposal_id, outcome)?;
        info!(session = %self.id, proposal = %proposal_id, status = status.label(), "swap proposal resolved");
        Ok(status)
    }

    pub fn acknowledge(&mut self) -> Result<Option<ProposalSnapshot>, LifecycleError> {
        let accepted = self.lifecycle.acknowledge()?;
        info!(session = %self.id, "accepted proposal acknowledged");
        Ok(accepted)
    }

    pub fn modify(&mut self) -> Result<Option<ProposalSnapshot>, LifecycleError> {
        let rejected = self.lifecycle.modify(&mut self.proposal)?;
        self.rescore();
        info!(session = %self.id, "rejected proposal reopened for changes");
        Ok(rejected)
    }

    /// Unconditional reset of zones and status. Confirmation is the caller's job.
    pub fn cancel(&mut self) -> Option<ProposalSnapshot> {
        let discarded = self.lifecycle.cancel(&mut self.proposal);
        self.rescore();
        info!(
            session = %self.id,
            discarded = discarded.as_ref().map(|snapshot| snapshot.proposal_id.0.as_str()),
            "swap proposal cancelled"
        );
        discarded
    }

    pub fn dismiss(&mut self) -> Option<ProposalSnapshot> {
        let dismissed = self.lifecycle.dismiss();
        debug!(session = %self.id, "proposal feedback dismissed");
        dismissed
    }

    pub fn draft(&self) -> ProposalDraft {
        ProposalDraft {
            session_id: self.id.clone(),
            offer: self.proposal.item_ids(Zone::Offer),
            request: self.proposal.item_ids(Zone::Request),
            status: self.status(),
            submission: self.submission().cloned(),
        }
    }

    pub fn view(&self) -> SessionView {
        let band = self.score.band();
        SessionView {
            session_id: self.id.clone(),
            algorithm: self.algorithm(),
            offer: self.proposal.offer().to_vec(),
            request: self.proposal.request().to_vec(),
            offer_summary: self.proposal.summary(Zone::Offer),
            request_summary: self.proposal.summary(Zone::Request),
            overlapping_items: self.proposal.overlapping_items(),
            feedback: self.feedback(),
            score: self.score.clone(),
            band,
            band_label: band.label(),
            gate: self.gate_decision(),
            status: self.status(),
            banner: self.banner(),
            submission: self.submission().cloned(),
        }
    }

    /// Scorer feedback followed by one neutral note per item sitting in both zones.
    pub fn feedback(&self) -> Vec<FeedbackItem> {
        let mut feedback = self.score.feedback.clone();
        feedback.extend(
            self.proposal
                .offer()
                .iter()
                .filter(|item| self.proposal.contains(Zone::Request, &item.id))
                .map(|item| {
                    FeedbackItem::neutral(&format!(
                        "{} is in both the offer and the request",
                        item.name
                    ))
                }),
        );
        feedback
    }

    fn rescore(&mut self) {
        self.score = self.scorer.score(&self.proposal);
    }
}

/// Serializable unit for a proposal: ordered ids per zone, status, and submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub session_id: SessionId,
    pub offer: Vec<ItemId>,
    pub request: Vec<ItemId>,
    pub status: ProposalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<ProposalSnapshot>,
}

/// Everything the compatibility display and feedback banner render for a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub algorithm: ScoringAlgorithm,
    pub offer: Vec<Item>,
    pub request: Vec<Item>,
    pub offer_summary: ZoneSummary,
    pub request_summary: ZoneSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overlapping_items: Vec<ItemId>,
    /// What the compatibility display lists: score feedback plus overlap notes.
    pub feedback: Vec<FeedbackItem>,
    pub score: ScoreResult,
    pub band: ScoreBand,
    pub band_label: &'static str,
    pub gate: GateDecision,
    pub status: ProposalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<ProposalBanner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<ProposalSnapshot>,
}
