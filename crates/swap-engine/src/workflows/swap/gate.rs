use serde::{Deserialize, Serialize};

use super::proposal_set::ProposalSet;
use super::scoring::ScoreResult;

pub const DEFAULT_MINIMUM_SUBMIT_SCORE: u8 = 40;

/// Predicate deciding whether a draft may be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionGate {
    minimum_score: u8,
}

impl Default for SubmissionGate {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_SUBMIT_SCORE)
    }
}

impl SubmissionGate {
    pub fn new(minimum_score: u8) -> Self {
        Self { minimum_score }
    }

    pub fn minimum_score(&self) -> u8 {
        self.minimum_score
    }

    /// Empty zones are reported ahead of a low score, whatever the score is.
    pub fn evaluate(&self, proposal: &ProposalSet, score: &ScoreResult) -> GateDecision {
        if !proposal.both_zones_filled() {
            return GateDecision::Blocked(SubmissionBlocker::EmptyZone {
                offer_empty: proposal.offer().is_empty(),
                request_empty: proposal.request().is_empty(),
            });
        }

        if score.score < self.minimum_score {
            return GateDecision::Blocked(SubmissionBlocker::ScoreTooLow {
                score: score.score,
                minimum: self.minimum_score,
            });
        }

        GateDecision::Open
    }

    pub fn can_submit(&self, proposal: &ProposalSet, score: &ScoreResult) -> bool {
        self.evaluate(proposal, score).is_open()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "blocker", rename_all = "snake_case")]
pub enum GateDecision {
    Open,
    Blocked(SubmissionBlocker),
}

impl GateDecision {
    pub fn is_open(&self) -> bool {
        matches!(self, GateDecision::Open)
    }

    pub fn blocker(&self) -> Option<SubmissionBlocker> {
        match self {
            GateDecision::Open => None,
            GateDecision::Blocked(blocker) => Some(*blocker),
        }
    }
}

/// The gate clause that failed, so the UI can render a precise reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SubmissionBlocker {
    EmptyZone {
        offer_empty: bool,
        request_empty: bool,
    },
    ScoreTooLow {
        score: u8,
        minimum: u8,
    },
}

impl SubmissionBlocker {
    pub const fn code(&self) -> &'static str {
        match self {
            SubmissionBlocker::EmptyZone { .. } => "empty_zone",
            SubmissionBlocker::ScoreTooLow { .. } => "score_too_low",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            SubmissionBlocker::EmptyZone { .. } => "Add items to both sides of the swap",
            SubmissionBlocker::ScoreTooLow { .. } => {
                "Compatibility score is too low. Try adding more items or adjusting your proposal."
            }
        }
    }
}

impl std::fmt::Display for SubmissionBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionBlocker::EmptyZone { .. } => f.write_str(self.message()),
            SubmissionBlocker::ScoreTooLow { score, minimum } => write!(
                f,
                "compatibility score {score} is below the required {minimum}"
            ),
        }
    }
}
