mod band;
mod config;
pub(crate) mod rules;

pub use band::ScoreBand;
pub use config::ScoringAlgorithm;

use serde::{Deserialize, Serialize};

use super::domain::FeedbackItem;
use super::proposal_set::ProposalSet;

/// Stateless scorer bound to one algorithm for the lifetime of a proposal context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompatibilityScorer {
    algorithm: ScoringAlgorithm,
}

impl CompatibilityScorer {
    pub fn new(algorithm: ScoringAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> ScoringAlgorithm {
        self.algorithm
    }

    pub fn score(&self, proposal: &ProposalSet) -> ScoreResult {
        match self.algorithm {
            ScoringAlgorithm::VarietyWeighted => rules::variety_weighted(proposal),
            ScoringAlgorithm::RatioWeighted => rules::ratio_weighted(proposal),
        }
    }
}

/// Compatibility score in `0..=100` plus the ordered feedback explaining it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub feedback: Vec<FeedbackItem>,
}

impl ScoreResult {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}
