use super::super::domain::{FeedbackItem, Zone};
use super::super::proposal_set::ProposalSet;
use super::ScoreResult;

pub(crate) const SIMILAR_VALUE: &str = "Items are of similar value";
pub(crate) const SOMEWHAT_BALANCED: &str = "Item values are somewhat balanced";
pub(crate) const VALUE_IMBALANCE: &str = "Significant value imbalance";
pub(crate) const GOOD_VARIETY: &str = "Good variety of items";
pub(crate) const ADD_MORE_ITEMS: &str = "Consider adding more items";
pub(crate) const NO_ITEMS_YET: &str = "No items added yet";
pub(crate) const BOTH_SIDES_FILLED: &str = "Both sides of the swap have items";
pub(crate) const COMPLETE_BOTH_SIDES: &str = "Complete both sides of the swap";
pub(crate) const ADD_ITEMS_TO_BOTH_ZONES: &str = "Add items to both zones to see compatibility";
pub(crate) const MULTIPLE_OFFERED: &str = "Multiple items offered increases appeal";
pub(crate) const MULTIPLE_REQUESTED: &str =
    "Requesting multiple items may reduce acceptance chance";

/// Summed zone values feeding both algorithms.
pub(crate) struct ValueTotals {
    pub offer: u64,
    pub request: u64,
}

impl ValueTotals {
    pub(crate) fn of(proposal: &ProposalSet) -> Self {
        Self {
            offer: proposal.total_value(Zone::Offer),
            request: proposal.total_value(Zone::Request),
        }
    }

    pub(crate) fn difference(&self) -> u64 {
        self.offer.abs_diff(self.request)
    }

    /// `1 - difference / max`, or 1 when both sides are worth nothing.
    pub(crate) fn balance(&self) -> f64 {
        let max = self.offer.max(self.request);
        if max == 0 {
            return 1.0;
        }
        1.0 - self.difference() as f64 / max as f64
    }

    /// `min / max`, or 1 when both sides are worth nothing.
    pub(crate) fn ratio(&self) -> f64 {
        let max = self.offer.max(self.request);
        if max == 0 {
            return 1.0;
        }
        self.offer.min(self.request) as f64 / max as f64
    }
}

pub(crate) fn variety_weighted(proposal: &ProposalSet) -> ScoreResult {
    let totals = ValueTotals::of(proposal);
    let value_balance = totals.balance();
    let total_items = proposal.offer().len() + proposal.request().len();

    let variety_points = (total_items as f64 * 5.0).min(20.0);
    let score = clamp_score(50.0 + value_balance * 30.0 + variety_points);

    let mut feedback = vec![value_tier(value_balance)];

    feedback.push(if total_items >= 4 {
        FeedbackItem::positive(GOOD_VARIETY)
    } else if total_items > 0 {
        FeedbackItem::neutral(ADD_MORE_ITEMS)
    } else {
        FeedbackItem::negative(NO_ITEMS_YET)
    });

    feedback.push(if proposal.both_zones_filled() {
        FeedbackItem::positive(BOTH_SIDES_FILLED)
    } else {
        FeedbackItem::negative(COMPLETE_BOTH_SIDES)
    });

    ScoreResult { score, feedback }
}

pub(crate) fn ratio_weighted(proposal: &ProposalSet) -> ScoreResult {
    if !proposal.both_zones_filled() {
        return ScoreResult {
            score: 0,
            feedback: vec![FeedbackItem::neutral(ADD_ITEMS_TO_BOTH_ZONES)],
        };
    }

    let totals = ValueTotals::of(proposal);
    let offer_count = proposal.offer().len();
    let request_count = proposal.request().len();

    let mut score = clamp_score(100.0 - totals.difference() as f64 / 10.0);
    if offer_count >= 2 && request_count >= 2 {
        score = score.saturating_add(5).min(100);
    }

    let mut feedback = vec![value_tier(totals.ratio())];
    if offer_count > 1 {
        feedback.push(FeedbackItem::positive(MULTIPLE_OFFERED));
    }
    if request_count > 1 {
        feedback.push(FeedbackItem::neutral(MULTIPLE_REQUESTED));
    }

    ScoreResult { score, feedback }
}

fn value_tier(balance: f64) -> FeedbackItem {
    if balance > 0.8 {
        FeedbackItem::positive(SIMILAR_VALUE)
    } else if balance > 0.5 {
        FeedbackItem::neutral(SOMEWHAT_BALANCED)
    } else {
        FeedbackItem::negative(VALUE_IMBALANCE)
    }
}

fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}
