use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog identifier for a tradeable item. Stable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifies the party currently holding an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

/// Identifier wrapper for an in-progress swap session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for a submitted proposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub String);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable catalog record referenced by the proposal zones.
///
/// `name` and `description` are display-only; `value` is the whole-unit estimate
/// the scorer sums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub value: u32,
    pub owner_id: OwnerId,
}

/// One of the two item collections of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Offer,
    Request,
}

impl Zone {
    pub const fn label(self) -> &'static str {
        match self {
            Zone::Offer => "offer",
            Zone::Request => "request",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackPolarity {
    Positive,
    Negative,
    Neutral,
}

/// Short explanation of one score component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub text: String,
    pub polarity: FeedbackPolarity,
}

impl FeedbackItem {
    pub fn positive(text: &str) -> Self {
        Self {
            text: text.to_string(),
            polarity: FeedbackPolarity::Positive,
        }
    }

    pub fn negative(text: &str) -> Self {
        Self {
            text: text.to_string(),
            polarity: FeedbackPolarity::Negative,
        }
    }

    pub fn neutral(text: &str) -> Self {
        Self {
            text: text.to_string(),
            polarity: FeedbackPolarity::Neutral,
        }
    }
}

/// High level status tracked throughout the proposal lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counterparty decision on a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOutcome {
    Accepted,
    Rejected,
}

impl ProposalOutcome {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "accepted" | "accept" => Some(Self::Accepted),
            "rejected" | "reject" | "declined" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub const fn status(self) -> ProposalStatus {
        match self {
            ProposalOutcome::Accepted => ProposalStatus::Accepted,
            ProposalOutcome::Rejected => ProposalStatus::Rejected,
        }
    }
}
