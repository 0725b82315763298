use serde::{Deserialize, Serialize};

/// Named scoring strategies. A scorer applies exactly one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringAlgorithm {
    /// Base 50, up to 30 for value balance, up to 20 for item count. Empty zones are
    /// scored by the formula like any other input.
    VarietyWeighted,
    /// Starts at 100 minus a tenth of the value gap. Either zone empty forces 0.
    #[default]
    RatioWeighted,
}

impl ScoringAlgorithm {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "variety" | "variety-weighted" | "variety_weighted" => Some(Self::VarietyWeighted),
            "ratio" | "ratio-weighted" | "ratio_weighted" => Some(Self::RatioWeighted),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoringAlgorithm::VarietyWeighted => "variety-weighted",
            ScoringAlgorithm::RatioWeighted => "ratio-weighted",
        }
    }
}
