use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal fit bucket derived from the weighted total (A is best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    A,
    B,
    C,
    D,
}

impl Tier {
    pub const fn ordered() -> [Self; 4] {
        [Self::A, Self::B, Self::C, Self::D]
    }

    /// Thresholds are inclusive of their lower bound.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::A
        } else if score >= 60.0 {
            Self::B
        } else if score >= 40.0 {
            Self::C
        } else {
            Self::D
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::A => {
                "High priority - Excellent fit. Pursue aggressively with personalized outreach."
            }
            Self::B => {
                "Good fit - Worth pursuing. Develop tailored messaging and multi-touch cadence."
            }
            Self::C => {
                "Moderate fit - Consider for nurture campaigns. Monitor for positive signals."
            }
            Self::D => {
                "Low priority - Poor fit. Deprioritize unless specific trigger events occur."
            }
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
