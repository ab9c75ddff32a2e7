use crate::logic::MoonPhase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FishingRating {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl FishingRating {
    pub fn from_score(score: i32) -> Self {
        if score >= 70 {
            FishingRating::Excellent
        } else if score >= 50 {
            FishingRating::Good
        } else if score >= 30 {
            FishingRating::Fair
        } else {
            FishingRating::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FishingRating::Poor => "poor",
            FishingRating::Fair => "fair",
            FishingRating::Good => "good",
            FishingRating::Excellent => "excellent",
        }
    }
}

impl std::fmt::Display for FishingRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-factor explanations behind a rating
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionFactors {
    pub moon: String,
    /// Estimated from the sky condition, not measured
    pub barometer: String,
    pub tides: String,
    pub weather: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishingConditions {
    pub rating: FishingRating,
    pub moon_phase: MoonPhase,
    pub factors: ConditionFactors,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_thresholds() {
        assert_eq!(FishingRating::from_score(105), FishingRating::Excellent);
        assert_eq!(FishingRating::from_score(70), FishingRating::Excellent);
        assert_eq!(FishingRating::from_score(69), FishingRating::Good);
        assert_eq!(FishingRating::from_score(50), FishingRating::Good);
        assert_eq!(FishingRating::from_score(49), FishingRating::Fair);
        assert_eq!(FishingRating::from_score(30), FishingRating::Fair);
        assert_eq!(FishingRating::from_score(29), FishingRating::Poor);
        assert_eq!(FishingRating::from_score(-10), FishingRating::Poor);
    }

    #[test]
    fn ratings_are_ordered() {
        assert!(FishingRating::Poor < FishingRating::Fair);
        assert!(FishingRating::Good < FishingRating::Excellent);
    }
}
