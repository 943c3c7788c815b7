use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::industry::IndustryCategory;
use super::MAX_FACTOR_POINTS;

/// Scoring policy. Every threshold is a default, not a calibrated constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Share of a factor's points awarded when the inputs it needs are missing.
    pub neutral_credit: f64,
    /// Share of industry points for categories listed in `industry_adjacency`.
    pub adjacent_industry_credit: f64,
    pub industry_adjacency: Vec<(IndustryCategory, IndustryCategory)>,
    /// Head count outside the target range at which size credit reaches zero.
    pub size_decay_distance: u32,
    pub innovation_keywords: BTreeSet<String>,
    pub keyword_points: f64,
    pub max_keyword_points: f64,
    pub funding_points: f64,
    pub narrative_points: f64,
    pub narrative_min_chars: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        use IndustryCategory::*;

        Self {
            neutral_credit: 0.5,
            adjacent_industry_credit: 0.6,
            industry_adjacency: vec![
                (Technology, ArtificialIntelligence),
                (Technology, FinTech),
                (Technology, HealthTech),
                (Technology, Ecommerce),
                (Technology, Education),
                (ArtificialIntelligence, HealthTech),
                (ArtificialIntelligence, FinTech),
                (Marketing, Media),
                (Marketing, Ecommerce),
                (Energy, Manufacturing),
                (FinTech, ProfessionalServices),
            ],
            size_decay_distance: 20,
            innovation_keywords: [
                "ai",
                "machine learning",
                "tensorflow",
                "pytorch",
                "blockchain",
                "kubernetes",
                "rust",
                "computer vision",
                "robotics",
                "iot",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            keyword_points: 5.0,
            max_keyword_points: 15.0,
            funding_points: 5.0,
            narrative_points: 5.0,
            narrative_min_chars: 500,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), MatchConfigError> {
        for (name, value) in [
            ("neutral_credit", self.neutral_credit),
            ("adjacent_industry_credit", self.adjacent_industry_credit),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(MatchConfigError::CreditOutOfRange { name, value });
            }
        }

        if self.size_decay_distance == 0 {
            return Err(MatchConfigError::ZeroDecayDistance);
        }

        for (name, value) in [
            ("keyword_points", self.keyword_points),
            ("max_keyword_points", self.max_keyword_points),
            ("funding_points", self.funding_points),
            ("narrative_points", self.narrative_points),
        ] {
            if !value.is_finite() || !(0.0..=MAX_FACTOR_POINTS).contains(&value) {
                return Err(MatchConfigError::PointsOutOfRange { name, value });
            }
        }

        Ok(())
    }

    pub(crate) fn are_adjacent(&self, a: IndustryCategory, b: IndustryCategory) -> bool {
        self.industry_adjacency
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    pub(crate) fn is_innovation_keyword(&self, entry: &str) -> bool {
        let entry = entry.trim();
        self.innovation_keywords
            .iter()
            .any(|keyword| keyword.trim().eq_ignore_ascii_case(entry))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchConfigError {
    #[error("{name} must be within 0.0..=1.0 (found {value})")]
    CreditOutOfRange { name: &'static str, value: f64 },
    #[error("size_decay_distance must be greater than zero")]
    ZeroDecayDistance,
    #[error("{name} must be within 0..=25 points (found {value})")]
    PointsOutOfRange { name: &'static str, value: f64 },
}
