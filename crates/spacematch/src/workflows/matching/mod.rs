//! Applicant-to-provider compatibility scoring.
//!
//! Four factors (industry, size, collaboration, innovation) each contribute up to 25
//! points. Missing inputs earn neutral credit instead of failing the computation, and
//! the rounded breakdown always sums to the reported total.

mod config;
mod industry;
mod rules;

#[cfg(test)]
mod tests;

pub use config::{MatchConfig, MatchConfigError};
pub use industry::IndustryCategory;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicantProfile, Space, SpaceProviderProfile};
use rules::FactorScore;

pub(crate) const MAX_FACTOR_POINTS: f64 = 25.0;

/// Stateless scorer bound to one policy configuration.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: MatchConfig,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn score(
        &self,
        applicant: &ApplicantProfile,
        provider: &SpaceProviderProfile,
        space: Option<&Space>,
    ) -> MatchScore {
        compute_score(applicant, provider, space, &self.config)
    }
}

/// Scores an applicant against a provider, optionally narrowed to one of its spaces.
pub fn compute_score(
    applicant: &ApplicantProfile,
    provider: &SpaceProviderProfile,
    space: Option<&Space>,
    config: &MatchConfig,
) -> MatchScore {
    let factors: [(MatchFactor, FactorScore); 4] = [
        (
            MatchFactor::IndustryAlignment,
            rules::industry_alignment(applicant, provider, config),
        ),
        (
            MatchFactor::SizeCompatibility,
            rules::size_compatibility(applicant, provider, space, config),
        ),
        (
            MatchFactor::CollaborationPotential,
            rules::collaboration_potential(applicant, provider, config),
        ),
        (
            MatchFactor::InnovationFocus,
            rules::innovation_focus(applicant, config),
        ),
    ];

    let (total, parts) = apportion(std::array::from_fn(|i| factors[i].1.points));

    let reasons = factors
        .into_iter()
        .zip(parts)
        .map(|((factor, score), points)| MatchReason {
            factor,
            points,
            neutral: score.neutral,
            note: score.note,
        })
        .collect();

    MatchScore {
        total,
        breakdown: ScoreBreakdown {
            industry: parts[0],
            size: parts[1],
            collaboration: parts[2],
            innovation: parts[3],
        },
        reasons,
    }
}

/// Rounds raw factor points into integer sub-scores that sum exactly to the total.
///
/// Sub-scores start at their floor; the remaining points go one at a time to the
/// largest fractional factors (ties resolved in factor order).
fn apportion(raw: [f64; 4]) -> (u8, [u8; 4]) {
    let raw = raw.map(|points| {
        if points.is_finite() {
            points.clamp(0.0, MAX_FACTOR_POINTS)
        } else {
            0.0
        }
    });
    let sum: f64 = raw.iter().sum();
    let total = sum.round().clamp(0.0, 100.0) as u8;

    let mut parts = raw.map(|points| points.floor() as u8);
    let floor_sum: u8 = parts.iter().sum();
    let mut remainder = total.saturating_sub(floor_sum);

    let mut candidates: Vec<usize> = (0..raw.len()).filter(|&i| raw[i].fract() > 0.0).collect();
    candidates.sort_by(|&a, &b| raw[b].total_cmp(&raw[a]).then(a.cmp(&b)));

    for index in candidates {
        if remainder == 0 {
            break;
        }
        parts[index] += 1;
        remainder -= 1;
    }

    (total, parts)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    IndustryAlignment,
    SizeCompatibility,
    CollaborationPotential,
    InnovationFocus,
}

impl MatchFactor {
    pub const ALL: [MatchFactor; 4] = [
        MatchFactor::IndustryAlignment,
        MatchFactor::SizeCompatibility,
        MatchFactor::CollaborationPotential,
        MatchFactor::InnovationFocus,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            MatchFactor::IndustryAlignment => "Industry Alignment",
            MatchFactor::SizeCompatibility => "Size Compatibility",
            MatchFactor::CollaborationPotential => "Collaboration Potential",
            MatchFactor::InnovationFocus => "Innovation Focus",
        }
    }
}

/// Four sub-scores, each in `0..=25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub industry: u8,
    pub size: u8,
    pub collaboration: u8,
    pub innovation: u8,
}

impl ScoreBreakdown {
    pub fn get(&self, factor: MatchFactor) -> u8 {
        match factor {
            MatchFactor::IndustryAlignment => self.industry,
            MatchFactor::SizeCompatibility => self.size,
            MatchFactor::CollaborationPotential => self.collaboration,
            MatchFactor::InnovationFocus => self.innovation,
        }
    }

    pub fn sum(&self) -> u16 {
        MatchFactor::ALL
            .iter()
            .map(|factor| u16::from(self.get(*factor)))
            .sum()
    }
}

/// Explanation for one factor's contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReason {
    pub factor: MatchFactor,
    pub points: u8,
    pub neutral: bool,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub total: u8,
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub reasons: Vec<MatchReason>,
}

impl MatchScore {
    pub fn grade(&self) -> MatchGrade {
        MatchGrade::for_total(self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchGrade {
    Strong,
    Moderate,
    Weak,
}

impl MatchGrade {
    pub const fn label(self) -> &'static str {
        match self {
            MatchGrade::Strong => "strong",
            MatchGrade::Moderate => "moderate",
            MatchGrade::Weak => "weak",
        }
    }

    pub const fn for_total(total: u8) -> Self {
        if total >= 80 {
            MatchGrade::Strong
        } else if total >= 60 {
            MatchGrade::Moderate
        } else {
            MatchGrade::Weak
        }
    }
}
