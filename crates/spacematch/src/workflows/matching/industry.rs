use serde::{Deserialize, Serialize};

/// Industry families offered by the application wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryCategory {
    Technology,
    ArtificialIntelligence,
    FinTech,
    HealthTech,
    Ecommerce,
    Education,
    Marketing,
    Media,
    Energy,
    Manufacturing,
    ProfessionalServices,
    Other,
}

impl IndustryCategory {
    /// Best-effort keyword classification of a free-text industry.
    ///
    /// Specific families are checked before the generic technology bucket so that
    /// "HealthTech & Medical" does not collapse into `Technology`.
    pub fn classify(raw: &str) -> Option<Self> {
        let text = normalize_industry(raw);
        if text.is_empty() {
            return None;
        }
        if text == "other" {
            return Some(Self::Other);
        }

        let tokens: Vec<&str> = text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|token| !token.is_empty())
            .collect();
        let has_token = |needle: &str| tokens.iter().any(|token| *token == needle);
        let contains_any = |needles: &[&str]| needles.iter().any(|needle| text.contains(needle));

        let category = if contains_any(&["artificial intelligence", "machine learning"])
            || has_token("ai")
            || has_token("ml")
        {
            Self::ArtificialIntelligence
        } else if contains_any(&["fintech", "financ", "banking", "insur"]) {
            Self::FinTech
        } else if contains_any(&["health", "medical", "biotech", "pharma"]) {
            Self::HealthTech
        } else if contains_any(&["commerce", "retail"]) {
            Self::Ecommerce
        } else if contains_any(&["edtech", "education", "learning"]) {
            Self::Education
        } else if contains_any(&["marketing", "advertis"]) {
            Self::Marketing
        } else if contains_any(&["media", "entertainment", "gaming", "publishing"]) {
            Self::Media
        } else if contains_any(&["energy", "sustainab", "cleantech", "climate"]) {
            Self::Energy
        } else if contains_any(&["manufactur", "hardware", "robotic", "industrial"]) {
            Self::Manufacturing
        } else if contains_any(&["professional services", "consult", "legal", "agency"]) {
            Self::ProfessionalServices
        } else if contains_any(&["tech", "software", "saas"]) || has_token("it") {
            Self::Technology
        } else {
            return None;
        };

        Some(category)
    }
}

pub(crate) fn normalize_industry(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
