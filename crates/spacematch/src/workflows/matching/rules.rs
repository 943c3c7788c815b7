use std::collections::BTreeSet;

use super::super::domain::{ApplicantProfile, Space, SpaceProviderProfile};
use super::config::MatchConfig;
use super::industry::{normalize_industry, IndustryCategory};
use super::MAX_FACTOR_POINTS;

/// Raw, unrounded contribution of one factor.
pub(crate) struct FactorScore {
    pub points: f64,
    pub neutral: bool,
    pub note: String,
}

impl FactorScore {
    fn scored(credit: f64, note: String) -> Self {
        Self {
            points: credit.clamp(0.0, 1.0) * MAX_FACTOR_POINTS,
            neutral: false,
            note,
        }
    }

    fn points(points: f64, note: String) -> Self {
        Self {
            points: points.clamp(0.0, MAX_FACTOR_POINTS),
            neutral: false,
            note,
        }
    }

    fn neutral(config: &MatchConfig, note: &str) -> Self {
        Self {
            points: config.neutral_credit.clamp(0.0, 1.0) * MAX_FACTOR_POINTS,
            neutral: true,
            note: format!("{note}; neutral credit applied"),
        }
    }
}

pub(crate) fn industry_alignment(
    applicant: &ApplicantProfile,
    provider: &SpaceProviderProfile,
    config: &MatchConfig,
) -> FactorScore {
    let Some(industry) = applicant
        .industry
        .as_deref()
        .map(normalize_industry)
        .filter(|industry| !industry.is_empty())
    else {
        return FactorScore::neutral(config, "applicant industry not stated");
    };
    if provider.industry_focus.is_empty() {
        return FactorScore::neutral(config, "provider has no industry focus");
    }

    let category = IndustryCategory::classify(&industry);
    let mut best: Option<(f64, String)> = None;

    for focus in &provider.industry_focus {
        let normalized = normalize_industry(focus);
        let focus_category = IndustryCategory::classify(&normalized);
        let candidate = if normalized == industry {
            Some((1.0, format!("industry '{industry}' matches provider focus")))
        } else {
            match (category, focus_category) {
                (Some(a), Some(b)) if a == b && a != IndustryCategory::Other => Some((
                    1.0,
                    format!("industry '{industry}' shares the {a:?} category with '{focus}'"),
                )),
                (Some(a), Some(b)) if config.are_adjacent(a, b) => Some((
                    config.adjacent_industry_credit,
                    format!("industry '{industry}' is adjacent to provider focus '{focus}'"),
                )),
                _ => None,
            }
        };

        if let Some((credit, note)) = candidate {
            if best.as_ref().map_or(true, |(current, _)| credit > *current) {
                best = Some((credit, note));
            }
        }
    }

    match best {
        Some((credit, note)) => FactorScore::scored(credit, note),
        None => FactorScore::scored(
            0.0,
            format!("industry '{industry}' is outside the provider's focus"),
        ),
    }
}

pub(crate) fn size_compatibility(
    applicant: &ApplicantProfile,
    provider: &SpaceProviderProfile,
    space: Option<&Space>,
    config: &MatchConfig,
) -> FactorScore {
    let Some(size) = applicant.team_size else {
        return FactorScore::neutral(config, "team size not stated");
    };

    let target = match space.and_then(|space| space.capacity_band().map(|band| (space, band))) {
        Some((space, band)) => Some((band, format!("capacity of {}", space.name))),
        None => provider
            .ideal_team_size
            .map(|range| (range, "provider ideal range".to_string())),
    };
    let Some((range, source)) = target else {
        return FactorScore::neutral(config, "no size range stated");
    };

    let distance = range.distance(size);
    if distance == 0 {
        return FactorScore::scored(
            1.0,
            format!(
                "team of {} fits {source} {}-{}",
                size.get(),
                range.min(),
                range.max()
            ),
        );
    }

    let decay = config.size_decay_distance.max(1) as f64;
    let credit = (1.0 - distance as f64 / decay).max(0.0);
    FactorScore::scored(
        credit,
        format!(
            "team of {} is {distance} outside {source} {}-{}",
            size.get(),
            range.min(),
            range.max()
        ),
    )
}

pub(crate) fn collaboration_potential(
    applicant: &ApplicantProfile,
    provider: &SpaceProviderProfile,
    config: &MatchConfig,
) -> FactorScore {
    let interests = normalize_set(applicant.collaboration_interests.iter());
    if interests.is_empty() {
        return FactorScore::neutral(config, "no collaboration interests selected");
    }
    let provider_side = normalize_set(provider.offers.iter().chain(provider.looking_for.iter()));
    if provider_side.is_empty() {
        return FactorScore::neutral(config, "provider lists no offers or needs");
    }

    let shared: Vec<&String> = interests.intersection(&provider_side).collect();
    let union = interests.union(&provider_side).count();
    let overlap = shared.len() as f64 / union as f64;

    let note = if shared.is_empty() {
        "no shared collaboration interests".to_string()
    } else {
        let names: Vec<&str> = shared.iter().map(|s| s.as_str()).collect();
        format!(
            "{} shared collaboration interest(s): {}",
            shared.len(),
            names.join(", ")
        )
    };
    FactorScore::scored(overlap, note)
}

pub(crate) fn innovation_focus(applicant: &ApplicantProfile, config: &MatchConfig) -> FactorScore {
    let description = applicant.description.trim();
    if applicant.tech_stack.is_empty()
        && applicant.funding_status.is_none()
        && description.is_empty()
    {
        return FactorScore::neutral(config, "no innovation signals provided");
    }

    let keywords: Vec<&str> = applicant
        .tech_stack
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| config.is_innovation_keyword(entry))
        .collect();

    let mut points = (keywords.len() as f64 * config.keyword_points).min(config.max_keyword_points);
    let mut signals = Vec::new();
    if !keywords.is_empty() {
        signals.push(format!("innovation stack ({})", keywords.join(", ")));
    }

    if let Some(funding) = applicant.funding_status.filter(|status| status.is_external()) {
        points += config.funding_points;
        signals.push(format!("{} funding", funding.label()));
    }

    if description.chars().count() >= config.narrative_min_chars {
        points += config.narrative_points;
        signals.push("detailed business narrative".to_string());
    }

    let note = if signals.is_empty() {
        "no qualifying innovation signals".to_string()
    } else {
        signals.join("; ")
    };

    FactorScore::points(points, note)
}

fn normalize_set<'a>(values: impl Iterator<Item = &'a String>) -> BTreeSet<String> {
    values
        .map(|value| normalize_token(value))
        .filter(|value| !value.is_empty())
        .collect()
}

/// Lowercases and joins alphanumeric runs with `-`, so "Skill Sharing" == "skill-sharing".
pub(crate) fn normalize_token(raw: &str) -> String {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
