use std::collections::BTreeSet;

use super::{apportion, compute_score, MatchConfig, MatchEngine, MatchFactor, MatchGrade};
use crate::workflows::domain::{
    ApplicantId, ApplicantProfile, FundingStatus, ProviderId, Space, SpaceId, SpaceProviderProfile,
    SpaceType, TeamSize, TeamSizeRange,
};

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn empty_applicant() -> ApplicantProfile {
    ApplicantProfile {
        id: ApplicantId::new("applicant-1"),
        company_name: "Northwind Robotics".to_string(),
        ..ApplicantProfile::default()
    }
}

fn technology_applicant(team_size: u32) -> ApplicantProfile {
    ApplicantProfile {
        industry: Some("Technology".to_string()),
        team_size: Some(TeamSize::new(team_size).expect("positive")),
        ..empty_applicant()
    }
}

fn provider() -> SpaceProviderProfile {
    SpaceProviderProfile {
        id: ProviderId::new("pixida"),
        company_name: "Pixida".to_string(),
        industry_focus: set(&["Technology & Software"]),
        offers: set(&["Skill Sharing", "Technical Partnerships"]),
        looking_for: set(&["customer-referrals"]),
        ideal_team_size: Some(TeamSizeRange::new(10, 20).expect("valid range")),
        ..SpaceProviderProfile::default()
    }
}

fn space(capacity: u32) -> Space {
    Space {
        id: SpaceId::new("loft-2"),
        provider_id: ProviderId::new("pixida"),
        name: "Loft 2".to_string(),
        space_type: SpaceType::Office,
        size_sqm: Some(85.0),
        capacity: Some(capacity),
        monthly_price: Some(2_400.0),
        amenities: BTreeSet::new(),
        available_from: None,
        images: Vec::new(),
        location: Some("Munich".to_string()),
    }
}

fn config() -> MatchConfig {
    MatchConfig::default()
}

#[test]
fn matching_industry_and_size_earn_full_marks() {
    let score = compute_score(&technology_applicant(12), &provider(), None, &config());

    assert_eq!(score.breakdown.industry, 25);
    assert_eq!(score.breakdown.size, 25);
    assert!(score.total >= 50);
    assert_eq!(score.breakdown.sum(), u16::from(score.total));
}

#[test]
fn empty_profile_scores_neutral_defaults() {
    let score = compute_score(&empty_applicant(), &provider(), None, &config());

    assert_eq!(score.total, 50);
    assert_eq!(score.breakdown.industry, 13);
    assert_eq!(score.breakdown.size, 13);
    assert_eq!(score.breakdown.collaboration, 12);
    assert_eq!(score.breakdown.innovation, 12);
    assert!(score.reasons.iter().all(|reason| reason.neutral));
}

#[test]
fn missing_team_size_yields_neutral_size_credit() {
    let mut applicant = technology_applicant(12);
    applicant.team_size = None;

    let score = compute_score(&applicant, &provider(), None, &config());
    let size = score
        .reasons
        .iter()
        .find(|reason| reason.factor == MatchFactor::SizeCompatibility)
        .expect("size reason present");

    assert!(size.neutral);
    assert!(size.note.contains("team size not stated"));
    assert!((12..=13).contains(&score.breakdown.size));
}

#[test]
fn size_credit_decays_outside_range() {
    let config = config();

    let near = compute_score(&technology_applicant(4), &provider(), None, &config);
    let far = compute_score(&technology_applicant(40), &provider(), None, &config);

    // six people short of the range: 0.7 of 25 points
    assert!((17..=18).contains(&near.breakdown.size));
    assert_eq!(far.breakdown.size, 0);
}

#[test]
fn space_capacity_takes_precedence_over_provider_range() {
    let applicant = technology_applicant(12);

    let fits_provider = compute_score(&applicant, &provider(), None, &config());
    let small_space = space(8);
    let tight = compute_score(&applicant, &provider(), Some(&small_space), &config());

    assert_eq!(fits_provider.breakdown.size, 25);
    assert_eq!(tight.breakdown.size, 20);
    let note = &tight.reasons[1].note;
    assert!(note.contains("capacity of Loft 2"), "{note}");
}

#[test]
fn adjacent_industries_earn_partial_credit() {
    let mut applicant = technology_applicant(12);
    applicant.industry = Some("Artificial Intelligence & Machine Learning".to_string());
    let mut health = provider();
    health.industry_focus = set(&["HealthTech & Medical"]);

    let adjacent = compute_score(&applicant, &health, None, &config());

    applicant.industry = Some("Media & Entertainment".to_string());
    health.industry_focus = set(&["Energy & Sustainability"]);
    let disjoint = compute_score(&applicant, &health, None, &config());

    assert_eq!(adjacent.breakdown.industry, 15);
    assert_eq!(disjoint.breakdown.industry, 0);
}

#[test]
fn best_focus_entry_wins() {
    let mut focus = provider();
    focus.industry_focus = set(&["Energy & Sustainability", "technology"]);

    let score = compute_score(&technology_applicant(12), &focus, None, &config());

    assert_eq!(score.breakdown.industry, 25);
    assert!(score.reasons[0].note.contains("matches provider focus"));
}

#[test]
fn collaboration_uses_jaccard_overlap() {
    let mut applicant = technology_applicant(12);
    applicant.collaboration_interests = set(&["joint-development", "skill-sharing"]);
    let mut host = provider();
    host.offers = set(&["Skill Sharing"]);
    host.looking_for = set(&["customer referrals"]);

    let score = compute_score(&applicant, &host, None, &config());

    // 1 shared of 3 distinct interests: 8.33 points
    assert!((8..=9).contains(&score.breakdown.collaboration));
    assert!(score.reasons[2].note.contains("skill-sharing"));
}

#[test]
fn collaboration_is_neutral_when_provider_lists_nothing() {
    let mut applicant = technology_applicant(12);
    applicant.collaboration_interests = set(&["mentorship-exchange"]);
    let mut host = provider();
    host.offers.clear();
    host.looking_for.clear();

    let score = compute_score(&applicant, &host, None, &config());

    assert!(score.reasons[2].neutral);
}

#[test]
fn innovation_signals_are_weighted_and_capped() {
    let mut applicant = technology_applicant(12);
    applicant.tech_stack = set(&["Rust", "AI", "React"]);
    applicant.funding_status = Some(FundingStatus::Seed);
    applicant.description = "x".repeat(500);

    let partial = compute_score(&applicant, &provider(), None, &config());
    assert_eq!(partial.breakdown.innovation, 20);

    applicant.tech_stack = set(&["Rust", "AI", "PyTorch", "Kubernetes", "Blockchain"]);
    let capped = compute_score(&applicant, &provider(), None, &config());
    assert_eq!(capped.breakdown.innovation, 25);
}

#[test]
fn bootstrapped_plain_stack_scores_zero_innovation() {
    let mut applicant = technology_applicant(12);
    applicant.tech_stack = set(&["React"]);
    applicant.funding_status = Some(FundingStatus::Bootstrapped);
    applicant.description = "We build things.".to_string();

    let score = compute_score(&applicant, &provider(), None, &config());

    assert_eq!(score.breakdown.innovation, 0);
    assert!(!score.reasons[3].neutral);
}

#[test]
fn scoring_is_deterministic() {
    let mut applicant = technology_applicant(7);
    applicant.collaboration_interests = set(&["skill-sharing", "resource-sharing"]);
    applicant.tech_stack = set(&["AI", "Go"]);
    let engine = MatchEngine::new(config());
    let loft = space(6);

    let first = engine.score(&applicant, &provider(), Some(&loft));
    let second = engine.score(&applicant, &provider(), Some(&loft));

    assert_eq!(first, second);
}

#[test]
fn breakdown_always_sums_to_total() {
    let industries = [None, Some("Technology"), Some("AI"), Some("Retail"), Some("Other")];
    let sizes = [None, Some(1), Some(9), Some(15), Some(31), Some(200)];
    let interests: [&[&str]; 3] = [&[], &["skill-sharing"], &["joint-development", "x", "y"]];
    let stacks: [&[&str]; 3] = [&[], &["AI"], &["Rust", "AI", "IoT", "Robotics"]];
    let config = config();
    let host = provider();

    for industry in industries {
        for size in sizes {
            for interest in interests {
                for stack in stacks {
                    let applicant = ApplicantProfile {
                        industry: industry.map(str::to_string),
                        team_size: size.map(|n| TeamSize::new(n).expect("positive")),
                        collaboration_interests: set(interest),
                        tech_stack: set(stack),
                        ..empty_applicant()
                    };
                    let score = compute_score(&applicant, &host, None, &config);
                    assert_eq!(score.breakdown.sum(), u16::from(score.total));
                    assert!(score.total <= 100);
                    for factor in MatchFactor::ALL {
                        assert!(score.breakdown.get(factor) <= 25);
                    }
                }
            }
        }
    }
}

#[test]
fn apportion_preserves_total_for_fractional_points() {
    let values = [0.0, 0.3, 8.333, 12.5, 17.5, 24.6, 25.0];
    for a in values {
        for b in values {
            for c in values {
                for d in values {
                    let (total, parts) = apportion([a, b, c, d]);
                    let sum: u16 = parts.iter().map(|part| u16::from(*part)).sum();
                    assert_eq!(sum, u16::from(total), "{a} {b} {c} {d}");
                    assert_eq!(f64::from(total), (a + b + c + d).round());
                    assert!(parts.iter().all(|part| *part <= 25));
                }
            }
        }
    }
}

#[test]
fn apportion_sanitizes_non_finite_points() {
    let (total, parts) = apportion([f64::NAN, f64::INFINITY, -4.0, 40.0]);
    assert_eq!(total, 25);
    assert_eq!(parts, [0, 0, 0, 25]);
}

#[test]
fn grade_thresholds_follow_review_colours() {
    assert_eq!(MatchGrade::for_total(80), MatchGrade::Strong);
    assert_eq!(MatchGrade::for_total(79), MatchGrade::Moderate);
    assert_eq!(MatchGrade::for_total(60), MatchGrade::Moderate);
    assert_eq!(MatchGrade::for_total(59), MatchGrade::Weak);
}

#[test]
fn config_validation_rejects_out_of_range_values() {
    let mut config = MatchConfig::default();
    assert!(config.validate().is_ok());

    config.adjacent_industry_credit = -0.1;
    assert!(config.validate().is_err());

    let mut config = MatchConfig::default();
    config.size_decay_distance = 0;
    assert!(config.validate().is_err());

    let mut config = MatchConfig::default();
    config.funding_points = 30.0;
    assert!(config.validate().is_err());
}

#[test]
fn config_round_trips_partial_json() {
    let parsed: MatchConfig =
        serde_json::from_str(r#"{"size_decay_distance": 5}"#).expect("partial config parses");
    assert_eq!(parsed.size_decay_distance, 5);
    assert_eq!(parsed.neutral_credit, MatchConfig::default().neutral_credit);
}
