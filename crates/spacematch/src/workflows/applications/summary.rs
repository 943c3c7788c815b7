use std::collections::BTreeMap;

use serde::Serialize;

use super::super::domain::ProviderId;
use super::domain::{ApplicationRecord, ApplicationStatus};

/// Industry label used when an applicant left the field blank.
pub const UNSPECIFIED_INDUSTRY: &str = "Other";

/// Effective-score bands of the admin analytics chart, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Low,
}

impl ScoreBand {
    pub const ALL: [ScoreBand; 4] = [
        ScoreBand::Excellent,
        ScoreBand::Good,
        ScoreBand::Fair,
        ScoreBand::Low,
    ];

    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::Low,
        }
    }

    pub const fn range_label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "80-100",
            ScoreBand::Good => "60-79",
            ScoreBand::Fair => "40-59",
            ScoreBand::Low => "0-39",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBandEntry {
    pub band: ScoreBand,
    pub range_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountEntry {
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustryCountEntry {
    pub industry: String,
    pub count: usize,
}

/// Headline numbers and breakdowns over a set of applications.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    /// Applications carrying an effective score.
    pub scored: usize,
    /// Rounded mean effective score, 0 when nothing is scored.
    pub average_score: u8,
    /// Accepted share of all applications in percent, 0 when empty.
    pub success_rate: u8,
    pub score_distribution: Vec<ScoreBandEntry>,
    pub by_status: Vec<StatusCountEntry>,
    /// Most common industry first; ties ordered by name.
    pub by_industry: Vec<IndustryCountEntry>,
}

impl ApplicationSummary {
    pub fn from_records<'a, I>(provider_id: Option<ProviderId>, records: I) -> Self
    where
        I: IntoIterator<Item = &'a ApplicationRecord>,
    {
        let mut total = 0usize;
        let mut score_sum = 0u64;
        let mut scored = 0usize;
        let mut bands = [0usize; ScoreBand::ALL.len()];
        let mut statuses = [0usize; ApplicationStatus::ALL.len()];
        let mut industries: BTreeMap<String, usize> = BTreeMap::new();

        for record in records {
            total += 1;
            if let Some(slot) = ApplicationStatus::ALL
                .iter()
                .position(|status| *status == record.status)
            {
                statuses[slot] += 1;
            }
            if let Some(score) = record.effective_score() {
                scored += 1;
                score_sum += u64::from(score);
                if let Some(slot) = ScoreBand::ALL
                    .iter()
                    .position(|band| *band == ScoreBand::for_score(score))
                {
                    bands[slot] += 1;
                }
            }
            *industries.entry(industry_label(record)).or_default() += 1;
        }

        let by_status: Vec<StatusCountEntry> = ApplicationStatus::ALL
            .into_iter()
            .zip(statuses)
            .map(|(status, count)| StatusCountEntry {
                status,
                status_label: status.label(),
                count,
            })
            .collect();
        let count_of = |status: ApplicationStatus| {
            by_status
                .iter()
                .find(|entry| entry.status == status)
                .map_or(0, |entry| entry.count)
        };
        let pending = count_of(ApplicationStatus::Pending);
        let accepted = count_of(ApplicationStatus::Accepted);

        let mut by_industry: Vec<IndustryCountEntry> = industries
            .into_iter()
            .map(|(industry, count)| IndustryCountEntry { industry, count })
            .collect();
        by_industry.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.industry.cmp(&b.industry))
        });

        Self {
            provider_id,
            total,
            pending,
            accepted,
            scored,
            average_score: rounded_ratio(score_sum, scored as u64, 1),
            success_rate: rounded_ratio(accepted as u64, total as u64, 100),
            score_distribution: ScoreBand::ALL
                .into_iter()
                .zip(bands)
                .map(|(band, count)| ScoreBandEntry {
                    band,
                    range_label: band.range_label(),
                    count,
                })
                .collect(),
            by_status,
            by_industry,
        }
    }

    pub fn band(&self, band: ScoreBand) -> usize {
        self.score_distribution
            .iter()
            .find(|entry| entry.band == band)
            .map_or(0, |entry| entry.count)
    }
}

fn industry_label(record: &ApplicationRecord) -> String {
    record
        .applicant
        .industry
        .as_deref()
        .map(str::trim)
        .filter(|industry| !industry.is_empty())
        .unwrap_or(UNSPECIFIED_INDUSTRY)
        .to_string()
}

/// `numerator * scale / denominator` rounded half up, capped at 100.
fn rounded_ratio(numerator: u64, denominator: u64, scale: u64) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let value = (2 * numerator * scale + denominator) / (2 * denominator);
    u8::try_from(value.min(100)).unwrap_or(100)
}
