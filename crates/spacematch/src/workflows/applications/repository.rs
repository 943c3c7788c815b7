use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{
    ApplicantId, ApplicantProfile, ApplicationId, ProviderId, Space, SpaceId,
    SpaceProviderProfile,
};
use super::super::matching::{MatchGrade, MatchReason, ScoreBreakdown};
use super::domain::{ApplicationRecord, ApplicationStatus, ReviewEntry};

/// Storage abstraction for application records.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn query(&self, query: &ApplicationQuery) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read side of the applicant, provider and space tables.
pub trait ProfileDirectory: Send + Sync {
    fn applicant(&self, id: &ApplicantId) -> Result<Option<ApplicantProfile>, DirectoryError>;
    fn provider(&self, id: &ProviderId) -> Result<Option<SpaceProviderProfile>, DirectoryError>;
    fn space(&self, id: &SpaceId) -> Result<Option<Space>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("profile directory unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    SubmittedAt,
    MatchScore,
    CompanyName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn orient(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Filter and ordering for listing applications. Defaults to newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationQuery {
    pub status: Option<ApplicationStatus>,
    pub provider_id: Option<ProviderId>,
    pub applicant_id: Option<ApplicantId>,
    /// Case-insensitive substring of the company name.
    pub company_contains: Option<String>,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl ApplicationQuery {
    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        if self.status.is_some_and(|status| status != record.status) {
            return false;
        }
        if self
            .provider_id
            .as_ref()
            .is_some_and(|provider| *provider != record.provider_id)
        {
            return false;
        }
        if self
            .applicant_id
            .as_ref()
            .is_some_and(|applicant| *applicant != record.applicant.id)
        {
            return false;
        }
        match self
            .company_contains
            .as_deref()
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
        {
            Some(pattern) => record
                .company_name()
                .to_lowercase()
                .contains(&pattern.to_lowercase()),
            None => true,
        }
    }

    /// Orders two records; unscored records go last whatever the order.
    pub fn compare(&self, a: &ApplicationRecord, b: &ApplicationRecord) -> Ordering {
        let primary = match self.sort_by {
            SortField::CreatedAt => self.order.orient(a.created_at.cmp(&b.created_at)),
            SortField::SubmittedAt => self.order.orient(a.submitted_at.cmp(&b.submitted_at)),
            SortField::CompanyName => self.order.orient(
                a.company_name()
                    .to_lowercase()
                    .cmp(&b.company_name().to_lowercase()),
            ),
            SortField::MatchScore => match (a.effective_score(), b.effective_score()) {
                (Some(x), Some(y)) => self.order.orient(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// Filters, sorts and truncates an unordered set of records.
    pub fn apply(&self, records: impl IntoIterator<Item = ApplicationRecord>) -> Vec<ApplicationRecord> {
        let mut selected: Vec<ApplicationRecord> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        selected.sort_by(|a, b| self.compare(a, b));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// List entry exposed by the review surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub applicant_id: ApplicantId,
    pub company_name: String,
    pub provider_id: ProviderId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<MatchGrade>,
    pub overridden: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Full record for the administrator detail page.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetailView {
    #[serde(flatten)]
    pub summary: ApplicationStatusView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_override: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    pub reasons: Vec<MatchReason>,
    pub applicant: ApplicantProfile,
    pub interested_spaces: Vec<SpaceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub review_log: Vec<ReviewEntry>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        let score = self.effective_score();
        ApplicationStatusView {
            application_id: self.id.clone(),
            applicant_id: self.applicant.id.clone(),
            company_name: self.company_name().to_string(),
            provider_id: self.provider_id.clone(),
            status: self.status.label(),
            score,
            grade: score.map(MatchGrade::for_total),
            overridden: self.score_override.is_some(),
            submitted_at: self.submitted_at,
        }
    }

    pub fn detail_view(&self) -> ApplicationDetailView {
        ApplicationDetailView {
            summary: self.status_view(),
            computed_score: self.computed_score(),
            score_override: self.score_override,
            breakdown: self.match_score.as_ref().map(|score| score.breakdown),
            reasons: self
                .match_score
                .as_ref()
                .map(|score| score.reasons.clone())
                .unwrap_or_default(),
            applicant: self.applicant.clone(),
            interested_spaces: self.interested_spaces.clone(),
            notes: self.notes.clone(),
            review_log: self.review_log.clone(),
            created_at: self.created_at,
            reviewed_at: self.reviewed_at,
            updated_at: self.updated_at,
        }
    }
}

/// One status column of the review board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: ApplicationStatus,
    pub applications: Vec<ApplicationStatusView>,
}

/// Applications grouped by status, best matches first within each column.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewBoard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
    pub columns: Vec<BoardColumn>,
}

impl ReviewBoard {
    pub fn column(&self, status: ApplicationStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|column| column.status == status)
    }

    pub fn total(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.applications.len())
            .sum()
    }
}
